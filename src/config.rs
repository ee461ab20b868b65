// ============================================================================
// Configuration
// ============================================================================
// Paramètres des deux fournisseurs, du logging et des raccourcis.
//
// Chargée depuis un fichier TOML optionnel :
// - $SRLEVELS_CONFIG si défini
// - sinon ~/.config/srlevels/config.toml (Linux), équivalent sur macOS/Windows
// Un fichier absent n'est pas une erreur : les valeurs par défaut s'appliquent.
//
// Exemple :
// [primary]
// timeout_secs = 5
//
// [fallback]
// timeout_secs = 20
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Nom de l'application (répertoires de config et de logs)
pub const APP_NAME: &str = "srlevels";

/// Variable d'environnement pour surcharger le chemin du fichier de config
pub const CONFIG_ENV_VAR: &str = "SRLEVELS_CONFIG";

/// Symboles des cinq boutons de sélection rapide
pub const DEFAULT_QUICK_SYMBOLS: [&str; 5] = ["NIFTY", "BANKNIFTY", "FINNIFTY", "RELIANCE", "TCS"];

const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Configuration complète
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub primary: PrimaryConfig,
    pub fallback: FallbackConfig,
    pub log: LogConfig,
    pub quick_symbols: Vec<String>,
}

/// Fournisseur principal (API NSE, snapshot d'indice)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    /// Endpoint du snapshot d'indice (sans paramètres)
    pub url: String,
    /// Indice interrogé, quel que soit le symbole demandé
    pub reference_index: String,
    pub timeout_secs: u64,
    /// Nombre de lignes conservées (les plus récentes)
    pub max_rows: usize,
    pub user_agent: String,
}

/// Fournisseur de secours (API de charting Groww)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Préfixe de l'endpoint, complété par /exchange/{exchange}/segment/{segment}/{symbol}
    pub base_url: String,
    pub exchange: String,
    pub segment: String,
    pub interval: String,
    pub user_agent: String,
    /// Aucun timeout si absent (défaut du transport)
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Répertoire des logs ; par défaut ~/.local/share/srlevels/logs
    pub dir: Option<PathBuf>,
    /// Directive EnvFilter utilisée quand RUST_LOG n'est pas défini
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary: PrimaryConfig::default(),
            fallback: FallbackConfig::default(),
            log: LogConfig::default(),
            quick_symbols: DEFAULT_QUICK_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            url: "https://www.nseindia.com/api/equity-stockIndices".to_string(),
            reference_index: "NIFTY 50".to_string(),
            timeout_secs: 10,
            max_rows: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: "https://groww.in/v1/api/charting_service/v2/chart".to_string(),
            exchange: "NSE".to_string(),
            segment: "CASH".to_string(),
            interval: "1d".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filter: format!("{}=debug,info", APP_NAME),
        }
    }
}

impl Config {
    /// Charge la configuration depuis l'emplacement par défaut
    ///
    /// CONCEPT RUST : Option chaining
    /// - env var > répertoire de config de l'OS > valeurs par défaut
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml")));

        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Lit et parse un fichier TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Fichier de configuration invalide : {}", path.display()))?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.quick_symbols.is_empty() {
            anyhow::bail!("quick_symbols ne peut pas être vide");
        }
        Ok(config)
    }

    /// Répertoire des logs effectif
    pub fn log_dir(&self) -> PathBuf {
        self.log
            .dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_NAME).join("logs")))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
