// ============================================================================
// Module : api
// ============================================================================
// Clients des fournisseurs de données de marché :
// - nse : fournisseur principal (snapshot de l'indice de référence)
// - groww : fournisseur de secours (bougies journalières par symbole)
//
// Les deux retournent la même PriceSeries normalisée. Toute erreur (réseau,
// statut HTTP, JSON, forme des données) est convertie en FetchOutcome::NoData
// à la frontière du fournisseur, accompagnée d'un avertissement.
// ============================================================================

pub mod groww; // Client API Groww (secours)
pub mod nse;   // Client API NSE (principal)

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{Notice, PriceSeries, SeriesError, Source};

pub use groww::GrowwProvider;
pub use nse::NseProvider;

/// Raisons pour lesquelles un fournisseur n'a pas pu livrer de série
///
/// Toutes sont traitées de la même façon (NoData + avertissement), la
/// distinction sert aux logs et au message affiché.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("erreur réseau : {0}")]
    Transport(#[from] reqwest::Error),

    #[error("réponse JSON invalide : {0}")]
    Parse(#[from] serde_json::Error),

    #[error("aucune donnée retournée")]
    Empty,

    #[error("timestamp invalide : {0}")]
    Timestamp(i64),

    #[error("données incohérentes : {0}")]
    Shape(#[from] SeriesError),
}

/// Résultat d'une récupération : une série, ou rien
///
/// CONCEPT RUST : Enum à deux variantes au lieu d'exceptions
/// - L'orchestrateur fait un match, rien ne remonte en panique
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Data(PriceSeries),
    NoData,
}

impl FetchOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchOutcome::NoData)
    }
}

/// Un fournisseur de séries de prix
///
/// CONCEPT RUST : Trait avec méthode par défaut
/// - `try_fetch` : implémentée par chaque fournisseur, peut échouer
/// - `fetch` : fournie, convertit l'échec en NoData + avertissement
///
/// Les tests de l'orchestration implémentent ce trait avec des sources
/// simulées pour compter les appels.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    /// Identité du fournisseur (messages et attribution)
    fn source(&self) -> Source;

    async fn try_fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError>;

    async fn fetch(&self, symbol: &str, notices: &mut Vec<Notice>) -> FetchOutcome {
        match self.try_fetch(symbol).await {
            Ok(series) => FetchOutcome::Data(series),
            Err(e) => {
                warn!(provider = %self.source(), symbol, error = %e, "Fetch failed, returning no data");
                notices.push(Notice::warning(format!("Échec {} : {}", self.source(), e)));
                FetchOutcome::NoData
            }
        }
    }
}

/// Envoie une requête et désérialise le corps JSON
///
/// Le corps est lu en octets puis parsé avec serde_json, pour séparer les
/// erreurs de transport des erreurs de format.
#[instrument(skip(request))]
async fn get_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, FetchError> {
    let response = request.send().await?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.bytes().await?;
    debug!(bytes = body.len(), "Parsing JSON response");
    Ok(serde_json::from_slice(&body)?)
}

// ============================================================================
// Support de test : serveur HTTP jetable
// ============================================================================
