// ============================================================================
// API Client : NSE (fournisseur principal)
// ============================================================================
// Récupère le snapshot des cotations de l'indice de référence (NIFTY 50) et
// le convertit en PriceSeries.
//
// ATTENTION : l'endpoint ne dépend pas du symbole demandé. Le symbole ne sert
// que d'étiquette sur la série retournée. Comportement conservé tel quel,
// voir DESIGN.md.
//
// Le snapshot n'est pas une vraie série temporelle : chaque ligne reprend le
// dernier prix d'un composant de l'indice, toutes avec le même timestamp.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{get_json, FetchError, PriceSource};
use crate::config::PrimaryConfig;
use crate::models::{PriceBar, PriceSeries, Source};

/// Valeur renvoyée par NSE quand le plus haut / plus bas n'est pas disponible
const INVALID_PRICE: f64 = -1.0;

// ============================================================================
// Structures pour parser la réponse JSON de NSE
// ============================================================================
// Seuls les champs utilisés sont déclarés, serde ignore le reste.
// ============================================================================

/// Réponse de /api/equity-stockIndices
#[derive(Debug, Deserialize)]
struct IndexSnapshot {
    #[serde(default)]
    data: Vec<IndexQuote>,
}

/// Cotation d'un composant de l'indice
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")] // "lastPrice" -> last_price
struct IndexQuote {
    last_price: f64,
    day_high: f64,
    day_low: f64,
}

/// Client du fournisseur principal
pub struct NseProvider {
    client: reqwest::Client,
    config: PrimaryConfig,
}

impl NseProvider {
    /// Crée le client HTTP (User-Agent navigateur, timeout configuré)
    pub fn new(config: PrimaryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Échec de la création du client HTTP NSE")?;

        Ok(Self { client, config })
    }

    /// URL du snapshot de l'indice de référence
    ///
    /// L'espace est encodé en %20 ("NIFTY 50" -> "NIFTY%2050").
    fn snapshot_url(&self) -> String {
        format!(
            "{}?index={}",
            self.config.url,
            self.config.reference_index.replace(' ', "%20")
        )
    }
}

impl PriceSource for NseProvider {
    fn source(&self) -> Source {
        Source::Nse
    }

    #[instrument(skip(self), fields(index = %self.config.reference_index))]
    async fn try_fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        let url = self.snapshot_url();
        debug!(url = %url, "Requesting NSE index snapshot");

        let request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        let snapshot: IndexSnapshot = get_json(request).await?;

        let series = parse_snapshot(snapshot, symbol, self.config.max_rows, Utc::now())?;
        info!(rows = series.len(), "Successfully fetched NSE snapshot");
        Ok(series)
    }
}

/// Convertit le snapshot en PriceSeries
///
/// - Close = lastPrice, Open = Close
/// - High / Low = dayHigh / dayLow, remplacés par Close si égaux à -1
/// - Volume = 0 (non fourni par cet endpoint)
/// - un seul instant de récupération pour toutes les lignes
/// - seules les `max_rows` dernières lignes sont gardées
fn parse_snapshot(
    snapshot: IndexSnapshot,
    symbol: &str,
    max_rows: usize,
    retrieved_at: DateTime<Utc>,
) -> Result<PriceSeries, FetchError> {
    if snapshot.data.is_empty() {
        return Err(FetchError::Empty);
    }

    let total = snapshot.data.len();
    let skip = total.saturating_sub(max_rows);

    let bars: Vec<PriceBar> = snapshot
        .data
        .into_iter()
        .skip(skip)
        .map(|quote| {
            let close = quote.last_price;
            let high = or_close(quote.day_high, close);
            let low = or_close(quote.day_low, close);
            PriceBar::new(retrieved_at, close, high, low, close, 0)
        })
        .collect();

    debug!(total, kept = bars.len(), "Normalized NSE snapshot");
    Ok(PriceSeries::new(symbol, Source::Nse, bars)?)
}

fn or_close(value: f64, close: f64) -> f64 {
    if value == INVALID_PRICE {
        close
    } else {
        value
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::api::test_support::{serve_once, serve_silent};
    use crate::api::FetchOutcome;
    use crate::models::NoticeLevel;

    fn snapshot(json: &str) -> IndexSnapshot {
        serde_json::from_str(json).unwrap()
    }

    fn provider(url: String) -> NseProvider {
        let config = PrimaryConfig {
            url,
            ..PrimaryConfig::default()
        };
        NseProvider::new(config).unwrap()
    }

    #[test]
    fn test_snapshot_url_encodes_space() {
        let nse = NseProvider::new(PrimaryConfig::default()).unwrap();
        assert_eq!(
            nse.snapshot_url(),
            "https://www.nseindia.com/api/equity-stockIndices?index=NIFTY%2050"
        );
    }

    #[test]
    fn test_sentinel_high_replaced_by_close() {
        let snap = snapshot(
            r#"{"data": [
                {"symbol": "NIFTY 50", "lastPrice": 22000.5, "dayHigh": -1, "dayLow": 21900.0}
            ]}"#,
        );
        let series = parse_snapshot(snap, "NIFTY", 10, Utc::now()).unwrap();
        let bar = series.last();

        assert_eq!(bar.close, 22000.5);
        assert_eq!(bar.open, 22000.5);
        assert_eq!(bar.high, 22000.5);
        assert_eq!(bar.low, 21900.0);
        assert_eq!(bar.volume, 0);
    }

    #[test]
    fn test_sentinel_low_replaced_by_close() {
        let snap = snapshot(r#"{"data": [{"lastPrice": 150.0, "dayHigh": 155.0, "dayLow": -1}]}"#);
        let series = parse_snapshot(snap, "TCS", 10, Utc::now()).unwrap();
        assert_eq!(series.last().low, 150.0);
        assert_eq!(series.last().high, 155.0);
    }

    #[test]
    fn test_keeps_last_rows_with_shared_timestamp() {
        let quotes: Vec<String> = (1..=15)
            .map(|i| format!(r#"{{"lastPrice": {}.0, "dayHigh": {}.0, "dayLow": {}.0}}"#, i, i + 1, i - 1))
            .collect();
        let snap = snapshot(&format!(r#"{{"data": [{}]}}"#, quotes.join(",")));
        let now = Utc::now();

        let series = parse_snapshot(snap, "BANKNIFTY", 10, now).unwrap();

        assert_eq!(series.len(), 10);
        assert_eq!(series.first().close, 6.0);
        assert_eq!(series.last().close, 15.0);
        assert!(series.bars().iter().all(|b| b.timestamp == now));
        assert_eq!(series.symbol(), "BANKNIFTY");
        assert_eq!(series.source(), Source::Nse);
    }

    #[test]
    fn test_empty_data_is_error() {
        let snap = snapshot(r#"{"data": []}"#);
        assert!(matches!(
            parse_snapshot(snap, "NIFTY", 10, Utc::now()),
            Err(FetchError::Empty)
        ));

        let missing = snapshot(r#"{"name": "NIFTY 50"}"#);
        assert!(matches!(
            parse_snapshot(missing, "NIFTY", 10, Utc::now()),
            Err(FetchError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_http_500_is_no_data_with_warning() {
        let (base, _request) = serve_once("500 Internal Server Error", "").await;
        let nse = provider(format!("{}/api/equity-stockIndices", base));
        let mut notices = Vec::new();

        let outcome = nse.fetch("NIFTY", &mut notices).await;

        assert_eq!(outcome, FetchOutcome::NoData);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert!(notices[0].message.contains("NSE"));
        assert!(notices[0].message.contains("500"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_data_with_warning() {
        let nse = provider("http://127.0.0.1:1/api/equity-stockIndices".to_string());
        let mut notices = Vec::new();

        let outcome = nse.fetch("NIFTY", &mut notices).await;

        assert_eq!(outcome, FetchOutcome::NoData);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert!(notices[0].message.starts_with("Échec NSE : erreur réseau"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let base = serve_silent().await;
        let nse = NseProvider::new(PrimaryConfig {
            url: base,
            timeout_secs: 1,
            ..PrimaryConfig::default()
        })
        .unwrap();
        let mut notices = Vec::new();

        let started = Instant::now();
        let outcome = nse.fetch("NIFTY", &mut notices).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, FetchOutcome::NoData);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert!(elapsed >= Duration::from_millis(900), "returned after {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "returned after {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_invalid_json_is_no_data() {
        let (base, _request) = serve_once("200 OK", "<html>blocked</html>").await;
        let nse = provider(base);
        let mut notices = Vec::new();

        assert!(nse.fetch("NIFTY", &mut notices).await.is_no_data());
        assert_eq!(notices.len(), 1);
    }

    #[tokio::test]
    async fn test_successful_fetch_sends_browser_headers() {
        let body = r#"{"data": [{"lastPrice": 100.0, "dayHigh": 101.0, "dayLow": 99.0}]}"#;
        let (base, request) = serve_once("200 OK", body).await;
        let nse = provider(format!("{}/api/equity-stockIndices", base));
        let mut notices = Vec::new();

        let outcome = nse.fetch("RELIANCE", &mut notices).await;

        let series = match outcome {
            FetchOutcome::Data(series) => series,
            FetchOutcome::NoData => panic!("expected data, got {:?}", notices),
        };
        assert_eq!(series.symbol(), "RELIANCE");
        assert!(notices.is_empty());

        let raw = request.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /api/equity-stockindices?index=nifty%2050 "));
        assert!(raw.contains("user-agent: mozilla/5.0"));
        assert!(raw.contains("accept: application/json"));
    }
}
