// ============================================================================
// API Client : Groww (fournisseur de secours)
// ============================================================================
// Récupère les bougies journalières d'un symbole via l'API de charting Groww.
// Utilisé uniquement quand NSE n'a rien retourné.
//
// Format de la réponse :
// { "candles": [[timestamp_ms, open, high, low, close, volume], ...] }
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{get_json, FetchError, PriceSource};
use crate::config::FallbackConfig;
use crate::models::{PriceBar, PriceSeries, Source};

/// Bougie brute : (timestamp ms, open, high, low, close, volume)
type RawCandle = (i64, f64, f64, f64, f64, f64);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    candles: Option<Vec<RawCandle>>,
}

/// Client du fournisseur de secours
pub struct GrowwProvider {
    client: reqwest::Client,
    config: FallbackConfig,
}

impl GrowwProvider {
    /// Crée le client HTTP
    ///
    /// Pas de timeout explicite sauf s'il est configuré.
    pub fn new(config: FallbackConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .context("Échec de la création du client HTTP Groww")?;

        Ok(Self { client, config })
    }

    /// URL du graphique d'un symbole (sans le paramètre interval)
    ///
    /// Le symbole est utilisé tel quel, sans validation.
    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/exchange/{}/segment/{}/{}",
            self.config.base_url, self.config.exchange, self.config.segment, symbol
        )
    }
}

impl PriceSource for GrowwProvider {
    fn source(&self) -> Source {
        Source::Groww
    }

    #[instrument(skip(self), fields(interval = %self.config.interval))]
    async fn try_fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(symbol);
        debug!(url = %url, "Requesting Groww candles");

        let request = self
            .client
            .get(&url)
            .query(&[("interval", self.config.interval.as_str())]);
        let response: ChartResponse = get_json(request).await?;

        let series = parse_candles(response, symbol)?;
        info!(candles = series.len(), "Successfully fetched Groww candles");
        Ok(series)
    }
}

/// Convertit les bougies en PriceSeries, dans l'ordre reçu
fn parse_candles(response: ChartResponse, symbol: &str) -> Result<PriceSeries, FetchError> {
    let candles = response.candles.unwrap_or_default();
    if candles.is_empty() {
        return Err(FetchError::Empty);
    }

    let bars = candles
        .into_iter()
        .map(|(ts, open, high, low, close, volume)| {
            let timestamp = from_millis(ts).ok_or(FetchError::Timestamp(ts))?;
            Ok(PriceBar::new(timestamp, open, high, low, close, to_volume(volume)))
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    Ok(PriceSeries::new(symbol, Source::Groww, bars)?)
}

/// Epoch millisecondes -> DateTime<Utc>
fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    let nanos = (ms.rem_euclid(1000) * 1_000_000) as u32;
    DateTime::from_timestamp(ms.div_euclid(1000), nanos)
}

/// Le volume arrive parfois en flottant, on le ramène à un entier positif
fn to_volume(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.round() as u64
    } else {
        0
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
