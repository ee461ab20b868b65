// ============================================================================
// Structures : PriceBar et PriceSeries
// ============================================================================
// Une ligne journalière (Open, High, Low, Close, Volume) et la série ordonnée
// qui les regroupe.
//
// CONCEPTS RUST :
// 1. Constructeur fallible : PriceSeries::new retourne un Result, donc une
//    PriceSeries existante respecte toujours ses invariants
// 2. Champs privés + accesseurs : personne ne peut vider la série après coup
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fournisseur d'où proviennent les données
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// API NSE (snapshot de l'indice de référence)
    Nse,
    /// API de charting Groww (vraies bougies journalières)
    Groww,
}

impl Source {
    /// Nom court pour l'affichage et les logs
    pub fn label(&self) -> &'static str {
        match self {
            Source::Nse => "NSE",
            Source::Groww => "Groww",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Une ligne journalière de prix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Index de la ligne (date/heure UTC)
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume échangé (0 quand le fournisseur ne le donne pas)
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Violation d'un invariant de PriceSeries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("la série de prix est vide")]
    Empty,

    #[error("ligne {index} : high ({high}) < low ({low})")]
    InvertedRange { index: usize, high: f64, low: f64 },

    #[error("ligne {index} : prix non fini")]
    NonFinite { index: usize },
}

/// Série de prix journaliers, triée du plus ancien au plus récent
///
/// Invariants (garantis par `new`) :
/// - au moins une ligne
/// - high >= low sur chaque ligne
/// - tous les prix sont finis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    source: Source,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Construit une série en vérifiant les invariants
    pub fn new(symbol: impl Into<String>, source: Source, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }

        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_finite() {
                return Err(SeriesError::NonFinite { index });
            }
            if bar.high < bar.low {
                return Err(SeriesError::InvertedRange {
                    index,
                    high: bar.high,
                    low: bar.low,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            source,
            bars,
        })
    }

    /// Symbole utilisé comme étiquette de la série
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Toujours faux : une série vide ne peut pas être construite
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Ligne la plus récente
    ///
    /// CONCEPT RUST : pas d'Option ici, l'invariant "non vide" est porté
    /// par le type, on indexe directement
    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    /// Plus bas de toute la série (min des Low)
    pub fn min_low(&self) -> f64 {
        self.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min)
    }

    /// Plus haut de toute la série (max des High)
    pub fn max_high(&self) -> f64 {
        self.bars
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Points (x, y) pour le graphique : index de ligne et clôture
    pub fn close_points(&self) -> Vec<(f64, f64)> {
        self.bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (i as f64, bar.close))
            .collect()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar::new(Utc::now(), close, high, low, close, 0)
    }

    #[test]
    fn test_empty_series_rejected() {
        let result = PriceSeries::new("NIFTY", Source::Nse, Vec::new());
        assert_eq!(result.unwrap_err(), SeriesError::Empty);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let bars = vec![bar(101.0, 99.0, 100.0), bar(98.0, 99.0, 98.5)];
        let err = PriceSeries::new("NIFTY", Source::Nse, bars).unwrap_err();
        assert!(matches!(err, SeriesError::InvertedRange { index: 1, .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        let bars = vec![bar(f64::NAN, 99.0, 100.0)];
        let err = PriceSeries::new("NIFTY", Source::Nse, bars).unwrap_err();
        assert_eq!(err, SeriesError::NonFinite { index: 0 });
    }

    #[test]
    fn test_min_max_and_last() {
        let bars = vec![
            bar(101.0, 99.0, 100.0),
            bar(106.0, 104.0, 105.0),
            bar(111.0, 109.0, 110.0),
        ];
        let series = PriceSeries::new("NIFTY", Source::Groww, bars).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.min_low(), 99.0);
        assert_eq!(series.max_high(), 111.0);
        assert_eq!(series.last().close, 110.0);
        assert_eq!(series.first().close, 100.0);
        assert_eq!(series.source(), Source::Groww);
    }

    #[test]
    fn test_close_points() {
        let bars = vec![bar(101.0, 99.0, 100.0), bar(106.0, 104.0, 105.0)];
        let series = PriceSeries::new("TCS", Source::Nse, bars).unwrap();
        assert_eq!(series.close_points(), vec![(0.0, 100.0), (1.0, 105.0)]);
    }
}
