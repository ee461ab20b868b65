// ============================================================================
// Pipeline : NSE -> (secours) Groww -> calcul des niveaux
// ============================================================================
// Une exécution par interaction utilisateur, du début à la fin :
//
//   SymbolChosen -> FetchingPrimary -> Rendered
//                                   -> FetchingFallback -> Rendered
//                                                       -> ErrorShown
//
// Chaque fournisseur est appelé au plus une fois, rien n'est mis en cache.
// ============================================================================

use tracing::{error, info, instrument};

use crate::api::{FetchOutcome, PriceSource};
use crate::models::{calculate_levels, LevelSet, Notice, PriceSeries};

/// Étape courante d'une exécution, notifiée à l'appelant pour l'affichage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    FetchingPrimary,
    FetchingFallback,
}

/// Résultat final d'une exécution
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Données disponibles : série + niveaux
    Ready { series: PriceSeries, levels: LevelSet },
    /// Aucun fournisseur n'a répondu
    Unavailable,
}

/// Tout ce qu'il faut afficher après une exécution
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub symbol: String,
    /// Avertissements (échecs), info (bascule), erreur (aucune donnée)
    pub notices: Vec<Notice>,
    pub outcome: Outcome,
}

impl Report {
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome, Outcome::Ready { .. })
    }

    pub fn levels(&self) -> Option<&LevelSet> {
        match &self.outcome {
            Outcome::Ready { levels, .. } => Some(levels),
            Outcome::Unavailable => None,
        }
    }

    pub fn series(&self) -> Option<&PriceSeries> {
        match &self.outcome {
            Outcome::Ready { series, .. } => Some(series),
            Outcome::Unavailable => None,
        }
    }
}

/// Orchestration principal + secours
///
/// CONCEPT RUST : Generics
/// - P et F sont n'importe quels PriceSource (vrais clients ou simulations)
/// - Pas de Box<dyn>, le compilateur monomorphise
pub struct Pipeline<P, F> {
    primary: P,
    fallback: F,
}

impl<P: PriceSource, F: PriceSource> Pipeline<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Exécute le pipeline complet pour un symbole déjà normalisé
    ///
    /// `on_stage` est appelé à l'entrée de chaque étape de récupération, ce
    /// qui permet à l'UI de se redessiner avant un appel bloquant.
    #[instrument(skip(self, on_stage))]
    pub async fn run(&self, symbol: &str, mut on_stage: impl FnMut(Stage)) -> Report {
        let mut notices = Vec::new();

        on_stage(Stage::FetchingPrimary);
        let mut outcome = self.primary.fetch(symbol, &mut notices).await;

        if outcome.is_no_data() {
            info!("Primary source returned no data, trying fallback");
            notices.push(Notice::info(format!(
                "{} indisponible, tentative via {}...",
                self.primary.source(),
                self.fallback.source()
            )));
            on_stage(Stage::FetchingFallback);
            outcome = self.fallback.fetch(symbol, &mut notices).await;
        }

        let outcome = match outcome {
            FetchOutcome::Data(series) => {
                let levels = calculate_levels(&series);
                info!(
                    source = %series.source(),
                    rows = series.len(),
                    last_close = levels.last_close,
                    "Levels computed"
                );
                Outcome::Ready { series, levels }
            }
            FetchOutcome::NoData => {
                error!("No data from any source");
                notices.push(Notice::error(format!("Aucune donnée disponible pour {}", symbol)));
                Outcome::Unavailable
            }
        };

        Report {
            symbol: symbol.to_string(),
            notices,
            outcome,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::api::FetchError;
    use crate::models::{NoticeLevel, PriceBar, Source};
    use chrono::Utc;

    /// Source simulée : retourne une série fixe ou échoue, compte les appels
    struct MockSource {
        source: Source,
        rows: Option<Vec<(f64, f64, f64)>>,
        calls: Cell<usize>,
    }

    impl MockSource {
        fn ok(source: Source, rows: &[(f64, f64, f64)]) -> Self {
            Self {
                source,
                rows: Some(rows.to_vec()),
                calls: Cell::new(0),
            }
        }

        fn failing(source: Source) -> Self {
            Self {
                source,
                rows: None,
                calls: Cell::new(0),
            }
        }
    }

    impl PriceSource for MockSource {
        fn source(&self) -> Source {
            self.source
        }

        async fn try_fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let rows = self.rows.as_ref().ok_or(FetchError::Empty)?;
            let bars = rows
                .iter()
                .map(|&(high, low, close)| PriceBar::new(Utc::now(), close, high, low, close, 0))
                .collect();
            Ok(PriceSeries::new(symbol, self.source, bars)?)
        }
    }

    const ROWS: [(f64, f64, f64); 3] = [(101.0, 99.0, 100.0), (106.0, 104.0, 105.0), (111.0, 109.0, 110.0)];

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let pipeline = Pipeline::new(
            MockSource::ok(Source::Nse, &ROWS),
            MockSource::ok(Source::Groww, &ROWS),
        );
        let mut stages = Vec::new();

        let report = pipeline.run("NIFTY", |s| stages.push(s)).await;

        assert_eq!(pipeline.primary().calls.get(), 1);
        assert_eq!(pipeline.fallback().calls.get(), 0);
        assert_eq!(stages, vec![Stage::FetchingPrimary]);
        assert!(report.notices.is_empty());

        let levels = report.levels().unwrap();
        assert_eq!(levels.support, 99.0);
        assert_eq!(levels.resistance, 111.0);
        assert_eq!(levels.last_close, 110.0);
        assert_eq!(levels.s1, 104.0);
        assert_eq!(levels.r1, 116.0);
        assert_eq!(levels.stop_loss, 99.0);
        assert_eq!(report.series().unwrap().source(), Source::Nse);
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback_once() {
        let pipeline = Pipeline::new(
            MockSource::failing(Source::Nse),
            MockSource::ok(Source::Groww, &ROWS[..1]),
        );
        let mut stages = Vec::new();

        let report = pipeline.run("RELIANCE", |s| stages.push(s)).await;

        assert_eq!(pipeline.primary().calls.get(), 1);
        assert_eq!(pipeline.fallback().calls.get(), 1);
        assert_eq!(stages, vec![Stage::FetchingPrimary, Stage::FetchingFallback]);
        assert!(report.is_ready());
        assert_eq!(report.series().unwrap().source(), Source::Groww);

        let levels: Vec<NoticeLevel> = report.notices.iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NoticeLevel::Warning, NoticeLevel::Info]);
    }

    #[tokio::test]
    async fn test_both_failing_reports_error() {
        let pipeline = Pipeline::new(MockSource::failing(Source::Nse), MockSource::failing(Source::Groww));

        let report = pipeline.run("XYZ", |_| {}).await;

        assert_eq!(report.outcome, Outcome::Unavailable);
        assert!(report.levels().is_none());
        assert_eq!(pipeline.primary().calls.get(), 1);
        assert_eq!(pipeline.fallback().calls.get(), 1);

        let errors: Vec<&Notice> = report
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Aucune donnée disponible pour XYZ");
        assert_eq!(
            report.notices.iter().filter(|n| n.level == NoticeLevel::Info).count(),
            1
        );
    }
}
