// ============================================================================
// Calcul des niveaux : support / résistance
// ============================================================================
// Fonction pure PriceSeries -> LevelSet. Aucun arrondi ici, le formatage à
// 2 décimales est fait au moment de l'affichage.
// ============================================================================

use serde::Serialize;

use crate::models::PriceSeries;

/// Les six niveaux dérivés d'une série
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSet {
    pub last_close: f64,
    pub support: f64,
    pub resistance: f64,
    pub s1: f64,
    pub r1: f64,
    pub stop_loss: f64,
}

impl LevelSet {
    /// Paires (libellé, valeur) dans l'ordre d'affichage
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("Last Close", self.last_close),
            ("Support", self.support),
            ("Resistance", self.resistance),
            ("S1", self.s1),
            ("R1", self.r1),
            ("Stop Loss", self.stop_loss),
        ]
    }

    /// Lignes formatées "Libellé: 123.45"
    pub fn display_lines(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(label, value)| format!("{}: {:.2}", label, value))
            .collect()
    }
}

/// Calcule les niveaux à partir d'une série
///
/// La série est non vide par construction, la fonction est donc totale.
/// Le stop loss est placé sous le support quand la dernière clôture est
/// dans la moitié haute du range, sinon au-dessus de la résistance.
pub fn calculate_levels(series: &PriceSeries) -> LevelSet {
    let last_close = series.last().close;
    let support = series.min_low();
    let resistance = series.max_high();

    let range = resistance - support;
    let s1 = last_close - range * 0.5;
    let r1 = last_close + range * 0.5;

    let midpoint = (support + resistance) / 2.0;
    let stop_loss = if last_close > midpoint {
        support
    } else {
        resistance
    };

    LevelSet {
        last_close,
        support,
        resistance,
        s1,
        r1,
        stop_loss,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceBar, Source};
    use chrono::{Duration, TimeZone, Utc};

    fn series(rows: &[(f64, f64, f64)]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| {
                PriceBar::new(start + Duration::days(i as i64), close, high, low, close, 0)
            })
            .collect();
        PriceSeries::new("TEST", Source::Groww, bars).unwrap()
    }

    #[test]
    fn test_three_rows_fixture() {
        let s = series(&[(101.0, 99.0, 100.0), (106.0, 104.0, 105.0), (111.0, 109.0, 110.0)]);
        let levels = calculate_levels(&s);

        assert_eq!(levels.last_close, 110.0);
        assert_eq!(levels.support, 99.0);
        assert_eq!(levels.resistance, 111.0);
        assert_eq!(levels.s1, 104.0);
        assert_eq!(levels.r1, 116.0);
        // 110 > (99 + 111) / 2 = 105
        assert_eq!(levels.stop_loss, 99.0);
    }

    #[test]
    fn test_stop_loss_at_resistance_in_lower_half() {
        let s = series(&[(120.0, 100.0, 118.0), (110.0, 101.0, 102.0)]);
        let levels = calculate_levels(&s);

        assert_eq!(levels.support, 100.0);
        assert_eq!(levels.resistance, 120.0);
        assert_eq!(levels.stop_loss, 120.0);
    }

    #[test]
    fn test_stop_loss_at_exact_midpoint_is_resistance() {
        let s = series(&[(120.0, 100.0, 110.0)]);
        let levels = calculate_levels(&s);
        assert_eq!(levels.stop_loss, 120.0);
    }

    #[test]
    fn test_single_flat_row() {
        let s = series(&[(50.0, 50.0, 50.0)]);
        let levels = calculate_levels(&s);

        assert_eq!(levels.support, 50.0);
        assert_eq!(levels.resistance, 50.0);
        assert_eq!(levels.s1, 50.0);
        assert_eq!(levels.r1, 50.0);
        assert_eq!(levels.s1, levels.last_close);
    }

    #[test]
    fn test_single_row_support_resistance_from_low_high() {
        let s = series(&[(52.0, 48.0, 51.0)]);
        let levels = calculate_levels(&s);

        assert_eq!(levels.support, 48.0);
        assert_eq!(levels.resistance, 52.0);
        assert_eq!(levels.s1, 49.0);
        assert_eq!(levels.r1, 53.0);
    }

    #[test]
    fn test_properties_over_varied_series() {
        let fixtures: Vec<Vec<(f64, f64, f64)>> = vec![
            vec![(10.5, 9.5, 10.0)],
            vec![(3.0, 1.0, 2.0), (4.0, 2.5, 3.9), (2.2, 0.5, 0.7)],
            vec![(1500.25, 1480.0, 1499.9), (1510.0, 1490.75, 1491.0)],
            vec![(22450.0, 22100.0, 22400.0), (22600.0, 22300.0, 22310.0), (22350.0, 21980.0, 22005.5)],
        ];

        for rows in fixtures {
            let levels = calculate_levels(&series(&rows));
            let range = levels.resistance - levels.support;
            let midpoint = (levels.support + levels.resistance) / 2.0;

            assert!(levels.support <= levels.resistance);
            assert_eq!(levels.s1, levels.last_close - range * 0.5);
            assert_eq!(levels.r1, levels.last_close + range * 0.5);
            assert!(levels.stop_loss == levels.support || levels.stop_loss == levels.resistance);
            assert_eq!(levels.stop_loss == levels.support, levels.last_close > midpoint);
        }
    }

    #[test]
    fn test_display_lines_two_decimals() {
        let s = series(&[(101.0, 99.0, 100.0), (106.0, 104.0, 105.0), (111.0, 109.0, 110.0)]);
        let lines = calculate_levels(&s).display_lines();

        assert_eq!(
            lines,
            vec![
                "Last Close: 110.00",
                "Support: 99.00",
                "Resistance: 111.00",
                "S1: 104.00",
                "R1: 116.00",
                "Stop Loss: 99.00",
            ]
        );
    }
}
