// ============================================================================
// Chart - Graphique des clôtures
// ============================================================================
// Graphique ligne (une seule série) du Close sur l'index de dates de la série.
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de points (x, y)
// 3. Axis : bornes et labels des axes X et Y
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::models::PriceSeries;

/// Titre du graphique pour un symbole
pub fn chart_title(symbol: &str) -> String {
    format!(" {} - Cours de clôture ", symbol)
}

/// Dessine le graphique des clôtures d'une série
pub fn render_close_chart(frame: &mut Frame, series: &PriceSeries, area: Rect) {
    let points = series.close_points();

    let (y_min, y_max) = price_bounds(&points);

    // Une série d'une seule ligne donne x_max = 0 : on garde un axe non dégénéré
    let x_max = ((points.len() - 1) as f64).max(1.0);

    let color = if series.last().close >= series.first().close {
        Color::Green
    } else {
        Color::Red
    };

    let datasets = vec![Dataset::default()
        .name(series.symbol())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(date_labels(series));

    let y_axis = Axis::default()
        .title("Close")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(chart_title(series.symbol())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Bornes Y avec une marge de 5 %
///
/// Quand toutes les clôtures sont égales (snapshot NSE), la marge est prise
/// sur le prix lui-même pour que la ligne reste visible.
fn price_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let (min_price, max_price) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), &(_x, y)| (min.min(y), max.max(y)),
    );

    let range = max_price - min_price;
    let margin = if range > 0.0 {
        range * 0.05
    } else {
        (max_price.abs() * 0.01).max(1.0)
    };

    ((min_price - margin).max(0.0), max_price + margin)
}

/// Labels X : première, médiane et dernière date
fn date_labels(series: &PriceSeries) -> Vec<Span<'static>> {
    let bars = series.bars();
    let fmt = |i: usize| bars[i].timestamp.format("%d/%m/%y").to_string();

    vec![
        Span::raw(fmt(0)),
        Span::raw(fmt(bars.len() / 2)),
        Span::raw(fmt(bars.len() - 1)),
    ]
}
