// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Un seul écran :
//
//   ┌ header ─────────────────────────────────────────┐
//   ├ boutons rapides ────────────────────────────────┤
//   ├ champ symbole ──────────────────────────────────┤
//   ├ niveaux + notifications ─┬ graphique ───────────┤
//   ├ footer (raccourcis) ─────┴──────────────────────┘
//
// CONCEPTS RATATUI :
// 1. Layout : découpage vertical puis horizontal
// 2. Paragraph / Line / Span : texte stylé
// 3. Rendu conditionnel selon l'état (App::status)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Status};
use crate::models::{LevelSet, Notice, NoticeLevel, PriceSeries};
use crate::pipeline::{Outcome, Report, Stage};
use crate::ui::chart;

/// Largeur du panneau de gauche (niveaux + notifications)
const SIDE_PANEL_WIDTH: u16 = 44;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Boutons rapides
            Constraint::Length(3), // Champ symbole
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(frame.size())
        .to_vec();

    render_header(frame, chunks[0]);
    render_quick_bar(frame, app, chunks[1]);
    render_symbol_input(frame, app, chunks[2]);
    render_body(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

// ============================================================================
// Header, boutons rapides, champ symbole
// ============================================================================

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" srlevels ")
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "Market Support & Resistance",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Les boutons rapides : "[1] NIFTY  [2] BANKNIFTY ..."
fn render_quick_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Sélection rapide ");

    let mut spans = Vec::new();
    for (i, symbol) in app.quick_symbols.iter().enumerate() {
        spans.push(Span::styled(
            format!("[{}]", i + 1),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}   ", symbol)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Champ texte du symbole (vert + curseur en mode saisie)
fn render_symbol_input(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.is_in_input_mode();
    let border_color = if editing { Color::Green } else { Color::Cyan };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Symbole (ex: NIFTY, RELIANCE) ");

    let mut spans = vec![Span::styled(
        app.input_buffer.as_str(),
        Style::default().fg(Color::White),
    )];
    if editing {
        spans.push(Span::styled(
            "█",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ============================================================================
// Contenu principal : dépend de l'état de la recherche
// ============================================================================

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    match &app.status {
        Status::Idle => render_message(
            frame,
            area,
            "Choisissez un symbole : [1]-[5] ou [/] pour saisir",
            Color::Gray,
        ),
        Status::SymbolChosen(symbol) => {
            render_message(frame, area, &format!("Recherche de {}...", symbol), Color::Yellow)
        }
        Status::Fetching { symbol, stage } => {
            let message = match stage {
                Stage::FetchingPrimary => format!("Chargement de {} via NSE...", symbol),
                Stage::FetchingFallback => format!("NSE indisponible, chargement de {} via Groww...", symbol),
            };
            render_message(frame, area, &message, Color::Yellow);
        }
        Status::Rendered(report) | Status::ErrorShown(report) => render_report(frame, report, area),
    }
}

/// Affiche un rapport : niveaux + notifications à gauche, graphique à droite
///
/// En cas d'échec total, seules les notifications sont affichées.
fn render_report(frame: &mut Frame, report: &Report, area: Rect) {
    let (series, levels) = match &report.outcome {
        Outcome::Ready { series, levels } => (series, levels),
        Outcome::Unavailable => {
            render_notices(frame, &report.notices, area);
            return;
        }
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDE_PANEL_WIDTH), Constraint::Min(0)])
        .split(area)
        .to_vec();

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(columns[0])
        .to_vec();

    render_levels(frame, series, levels, side[0]);
    render_notices(frame, &report.notices, side[1]);
    chart::render_close_chart(frame, series, columns[1]);
}

/// Les six niveaux, 2 décimales, plus la source des données
fn render_levels(frame: &mut Frame, series: &PriceSeries, levels: &LevelSet, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Supports & Résistances ");

    let mut lines: Vec<Line> = levels
        .entries()
        .into_iter()
        .zip(levels.display_lines())
        .map(|((label, _), text)| {
            Line::from(Span::styled(
                text,
                Style::default().fg(level_color(label)).add_modifier(Modifier::BOLD),
            ))
        })
        .collect();

    lines.push(Line::from(Span::styled(
        format!("Source : {} ({} lignes)", series.source(), series.len()),
        Style::default().fg(Color::Gray),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn level_color(label: &str) -> Color {
    match label {
        "Support" | "S1" => Color::Green,
        "Resistance" | "R1" => Color::Red,
        "Stop Loss" => Color::Magenta,
        _ => Color::White,
    }
}

/// Avertissements, info et erreur de la dernière recherche
fn render_notices(frame: &mut Frame, notices: &[Notice], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Messages ");

    let items: Vec<ListItem> = notices
        .iter()
        .map(|notice| {
            let (icon, color) = match notice.level {
                NoticeLevel::Info => ("ℹ", Color::Cyan),
                NoticeLevel::Warning => ("⚠", Color::Yellow),
                NoticeLevel::Error => ("✖", Color::Red),
            };
            ListItem::new(format!("{} {}", icon, notice.message)).style(Style::default().fg(color))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(color))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis ou confirmation de quit
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_in_input_mode() {
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Valider  "),
            Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Annuler"),
        ])
    } else if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key_style),
            Span::raw(" Quit  "),
            Span::styled("[1-5]", key_style),
            Span::raw(" Sélection rapide  "),
            Span::styled("[/]", key_style),
            Span::raw(" Saisir un symbole"),
        ])
    };

    let paragraph = Paragraph::new(shortcuts)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
