// ============================================================================
// Gestion des événements
// ============================================================================
// Lecture des événements clavier (crossterm) et helpers pour les identifier.
//
// Raccourcis :
// - 1..5 ou F1..F5 : boutons rapides (NIFTY, BANKNIFTY, ...)
// - / ou s : saisir un symbole (Enter valide, ESC annule)
// - q : quitter (deux fois)
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Aucun événement pendant l'intervalle de poll
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// - Si pas d'événement avant `tick_rate`, retourne Event::Tick
    /// - Seuls les appuis (KeyEventKind::Press) sont remontés, pour éviter
    ///   les doublons Press/Release sur Windows
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            // Release, resize, souris : ignorés
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

// ============================================================================
// Helpers : identifier une touche
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// Touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// '/' ou 's' : ouvre la saisie du symbole
pub fn is_edit_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char('/') | KeyCode::Char('s') | KeyCode::Char('S'))
    )
}

/// Index (0-based) du bouton rapide : '1'..'9' ou F1..F9
pub fn quick_select_index(event: &Event) -> Option<usize> {
    match key_code(event)? {
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize - 1),
        KeyCode::F(n @ 1..=9) => Some(n as usize - 1),
        _ => None,
    }
}

/// Caractère acceptable dans un symbole (ex: "M&M", "BAJAJ-AUTO", "NIFTY 50")
pub fn get_symbol_char(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) if c.is_alphanumeric() || matches!(c, '-' | '.' | '&' | '_' | ' ') => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
