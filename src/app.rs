// ============================================================================
// Structure : App
// ============================================================================
// État de l'application TUI : saisie du symbole, étape de la recherche en
// cours et dernier rapport affiché.
//
// PATTERN : "Application State"
// - L'UI lit depuis App
// - Toutes les modifications passent par les méthodes de App
//
// Machine à états d'une interaction :
//   Idle -> SymbolChosen -> Fetching(NSE) -> Rendered
//                                         -> Fetching(Groww) -> Rendered
//                                                            -> ErrorShown
// ============================================================================

use tracing::{debug, info};

use crate::config::DEFAULT_QUICK_SYMBOLS;
use crate::pipeline::{Report, Stage};
use crate::ui::events::{
    get_symbol_char, is_backspace_event, is_edit_event, is_enter_event, is_escape_event,
    is_quit_event, quick_select_index, Event,
};

/// Écran (mode de saisie) actif
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : raccourcis actifs
    Dashboard,

    /// Mode saisie : les touches remplissent le buffer du symbole
    /// - Enter valide, ESC annule
    InputMode,
}

/// Où en est la recherche courante
///
/// CONCEPT RUST : Enum avec données
/// - chaque état porte exactement ce dont l'affichage a besoin
/// - le rapport n'existe que dans les états terminaux
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    SymbolChosen(String),
    Fetching { symbol: String, stage: Stage },
    Rendered(Report),
    ErrorShown(Report),
}

/// Résout le symbole d'une interaction
///
/// Un bouton rapide l'emporte sur le texte saisi. Le résultat est nettoyé
/// (trim + majuscules) ; une chaîne vide ne déclenche rien.
pub fn resolve_symbol(typed: &str, quick: Option<&str>) -> Option<String> {
    let symbol = quick.unwrap_or(typed).trim().to_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Étape de la recherche en cours / dernier résultat
    pub status: Status,

    /// Symboles des boutons rapides (touches 1 à 5)
    pub quick_symbols: Vec<String>,

    /// Confirmation de quit en deux temps (q, puis q)
    pub confirm_quit: bool,

    /// Texte du champ symbole
    ///
    /// Conservé après validation pour rester affiché, comme un champ texte.
    pub input_buffer: String,

    /// Contenu du buffer au moment d'entrer en mode saisie (restauré sur ESC)
    saved_input: String,
}

impl App {
    pub fn new(quick_symbols: Vec<String>) -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            status: Status::Idle,
            quick_symbols,
            confirm_quit: false,
            input_buffer: String::new(),
            saved_input: String::new(),
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Clavier
    // ========================================================================

    /// Traite un événement ; retourne le symbole à rechercher s'il y en a un
    ///
    /// En mode saisie, toutes les touches vont dans le champ (y compris 'q').
    pub fn handle_key(&mut self, event: &Event) -> Option<String> {
        if self.is_in_input_mode() {
            if is_enter_event(event) {
                let symbol = self.submit_input();
                match &symbol {
                    Some(s) => info!(symbol = %s, "User submitted symbol"),
                    None => debug!("Empty symbol, ignoring"),
                }
                return symbol;
            }
            if is_escape_event(event) {
                info!("User cancelled input");
                self.cancel_input();
            } else if is_backspace_event(event) {
                self.backspace();
            } else if let Some(c) = get_symbol_char(event) {
                self.append_char(c);
            }
            return None;
        }

        match event {
            Event::Key(_) if is_quit_event(event) => {
                // Two-step : première pression = confirmation, deuxième = quit
                if self.is_awaiting_quit_confirmation() {
                    info!("User confirmed quit");
                    self.quit();
                } else {
                    info!("User requested quit (awaiting confirmation)");
                    self.request_quit();
                }
                None
            }

            Event::Key(_) if is_edit_event(event) => {
                self.cancel_quit();
                debug!("User started symbol input");
                self.start_input();
                None
            }

            Event::Key(_) => {
                self.cancel_quit();
                let index = quick_select_index(event)?;
                let symbol = self.select_quick(index)?;
                info!(symbol = %symbol, index, "User clicked quick-select");
                Some(symbol)
            }

            Event::Tick => None,
        }
    }

    // ========================================================================
    // Saisie du symbole
    // ========================================================================

    /// Entre en mode saisie en gardant le texte actuel
    pub fn start_input(&mut self) {
        self.current_screen = Screen::InputMode;
        self.saved_input = self.input_buffer.clone();
    }

    /// Annule la saisie et restaure le texte précédent
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer = std::mem::take(&mut self.saved_input);
    }

    /// Valide la saisie : retourne le symbole résolu (si non vide)
    pub fn submit_input(&mut self) -> Option<String> {
        self.current_screen = Screen::Dashboard;
        self.saved_input.clear();
        let symbol = resolve_symbol(&self.input_buffer, None)?;
        self.choose(symbol)
    }

    /// Bouton rapide n° `index` (0-based) : prioritaire sur le texte saisi
    pub fn select_quick(&mut self, index: usize) -> Option<String> {
        let quick = self.quick_symbols.get(index)?.clone();
        let symbol = resolve_symbol(&self.input_buffer, Some(quick.as_str()))?;
        self.choose(symbol)
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    // ========================================================================
    // Transitions de la recherche
    // ========================================================================

    fn choose(&mut self, symbol: String) -> Option<String> {
        debug!(symbol = %symbol, "Symbol chosen");
        self.status = Status::SymbolChosen(symbol.clone());
        Some(symbol)
    }

    /// Appelé par le pipeline à l'entrée de chaque étape de récupération
    pub fn set_stage(&mut self, stage: Stage) {
        let symbol = match &self.status {
            Status::SymbolChosen(symbol) | Status::Fetching { symbol, .. } => symbol.clone(),
            _ => return,
        };
        self.status = Status::Fetching { symbol, stage };
    }

    /// Termine la recherche avec le rapport du pipeline
    pub fn finish(&mut self, report: Report) {
        self.status = if report.is_ready() {
            Status::Rendered(report)
        } else {
            Status::ErrorShown(report)
        };
    }

    /// Dernier rapport, s'il y en a un
    pub fn report(&self) -> Option<&Report> {
        match &self.status {
            Status::Rendered(report) | Status::ErrorShown(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, Status::SymbolChosen(_) | Status::Fetching { .. })
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DEFAULT_QUICK_SYMBOLS.iter().map(|s| s.to_string()).collect())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
