// ============================================================================
// srlevels - Support & résistance dans le terminal
// ============================================================================
// Programme TUI : choisir un symbole (saisie libre ou bouton rapide), récupérer
// les prix via NSE (secours : Groww), afficher les niveaux et le graphique.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime::block_on pour les appels HTTP
//
// Chaque recherche s'exécute jusqu'au bout avant de rendre la main à la
// boucle : pas de worker thread, pas d'état partagé.
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

use srlevels::api::{GrowwProvider, NseProvider, PriceSource};
use srlevels::app::App;
use srlevels::config::{Config, APP_NAME};
use srlevels::pipeline::Pipeline;
use srlevels::ui::{render, EventHandler};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
//
// # Utilisation
// ```bash
// tail -f ~/.local/share/srlevels/logs/srlevels.log.*
// RUST_LOG=srlevels=trace cargo run
// ```
// ============================================================================

fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), format!("{}.log", APP_NAME));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prioritaire, sinon la directive de la config
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::load().context("Échec du chargement de la configuration")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("srlevels starting up");

    let runtime = Runtime::new().context("Échec de la création du runtime tokio")?;
    let pipeline = {
        // Les clients HTTP sont créés dans le contexte du runtime
        let _guard = runtime.enter();
        Pipeline::new(
            NseProvider::new(config.primary.clone())?,
            GrowwProvider::new(config.fallback.clone())?,
        )
    };
    let mut app = App::new(config.quick_symbols.clone());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;
    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &runtime, &pipeline);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   1. RENDER : dessine l'interface
//   2. INPUT : lit un événement, met à jour l'état
//   3. Si un symbole a été choisi : exécute le pipeline (bloquant)
// ============================================================================

fn run<P: PriceSource, F: PriceSource>(
    terminal: &mut Tui,
    app: &mut App,
    events: &EventHandler,
    runtime: &Runtime,
    pipeline: &Pipeline<P, F>,
) -> Result<()> {
    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        if let Some(symbol) = app.handle_key(&event) {
            run_pipeline(terminal, app, runtime, pipeline, &symbol);
        }
    }

    Ok(())
}

/// Exécute une recherche complète pour `symbol`
///
/// L'interface est redessinée à chaque étape (NSE puis éventuellement Groww)
/// pour afficher l'état courant pendant l'appel bloquant.
fn run_pipeline<P: PriceSource, F: PriceSource>(
    terminal: &mut Tui,
    app: &mut App,
    runtime: &Runtime,
    pipeline: &Pipeline<P, F>,
    symbol: &str,
) {
    info!(symbol = %symbol, "Running fetch pipeline");

    let report = runtime.block_on(pipeline.run(symbol, |stage| {
        app.set_stage(stage);
        if let Err(e) = terminal.draw(|frame| render(frame, app)) {
            error!(error = ?e, "Failed to draw progress");
        }
    }));

    info!(symbol = %symbol, ready = report.is_ready(), notices = report.notices.len(), "Pipeline finished");
    app.finish(report);
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
