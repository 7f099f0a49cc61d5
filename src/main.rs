// ============================================================================
// LazyPrice - Suivi de prix crypto dans le terminal
// ============================================================================
// Affiche le prix actuel d'un coin, une bande 7 jours et une grille 365 jours
// Données CoinGecko rafraîchies toutes les 60 secondes
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : un worker thread avec son propre runtime tokio
// 4. Channels mpsc : commandes vers le worker, résultats vers l'UI
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazyprice::api::{CoinGeckoClient, ReqwestTransport};
use lazyprice::app::{App, RefreshRequest, RefreshTrigger};
use lazyprice::config::Config;
use lazyprice::refresh::{RefreshOutcome, Refresher};
use lazyprice::store::{FileStore, KeyValueStore, MemoryStore, Preferences, SystemClock, YearSeriesCache};
use lazyprice::ui::{action_for, render, Action, EventHandler};

// ============================================================================
// AppCommand / AppResult : messages échangés avec le worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, Copy)]
enum AppCommand {
    /// Exécuter un cycle complet pour (coin, devise)
    Refresh(RefreshRequest),
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Fin d'un cycle ; l'erreur est déjà formatée pour les logs
    Refreshed {
        request: RefreshRequest,
        result: Result<RefreshOutcome, String>,
    },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers ./logs/lazyprice.log
///
/// # Utilisation
/// ```bash
/// tail -f logs/lazyprice.log
/// RUST_LOG=lazyprice=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyprice.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour lazyprice, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyprice=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyPrice starting up");

    let config = Config::from_env();
    info!(api = %config.api_base_url, data_dir = ?config.data_dir, "Configuration loaded");

    // Store : fichier JSON, ou mémoire si le répertoire est inutilisable
    let store: Arc<dyn KeyValueStore> = match FileStore::open(&config.data_dir) {
        Ok(store) => {
            info!(path = ?store.path(), "Using file store");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to open file store, falling back to memory");
            Arc::new(MemoryStore::new())
        }
    };

    let preferences = Preferences::new(store.clone());

    let transport = Arc::new(ReqwestTransport::new(config.http_timeout)?);
    let client = CoinGeckoClient::new(transport, &config.api_base_url, config.retry);
    let cache = YearSeriesCache::new(
        client.clone(),
        store,
        Arc::new(SystemClock),
        config.cache_duration,
    );
    let refresher = Refresher::new(client, cache);

    // Le runtime est créé ici pour propager l'erreur, puis déplacé dans le worker
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(runtime, refresher, command_rx, result_tx);

    let mut app = App::new(preferences.coin(), preferences.currency());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(
        &mut terminal,
        &mut app,
        &events,
        &config,
        &preferences,
        &command_tx,
        &result_rx,
    );

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - std::thread::spawn() : crée un thread OS
// - runtime.block_on() bloque le worker, jamais l'UI
// - Un cycle à la fois : l'App garantit qu'une seule commande est en vol
// ============================================================================

fn spawn_background_worker(
    runtime: tokio::runtime::Runtime,
    refresher: Refresher,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::Refresh(request) => {
                    let result = runtime
                        .block_on(refresher.refresh_cycle(request.coin, request.currency))
                        .map_err(|e| format!("{:#}", e));

                    if let Err(e) = &result {
                        error!(coin = request.coin.id, error = %e, "Refresh cycle failed");
                    }

                    if result_tx.send(AppResult::Refreshed { request, result }).is_err() {
                        break;
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Envoie une demande de cycle au worker s'il y en a une
///
/// Si le worker a disparu, l'App sort de l'état « refreshing ».
fn dispatch(app: &mut App, command_tx: &mpsc::Sender<AppCommand>, request: Option<RefreshRequest>) {
    if let Some(request) = request {
        if command_tx.send(AppCommand::Refresh(request)).is_err() {
            error!("Worker thread disconnected, refresh dropped");
            app.worker_lost();
        }
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Traiter les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Déclencher le rafraîchissement périodique (update)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    config: &Config,
    preferences: &Preferences,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    let request = app.request_refresh(RefreshTrigger::Startup);
    dispatch(app, command_tx, request);

    let mut worker_alive = true;

    while app.is_running() {
        // 0. RÉSULTATS
        loop {
            match result_rx.try_recv() {
                Ok(AppResult::Refreshed { request, result }) => {
                    let next = app.complete_refresh(request, result);
                    dispatch(app, command_tx, next);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if worker_alive {
                        error!("Worker thread disconnected!");
                        worker_alive = false;
                    }
                    if app.is_refreshing() {
                        app.worker_lost();
                    }
                    break;
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => {
                if let Some(action) = action_for(&event) {
                    handle_action(app, action, preferences, command_tx);
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read terminal event");
            }
        }

        // 3. UPDATE : timer de 60s
        if app.refresh_due(Instant::now(), config.refresh_interval) {
            let request = app.request_refresh(RefreshTrigger::Timer);
            dispatch(app, command_tx, request);
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des actions
// ============================================================================

fn handle_action(
    app: &mut App,
    action: Action,
    preferences: &Preferences,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    // Toute action autre que q annule la confirmation de quit
    if action != Action::Quit {
        app.cancel_quit();
    }

    match action {
        Action::Quit => {
            // CONCEPT : Two-step confirmation pour éviter les quits accidentels
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Action::Refresh => {
            info!("User requested refresh");
            let request = app.request_refresh(RefreshTrigger::User);
            dispatch(app, command_tx, request);
        }

        Action::NextCurrency => {
            let currency = app.next_currency();
            info!(currency = currency.code, "User changed currency");
            preferences.save_currency(currency);
            let request = app.request_refresh(RefreshTrigger::User);
            dispatch(app, command_tx, request);
        }

        Action::NextCoin => {
            let coin = app.next_coin();
            info!(coin = coin.id, "User changed coin");
            preferences.save_coin(coin);
            let request = app.request_refresh(RefreshTrigger::User);
            dispatch(app, command_tx, request);
        }

        Action::Move(delta) => app.move_selection(delta),
        Action::FirstDay => app.select_first_day(),
        Action::LastDay => app.select_last_day(),
        Action::Other => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    terminal.show_cursor()?;

    Ok(())
}
