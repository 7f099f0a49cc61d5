// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Enums avec données : View::Ready(DashboardData) / View::Failed(message)
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Garantit la cohérence de l'état
//
// Un seul cycle de rafraîchissement à la fois :
// - déclenchement par le timer pendant un cycle : ignoré
// - déclenchement utilisateur pendant un cycle : mis en attente (un seul)
// ============================================================================

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::models::{derive_window, Coin, Currency, DerivedPoint, DerivedWindow, PriceSnapshot};
use crate::refresh::{failure_message, RefreshOutcome};

/// Nombre de jours affichés dans la bande hebdomadaire
pub const WEEK_DISPLAY_DAYS: usize = 7;

/// Nombre de jours affichés dans la grille annuelle
pub const YEAR_DISPLAY_DAYS: usize = 365;

/// Origine d'une demande de rafraîchissement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Démarrage de l'application
    Startup,
    /// Timer périodique (60s)
    Timer,
    /// Action utilisateur : retry, changement de coin ou de devise
    User,
}

/// Données prêtes à afficher
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub current: PriceSnapshot,
    pub week: DerivedWindow,
    pub year: DerivedWindow,
    pub updated_at: DateTime<Local>,
}

impl DashboardData {
    /// Découpe les séries aux tailles d'affichage et calcule les métriques
    pub fn from_outcome(outcome: &RefreshOutcome) -> Self {
        Self {
            current: outcome.current,
            week: derive_window(outcome.week.window(WEEK_DISPLAY_DAYS)),
            year: derive_window(outcome.year.window(YEAR_DISPLAY_DAYS)),
            updated_at: outcome.fetched_at,
        }
    }
}

/// Ce que l'écran principal affiche
#[derive(Debug, Clone)]
pub enum View {
    /// Premier chargement ou changement de coin/devise
    Loading,
    /// Données chargées
    Ready(DashboardData),
    /// Échec du dernier cycle : message + proposition de retry
    Failed(String),
}

/// Une demande de cycle à exécuter par le worker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshRequest {
    pub coin: &'static Coin,
    pub currency: &'static Currency,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    pub confirm_quit: bool,

    pub coin: &'static Coin,
    pub currency: &'static Currency,

    pub view: View,

    /// Index du jour sélectionné dans la grille annuelle
    pub selected_day: usize,

    refresh_in_flight: bool,
    pending_refresh: bool,
    last_refresh: Option<Instant>,
}

impl App {
    /// Crée l'application pour un coin et une devise (issus des préférences)
    pub fn new(coin: &'static Coin, currency: &'static Currency) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            coin,
            currency,
            view: View::Loading,
            selected_day: 0,
            refresh_in_flight: false,
            pending_refresh: false,
            last_refresh: None,
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
    // Cycle de rafraîchissement
    // ========================================================================

    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight
    }

    /// Demande un cycle ; retourne la requête à envoyer au worker si un cycle
    /// peut démarrer maintenant
    ///
    /// - aucun cycle en cours : démarre
    /// - cycle en cours + Timer : ignoré
    /// - cycle en cours + User/Startup : mis en attente (coalescé)
    pub fn request_refresh(&mut self, trigger: RefreshTrigger) -> Option<RefreshRequest> {
        if self.refresh_in_flight {
            match trigger {
                RefreshTrigger::Timer => {
                    debug!("Refresh already in flight, skipping timer refresh");
                }
                RefreshTrigger::Startup | RefreshTrigger::User => {
                    debug!(?trigger, "Refresh already in flight, queueing");
                    self.pending_refresh = true;
                }
            }
            return None;
        }

        Some(self.start_refresh(trigger))
    }

    fn start_refresh(&mut self, trigger: RefreshTrigger) -> RefreshRequest {
        info!(?trigger, coin = self.coin.id, currency = self.currency.code, "Starting refresh cycle");
        self.refresh_in_flight = true;
        self.pending_refresh = false;
        self.last_refresh = Some(Instant::now());

        // Pas de rendu partiel : après une erreur on repasse en chargement
        if matches!(self.view, View::Failed(_)) {
            self.view = View::Loading;
        }

        RefreshRequest {
            coin: self.coin,
            currency: self.currency,
        }
    }

    /// Le timer doit-il déclencher un cycle ?
    pub fn refresh_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_refresh {
            Some(last) => now.saturating_duration_since(last) >= interval,
            None => true,
        }
    }

    /// Applique le résultat d'un cycle ; retourne le cycle en attente à lancer
    ///
    /// Un résultat pour un coin/devise qui n'est plus sélectionné est ignoré.
    pub fn complete_refresh(
        &mut self,
        request: RefreshRequest,
        result: Result<RefreshOutcome, String>,
    ) -> Option<RefreshRequest> {
        self.refresh_in_flight = false;

        let current = request.coin.id == self.coin.id && request.currency.code == self.currency.code;

        if !current {
            debug!(coin = request.coin.id, currency = request.currency.code, "Discarding result for previous selection");
        } else {
            match result {
                Ok(outcome) => {
                    let data = DashboardData::from_outcome(&outcome);
                    let first_load = !matches!(self.view, View::Ready(_));
                    if first_load || self.selected_day >= data.year.len() {
                        self.selected_day = data.year.len().saturating_sub(1);
                    }
                    self.view = View::Ready(data);
                }
                Err(error) => {
                    warn!(error = %error, "Refresh cycle failed");
                    self.view = View::Failed(failure_message(self.coin));
                }
            }
        }

        if self.pending_refresh {
            Some(self.start_refresh(RefreshTrigger::User))
        } else {
            None
        }
    }

    /// Le worker ne répond plus : le cycle en cours ne se terminera jamais
    ///
    /// Libère le verrou de cycle et affiche l'erreur avec la proposition de
    /// retry, au lieu de rester bloqué sur « refreshing ».
    pub fn worker_lost(&mut self) {
        warn!(coin = self.coin.id, "Refresh worker lost");
        self.refresh_in_flight = false;
        self.pending_refresh = false;
        self.view = View::Failed(failure_message(self.coin));
    }

    // ========================================================================
    // Sélection coin / devise
    // ========================================================================

    /// Passe à la devise suivante ; les données affichées sont invalidées
    pub fn next_currency(&mut self) -> &'static Currency {
        self.currency = self.currency.next();
        self.view = View::Loading;
        self.currency
    }

    /// Passe au coin suivant ; les données affichées sont invalidées
    pub fn next_coin(&mut self) -> &'static Coin {
        self.coin = self.coin.next();
        self.view = View::Loading;
        self.coin
    }

    // ========================================================================
    // Navigation dans la grille annuelle
    // ========================================================================

    fn year_len(&self) -> usize {
        match &self.view {
            View::Ready(data) => data.year.len(),
            _ => 0,
        }
    }

    /// Déplace la sélection de `delta` jours (borné à la grille)
    ///
    /// ←/→ : ±1 jour, ↑/↓ : ±7 jours (une semaine = une colonne)
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.year_len();
        if len == 0 {
            return;
        }
        let max_index = (len - 1) as isize;
        self.selected_day = (self.selected_day as isize + delta).clamp(0, max_index) as usize;
    }

    pub fn select_first_day(&mut self) {
        self.selected_day = 0;
    }

    pub fn select_last_day(&mut self) {
        self.selected_day = self.year_len().saturating_sub(1);
    }

    /// Jour sélectionné dans la grille annuelle
    pub fn selected_point(&self) -> Option<&DerivedPoint> {
        match &self.view {
            View::Ready(data) => data.year.points.get(self.selected_day),
            _ => None,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
