// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : convertir une touche en action
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (rafraîchissement de l'écran, timer)
    Tick,
}

/// Action demandée par l'utilisateur
///
/// CONCEPT : Séparer « quelle touche » de « quoi faire »
/// - La boucle principale ne matche que sur Action
/// - Le mapping clavier reste dans ce module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    NextCurrency,
    NextCoin,
    /// Déplacement dans la grille annuelle (en jours)
    Move(isize),
    FirstDay,
    LastDay,
    /// Toute autre touche (annule les confirmations)
    Other,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus `tick_rate`)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

/// Convertit un événement en action (None pour un Tick)
pub fn action_for(event: &Event) -> Option<Action> {
    let Event::Key(key) = event else {
        return None;
    };

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Refresh,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::NextCurrency,
        KeyCode::Char('b') | KeyCode::Char('B') => Action::NextCoin,
        KeyCode::Right | KeyCode::Char('l') => Action::Move(1),
        KeyCode::Left | KeyCode::Char('h') => Action::Move(-1),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(7),
        KeyCode::Up | KeyCode::Char('k') => Action::Move(-7),
        KeyCode::Home => Action::FirstDay,
        KeyCode::End => Action::LastDay,
        _ => Action::Other,
    };

    Some(action)
}
