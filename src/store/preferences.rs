// ============================================================================
// Préférences utilisateur
// ============================================================================
// Dernier coin et dernière devise sélectionnés, persistés dans le store.
// Une valeur inconnue ou illisible retombe sur la valeur par défaut.
// ============================================================================

use std::sync::Arc;

use tracing::warn;

use crate::models::{Coin, Currency};
use crate::store::KeyValueStore;

pub const CURRENCY_KEY: &str = "lazyprice_currency";
pub const COIN_KEY: &str = "lazyprice_coin";

/// Accès typé aux préférences
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Devise sauvegardée, USD par défaut
    pub fn currency(&self) -> &'static Currency {
        self.read(CURRENCY_KEY)
            .and_then(|code| Currency::find(&code))
            .unwrap_or_else(Currency::default_currency)
    }

    /// Coin sauvegardé, Bitcoin par défaut
    pub fn coin(&self) -> &'static Coin {
        self.read(COIN_KEY)
            .and_then(|id| Coin::find(&id))
            .unwrap_or_else(Coin::default_coin)
    }

    pub fn save_currency(&self, currency: &Currency) {
        self.write(CURRENCY_KEY, currency.code);
    }

    pub fn save_coin(&self, coin: &Coin) {
        self.write(COIN_KEY, coin.id);
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .map_err(|e| warn!(key, error = %e, "Failed to read preference"))
            .ok()
            .flatten()
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "Failed to save preference");
        }
    }
}
