// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut de l'application, surchargeables par variables
// d'environnement :
// - LAZYPRICE_API_URL  : URL de base de l'API (ex: un proxy CoinGecko)
// - LAZYPRICE_DATA_DIR : répertoire du store (cache + préférences)
//
// Le niveau de log se règle avec RUST_LOG (voir main.rs).
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::api::{RetryPolicy, API_BASE_URL};
use crate::store::CACHE_DURATION;

pub const API_URL_ENV: &str = "LAZYPRICE_API_URL";
pub const DATA_DIR_ENV: &str = "LAZYPRICE_DATA_DIR";

/// Période du rafraîchissement automatique
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Timeout d'une requête HTTP
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration complète de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub refresh_interval: Duration,
    pub cache_duration: Duration,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            refresh_interval: REFRESH_INTERVAL,
            cache_duration: CACHE_DURATION,
            retry: RetryPolicy::default(),
            http_timeout: HTTP_TIMEOUT,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Configuration par défaut + surcharges de l'environnement
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lookup
    ///
    /// CONCEPT RUST : impl Fn
    /// - Permet de tester sans toucher aux vraies variables d'environnement
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }
}

/// Répertoire de données : ~/.local/share/lazyprice sur Linux,
/// ./.lazyprice si le système n'en fournit pas
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("lazyprice"))
        .unwrap_or_else(|| PathBuf::from(".lazyprice"))
}
