// ============================================================================
// Fetch avec retry et backoff exponentiel
// ============================================================================
// Effectue un GET et réessaie automatiquement en cas de rate limiting (429),
// de statut non-2xx ou d'échec réseau.
//
// Délai avant la tentative suivante : base_delay * 2^attempt (attempt part de 0)
// → avec la politique par défaut : 1s, 2s, 4s puis abandon (4 tentatives).
//
// CONCEPTS RUST :
// 1. loop + return : boucle explicite, sortie par Ok ou Err
// 2. Match guards : Ok(r) if r.status == 429
// 3. tokio::time::sleep : attente non-bloquante (les autres tâches continuent)
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::{FetchError, HttpTransport};

/// Nombre de retries par défaut (4 tentatives au total)
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Délai de base par défaut : 1 seconde
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Politique de retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Nombre de nouvelles tentatives après la première
    pub max_retries: u32,

    /// Délai de base du backoff (toujours > 0)
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Crée une politique ; un délai nul est remplacé par 1 ms
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        let base_delay = if base_delay.is_zero() {
            Duration::from_millis(1)
        } else {
            base_delay
        };

        Self {
            max_retries,
            base_delay,
        }
    }

    /// Délai d'attente après l'échec de la tentative `attempt`
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_pow / saturating_mul : pas de panic sur overflow
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}

/// GET `url` et retourne le corps JSON parsé
///
/// - 429 : attend puis réessaie ; après épuisement → FetchError::RateLimited
/// - autre non-2xx, erreur transport, JSON invalide : idem, la dernière
///   erreur est propagée (FetchError::Http { status } pour un statut)
///
/// Au plus `max_retries + 1` tentatives.
#[instrument(skip(transport, policy), fields(max_retries = policy.max_retries))]
pub async fn fetch_with_retry(
    transport: &dyn HttpTransport,
    url: &str,
    policy: &RetryPolicy,
) -> Result<Value, FetchError> {
    let mut attempt: u32 = 0;

    loop {
        let error = match transport.get(url).await {
            Ok(response) if response.status == 429 => FetchError::RateLimited {
                attempts: attempt + 1,
            },
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<Value>(&response.body) {
                    Ok(value) => {
                        debug!(attempt, "Request succeeded");
                        return Ok(value);
                    }
                    Err(e) => FetchError::InvalidBody(e.to_string()),
                }
            }
            Ok(response) => FetchError::Http {
                status: response.status,
            },
            Err(e) => e,
        };

        if !error.is_retryable() || attempt >= policy.max_retries {
            warn!(attempt, error = %error, "Request failed, giving up");
            return Err(error);
        }

        let wait = policy.delay_for(attempt);
        match &error {
            FetchError::RateLimited { .. } => {
                warn!(wait_ms = wait.as_millis() as u64, attempt, "Rate limited. Retrying");
            }
            _ => {
                warn!(wait_ms = wait.as_millis() as u64, attempt, error = %error, "Request failed. Retrying");
            }
        }

        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// CONCEPT : #[tokio::test(start_paused = true)]
// - L'horloge tokio démarre en pause et avance automatiquement
//   quand toutes les tâches dorment
// - Les sleep de 1s, 2s, 4s sont instantanés mais le temps virtuel est mesurable
// ============================================================================
