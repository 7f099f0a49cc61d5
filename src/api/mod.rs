// ============================================================================
// Module : api
// ============================================================================
// Ce module contient la couche d'acquisition des données : transport HTTP,
// fetch avec retry/backoff, et client CoinGecko
// ============================================================================

pub mod coingecko; // Client API CoinGecko (URLs + extraction des prix)
pub mod error;     // FetchError
pub mod http;      // Trait HttpTransport + implémentation reqwest
pub mod retry;     // fetch_with_retry + RetryPolicy

#[cfg(test)]
pub mod testing;   // Transport scripté (tests uniquement)

// Re-export des types principaux
pub use coingecko::{CoinGeckoClient, API_BASE_URL, WEEK_REQUEST_DAYS, YEAR_REQUEST_DAYS};
pub use error::FetchError;
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use retry::{fetch_with_retry, RetryPolicy};
