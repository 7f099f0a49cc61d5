// ============================================================================
// Cache de la série annuelle
// ============================================================================
// La série 365 jours est lourde à récupérer : on la garde dans le store
// pendant une heure, pour une seule devise par coin.
//
// Règle de réutilisation : l'entrée est valide ssi
//   now - entry.fetched_at < CACHE_DURATION   ET   entry.currency == devise demandée
// Sinon : fetch frais, puis écrasement de l'entrée (une seule entrée par coin).
//
// Une entrée illisible est traitée comme absente : ce n'est jamais une erreur.
//
// CONCEPTS RUST :
// 1. Trait Clock : le temps est injecté pour pouvoir tester l'expiration
// 2. Option chaining : lecture -> parsing -> validation, chaque étape peut échouer
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::api::{CoinGeckoClient, FetchError, YEAR_REQUEST_DAYS};
use crate::models::{Coin, Currency, PriceSeries};
use crate::store::KeyValueStore;

/// Durée de validité d'une entrée : 1 heure
pub const CACHE_DURATION: Duration = Duration::from_secs(60 * 60);

/// Source de temps en millisecondes epoch
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Horloge système (chrono)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Entrée persistée : `{"data": {...}, "timestamp": ..., "currencyCode": "usd"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: PriceSeries,

    /// Date du fetch (epoch ms)
    #[serde(rename = "timestamp")]
    pub fetched_at: i64,

    #[serde(rename = "currencyCode")]
    pub currency_code: String,
}

/// Clé du store pour un coin
pub fn cache_key(coin_id: &str) -> String {
    format!("{}_year_data", coin_id)
}

/// Cache « lu ou fetché » de la série 365 jours
#[derive(Clone)]
pub struct YearSeriesCache {
    client: CoinGeckoClient,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    duration: Duration,
}

impl YearSeriesCache {
    pub fn new(
        client: CoinGeckoClient,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        duration: Duration,
    ) -> Self {
        Self {
            client,
            store,
            clock,
            duration,
        }
    }

    /// Retourne la série annuelle depuis le cache si valide, sinon la fetch
    ///
    /// Les erreurs de fetch sont propagées telles quelles ; aucune donnée
    /// périmée n'est retournée silencieusement.
    #[instrument(skip(self, coin, currency), fields(coin = coin.id, currency = currency.code))]
    pub async fn get_cached_or_fresh(
        &self,
        coin: &Coin,
        currency: &Currency,
    ) -> Result<PriceSeries, FetchError> {
        let key = cache_key(coin.id);

        if let Some(data) = self.read_valid(&key, currency) {
            info!(points = data.len(), "Using cached year data");
            return Ok(data);
        }

        info!("Fetching fresh year data");
        let data = self
            .client
            .fetch_price_series(coin, currency, YEAR_REQUEST_DAYS)
            .await?;

        let entry = CacheEntry {
            data,
            fetched_at: self.clock.now_millis(),
            currency_code: currency.code.to_string(),
        };
        self.write(&key, &entry);

        Ok(entry.data)
    }

    /// Lit l'entrée et la retourne si elle est encore valide pour `currency`
    fn read_valid(&self, key: &str, currency: &Currency) -> Option<PriceSeries> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Cache read failed, fetching fresh data");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Cache parse error, fetching fresh data");
                return None;
            }
        };

        let age_ms = self.clock.now_millis() - entry.fetched_at;
        let fresh = age_ms < self.duration.as_millis() as i64;
        let same_currency = entry.currency_code == currency.code;

        debug!(age_ms, fresh, same_currency, cached = %entry.currency_code, "Checked cached year data");

        (fresh && same_currency).then_some(entry.data)
    }

    /// Écrit l'entrée ; un échec d'écriture n'empêche pas de retourner les données
    fn write(&self, key: &str, entry: &CacheEntry) {
        let serialized = match serde_json::to_string(entry) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &serialized) {
            warn!(error = %e, "Failed to write year data cache");
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::api::{HttpResponse, RetryPolicy};
    use crate::store::{MemoryStore, StoreError};
    use std::sync::atomic::{AtomicI64, Ordering};

    const T0: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60 * 1000;

    const FRESH_BODY: &str = r#"{"prices": [[1000, 1.0], [2000, 2.0], [3000, 3.0]]}"#;

    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn at(millis: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(millis)))
        }

        fn set(&self, millis: i64) {
            self.0.store(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Store dont les écritures échouent toujours
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    struct Fixture {
        transport: Arc<ScriptedTransport>,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        cache: YearSeriesCache,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(
            ScriptedTransport::new()
                .route("market_chart", vec![Ok(HttpResponse::new(200, FRESH_BODY))]),
        );
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::at(T0);
        let client = CoinGeckoClient::new(transport.clone(), "https://api.test", RetryPolicy::default());
        let cache = YearSeriesCache::new(client, store.clone(), clock.clone(), CACHE_DURATION);

        Fixture {
            transport,
            store,
            clock,
            cache,
        }
    }

    fn cached_entry(currency: &str, fetched_at: i64) -> String {
        serde_json::to_string(&CacheEntry {
            data: PriceSeries::new(vec![crate::models::PricePoint::new(42, 42.0)]),
            fetched_at,
            currency_code: currency.to_string(),
        })
        .unwrap()
    }

    fn stored_entry(store: &MemoryStore, coin: &Coin) -> CacheEntry {
        let raw = store.get(&cache_key(coin.id)).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("bitcoin"), "bitcoin_year_data");
    }

    #[test]
    fn test_entry_json_format() {
        let json = cached_entry("usd", 5);
        assert_eq!(
            json,
            r#"{"data":{"prices":[[42,42.0]]},"timestamp":5,"currencyCode":"usd"}"#
        );
    }

    #[tokio::test]
    async fn test_miss_fetches_and_writes_entry() {
        let f = fixture();
        let coin = Coin::default_coin();
        let usd = Currency::default_currency();

        let data = f.cache.get_cached_or_fresh(coin, usd).await.unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(f.transport.count("days=365"), 1);

        let entry = stored_entry(&f.store, coin);
        assert_eq!(entry.fetched_at, T0);
        assert_eq!(entry.currency_code, "usd");
        assert_eq!(entry.data, data);
    }

    #[tokio::test]
    async fn test_reuse_within_hour() {
        let f = fixture();
        let coin = Coin::default_coin();
        f.store.set(&cache_key(coin.id), &cached_entry("usd", T0)).unwrap();
        f.clock.set(T0 + 59 * MINUTE);

        let data = f
            .cache
            .get_cached_or_fresh(coin, Currency::default_currency())
            .await
            .unwrap();

        assert_eq!(data.prices[0].price, 42.0);
        assert!(f.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stale_entry_refetched_and_overwritten() {
        let f = fixture();
        let coin = Coin::default_coin();
        f.store.set(&cache_key(coin.id), &cached_entry("usd", T0)).unwrap();
        f.clock.set(T0 + 61 * MINUTE);

        let data = f
            .cache
            .get_cached_or_fresh(coin, Currency::default_currency())
            .await
            .unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(f.transport.count("market_chart"), 1);
        assert_eq!(stored_entry(&f.store, coin).fetched_at, T0 + 61 * MINUTE);
    }

    #[tokio::test]
    async fn test_currency_mismatch_forces_refetch() {
        let f = fixture();
        let coin = Coin::default_coin();
        let eur = Currency::find("eur").unwrap();
        f.store.set(&cache_key(coin.id), &cached_entry("usd", T0)).unwrap();

        let data = f.cache.get_cached_or_fresh(coin, eur).await.unwrap();

        assert_eq!(data.len(), 3);
        assert!(f.transport.calls()[0].contains("vs_currency=eur"));

        // Entrée unique par coin : l'entrée USD est remplacée par l'entrée EUR
        assert_eq!(stored_entry(&f.store, coin).currency_code, "eur");
    }

    #[tokio::test]
    async fn test_corrupted_entry_is_a_miss() {
        let f = fixture();
        let coin = Coin::default_coin();
        f.store
            .set(&cache_key(coin.id), r#"{"data":{"prices":[[1,2"#)
            .unwrap();

        let data = f
            .cache
            .get_cached_or_fresh(coin, Currency::default_currency())
            .await
            .unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(f.transport.count("market_chart"), 1);
        assert_eq!(stored_entry(&f.store, coin).data, data);
    }

    #[tokio::test]
    async fn test_entries_are_per_coin() {
        let f = fixture();
        let btc = Coin::default_coin();
        let eth = Coin::find("ethereum").unwrap();
        f.store.set(&cache_key(btc.id), &cached_entry("usd", T0)).unwrap();

        f.cache
            .get_cached_or_fresh(eth, Currency::default_currency())
            .await
            .unwrap();

        assert!(f.transport.calls()[0].contains("/coins/ethereum/"));
        assert_eq!(stored_entry(&f.store, btc).data.prices[0].price, 42.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_propagates_and_keeps_entry() {
        let transport = Arc::new(
            ScriptedTransport::new().route("market_chart", vec![Ok(HttpResponse::new(500, ""))]),
        );
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::at(T0 + 2 * 60 * MINUTE);
        let client = CoinGeckoClient::new(transport, "https://api.test", RetryPolicy::default());
        let cache = YearSeriesCache::new(client, store.clone(), clock, CACHE_DURATION);

        let coin = Coin::default_coin();
        let stale = cached_entry("usd", T0);
        store.set(&cache_key(coin.id), &stale).unwrap();

        let result = cache
            .get_cached_or_fresh(coin, Currency::default_currency())
            .await;

        assert_eq!(result, Err(FetchError::Http { status: 500 }));
        assert_eq!(store.get(&cache_key(coin.id)).unwrap(), Some(stale));
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_data() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .route("market_chart", vec![Ok(HttpResponse::new(200, FRESH_BODY))]),
        );
        let client = CoinGeckoClient::new(transport, "https://api.test", RetryPolicy::default());
        let cache = YearSeriesCache::new(
            client,
            Arc::new(ReadOnlyStore),
            Arc::new(SystemClock),
            CACHE_DURATION,
        );

        let data = cache
            .get_cached_or_fresh(Coin::default_coin(), Currency::default_currency())
            .await
            .unwrap();

        assert_eq!(data.len(), 3);
    }
}
