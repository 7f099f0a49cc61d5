// ============================================================================
// Module : store
// ============================================================================
// Persistance côté client : store clé-valeur, cache de la série annuelle,
// préférences utilisateur
// ============================================================================

pub mod kv;          // Trait KeyValueStore + FileStore / MemoryStore
pub mod preferences; // Dernier coin / dernière devise
pub mod year_cache;  // Cache 1h de la série 365 jours

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use preferences::Preferences;
pub use year_cache::{cache_key, CacheEntry, Clock, SystemClock, YearSeriesCache, CACHE_DURATION};
