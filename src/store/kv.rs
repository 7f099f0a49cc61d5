// ============================================================================
// Store clé-valeur persistant
// ============================================================================
// Store synchrone string -> string, l'équivalent d'un localStorage.
// Utilisé pour le cache de la série annuelle et les préférences utilisateur.
//
// CONCEPTS RUST :
// 1. Trait objet : Arc<dyn KeyValueStore> partagé entre UI et worker
// 2. Mutabilité intérieure : &self + Mutex pour écrire depuis un Arc
// 3. Écriture atomique : fichier temporaire puis rename
// ============================================================================

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

/// Nom du fichier du store dans le répertoire de données
pub const STORE_FILE_NAME: &str = "store.json";

/// Erreurs du store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupted: {0}")]
    Corrupted(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Store clé-valeur synchrone
pub trait KeyValueStore: Send + Sync {
    /// Lit une valeur ; Ok(None) si la clé est absente
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Écrit une valeur, remplace l'ancienne
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ============================================================================
// FileStore : un objet JSON plat sur disque
// ============================================================================

/// Store persisté dans un fichier JSON `{ "clé": "valeur", ... }`
///
/// Le fichier est relu à chaque `get` : aucune copie en mémoire n'est gardée
/// entre deux requêtes.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Ouvre (ou prépare) le store dans `dir`, crée le répertoire si besoin
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE_NAME);
        debug!(path = ?path, "Opened file store");

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::Corrupted(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;

        // Fichier corrompu : remplacé. Erreur d'I/O : propagée, rien n'est écrit
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StoreError::Corrupted(reason)) => {
                warn!(path = ?self.path, %reason, "Store file corrupted, replacing it");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }
}

// ============================================================================
// MemoryStore : store non persisté
// ============================================================================

/// Store en mémoire (tests, ou repli si le répertoire de données est inutilisable)
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("lazyprice_currency", "eur").unwrap();
        store.set("lazyprice_coin", "ethereum").unwrap();
        store.set("lazyprice_currency", "gbp").unwrap();

        // Une nouvelle instance relit le même fichier
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("lazyprice_currency").unwrap().as_deref(), Some("gbp"));
        assert_eq!(reopened.get("lazyprice_coin").unwrap().as_deref(), Some("ethereum"));
    }

    #[test]
    fn test_file_store_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.get("key"), Err(StoreError::Corrupted(_))));

        // Une écriture répare le fichier
        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_store_io_error_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        // Un répertoire à la place du fichier : lecture impossible, pas corrompue
        fs::create_dir(store.path()).unwrap();

        assert!(matches!(store.get("key"), Err(StoreError::Io(_))));
        assert!(matches!(store.set("key", "value"), Err(StoreError::Io(_))));
        assert!(store.path().is_dir());
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap(), None);
    }
}
