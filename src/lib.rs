// ============================================================================
// LazyPrice - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Client CoinGecko + retry
pub mod app;     // État de l'application
pub mod config;  // Configuration (défauts + environnement)
pub mod models;  // Structures de données et métriques
pub mod refresh; // Cycle de rafraîchissement
pub mod store;   // Stockage clé/valeur, cache annuel, préférences
pub mod ui;      // Interface utilisateur
