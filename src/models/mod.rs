// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod coin;    // Catalogues Coin / Currency
pub mod derived; // Métriques dérivées (direction, variation, compteurs)
pub mod format;  // Formatage des prix et pourcentages
pub mod price;   // PricePoint, PriceSeries, PriceSnapshot

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyprice::models::price::PriceSeries;
// On peut faire : use lazyprice::models::PriceSeries;
pub use coin::{Coin, Currency, COINS, CURRENCIES};
pub use derived::{derive_window, DerivedPoint, DerivedWindow, Direction};
pub use format::{format_compact_price, format_percentage, format_price};
pub use price::{PricePoint, PriceSeries, PriceSnapshot};
