// ============================================================================
// Structures : PricePoint, PriceSeries, PriceSnapshot
// ============================================================================
// Représente les séries de prix renvoyées par CoinGecko
//
// CONCEPTS RUST :
// 1. #[serde(from = ..., into = ...)] : format JSON différent du format Rust
//    - CoinGecko envoie chaque point comme un tableau [timestamp, prix]
//    - En Rust on préfère une struct avec des champs nommés
// 2. Slices (&[T]) : vue empruntée sur une partie d'un Vec, sans copie
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un point de prix : (timestamp en millisecondes, prix)
///
/// Format JSON : `[1711843200000, 70744.95]`
/// Le timestamp peut arriver en flottant, il est tronqué en millisecondes entières.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(i64, f64)")]
pub struct PricePoint {
    /// Epoch en millisecondes
    pub timestamp_ms: i64,

    /// Prix dans la devise demandée
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self { timestamp_ms, price }
    }

    /// Convertit le timestamp en DateTime<Utc>
    ///
    /// CONCEPT RUST : Option
    /// - None si le timestamp est hors de la plage représentable par chrono
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

impl From<(f64, f64)> for PricePoint {
    fn from((timestamp, price): (f64, f64)) -> Self {
        Self::new(timestamp as i64, price)
    }
}

impl From<PricePoint> for (i64, f64) {
    fn from(point: PricePoint) -> Self {
        (point.timestamp_ms, point.price)
    }
}

/// Série chronologique de prix pour un tuple (coin, devise, nombre de jours)
///
/// Immuable une fois reçue : on ne fait que la découper (window) ou en dériver
/// des métriques. Le format JSON est celui de CoinGecko : `{"prices": [[t, p], ...]}`
/// (les autres champs de la réponse, market_caps et total_volumes, sont ignorés).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Points triés par timestamp croissant
    pub prices: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(prices: Vec<PricePoint>) -> Self {
        Self { prices }
    }

    /// Retourne les `n` derniers points (ou tous s'il y en a moins)
    ///
    /// CONCEPT RUST : Slice
    /// - &self.prices[start..] : emprunte la fin du Vec sans allocation
    /// - saturating_sub évite un underflow si n > len
    pub fn window(&self, n: usize) -> &[PricePoint] {
        let start = self.prices.len().saturating_sub(n);
        &self.prices[start..]
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Point le plus récent
    pub fn last(&self) -> Option<&PricePoint> {
        self.prices.last()
    }
}

/// Prix actuel d'un coin et sa variation sur 24h
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSnapshot {
    pub price: f64,

    /// Variation 24h en pourcentage (absente si CoinGecko ne la fournit pas)
    pub change_24h: Option<f64>,
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_market_chart_body() {
        let body = r#"{
            "prices": [[1700000000000, 100.0], [1700086400000.0, 105.5]],
            "market_caps": [[1700000000000, 1.0]],
            "total_volumes": []
        }"#;

        let series: PriceSeries = serde_json::from_str(body).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.prices[0], PricePoint::new(1_700_000_000_000, 100.0));
        assert_eq!(series.prices[1].timestamp_ms, 1_700_086_400_000);
    }

    #[test]
    fn test_serialize_keeps_array_format() {
        let series = PriceSeries::new(vec![PricePoint::new(1_000, 42.5)]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"prices":[[1000,42.5]]}"#);
    }

    #[test]
    fn test_window() {
        let series = PriceSeries::new(
            (0..8).map(|i| PricePoint::new(i, i as f64)).collect(),
        );

        let week = series.window(7);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].timestamp_ms, 1);

        // Fenêtre plus grande que la série : tout est retourné
        assert_eq!(series.window(365).len(), 8);
        assert!(PriceSeries::default().window(7).is_empty());
    }

    #[test]
    fn test_datetime() {
        let point = PricePoint::new(86_400_000, 1.0);
        let date = point.datetime().unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "1970-01-02");
    }
}
