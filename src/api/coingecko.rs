// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Construit les URLs des endpoints CoinGecko et délègue l'exécution au fetcher
// avec retry. Aucun cache ni retry propre ici : une URL, un appel.
//
// Endpoints utilisés :
// - /coins/{id}/market_chart : historique journalier ({"prices": [[t, p], ...]})
// - /simple/price            : prix actuel + variation 24h
//
// CONCEPTS RUST :
// 1. Arc<dyn Trait> : transport partagé entre tâches, choisi à l'exécution
// 2. serde_json::Value : accès dynamique aux champs dont le nom dépend
//    du coin et de la devise ({"bitcoin": {"usd": ..., "usd_24h_change": ...}})
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::{fetch_with_retry, FetchError, HttpTransport, RetryPolicy};
use crate::models::{Coin, Currency, PriceSeries, PriceSnapshot};

/// URL publique de l'API CoinGecko v3
pub const API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Nombre de jours demandés pour la bande hebdomadaire
/// (CoinGecko renvoie 8 points : 7 jours + aujourd'hui)
pub const WEEK_REQUEST_DAYS: u32 = 7;

/// Nombre de jours demandés pour la grille annuelle
pub const YEAR_REQUEST_DAYS: u32 = 365;

/// Client CoinGecko
#[derive(Clone)]
pub struct CoinGeckoClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    policy: RetryPolicy,
}

impl CoinGeckoClient {
    /// Crée un client ; `base_url` sans slash final
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// URL de l'historique journalier sur `days` jours
    pub fn market_chart_url(&self, coin_id: &str, currency_code: &str, days: u32) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
            self.base_url, coin_id, currency_code, days
        )
    }

    /// URL du prix actuel avec variation 24h
    pub fn simple_price_url(&self, coin_id: &str, currency_code: &str) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}&include_24hr_change=true",
            self.base_url, coin_id, currency_code
        )
    }

    /// Récupère la série journalière de `days` jours
    #[instrument(skip(self, coin, currency), fields(coin = coin.id, currency = currency.code))]
    pub async fn fetch_price_series(
        &self,
        coin: &Coin,
        currency: &Currency,
        days: u32,
    ) -> Result<PriceSeries, FetchError> {
        let url = self.market_chart_url(coin.id, currency.code, days);
        debug!(url = %url, "Built market chart URL");

        let body = fetch_with_retry(self.transport.as_ref(), &url, &self.policy).await?;
        let series = parse_price_series(body)?;

        info!(points = series.len(), "Fetched price series");
        Ok(series)
    }

    /// Récupère le prix actuel et la variation 24h
    #[instrument(skip(self, coin, currency), fields(coin = coin.id, currency = currency.code))]
    pub async fn fetch_current_price(
        &self,
        coin: &Coin,
        currency: &Currency,
    ) -> Result<PriceSnapshot, FetchError> {
        let url = self.simple_price_url(coin.id, currency.code);
        debug!(url = %url, "Built simple price URL");

        let body = fetch_with_retry(self.transport.as_ref(), &url, &self.policy).await?;
        let snapshot = parse_price_snapshot(&body, coin.id, currency.code)?;

        info!(price = snapshot.price, change_24h = ?snapshot.change_24h, "Fetched current price");
        Ok(snapshot)
    }
}

/// Extrait `prices` d'une réponse market_chart
fn parse_price_series(body: Value) -> Result<PriceSeries, FetchError> {
    serde_json::from_value(body).map_err(|e| FetchError::MissingField(format!("prices ({})", e)))
}

/// Extrait le prix et la variation 24h d'une réponse simple/price
///
/// Format : `{"bitcoin": {"usd": 50000, "usd_24h_change": -2.5}}`
fn parse_price_snapshot(
    body: &Value,
    coin_id: &str,
    currency_code: &str,
) -> Result<PriceSnapshot, FetchError> {
    let entry = &body[coin_id];

    let price = entry[currency_code]
        .as_f64()
        .ok_or_else(|| FetchError::MissingField(format!("{}.{}", coin_id, currency_code)))?;

    let change_24h = entry[format!("{}_24h_change", currency_code)].as_f64();

    Ok(PriceSnapshot { price, change_24h })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::api::HttpResponse;

    fn client(transport: Arc<ScriptedTransport>) -> CoinGeckoClient {
        CoinGeckoClient::new(transport, "https://api.test/v3/", RetryPolicy::default())
    }

    #[test]
    fn test_build_urls() {
        let client = client(Arc::new(ScriptedTransport::new()));

        assert_eq!(
            client.market_chart_url("bitcoin", "eur", 365),
            "https://api.test/v3/coins/bitcoin/market_chart?vs_currency=eur&days=365&interval=daily"
        );
        assert_eq!(
            client.simple_price_url("ethereum", "usd"),
            "https://api.test/v3/simple/price?ids=ethereum&vs_currencies=usd&include_24hr_change=true"
        );
    }

    #[tokio::test]
    async fn test_fetch_price_series() {
        let transport = Arc::new(ScriptedTransport::new().route(
            "market_chart",
            vec![Ok(HttpResponse::new(
                200,
                r#"{"prices": [[1000, 100.0], [2000, 105.0]], "market_caps": [], "total_volumes": []}"#,
            ))],
        ));
        let client = client(transport.clone());

        let series = client
            .fetch_price_series(Coin::default_coin(), Currency::default_currency(), 7)
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().price, 105.0);
        assert!(transport.calls()[0].contains("days=7"));
    }

    #[tokio::test]
    async fn test_fetch_current_price() {
        let transport = Arc::new(ScriptedTransport::new().route(
            "simple/price",
            vec![Ok(HttpResponse::new(
                200,
                r#"{"bitcoin": {"usd": 50000, "usd_24h_change": -2.5}}"#,
            ))],
        ));

        let snapshot = client(transport)
            .fetch_current_price(Coin::default_coin(), Currency::default_currency())
            .await
            .unwrap();

        assert_eq!(snapshot.price, 50_000.0);
        assert_eq!(snapshot.change_24h, Some(-2.5));
    }

    #[test]
    fn test_snapshot_without_change() {
        let body = serde_json::json!({"bitcoin": {"eur": 41000.5}});
        let snapshot = parse_price_snapshot(&body, "bitcoin", "eur").unwrap();
        assert_eq!(snapshot.change_24h, None);
    }

    #[test]
    fn test_missing_fields() {
        let body = serde_json::json!({"bitcoin": {"usd": 1.0}});
        assert!(matches!(
            parse_price_snapshot(&body, "bitcoin", "gbp"),
            Err(FetchError::MissingField(_))
        ));

        assert!(matches!(
            parse_price_series(serde_json::json!({"error": "oops"})),
            Err(FetchError::MissingField(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_propagate_unmodified() {
        let transport = Arc::new(
            ScriptedTransport::new().route("simple/price", vec![Ok(HttpResponse::new(401, ""))]),
        );

        let result = client(transport)
            .fetch_current_price(Coin::default_coin(), Currency::default_currency())
            .await;

        assert_eq!(result, Err(FetchError::Http { status: 401 }));
    }
}
