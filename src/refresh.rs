// ============================================================================
// Cycle de rafraîchissement
// ============================================================================
// Un cycle = trois fetchs lancés en parallèle :
// 1. série 7 jours (toujours fraîche)
// 2. série 365 jours (cache 1h ou fetch)
// 3. prix actuel + variation 24h
//
// Le cycle ne réussit que si les TROIS réussissent : c'est un join
// « fail-fast », pas de rendu partiel.
//
// CONCEPT RUST : tokio::try_join!
// - Poll les futures sur la même tâche (concurrence coopérative, pas de thread)
// - Retourne dès la première Err, les autres futures sont abandonnées
// ============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{info, instrument};

use crate::api::{CoinGeckoClient, WEEK_REQUEST_DAYS};
use crate::models::{Coin, Currency, PriceSeries, PriceSnapshot};
use crate::store::YearSeriesCache;

/// Résultat d'un cycle réussi
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub coin: &'static Coin,
    pub currency: &'static Currency,
    pub week: PriceSeries,
    pub year: PriceSeries,
    pub current: PriceSnapshot,
    pub fetched_at: DateTime<Local>,
}

/// Orchestrateur : client pour les données fraîches, cache pour l'année
#[derive(Clone)]
pub struct Refresher {
    client: CoinGeckoClient,
    cache: YearSeriesCache,
}

impl Refresher {
    pub fn new(client: CoinGeckoClient, cache: YearSeriesCache) -> Self {
        Self { client, cache }
    }

    /// Exécute un cycle complet pour (coin, devise)
    #[instrument(skip(self, coin, currency), fields(coin = coin.id, currency = currency.code))]
    pub async fn refresh_cycle(
        &self,
        coin: &'static Coin,
        currency: &'static Currency,
    ) -> Result<RefreshOutcome> {
        let (week, year, current) = tokio::try_join!(
            self.client.fetch_price_series(coin, currency, WEEK_REQUEST_DAYS),
            self.cache.get_cached_or_fresh(coin, currency),
            self.client.fetch_current_price(coin, currency),
        )
        .with_context(|| format!("Échec du rafraîchissement {} / {}", coin.id, currency.code))?;

        info!(
            week_points = week.len(),
            year_points = year.len(),
            price = current.price,
            "Refresh cycle completed"
        );

        Ok(RefreshOutcome {
            coin,
            currency,
            week,
            year,
            current,
            fetched_at: Local::now(),
        })
    }
}

/// Message unique affiché à l'utilisateur quand un cycle échoue
pub fn failure_message(coin: &Coin) -> String {
    format!("Failed to load {} data. Please try again later.", coin.name)
}

// ============================================================================
// Tests unitaires
// ============================================================================
