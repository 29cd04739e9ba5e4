//! Market-cap snapshots: price x supply x SOL/USD, with a TTL cache and a
//! bounded per-mint history.

use crate::curve::{constant_product, CurveConfig, LinearCurve};
use crate::datasource::{ChainStateReader, MetadataStore, PriceOracle};
use crate::domain::{
    Clock, Decimal, GraduationStatus, MarketCapSnapshot, Mint, ScaledPrice, TokenAmount,
    PRICE_SCALE,
};
use crate::engine::{GraduationPolicy, SupplyTracker};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Maximum snapshots retained per mint.
pub const HISTORY_CAPACITY: usize = 1_000;

/// Composes the pricing sources with the SOL/USD oracle into displayable
/// market-cap snapshots.
///
/// Snapshots are cached per mint for a fixed TTL, invalidated purely by
/// time. Every freshly computed snapshot is appended to a capped ring
/// buffer; reads of the history never mutate it. Nothing here is fatal:
/// unavailable sources degrade the snapshot and set its flag.
pub struct MarketCapEngine {
    chain: Arc<dyn ChainStateReader>,
    supply: SupplyTracker,
    policy: Arc<GraduationPolicy>,
    oracle: Arc<dyn PriceOracle>,
    metadata: Arc<dyn MetadataStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
    cache: Mutex<HashMap<Mint, MarketCapSnapshot>>,
    history: Mutex<HashMap<Mint, VecDeque<MarketCapSnapshot>>>,
    last_sol_usd: Mutex<Option<Decimal>>,
    sol_usd_fallback: Decimal,
}

impl MarketCapEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: Arc<dyn ChainStateReader>,
        supply: SupplyTracker,
        policy: Arc<GraduationPolicy>,
        oracle: Arc<dyn PriceOracle>,
        metadata: Arc<dyn MetadataStore>,
        clock: Arc<dyn Clock>,
        ttl_ms: i64,
        sol_usd_fallback: Decimal,
    ) -> Self {
        Self {
            chain,
            supply,
            policy,
            oracle,
            metadata,
            clock,
            ttl_ms,
            cache: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            last_sol_usd: Mutex::new(None),
            sol_usd_fallback,
        }
    }

    /// Current market-cap snapshot for a mint, served from the TTL cache
    /// when fresh.
    pub async fn market_cap(&self, mint: &Mint, config: &CurveConfig) -> MarketCapSnapshot {
        let now = self.clock.now();
        if let Some(cached) = self.cache.lock().get(mint) {
            if now.since(cached.timestamp_ms) < self.ttl_ms {
                return cached.clone();
            }
        }

        let (price, circulating, mut degraded) = self.resolve_price(mint, config).await;
        let (sol_usd, oracle_degraded) = self.resolve_sol_usd().await;
        degraded |= oracle_degraded;

        let total_supply = config.total_supply.as_u64() as u128;
        let market_cap = price.as_u128() * circulating.as_u64() as u128 / PRICE_SCALE;
        let fully_diluted = price.as_u128() * total_supply / PRICE_SCALE;

        let price_usd = price.to_sol_per_token(config.decimals) * sol_usd;
        let market_cap_usd = Decimal::from_i128_with_scale(market_cap as i128, 9) * sol_usd;

        let snapshot = MarketCapSnapshot {
            timestamp_ms: now,
            price,
            price_usd,
            circulating_supply: circulating,
            market_cap,
            market_cap_usd,
            fully_diluted_market_cap: fully_diluted,
            degraded,
        };

        self.append_history(mint, snapshot.clone());
        self.cache.lock().insert(mint.clone(), snapshot.clone());
        snapshot
    }

    /// Snapshots for this mint within the trailing window, oldest first.
    pub fn history(&self, mint: &Mint, window_ms: i64) -> Vec<MarketCapSnapshot> {
        let cutoff = self.clock.now().as_ms().saturating_sub(window_ms);
        self.history
            .lock()
            .get(mint)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.timestamp_ms.as_ms() >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Percentage change of the circulating cap across the window. Zero
    /// when fewer than two points exist or the oldest cap is zero.
    pub fn change_pct(&self, mint: &Mint, window_ms: i64) -> Decimal {
        let points = self.history(mint, window_ms);
        let (Some(oldest), Some(newest)) = (points.first(), points.last()) else {
            return Decimal::zero();
        };
        if points.len() < 2 || oldest.market_cap == 0 {
            return Decimal::zero();
        }
        let oldest_cap = Decimal::from_i128_with_scale(oldest.market_cap as i128, 0);
        let newest_cap = Decimal::from_i128_with_scale(newest.market_cap as i128, 0);
        (newest_cap - oldest_cap) / oldest_cap * Decimal::hundred()
    }

    /// Resolve the spot price and circulating supply from the source the
    /// graduation flag makes authoritative.
    async fn resolve_price(
        &self,
        mint: &Mint,
        config: &CurveConfig,
    ) -> (ScaledPrice, TokenAmount, bool) {
        let sold = self.supply.tokens_sold(mint).await;
        let circulating = TokenAmount::new(sold.value.as_u64().min(config.total_supply.as_u64()));
        let mut degraded = sold.is_degraded();

        let price = match self.policy.status(mint).await {
            GraduationStatus::Bonding => match LinearCurve::new(config) {
                Ok(curve) => match curve.price_at(circulating) {
                    Ok(price) => price,
                    Err(e) => {
                        warn!("Curve evaluation failed for mint={}: {}", mint, e);
                        degraded = true;
                        ScaledPrice::new(0)
                    }
                },
                Err(e) => {
                    warn!("Curve construction failed for mint={}: {}", mint, e);
                    degraded = true;
                    ScaledPrice::new(0)
                }
            },
            GraduationStatus::Graduated => match self.chain.get_pool_reserves(mint).await {
                Ok(pool) if pool.is_priceable() => constant_product::spot_price(&pool)
                    .unwrap_or_else(|_| {
                        degraded = true;
                        ScaledPrice::new(0)
                    }),
                other => {
                    if let Err(e) = other {
                        warn!("Pool reserve read failed for mint={}: {}", mint, e);
                    }
                    degraded = true;
                    self.cached_price_fallback(mint).await
                }
            },
        };

        (price, circulating, degraded)
    }

    /// Last price the metadata store recorded, else a zero floor.
    async fn cached_price_fallback(&self, mint: &Mint) -> ScaledPrice {
        match self.metadata.cached_price(mint).await {
            Ok(Some(price)) => price,
            Ok(None) => ScaledPrice::new(0),
            Err(e) => {
                warn!("Cached price read failed for mint={}: {}", mint, e);
                ScaledPrice::new(0)
            }
        }
    }

    /// Oracle value, else the last good reading, else the configured safe
    /// default. The second element reports degradation.
    async fn resolve_sol_usd(&self) -> (Decimal, bool) {
        match self.oracle.sol_usd_price().await {
            Ok(Some(price)) => {
                *self.last_sol_usd.lock() = Some(price);
                (price, false)
            }
            Ok(None) => (self.stale_sol_usd(), true),
            Err(e) => {
                warn!("Oracle read failed: {}", e);
                (self.stale_sol_usd(), true)
            }
        }
    }

    fn stale_sol_usd(&self) -> Decimal {
        self.last_sol_usd.lock().unwrap_or(self.sol_usd_fallback)
    }

    fn append_history(&self, mint: &Mint, snapshot: MarketCapSnapshot) {
        let mut history = self.history.lock();
        let points = history.entry(mint.clone()).or_default();
        if points.len() == HISTORY_CAPACITY {
            points.pop_front();
        }
        points.push_back(snapshot);
    }
}

impl std::fmt::Debug for MarketCapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketCapEngine")
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}
