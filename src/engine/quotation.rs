//! Exact buy/sell trade simulation against the active pricing source.

use crate::curve::{constant_product, CurveConfig, LinearCurve};
use crate::datasource::{ChainStateReader, QuoteStrategy};
use crate::domain::{
    Clock, CurveState, GraduationStatus, Lamports, Mint, PoolState, PricingView, Quote,
    QuoteRequest, QuoteSource, ScaledPrice, TokenAmount, TradeDirection, PRICE_SCALE,
};
use crate::engine::{GraduationPolicy, SupplyTracker};
use crate::error::QuoteError;
use crate::orchestration::QuoteCoalescer;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// The local deterministic quote strategy: pure fixed-point simulation of
/// the on-chain settlement math.
///
/// For a fixed `(view, config, amount)` repeated calls return bit-identical
/// results; there is no randomness and no clock dependence except through
/// the supplied state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalQuoteCalculator;

impl LocalQuoteCalculator {
    /// Simulate buying with `sol_in` lamports.
    ///
    /// During bonding the token delta solves the curve integral for the
    /// spend; after graduation the constant-product formula applies. The
    /// two are never blended: the branch happens once, on the view's
    /// status.
    pub fn buy_quote(
        &self,
        view: &PricingView,
        config: &CurveConfig,
        sol_in: Lamports,
    ) -> Result<Quote, QuoteError> {
        if sol_in.is_zero() {
            return Err(QuoteError::InvalidAmount);
        }

        let (tokens_out, pre, post) = match view.status {
            GraduationStatus::Bonding => {
                let curve = LinearCurve::new(config)?;
                let sold = view.curve.tokens_sold;
                let delta = curve.tokens_for_lamports(sold, sol_in)?;
                if delta.is_zero() {
                    return Err(QuoteError::InvalidAmount);
                }
                let end = sold.checked_add(delta).ok_or(QuoteError::Overflow)?;
                if end > config.total_supply {
                    return Err(QuoteError::InsufficientSupply);
                }
                let pre = curve.price_at(sold)?;
                let post = curve.price_at(end)?;
                (delta, pre, post)
            }
            GraduationStatus::Graduated => {
                let pool = priceable_pool(view)?;
                let out = constant_product::tokens_out_for_sol(&pool, sol_in)?;
                if out.is_zero() {
                    return Err(QuoteError::InvalidAmount);
                }
                let pre = constant_product::spot_price(&pool)?;
                let after = constant_product::pool_after_buy(&pool, sol_in, out);
                let post = constant_product::spot_price(&after)?;
                (out, pre, post)
            }
        };

        Ok(Quote {
            direction: TradeDirection::Buy,
            amount_in: sol_in.as_u64(),
            amount_out: tokens_out.as_u64(),
            pre_trade_price: pre,
            post_trade_price: post,
            price_impact_bps: price_impact_bps(pre, post)?,
            avg_price: average_price(sol_in.as_u64(), tokens_out.as_u64())?,
            source: QuoteSource::Local,
            degraded: view.degraded,
        })
    }

    /// Simulate selling `tokens_in` raw units back to the pricing source.
    pub fn sell_quote(
        &self,
        view: &PricingView,
        config: &CurveConfig,
        tokens_in: TokenAmount,
    ) -> Result<Quote, QuoteError> {
        if tokens_in.is_zero() {
            return Err(QuoteError::InvalidAmount);
        }

        let (sol_out, pre, post) = match view.status {
            GraduationStatus::Bonding => {
                let curve = LinearCurve::new(config)?;
                let sold = view.curve.tokens_sold;
                if tokens_in > sold {
                    return Err(QuoteError::InsufficientReserve);
                }
                let start = TokenAmount::new(sold.as_u64() - tokens_in.as_u64());
                let proceeds = curve.cost_between(start, sold)?;
                let pre = curve.price_at(sold)?;
                let post = curve.price_at(start)?;
                (proceeds, pre, post)
            }
            GraduationStatus::Graduated => {
                let pool = priceable_pool(view)?;
                let out = constant_product::sol_out_for_tokens(&pool, tokens_in)?;
                if out >= pool.sol_reserves {
                    return Err(QuoteError::InsufficientReserve);
                }
                let pre = constant_product::spot_price(&pool)?;
                let after = constant_product::pool_after_sell(&pool, tokens_in, out);
                let post = constant_product::spot_price(&after)?;
                (out, pre, post)
            }
        };

        Ok(Quote {
            direction: TradeDirection::Sell,
            amount_in: tokens_in.as_u64(),
            amount_out: sol_out.as_u64(),
            pre_trade_price: pre,
            post_trade_price: post,
            price_impact_bps: price_impact_bps(pre, post)?,
            avg_price: average_price(sol_out.as_u64(), tokens_in.as_u64())?,
            source: QuoteSource::Local,
            degraded: view.degraded,
        })
    }
}

#[async_trait]
impl QuoteStrategy for LocalQuoteCalculator {
    async fn quote(
        &self,
        request: &QuoteRequest,
        view: &PricingView,
        config: &CurveConfig,
    ) -> Result<Quote, QuoteError> {
        match request.direction {
            TradeDirection::Buy => self.buy_quote(view, config, Lamports::new(request.amount_in)),
            TradeDirection::Sell => {
                self.sell_quote(view, config, TokenAmount::new(request.amount_in))
            }
        }
    }
}

fn priceable_pool(view: &PricingView) -> Result<PoolState, QuoteError> {
    view.pool
        .filter(PoolState::is_priceable)
        .ok_or(QuoteError::MissingPoolState)
}

/// Signed relative price change in basis points.
fn price_impact_bps(pre: ScaledPrice, post: ScaledPrice) -> Result<i64, QuoteError> {
    if pre.is_zero() {
        return Ok(0);
    }
    let diff = post.as_u128() as i128 - pre.as_u128() as i128;
    let bps = diff
        .checked_mul(10_000)
        .ok_or(QuoteError::Overflow)?
        / pre.as_u128() as i128;
    i64::try_from(bps).map_err(|_| QuoteError::Overflow)
}

/// Effective fill price: lamports paid or received per raw unit, scaled.
fn average_price(lamports: u64, tokens: u64) -> Result<ScaledPrice, QuoteError> {
    if tokens == 0 {
        return Err(QuoteError::InvalidAmount);
    }
    let scaled = (lamports as u128)
        .checked_mul(PRICE_SCALE)
        .ok_or(QuoteError::Overflow)?
        / tokens as u128;
    Ok(ScaledPrice::new(scaled))
}

/// Quotation front end: assembles a pricing view from the data sources,
/// selects a strategy, and coalesces duplicate requests.
pub struct QuotationEngine {
    chain: Arc<dyn ChainStateReader>,
    supply: SupplyTracker,
    policy: Arc<GraduationPolicy>,
    local: LocalQuoteCalculator,
    remote: Option<Arc<dyn QuoteStrategy>>,
    coalescer: QuoteCoalescer,
}

impl QuotationEngine {
    pub fn new(
        chain: Arc<dyn ChainStateReader>,
        supply: SupplyTracker,
        policy: Arc<GraduationPolicy>,
        clock: Arc<dyn Clock>,
        quote_cache_ttl_ms: i64,
    ) -> Self {
        Self {
            chain,
            supply,
            policy,
            local: LocalQuoteCalculator,
            remote: None,
            coalescer: QuoteCoalescer::new(clock, quote_cache_ttl_ms),
        }
    }

    /// Attach the live quoting service as the preferred strategy.
    pub fn with_remote(mut self, remote: Arc<dyn QuoteStrategy>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Quote a buy of `sol_in` lamports against `mint`.
    pub async fn buy_quote(
        &self,
        mint: &Mint,
        sol_in: Lamports,
        config: &CurveConfig,
    ) -> Result<Quote, QuoteError> {
        self.quote(QuoteRequest::buy(mint.clone(), sol_in), config)
            .await
    }

    /// Quote a sell of `tokens_in` raw units against `mint`.
    pub async fn sell_quote(
        &self,
        mint: &Mint,
        tokens_in: TokenAmount,
        config: &CurveConfig,
    ) -> Result<Quote, QuoteError> {
        self.quote(QuoteRequest::sell(mint.clone(), tokens_in), config)
            .await
    }

    /// Advisory cancellation of a pending quote for this input: its result
    /// will no longer be applied, though the underlying read may complete
    /// and fill the cache.
    pub fn cancel(&self, request: &QuoteRequest) {
        self.coalescer.cancel(request);
    }

    async fn quote(
        &self,
        request: QuoteRequest,
        config: &CurveConfig,
    ) -> Result<Quote, QuoteError> {
        if let Some(hit) = self.coalescer.cached(&request) {
            return Ok(hit);
        }
        let generation = self.coalescer.begin(&request);

        let view = self.pricing_view(&request.mint, config).await;

        // Strategy selection happens exactly once per request; the chosen
        // strategy computes the whole quote or none of it.
        let quote = match &self.remote {
            Some(remote) => match remote.quote(&request, &view, config).await {
                Ok(quote) => quote,
                Err(QuoteError::Unavailable(msg)) => {
                    warn!("Remote quote unavailable, using local calculator: {}", msg);
                    let mut quote = self.local.quote(&request, &view, config).await?;
                    quote.degraded = true;
                    quote
                }
                Err(other) => return Err(other),
            },
            None => self.local.quote(&request, &view, config).await?,
        };

        self.coalescer.complete(&request, generation, quote.clone());
        Ok(quote)
    }

    /// Assemble the pricing inputs for one operation: the graduation flag
    /// read once, then only the state that flag makes authoritative.
    pub async fn pricing_view(&self, mint: &Mint, config: &CurveConfig) -> PricingView {
        match self.policy.status(mint).await {
            GraduationStatus::Bonding => {
                let sold = self.supply.tokens_sold(mint).await;
                // Clamp so the curve invariant holds even against a
                // misreporting source.
                let clamped = sold.value.min(config.total_supply);
                PricingView::bonding(CurveState::new(clamped)).with_degraded(sold.is_degraded())
            }
            GraduationStatus::Graduated => match self.chain.get_pool_reserves(mint).await {
                Ok(pool) if pool.is_priceable() => PricingView::graduated(pool),
                Ok(_) => {
                    warn!("Pool for mint={} has empty reserves", mint);
                    PricingView {
                        status: GraduationStatus::Graduated,
                        curve: CurveState::default(),
                        pool: None,
                        degraded: true,
                    }
                }
                Err(e) => {
                    warn!("Pool reserve read failed for mint={}: {}", mint, e);
                    PricingView {
                        status: GraduationStatus::Graduated,
                        curve: CurveState::default(),
                        pool: None,
                        degraded: true,
                    }
                }
            },
        }
    }
}

impl std::fmt::Debug for QuotationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotationEngine")
            .field("remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}
