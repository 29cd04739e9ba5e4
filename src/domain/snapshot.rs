//! Externally-owned chain state snapshots and the market-cap value object.
//!
//! `CurveState` and `PoolState` are owned by the chain; this engine only
//! reads point-in-time copies of them. Quotes and snapshots never write
//! them back.

use crate::domain::{Decimal, GraduationStatus, Lamports, ScaledPrice, TimeMs, TokenAmount};
use serde::{Deserialize, Serialize};

/// Bonding-phase curve state. Mutated only by confirmed on-chain trades.
///
/// Invariant: `0 <= tokens_sold <= total_supply` of the owning config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveState {
    pub tokens_sold: TokenAmount,
}

impl CurveState {
    pub fn new(tokens_sold: TokenAmount) -> Self {
        Self { tokens_sold }
    }
}

/// Post-graduation AMM pool reserves.
///
/// Invariant: both reserves strictly positive while the token is Graduated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolState {
    pub sol_reserves: Lamports,
    pub token_reserves: TokenAmount,
}

impl PoolState {
    pub fn new(sol_reserves: Lamports, token_reserves: TokenAmount) -> Self {
        Self {
            sol_reserves,
            token_reserves,
        }
    }

    /// True when both reserves are positive, i.e. the pool is usable as a
    /// pricing source.
    pub fn is_priceable(&self) -> bool {
        !self.sol_reserves.is_zero() && !self.token_reserves.is_zero()
    }
}

/// The assembled pricing inputs for one quote or snapshot: the graduation
/// flag read once, plus whichever state that flag makes authoritative.
///
/// Curve and AMM pricing are never blended within one view; consumers
/// branch on `status` before touching either field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingView {
    pub status: GraduationStatus,
    pub curve: CurveState,
    /// Present only when priceable reserves were observed.
    pub pool: Option<PoolState>,
    /// True when a fallback data path supplied any of the inputs.
    pub degraded: bool,
}

impl PricingView {
    /// Bonding-phase view over a curve state snapshot.
    pub fn bonding(curve: CurveState) -> Self {
        Self {
            status: GraduationStatus::Bonding,
            curve,
            pool: None,
            degraded: false,
        }
    }

    /// Graduated view over pool reserves.
    pub fn graduated(pool: PoolState) -> Self {
        Self {
            status: GraduationStatus::Graduated,
            curve: CurveState::default(),
            pool: Some(pool),
            degraded: false,
        }
    }

    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }
}

/// Point-in-time market-cap computation for one mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapSnapshot {
    pub timestamp_ms: TimeMs,
    pub price: ScaledPrice,
    pub price_usd: Decimal,
    pub circulating_supply: TokenAmount,
    /// Circulating cap in lamports: price x circulating supply.
    pub market_cap: u128,
    pub market_cap_usd: Decimal,
    /// Fully-diluted cap in lamports: price x total supply.
    pub fully_diluted_market_cap: u128,
    /// True when the supply or oracle path fell back past its preferred
    /// source while assembling this snapshot.
    pub degraded: bool,
}
