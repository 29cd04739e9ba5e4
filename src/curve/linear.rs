//! Linear bonding curve with integer math.
//!
//! Price as a function of cumulative tokens sold:
//!
//! ```text
//! price(x) = a * x + b        (lamports per raw unit, scaled)
//! ```
//!
//! where `b` is the initial-price target and `a` is derived from the
//! terminal-price target at `x = total_supply`. The cost of a trade is the
//! exact definite integral of `price(x)` over the traded range, and the
//! buy-side solve inverts that integral with an integer square root, so a
//! quote agrees with the settlement math to the lamport.

use crate::curve::{CurveConfig, CurveError, CurveKind};
use crate::domain::{Lamports, ScaledPrice, TokenAmount, PRICE_SCALE};

/// Extra scale carried by the slope so it stays representable for large
/// supplies. A slope unit is `1 / SLOPE_SCALE` scaled-price per raw unit.
pub const SLOPE_SCALE: u128 = 1_000_000_000_000;

/// A validated linear curve with coefficients derived once from its config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearCurve {
    total_supply: u128,
    /// `a`, scaled by `PRICE_SCALE * SLOPE_SCALE`. Non-negative by
    /// construction; zero means a flat curve.
    slope: u128,
    /// `b`, scaled by `PRICE_SCALE`. Strictly positive by construction.
    intercept: u128,
}

impl LinearCurve {
    /// Derive and validate curve coefficients.
    ///
    /// # Errors
    /// Rejects configs with zero supply, zero initial price, a terminal
    /// price below the initial price (the slope would be negative and the
    /// curve non-monotonic), or prices too small to resolve at the
    /// configured decimals.
    pub fn new(config: &CurveConfig) -> Result<Self, CurveError> {
        match config.kind {
            CurveKind::Linear => {}
        }
        let total_supply = config.total_supply.as_u64() as u128;
        if total_supply == 0 {
            return Err(CurveError::InvalidConfig("total supply is zero"));
        }
        if config.initial_price_lamports == 0 {
            return Err(CurveError::InvalidConfig("initial price is zero"));
        }
        if config.terminal_price_lamports < config.initial_price_lamports {
            return Err(CurveError::InvalidConfig(
                "terminal price below initial price",
            ));
        }

        let unit = 10u128
            .checked_pow(config.decimals as u32)
            .ok_or(CurveError::Overflow)?;

        // b = p0 * PRICE_SCALE / 10^decimals, lamports per raw unit scaled.
        let intercept = (config.initial_price_lamports as u128)
            .checked_mul(PRICE_SCALE)
            .ok_or(CurveError::Overflow)?
            / unit;
        if intercept == 0 {
            return Err(CurveError::InvalidConfig(
                "initial price under-resolves at these decimals",
            ));
        }

        // a = (pT - p0) * PRICE_SCALE * SLOPE_SCALE / (10^decimals * supply).
        let delta_scaled = ((config.terminal_price_lamports - config.initial_price_lamports)
            as u128)
            .checked_mul(PRICE_SCALE)
            .ok_or(CurveError::Overflow)?
            / unit;
        let slope = delta_scaled
            .checked_mul(SLOPE_SCALE)
            .ok_or(CurveError::Overflow)?
            / total_supply;

        Ok(Self {
            total_supply,
            slope,
            intercept,
        })
    }

    /// Spot price after `tokens_sold` raw units have been sold.
    pub fn price_at(&self, tokens_sold: TokenAmount) -> Result<ScaledPrice, CurveError> {
        let x = tokens_sold.as_u64() as u128;
        if x > self.total_supply {
            return Err(CurveError::InvalidRange);
        }
        let slope_term = self.slope.checked_mul(x).ok_or(CurveError::Overflow)? / SLOPE_SCALE;
        let scaled = self
            .intercept
            .checked_add(slope_term)
            .ok_or(CurveError::Overflow)?;
        Ok(ScaledPrice::new(scaled))
    }

    /// Price of the first token.
    pub fn initial_price(&self) -> ScaledPrice {
        ScaledPrice::new(self.intercept)
    }

    /// Exact cost in lamports of the tokens between two supply points:
    /// the definite integral of `price(x)` over `[from, to]`.
    ///
    /// ```text
    /// cost = (2*S*b*delta + a*delta*(from + to)) / (2*S*P)
    /// ```
    pub fn cost_between(
        &self,
        from: TokenAmount,
        to: TokenAmount,
    ) -> Result<Lamports, CurveError> {
        let from = from.as_u64() as u128;
        let to = to.as_u64() as u128;
        if from > to || to > self.total_supply {
            return Err(CurveError::InvalidRange);
        }
        let delta = to - from;

        let flat = SLOPE_SCALE
            .checked_mul(2)
            .and_then(|v| v.checked_mul(self.intercept))
            .and_then(|v| v.checked_mul(delta))
            .ok_or(CurveError::Overflow)?;
        let ramp = self
            .slope
            .checked_mul(delta)
            .and_then(|v| v.checked_mul(from + to))
            .ok_or(CurveError::Overflow)?;
        let numer = flat.checked_add(ramp).ok_or(CurveError::Overflow)?;
        let lamports = numer / (2 * SLOPE_SCALE * PRICE_SCALE);

        u64::try_from(lamports)
            .map(Lamports::new)
            .map_err(|_| CurveError::Overflow)
    }

    /// Solve for the raw token amount whose integral cost equals
    /// `lamports`, starting at `tokens_sold`.
    ///
    /// For the linear curve this is a quadratic in the token delta; the
    /// non-negative real root is selected via integer square root. The
    /// result is not clamped to the remaining supply; callers decide
    /// whether the purchase fits.
    pub fn tokens_for_lamports(
        &self,
        tokens_sold: TokenAmount,
        lamports: Lamports,
    ) -> Result<TokenAmount, CurveError> {
        let s = tokens_sold.as_u64() as u128;
        if s > self.total_supply {
            return Err(CurveError::InvalidRange);
        }
        let cost = lamports.as_u64() as u128;
        if cost == 0 {
            return Ok(TokenAmount::new(0));
        }

        let delta = if self.slope == 0 {
            // Flat curve: cost = b * delta / P.
            cost.checked_mul(PRICE_SCALE).ok_or(CurveError::Overflow)? / self.intercept
        } else {
            // a*d^2 + 2*(a*s + S*b)*d - 2*S*P*cost = 0
            // d = (sqrt(lin^2 + 2*a*S*P*cost) - lin) / a,  lin = a*s + S*b
            let lin = self
                .slope
                .checked_mul(s)
                .and_then(|v| v.checked_add(SLOPE_SCALE.checked_mul(self.intercept)?))
                .ok_or(CurveError::Overflow)?;
            let paid = self
                .slope
                .checked_mul(cost)
                .and_then(|v| v.checked_mul(2))
                .and_then(|v| v.checked_mul(SLOPE_SCALE))
                .and_then(|v| v.checked_mul(PRICE_SCALE))
                .ok_or(CurveError::Overflow)?;
            let disc = lin
                .checked_mul(lin)
                .and_then(|v| v.checked_add(paid))
                .ok_or(CurveError::Overflow)?;
            (integer_sqrt(disc) - lin) / self.slope
        };

        u64::try_from(delta)
            .map(TokenAmount::new)
            .map_err(|_| CurveError::Overflow)
    }
}

/// Integer square root via Newton's method: floor(sqrt(n)).
fn integer_sqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n / 2 + 1;
    let mut y = (x + n / x) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
