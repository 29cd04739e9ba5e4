//! Scaled-integer amount types used by all pricing math.
//!
//! All curve and AMM arithmetic runs on unsigned integers: `u64` for raw
//! amounts, `u128` for intermediates. Floating point exists only at the
//! presentation boundary (`as_sol_f64`, `to_sol_per_token`); nothing in the
//! quoting path depends on it.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// Scale factor for [`ScaledPrice`]: lamports per raw token unit, times 10^9.
///
/// For a 9-decimal token this makes a scaled price numerically equal to
/// lamports per whole token.
pub const PRICE_SCALE: u128 = 1_000_000_000;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// An amount of SOL in lamports, the smallest indivisible unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lamports(pub u64);

impl Lamports {
    pub fn new(lamports: u64) -> Self {
        Lamports(lamports)
    }

    /// Whole SOL, truncating to lamports.
    pub fn from_sol(sol: u64) -> Self {
        Lamports(sol * LAMPORTS_PER_SOL)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Display-layer conversion to SOL.
    pub fn as_sol_f64(&self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }
}

impl std::fmt::Display for Lamports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} lamports", self.0)
    }
}

/// An amount of launch tokens in raw base units (whole tokens times
/// 10^decimals).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(pub u64);

impl TokenAmount {
    pub fn new(raw: u64) -> Self {
        TokenAmount(raw)
    }

    /// Whole tokens at the given mint decimals.
    pub fn from_whole(tokens: u64, decimals: u8) -> Self {
        TokenAmount(tokens * 10u64.pow(decimals as u32))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(&self, rhs: TokenAmount) -> TokenAmount {
        TokenAmount(self.0.saturating_sub(rhs.0))
    }

    pub fn checked_add(&self, rhs: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(rhs.0).map(TokenAmount)
    }

    /// Display-layer conversion to whole tokens.
    pub fn as_whole_f64(&self, decimals: u8) -> f64 {
        self.0 as f64 / 10u64.pow(decimals as u32) as f64
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-point price: lamports per raw token unit, scaled by
/// [`PRICE_SCALE`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScaledPrice(pub u128);

impl ScaledPrice {
    pub fn new(scaled: u128) -> Self {
        ScaledPrice(scaled)
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Lamports per whole token, truncating.
    pub fn lamports_per_token(&self, decimals: u8) -> u128 {
        self.0 * 10u128.pow(decimals as u32) / PRICE_SCALE
    }

    /// Exact SOL-per-whole-token value for the presentation layer.
    ///
    /// Uses the lossless Decimal wrapper; the scaled integer is the source
    /// of truth and this conversion is never fed back into pricing math.
    pub fn to_sol_per_token(&self, decimals: u8) -> Decimal {
        // scaled * 10^decimals has at most ~27 digits for any valid curve,
        // which fits both i128 and rust_decimal's 28-digit mantissa.
        let lamports_scaled = self.0 * 10u128.pow(decimals as u32);
        Decimal::from_i128_with_scale(lamports_scaled as i128, 18)
    }

    /// Display-layer conversion to SOL per whole token.
    pub fn as_sol_per_token_f64(&self, decimals: u8) -> f64 {
        self.0 as f64 * 10u64.pow(decimals as u32) as f64
            / (PRICE_SCALE as f64 * LAMPORTS_PER_SOL as f64)
    }
}

impl std::fmt::Display for ScaledPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
