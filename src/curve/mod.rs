//! Pricing curve primitives for the bonding phase and the post-graduation
//! AMM.
//!
//! Everything here is pure integer math over scaled fixed-point values;
//! these functions are safe to call from any thread and never touch I/O.

use crate::domain::TokenAmount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod constant_product;
pub mod linear;

pub use linear::{LinearCurve, SLOPE_SCALE};

/// Curve kinds supported by launch pricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// Linear bonding curve: price grows linearly in tokens sold.
    #[default]
    Linear,
}

/// Immutable per-launch curve parameters.
///
/// The coefficient derivation is driven by explicit target prices: the
/// launch names the price of the first and the last token, and the slope
/// and intercept follow from those and the supply. Created once at launch
/// time, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveConfig {
    /// Total supply in raw base units.
    pub total_supply: TokenAmount,
    /// Mint decimals.
    pub decimals: u8,
    pub kind: CurveKind,
    /// Target price of the first token, lamports per whole token.
    pub initial_price_lamports: u64,
    /// Target price at `x = total_supply`, lamports per whole token.
    pub terminal_price_lamports: u64,
}

impl CurveConfig {
    pub fn linear(
        total_supply: TokenAmount,
        decimals: u8,
        initial_price_lamports: u64,
        terminal_price_lamports: u64,
    ) -> Self {
        Self {
            total_supply,
            decimals,
            kind: CurveKind::Linear,
            initial_price_lamports,
            terminal_price_lamports,
        }
    }
}

/// Error codes for curve construction and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CurveError {
    /// Configuration rejected at construction.
    #[error("invalid curve configuration: {0}")]
    InvalidConfig(&'static str),
    /// Evaluation range outside `[0, total_supply]`.
    #[error("evaluation range outside curve domain")]
    InvalidRange,
    /// Checked arithmetic overflowed.
    #[error("curve arithmetic overflow")]
    Overflow,
}
