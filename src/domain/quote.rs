//! Quote value objects: the request key and the immutable computation result.

use crate::domain::{Lamports, Mint, ScaledPrice, TokenAmount, TradeDirection};
use serde::{Deserialize, Serialize};

/// Logical identity of a quote request. Used as the coalescing key and as
/// the payload for the remote quoting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub mint: Mint,
    pub direction: TradeDirection,
    /// Lamports for a buy, raw token units for a sell.
    pub amount_in: u64,
}

impl QuoteRequest {
    pub fn buy(mint: Mint, sol_in: Lamports) -> Self {
        Self {
            mint,
            direction: TradeDirection::Buy,
            amount_in: sol_in.as_u64(),
        }
    }

    pub fn sell(mint: Mint, tokens_in: TokenAmount) -> Self {
        Self {
            mint,
            direction: TradeDirection::Sell,
            amount_in: tokens_in.as_u64(),
        }
    }
}

/// Which strategy produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Local deterministic calculator.
    Local,
    /// Live off-chain quoting service.
    Remote,
}

/// A pure, immutable trade simulation result. Computing a quote never
/// mutates curve or pool state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub direction: TradeDirection,
    /// Lamports for a buy, raw token units for a sell.
    pub amount_in: u64,
    /// Raw token units for a buy, lamports for a sell.
    pub amount_out: u64,
    pub pre_trade_price: ScaledPrice,
    pub post_trade_price: ScaledPrice,
    /// Signed basis points; sells move the price down and quote negative.
    pub price_impact_bps: i64,
    /// Effective fill price: amount paid over amount received.
    pub avg_price: ScaledPrice,
    pub source: QuoteSource,
    /// True when a fallback data path was used to assemble the inputs.
    pub degraded: bool,
}
