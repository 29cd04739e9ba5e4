//! Domain types and fixed-point layer for the launch pricing engine.
//!
//! This module provides:
//! - Scaled-integer amount types: Lamports, TokenAmount, ScaledPrice
//! - Domain primitives: Mint, TimeMs, TradeDirection, GraduationStatus
//! - Quote and MarketCapSnapshot value objects with camelCase serialization
//! - A Decimal wrapper for USD money math at the presentation boundary

pub mod amounts;
pub mod clock;
pub mod decimal;
pub mod primitives;
pub mod quote;
pub mod snapshot;

pub use amounts::{Lamports, ScaledPrice, TokenAmount, PRICE_SCALE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decimal::Decimal;
pub use primitives::{GraduationStatus, Mint, TimeMs, TradeDirection};
pub use quote::{Quote, QuoteRequest, QuoteSource};
pub use snapshot::{CurveState, MarketCapSnapshot, PoolState, PricingView};
