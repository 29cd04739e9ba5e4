//! Error taxonomy for the pricing core.
//!
//! Arithmetic and precondition failures are returned as typed results to the
//! caller. Data-source degradation is never an error here; it is surfaced as
//! a flag on the successful result so consumers can indicate staleness
//! without blocking rendering.

use crate::curve::CurveError;
use thiserror::Error;

/// Errors produced while computing a trade quote.
///
/// A failed quote for one mint never affects any other mint; nothing in the
/// pricing core is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// Trade amount was zero or otherwise unusable before any math ran.
    #[error("invalid trade amount")]
    InvalidAmount,
    /// Buy would exceed the curve's remaining supply.
    #[error("buy exceeds remaining curve supply")]
    InsufficientSupply,
    /// Sell exceeds the tokens sold on the curve or the pool reserve.
    #[error("sell exceeds available reserve")]
    InsufficientReserve,
    /// Token is graduated but pool reserves could not be obtained.
    #[error("pool reserves unavailable for graduated token")]
    MissingPoolState,
    /// Curve configuration was rejected at coefficient derivation.
    #[error("invalid curve configuration: {0}")]
    InvalidConfig(String),
    /// Checked fixed-point arithmetic overflowed.
    #[error("quote arithmetic overflow")]
    Overflow,
    /// The selected quote strategy could not serve the request.
    #[error("quote strategy unavailable: {0}")]
    Unavailable(String),
}

impl From<CurveError> for QuoteError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::InvalidConfig(msg) => QuoteError::InvalidConfig(msg.to_string()),
            CurveError::InvalidRange => QuoteError::InvalidAmount,
            CurveError::Overflow => QuoteError::Overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_error_mapping() {
        assert_eq!(
            QuoteError::from(CurveError::Overflow),
            QuoteError::Overflow
        );
        assert_eq!(
            QuoteError::from(CurveError::InvalidRange),
            QuoteError::InvalidAmount
        );
        match QuoteError::from(CurveError::InvalidConfig("slope is negative")) {
            QuoteError::InvalidConfig(msg) => assert_eq!(msg, "slope is negative"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            QuoteError::InvalidAmount.to_string(),
            "invalid trade amount"
        );
        assert_eq!(
            QuoteError::MissingPoolState.to_string(),
            "pool reserves unavailable for graduated token"
        );
    }
}
