//! Domain primitives: Mint, TimeMs, TradeDirection, GraduationStatus.

use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, clamped at zero.
    pub fn since(&self, earlier: TimeMs) -> i64 {
        self.0.saturating_sub(earlier.0).max(0)
    }
}

/// Token mint address (base58 string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mint(pub String);

impl Mint {
    /// Create a Mint from a string.
    pub fn new(addr: impl Into<String>) -> Self {
        Mint(addr.into())
    }

    /// Get the mint address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade direction: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    /// SOL in, tokens out.
    Buy,
    /// Tokens in, SOL out.
    Sell,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

/// Pricing phase of a launch. The transition Bonding -> Graduated is
/// one-way and irreversible; the flag is read once per pricing operation
/// and never inferred from partial reserve data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraduationStatus {
    /// Priced from the bonding curve.
    Bonding,
    /// Priced from pooled AMM reserves.
    Graduated,
}

impl std::fmt::Display for GraduationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraduationStatus::Bonding => write!(f, "bonding"),
            GraduationStatus::Graduated => write!(f, "graduated"),
        }
    }
}
