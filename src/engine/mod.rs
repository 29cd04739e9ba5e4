//! Deterministic pricing engines and their data-resolution helpers.
//!
//! The quote and market-cap math in this module is synchronous and
//! side-effect-free; only the resolution of external state (supply,
//! reserves, oracle) awaits, and that is isolated behind the datasource
//! traits.

pub mod graduation;
pub mod market_cap;
pub mod quotation;
pub mod supply;

pub use graduation::{GraduationPolicy, DEFAULT_GRADUATION_THRESHOLD};
pub use market_cap::{MarketCapEngine, HISTORY_CAPACITY};
pub use quotation::{LocalQuoteCalculator, QuotationEngine};
pub use supply::{DataOrigin, Resolved, SupplyTracker};

// Strategy seam shared by the local calculator and the remote service.
pub use crate::datasource::QuoteStrategy;
// Assembled pricing inputs consumed by every strategy.
pub use crate::domain::PricingView;
