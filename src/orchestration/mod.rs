//! Request-level orchestration around the pricing core.

pub mod coalesce;
pub mod wiring;

pub use coalesce::QuoteCoalescer;
pub use wiring::PricingStack;
