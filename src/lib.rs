pub mod config;
pub mod curve;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use curve::{CurveConfig, CurveError, CurveKind, LinearCurve};
pub use datasource::{
    ChainStateReader, DataSourceError, HttpPriceOracle, MetadataStore, MockChainReader,
    MockMetadataStore, MockPriceOracle, PriceOracle, QuoteStrategy, RemoteQuoteService,
    RpcChainReader,
};
pub use domain::{
    Clock, CurveState, Decimal, GraduationStatus, Lamports, ManualClock, MarketCapSnapshot, Mint,
    PoolState, PricingView, Quote, QuoteRequest, QuoteSource, ScaledPrice, SystemClock, TimeMs,
    TokenAmount, TradeDirection,
};
pub use engine::{
    GraduationPolicy, LocalQuoteCalculator, MarketCapEngine, QuotationEngine, SupplyTracker,
};
pub use error::QuoteError;
pub use orchestration::PricingStack;
