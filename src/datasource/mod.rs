//! Data source abstraction over the chain reader, the SOL/USD oracle, the
//! metadata store, and the remote quoting service.
//!
//! These are the only asynchronous edges of the engine. The pricing core
//! never awaits; it consumes snapshots these traits produce. External reads
//! use a bounded backoff and a single fallback path, never an unbounded
//! retry loop.

use crate::curve::CurveConfig;
use crate::domain::{
    Decimal, Lamports, Mint, PoolState, PricingView, Quote, QuoteRequest, ScaledPrice, TokenAmount,
};
use crate::error::QuoteError;
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod oracle;
pub mod quote_service;
pub mod rpc;

pub use mock::{MockChainReader, MockMetadataStore, MockPriceOracle};
pub use oracle::{HttpPriceOracle, NullPriceOracle};
pub use quote_service::RemoteQuoteService;
pub use rpc::RpcChainReader;

/// Read-only view of live chain state for a launch.
///
/// Implementations must handle retry/backoff and rate limiting; callers
/// treat every returned value as a snapshot that may already be stale.
#[async_trait]
pub trait ChainStateReader: Send + Sync + fmt::Debug {
    /// Cumulative raw token units sold out of the curve.
    async fn get_tokens_sold(&self, mint: &Mint) -> Result<TokenAmount, DataSourceError>;

    /// Current AMM pool reserves, once a pool exists.
    async fn get_pool_reserves(&self, mint: &Mint) -> Result<PoolState, DataSourceError>;

    /// SOL reserves held by the launch, used for threshold-derived
    /// graduation when the flag is unavailable.
    async fn get_sol_reserves(&self, mint: &Mint) -> Result<Lamports, DataSourceError>;

    /// The program's own graduation flag.
    async fn get_graduation_flag(&self, mint: &Mint) -> Result<bool, DataSourceError>;
}

/// SOL/USD price feed. A failed read is an absent value, not an error the
/// snapshot pipeline propagates.
#[async_trait]
pub trait PriceOracle: Send + Sync + fmt::Debug {
    async fn sol_usd_price(&self) -> Result<Option<Decimal>, DataSourceError>;
}

/// Fast-path overrides from the persistent launch metadata store.
///
/// The store itself is an external collaborator; this engine only reads
/// hints from it.
#[async_trait]
pub trait MetadataStore: Send + Sync + fmt::Debug {
    /// Authoritative off-chain ledger value for tokens sold, if recorded.
    async fn tokens_sold_hint(&self, mint: &Mint) -> Result<Option<TokenAmount>, DataSourceError>;

    /// Last price the store cached for this mint, if any.
    async fn cached_price(&self, mint: &Mint) -> Result<Option<ScaledPrice>, DataSourceError>;
}

/// A quote computation strategy. Two implementations conform to the same
/// contract: the live off-chain quoting service and the local deterministic
/// calculator. The engine selects one per request by availability and never
/// mixes them mid-computation.
#[async_trait]
pub trait QuoteStrategy: Send + Sync + fmt::Debug {
    async fn quote(
        &self,
        request: &QuoteRequest,
        view: &PricingView,
        config: &CurveConfig,
    ) -> Result<Quote, QuoteError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded (caller should implement backoff)
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
