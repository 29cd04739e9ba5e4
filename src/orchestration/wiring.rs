//! Wires configuration into a ready-to-use pricing stack.

use crate::config::Config;
use crate::datasource::oracle::NullPriceOracle;
use crate::datasource::{
    ChainStateReader, HttpPriceOracle, MetadataStore, PriceOracle, RemoteQuoteService,
    RpcChainReader,
};
use crate::domain::{Clock, SystemClock};
use crate::engine::{GraduationPolicy, MarketCapEngine, QuotationEngine, SupplyTracker};
use std::sync::Arc;

/// The fully assembled engines a consuming service works with.
///
/// The metadata store stays injected: it belongs to the application's
/// persistence layer, and tests substitute mocks for every edge the same
/// way.
pub struct PricingStack {
    pub quotation: QuotationEngine,
    pub market_cap: MarketCapEngine,
    pub policy: Arc<GraduationPolicy>,
    pub supply: SupplyTracker,
}

impl PricingStack {
    pub fn from_config(config: &Config, metadata: Arc<dyn MetadataStore>) -> Self {
        let chain: Arc<dyn ChainStateReader> =
            Arc::new(RpcChainReader::new(config.rpc_url.clone()));
        let oracle: Arc<dyn PriceOracle> = match &config.oracle_url {
            Some(url) => Arc::new(HttpPriceOracle::new(url.clone())),
            None => Arc::new(NullPriceOracle),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let policy = Arc::new(GraduationPolicy::new(
            chain.clone(),
            config.graduation_threshold,
        ));
        let supply = SupplyTracker::new(chain.clone(), metadata.clone());

        let mut quotation = QuotationEngine::new(
            chain.clone(),
            supply.clone(),
            policy.clone(),
            clock.clone(),
            config.quote_cache_ttl_ms,
        );
        if let Some(url) = &config.quote_service_url {
            quotation = quotation.with_remote(Arc::new(RemoteQuoteService::new(url.clone())));
        }

        let market_cap = MarketCapEngine::new(
            chain,
            supply.clone(),
            policy.clone(),
            oracle,
            metadata,
            clock,
            config.market_cap_ttl_ms,
            config.sol_usd_fallback,
        );

        Self {
            quotation,
            market_cap,
            policy,
            supply,
        }
    }
}
