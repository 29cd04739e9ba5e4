//! Mock data sources for testing without network calls.
//!
//! Builders seed initial state; `set_*` methods mutate it afterwards so
//! tests can model chain state changing between reads.

use super::{ChainStateReader, DataSourceError, MetadataStore, PriceOracle};
use crate::domain::{Decimal, Lamports, Mint, PoolState, ScaledPrice, TokenAmount};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct ChainState {
    tokens_sold: HashMap<Mint, TokenAmount>,
    pools: HashMap<Mint, PoolState>,
    sol_reserves: HashMap<Mint, Lamports>,
    graduated: HashMap<Mint, bool>,
    failing: bool,
}

/// Mock chain reader returning predefined per-mint state.
#[derive(Debug, Default)]
pub struct MockChainReader {
    state: Mutex<ChainState>,
}

impl MockChainReader {
    /// Create a new mock chain reader with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed tokens sold for a mint.
    pub fn with_tokens_sold(self, mint: Mint, sold: TokenAmount) -> Self {
        self.state.lock().tokens_sold.insert(mint, sold);
        self
    }

    /// Seed pool reserves for a mint. Also records the SOL side as the
    /// mint's reserve balance.
    pub fn with_pool(self, mint: Mint, pool: PoolState) -> Self {
        {
            let mut state = self.state.lock();
            state.sol_reserves.insert(mint.clone(), pool.sol_reserves);
            state.pools.insert(mint, pool);
        }
        self
    }

    /// Seed SOL reserves without a full pool (pre-graduation vault).
    pub fn with_sol_reserves(self, mint: Mint, lamports: Lamports) -> Self {
        self.state.lock().sol_reserves.insert(mint, lamports);
        self
    }

    /// Seed the chain's graduation flag for a mint.
    pub fn with_graduation_flag(self, mint: Mint, graduated: bool) -> Self {
        self.state.lock().graduated.insert(mint, graduated);
        self
    }

    /// Make every read fail with a network error.
    pub fn failing(self) -> Self {
        self.state.lock().failing = true;
        self
    }

    pub fn set_tokens_sold(&self, mint: &Mint, sold: TokenAmount) {
        self.state.lock().tokens_sold.insert(mint.clone(), sold);
    }

    pub fn set_pool(&self, mint: &Mint, pool: PoolState) {
        let mut state = self.state.lock();
        state.sol_reserves.insert(mint.clone(), pool.sol_reserves);
        state.pools.insert(mint.clone(), pool);
    }

    pub fn set_sol_reserves(&self, mint: &Mint, lamports: Lamports) {
        self.state.lock().sol_reserves.insert(mint.clone(), lamports);
    }

    pub fn set_graduation_flag(&self, mint: &Mint, graduated: bool) {
        self.state.lock().graduated.insert(mint.clone(), graduated);
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    fn check_failing(&self) -> Result<(), DataSourceError> {
        if self.state.lock().failing {
            Err(DataSourceError::NetworkError(
                "mock reader configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChainStateReader for MockChainReader {
    async fn get_tokens_sold(&self, mint: &Mint) -> Result<TokenAmount, DataSourceError> {
        self.check_failing()?;
        self.state
            .lock()
            .tokens_sold
            .get(mint)
            .copied()
            .ok_or_else(|| DataSourceError::Other(format!("unknown mint {}", mint)))
    }

    async fn get_pool_reserves(&self, mint: &Mint) -> Result<PoolState, DataSourceError> {
        self.check_failing()?;
        self.state
            .lock()
            .pools
            .get(mint)
            .copied()
            .ok_or_else(|| DataSourceError::Other(format!("no pool for mint {}", mint)))
    }

    async fn get_sol_reserves(&self, mint: &Mint) -> Result<Lamports, DataSourceError> {
        self.check_failing()?;
        self.state
            .lock()
            .sol_reserves
            .get(mint)
            .copied()
            .ok_or_else(|| DataSourceError::Other(format!("no reserves for mint {}", mint)))
    }

    async fn get_graduation_flag(&self, mint: &Mint) -> Result<bool, DataSourceError> {
        self.check_failing()?;
        self.state
            .lock()
            .graduated
            .get(mint)
            .copied()
            .ok_or_else(|| DataSourceError::Other(format!("unknown mint {}", mint)))
    }
}

#[derive(Debug, Default)]
struct OracleState {
    price: Option<Decimal>,
    failing: bool,
}

/// Mock oracle returning a fixed SOL/USD price, or nothing.
#[derive(Debug, Default)]
pub struct MockPriceOracle {
    state: Mutex<OracleState>,
}

impl MockPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, price: Decimal) -> Self {
        self.state.lock().price = Some(price);
        self
    }

    pub fn failing(self) -> Self {
        self.state.lock().failing = true;
        self
    }

    pub fn set_price(&self, price: Option<Decimal>) {
        self.state.lock().price = price;
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }
}

#[async_trait]
impl PriceOracle for MockPriceOracle {
    async fn sol_usd_price(&self) -> Result<Option<Decimal>, DataSourceError> {
        let state = self.state.lock();
        if state.failing {
            return Err(DataSourceError::NetworkError(
                "mock oracle configured to fail".to_string(),
            ));
        }
        Ok(state.price)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    sold_hints: HashMap<Mint, TokenAmount>,
    cached_prices: HashMap<Mint, ScaledPrice>,
    failing: bool,
}

/// Mock metadata store with per-mint hints.
#[derive(Debug, Default)]
pub struct MockMetadataStore {
    state: Mutex<StoreState>,
}

impl MockMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens_sold_hint(self, mint: Mint, sold: TokenAmount) -> Self {
        self.state.lock().sold_hints.insert(mint, sold);
        self
    }

    pub fn with_cached_price(self, mint: Mint, price: ScaledPrice) -> Self {
        self.state.lock().cached_prices.insert(mint, price);
        self
    }

    pub fn failing(self) -> Self {
        self.state.lock().failing = true;
        self
    }

    pub fn set_tokens_sold_hint(&self, mint: &Mint, sold: Option<TokenAmount>) {
        let mut state = self.state.lock();
        match sold {
            Some(v) => state.sold_hints.insert(mint.clone(), v),
            None => state.sold_hints.remove(mint),
        };
    }

    fn check_failing(&self) -> Result<(), DataSourceError> {
        if self.state.lock().failing {
            Err(DataSourceError::NetworkError(
                "mock store configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataStore for MockMetadataStore {
    async fn tokens_sold_hint(&self, mint: &Mint) -> Result<Option<TokenAmount>, DataSourceError> {
        self.check_failing()?;
        Ok(self.state.lock().sold_hints.get(mint).copied())
    }

    async fn cached_price(&self, mint: &Mint) -> Result<Option<ScaledPrice>, DataSourceError> {
        self.check_failing()?;
        Ok(self.state.lock().cached_prices.get(mint).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mint() -> Mint {
        Mint::new("mint1")
    }

    #[tokio::test]
    async fn test_mock_chain_reader_returns_configured_state() {
        let reader = MockChainReader::new()
            .with_tokens_sold(mint(), TokenAmount::new(500))
            .with_graduation_flag(mint(), false);

        assert_eq!(
            reader.get_tokens_sold(&mint()).await.unwrap(),
            TokenAmount::new(500)
        );
        assert!(!reader.get_graduation_flag(&mint()).await.unwrap());
        assert!(reader.get_pool_reserves(&mint()).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_chain_reader_set_after_build() {
        let reader = MockChainReader::new().with_tokens_sold(mint(), TokenAmount::new(500));
        reader.set_tokens_sold(&mint(), TokenAmount::new(750));
        assert_eq!(
            reader.get_tokens_sold(&mint()).await.unwrap(),
            TokenAmount::new(750)
        );
    }

    #[tokio::test]
    async fn test_mock_chain_reader_failing() {
        let reader = MockChainReader::new()
            .with_tokens_sold(mint(), TokenAmount::new(500))
            .failing();
        assert!(reader.get_tokens_sold(&mint()).await.is_err());

        reader.set_failing(false);
        assert!(reader.get_tokens_sold(&mint()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_oracle() {
        let oracle =
            MockPriceOracle::new().with_price(Decimal::from_str_canonical("142.37").unwrap());
        let price = oracle.sol_usd_price().await.unwrap().unwrap();
        assert_eq!(price.to_canonical_string(), "142.37");

        oracle.set_price(None);
        assert!(oracle.sol_usd_price().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_metadata_store() {
        let store = MockMetadataStore::new()
            .with_tokens_sold_hint(mint(), TokenAmount::new(42))
            .with_cached_price(mint(), ScaledPrice::new(20_000));

        assert_eq!(
            store.tokens_sold_hint(&mint()).await.unwrap(),
            Some(TokenAmount::new(42))
        );
        assert_eq!(
            store.cached_price(&mint()).await.unwrap(),
            Some(ScaledPrice::new(20_000))
        );

        store.set_tokens_sold_hint(&mint(), None);
        assert_eq!(store.tokens_sold_hint(&mint()).await.unwrap(), None);
    }
}
