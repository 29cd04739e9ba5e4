//! Supply resolution with a strict source-priority chain.

use crate::datasource::{ChainStateReader, MetadataStore};
use crate::domain::{Mint, TokenAmount};
use std::sync::Arc;
use tracing::warn;

/// Where a resolved value came from. Ordered by preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// Authoritative off-chain ledger record.
    LedgerHint,
    /// Derived from the mint's on-chain circulating supply.
    Chain,
    /// Safe floor after every source failed.
    Floor,
}

/// A value plus the provenance callers use to flag degraded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub origin: DataOrigin,
}

impl<T> Resolved<T> {
    /// True when the tracker fell back to the safe floor; surfaced to the
    /// caller as a degraded-data flag, never as an error.
    pub fn is_degraded(&self) -> bool {
        self.origin == DataOrigin::Floor
    }
}

/// Resolves tokens sold and circulating supply from external state.
///
/// The fallback chain is a strict priority order, not a race: the first
/// satisfied source wins and the rest are skipped. Read failures floor at
/// zero so nothing negative or thrown ever reaches pricing math.
#[derive(Clone)]
pub struct SupplyTracker {
    chain: Arc<dyn ChainStateReader>,
    metadata: Arc<dyn MetadataStore>,
}

impl SupplyTracker {
    pub fn new(chain: Arc<dyn ChainStateReader>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { chain, metadata }
    }

    /// Cumulative raw token units sold for a mint.
    pub async fn tokens_sold(&self, mint: &Mint) -> Resolved<TokenAmount> {
        match self.metadata.tokens_sold_hint(mint).await {
            Ok(Some(sold)) => {
                return Resolved {
                    value: sold,
                    origin: DataOrigin::LedgerHint,
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Metadata hint read failed for mint={}: {}", mint, e);
            }
        }

        match self.chain.get_tokens_sold(mint).await {
            Ok(sold) => Resolved {
                value: sold,
                origin: DataOrigin::Chain,
            },
            Err(e) => {
                warn!("Chain supply read failed for mint={}: {}", mint, e);
                Resolved {
                    value: TokenAmount::new(0),
                    origin: DataOrigin::Floor,
                }
            }
        }
    }

    /// Raw token units still available on the curve, clamped at zero.
    pub async fn tokens_remaining(
        &self,
        mint: &Mint,
        total_supply: TokenAmount,
    ) -> Resolved<TokenAmount> {
        let sold = self.tokens_sold(mint).await;
        Resolved {
            value: total_supply.saturating_sub(sold.value),
            origin: sold.origin,
        }
    }
}

impl std::fmt::Debug for SupplyTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupplyTracker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{MockChainReader, MockMetadataStore};

    fn mint() -> Mint {
        Mint::new("mint1")
    }

    #[tokio::test]
    async fn test_ledger_hint_wins_over_chain() {
        let chain = Arc::new(MockChainReader::new().with_tokens_sold(mint(), TokenAmount::new(900)));
        let store = Arc::new(
            MockMetadataStore::new().with_tokens_sold_hint(mint(), TokenAmount::new(100)),
        );
        let tracker = SupplyTracker::new(chain, store);

        let resolved = tracker.tokens_sold(&mint()).await;
        assert_eq!(resolved.value, TokenAmount::new(100));
        assert_eq!(resolved.origin, DataOrigin::LedgerHint);
        assert!(!resolved.is_degraded());
    }

    #[tokio::test]
    async fn test_chain_fallback_when_hint_absent() {
        let chain = Arc::new(MockChainReader::new().with_tokens_sold(mint(), TokenAmount::new(900)));
        let store = Arc::new(MockMetadataStore::new());
        let tracker = SupplyTracker::new(chain, store);

        let resolved = tracker.tokens_sold(&mint()).await;
        assert_eq!(resolved.value, TokenAmount::new(900));
        assert_eq!(resolved.origin, DataOrigin::Chain);
        assert!(!resolved.is_degraded());
    }

    #[tokio::test]
    async fn test_floor_when_every_source_fails() {
        let chain = Arc::new(MockChainReader::new().failing());
        let store = Arc::new(MockMetadataStore::new().failing());
        let tracker = SupplyTracker::new(chain, store);

        let resolved = tracker.tokens_sold(&mint()).await;
        assert_eq!(resolved.value, TokenAmount::new(0));
        assert_eq!(resolved.origin, DataOrigin::Floor);
        assert!(resolved.is_degraded());
    }

    #[tokio::test]
    async fn test_hint_failure_still_reaches_chain() {
        let chain = Arc::new(MockChainReader::new().with_tokens_sold(mint(), TokenAmount::new(700)));
        let store = Arc::new(MockMetadataStore::new().failing());
        let tracker = SupplyTracker::new(chain, store);

        let resolved = tracker.tokens_sold(&mint()).await;
        assert_eq!(resolved.value, TokenAmount::new(700));
        assert_eq!(resolved.origin, DataOrigin::Chain);
    }

    #[tokio::test]
    async fn test_tokens_remaining_clamps_at_zero() {
        let chain = Arc::new(
            MockChainReader::new().with_tokens_sold(mint(), TokenAmount::new(5_000)),
        );
        let store = Arc::new(MockMetadataStore::new());
        let tracker = SupplyTracker::new(chain, store);

        let remaining = tracker
            .tokens_remaining(&mint(), TokenAmount::new(4_000))
            .await;
        assert_eq!(remaining.value, TokenAmount::new(0));

        let remaining = tracker
            .tokens_remaining(&mint(), TokenAmount::new(6_000))
            .await;
        assert_eq!(remaining.value, TokenAmount::new(1_000));
    }
}
