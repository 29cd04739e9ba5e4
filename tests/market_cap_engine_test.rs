//! Market-cap engine tests: the cap identity, TTL caching, bounded history,
//! change percentage, and oracle degradation.

use launchcurve::curve::CurveConfig;
use launchcurve::datasource::{MockChainReader, MockMetadataStore, MockPriceOracle};
use launchcurve::domain::{
    Decimal, Lamports, ManualClock, Mint, PoolState, ScaledPrice, TokenAmount, PRICE_SCALE,
};
use launchcurve::engine::{
    GraduationPolicy, MarketCapEngine, SupplyTracker, DEFAULT_GRADUATION_THRESHOLD,
    HISTORY_CAPACITY,
};
use std::sync::Arc;

const TTL_MS: i64 = 15_000;

fn mint() -> Mint {
    Mint::new("LaunchMint1111111111111111111111111111111111")
}

fn config() -> CurveConfig {
    CurveConfig::linear(TokenAmount::from_whole(1_000_000, 9), 9, 20_000, 60_000)
}

fn flat_config() -> CurveConfig {
    CurveConfig::linear(TokenAmount::from_whole(1_000_000, 9), 9, 20_000, 20_000)
}

struct TestEngine {
    engine: MarketCapEngine,
    chain: Arc<MockChainReader>,
    oracle: Arc<MockPriceOracle>,
    clock: Arc<ManualClock>,
}

fn setup(chain: MockChainReader, oracle: MockPriceOracle, store: MockMetadataStore) -> TestEngine {
    let chain = Arc::new(chain);
    let oracle = Arc::new(oracle);
    let store = Arc::new(store);
    let clock = Arc::new(ManualClock::new(1_000_000));
    let supply = SupplyTracker::new(chain.clone(), store.clone());
    let policy = Arc::new(GraduationPolicy::new(
        chain.clone(),
        DEFAULT_GRADUATION_THRESHOLD,
    ));
    let engine = MarketCapEngine::new(
        chain.clone(),
        supply,
        policy,
        oracle.clone(),
        store,
        clock.clone(),
        TTL_MS,
        Decimal::zero(),
    );
    TestEngine {
        engine,
        chain,
        oracle,
        clock,
    }
}

fn bonding_chain(sold: TokenAmount) -> MockChainReader {
    MockChainReader::new()
        .with_tokens_sold(mint(), sold)
        .with_graduation_flag(mint(), false)
        .with_sol_reserves(mint(), Lamports::new(0))
}

// =============================================================================
// Cap identity
// =============================================================================

#[tokio::test]
async fn test_market_cap_identity() {
    let sold = TokenAmount::from_whole(100_000, 9);
    let t = setup(
        bonding_chain(sold),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    let snapshot = t.engine.market_cap(&mint(), &config()).await;

    // Curve price at 100k sold: 20k + 0.04 * 100k = 24k lamports per token.
    assert_eq!(snapshot.price.lamports_per_token(9), 24_000);
    assert_eq!(snapshot.circulating_supply, sold);

    // marketCap == price * circulatingSupply, exactly.
    assert_eq!(
        snapshot.market_cap,
        snapshot.price.as_u128() * snapshot.circulating_supply.as_u64() as u128 / PRICE_SCALE
    );
    // 24k lamports * 100k tokens = 2.4e9 lamports.
    assert_eq!(snapshot.market_cap, 2_400_000_000);

    // Fully diluted uses total supply: 24k * 1M tokens.
    assert_eq!(snapshot.fully_diluted_market_cap, 24_000_000_000);
    assert!(!snapshot.degraded);
}

#[tokio::test]
async fn test_usd_conversion_uses_oracle() {
    let sold = TokenAmount::from_whole(100_000, 9);
    let t = setup(
        bonding_chain(sold),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    let snapshot = t.engine.market_cap(&mint(), &config()).await;

    // 24k lamports/token = 0.000024 SOL/token; at $100/SOL = $0.0024.
    assert_eq!(snapshot.price_usd.to_canonical_string(), "0.0024");
    // 2.4e9 lamports = 2.4 SOL = $240.
    assert_eq!(snapshot.market_cap_usd.to_canonical_string(), "240");
}

#[tokio::test]
async fn test_graduated_cap_uses_pool_ratio() {
    let chain = MockChainReader::new()
        .with_tokens_sold(mint(), TokenAmount::from_whole(800_000, 9))
        .with_graduation_flag(mint(), true)
        .with_pool(
            mint(),
            PoolState::new(
                Lamports::new(30_000_000_000),
                TokenAmount::from_whole(200_000, 9),
            ),
        );
    let t = setup(
        chain,
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    let snapshot = t.engine.market_cap(&mint(), &config()).await;
    // 30 SOL / 200k tokens = 150k lamports per token.
    assert_eq!(snapshot.price.lamports_per_token(9), 150_000);
    assert_eq!(
        snapshot.market_cap,
        snapshot.price.as_u128() * snapshot.circulating_supply.as_u64() as u128 / PRICE_SCALE
    );
}

// =============================================================================
// TTL caching
// =============================================================================

#[tokio::test]
async fn test_snapshot_cached_for_ttl() {
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    let first = t.engine.market_cap(&mint(), &config()).await;

    // Supply moves on chain, but the cache still serves inside the TTL.
    t.chain
        .set_tokens_sold(&mint(), TokenAmount::from_whole(500_000, 9));
    t.clock.advance_ms(TTL_MS - 1);
    let second = t.engine.market_cap(&mint(), &config()).await;
    assert_eq!(first, second);

    // One more millisecond and the cache expires by time alone.
    t.clock.advance_ms(1);
    let third = t.engine.market_cap(&mint(), &config()).await;
    assert!(third.market_cap > first.market_cap);
}

// =============================================================================
// History and change percentage
// =============================================================================

#[tokio::test]
async fn test_history_is_bounded() {
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    for _ in 0..(HISTORY_CAPACITY + 5) {
        t.engine.market_cap(&mint(), &config()).await;
        t.clock.advance_ms(TTL_MS);
    }

    let points = t.engine.history(&mint(), i64::MAX);
    assert_eq!(points.len(), HISTORY_CAPACITY);
    // Oldest entries were evicted, newest kept.
    assert!(points.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
}

#[tokio::test]
async fn test_history_window_filters_by_timestamp() {
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    for _ in 0..4 {
        t.engine.market_cap(&mint(), &config()).await;
        t.clock.advance_ms(TTL_MS);
    }

    assert_eq!(t.engine.history(&mint(), i64::MAX).len(), 4);
    // Only the snapshots from the trailing two intervals qualify.
    assert_eq!(t.engine.history(&mint(), 2 * TTL_MS).len(), 2);
}

#[tokio::test]
async fn test_change_pct_flat_curve_doubling_supply() {
    // Flat curve keeps price constant, so doubling circulating supply
    // doubles the cap: +100%.
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    t.engine.market_cap(&mint(), &flat_config()).await;
    t.chain
        .set_tokens_sold(&mint(), TokenAmount::from_whole(200_000, 9));
    t.clock.advance_ms(TTL_MS);
    t.engine.market_cap(&mint(), &flat_config()).await;

    let change = t.engine.change_pct(&mint(), i64::MAX);
    assert_eq!(change.to_canonical_string(), "100");
}

#[tokio::test]
async fn test_change_pct_needs_two_points() {
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    assert!(t.engine.change_pct(&mint(), i64::MAX).is_zero());
    t.engine.market_cap(&mint(), &config()).await;
    assert!(t.engine.change_pct(&mint(), i64::MAX).is_zero());
}

// =============================================================================
// Degradation
// =============================================================================

#[tokio::test]
async fn test_oracle_outage_uses_last_good_price_and_flags() {
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        MockMetadataStore::new(),
    );

    let healthy = t.engine.market_cap(&mint(), &config()).await;
    assert!(!healthy.degraded);

    t.oracle.set_failing(true);
    t.clock.advance_ms(TTL_MS);
    let degraded = t.engine.market_cap(&mint(), &config()).await;

    // Same USD conversion from the last good reading, but flagged.
    assert!(degraded.degraded);
    assert_eq!(degraded.price_usd, healthy.price_usd);
    // The SOL-side figures never depended on the oracle.
    assert_eq!(degraded.market_cap, healthy.market_cap);
}

#[tokio::test]
async fn test_oracle_never_seen_falls_back_to_default() {
    let t = setup(
        bonding_chain(TokenAmount::from_whole(100_000, 9)),
        MockPriceOracle::new().failing(),
        MockMetadataStore::new(),
    );

    let snapshot = t.engine.market_cap(&mint(), &config()).await;
    assert!(snapshot.degraded);
    // Fallback configured as zero: USD figures zero, SOL figures intact.
    assert!(snapshot.price_usd.is_zero());
    assert!(snapshot.market_cap > 0);
}

#[tokio::test]
async fn test_graduated_without_pool_uses_cached_price() {
    let chain = MockChainReader::new()
        .with_tokens_sold(mint(), TokenAmount::from_whole(800_000, 9))
        .with_graduation_flag(mint(), true);
    let store = MockMetadataStore::new().with_cached_price(mint(), ScaledPrice::new(150_000));
    let t = setup(
        chain,
        MockPriceOracle::new().with_price(Decimal::from_str_canonical("100").unwrap()),
        store,
    );

    let snapshot = t.engine.market_cap(&mint(), &config()).await;
    assert!(snapshot.degraded);
    assert_eq!(snapshot.price.as_u128(), 150_000);
    assert_eq!(
        snapshot.market_cap,
        snapshot.price.as_u128() * snapshot.circulating_supply.as_u64() as u128 / PRICE_SCALE
    );
}
