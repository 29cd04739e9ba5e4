//! Graduation exclusivity tests: the flag flips exactly at the threshold,
//! transitions one way, and switches the pricing source atomically.

use launchcurve::curve::CurveConfig;
use launchcurve::datasource::{MockChainReader, MockMetadataStore};
use launchcurve::domain::{GraduationStatus, Lamports, ManualClock, Mint, PoolState, TokenAmount};
use launchcurve::engine::{
    GraduationPolicy, QuotationEngine, SupplyTracker, DEFAULT_GRADUATION_THRESHOLD,
};
use std::sync::Arc;

fn mint() -> Mint {
    Mint::new("LaunchMint1111111111111111111111111111111111")
}

fn config() -> CurveConfig {
    CurveConfig::linear(TokenAmount::from_whole(1_000_000, 9), 9, 20_000, 60_000)
}

fn policy_with_reserves(lamports: u64) -> (GraduationPolicy, Arc<MockChainReader>) {
    let chain = Arc::new(
        MockChainReader::new()
            .with_graduation_flag(mint(), false)
            .with_sol_reserves(mint(), Lamports::new(lamports)),
    );
    (
        GraduationPolicy::new(chain.clone(), DEFAULT_GRADUATION_THRESHOLD),
        chain,
    )
}

#[tokio::test]
async fn test_just_below_threshold_is_bonding() {
    // 29.99 SOL of reserves.
    let (policy, _) = policy_with_reserves(29_990_000_000);
    assert_eq!(policy.status(&mint()).await, GraduationStatus::Bonding);
}

#[tokio::test]
async fn test_just_above_threshold_is_graduated() {
    // 30.01 SOL of reserves.
    let (policy, _) = policy_with_reserves(30_010_000_000);
    assert_eq!(policy.status(&mint()).await, GraduationStatus::Graduated);
}

#[tokio::test]
async fn test_threshold_boundary_by_single_lamport() {
    let threshold = DEFAULT_GRADUATION_THRESHOLD.as_u64();
    let (policy, _) = policy_with_reserves(threshold - 1);
    assert_eq!(policy.status(&mint()).await, GraduationStatus::Bonding);

    let (policy, _) = policy_with_reserves(threshold + 1);
    assert_eq!(policy.status(&mint()).await, GraduationStatus::Graduated);
}

#[tokio::test]
async fn test_transition_is_irreversible() {
    let (policy, chain) = policy_with_reserves(30_010_000_000);
    assert_eq!(policy.status(&mint()).await, GraduationStatus::Graduated);

    // Reserves dropping back below the threshold (e.g. pool withdrawals
    // seen through a lagging indexer) never un-graduates the mint.
    chain.set_sol_reserves(&mint(), Lamports::new(1_000_000));
    assert_eq!(policy.status(&mint()).await, GraduationStatus::Graduated);
}

#[tokio::test]
async fn test_pricing_switches_with_the_flag_and_never_blends() {
    // Reserves cross the threshold between two quotes for the same mint;
    // each quote is priced wholly by one source.
    let sold = TokenAmount::from_whole(800_000, 9);
    let chain = Arc::new(
        MockChainReader::new()
            .with_tokens_sold(mint(), sold)
            .with_graduation_flag(mint(), false)
            .with_sol_reserves(mint(), Lamports::new(29_990_000_000)),
    );
    let clock = Arc::new(ManualClock::new(0));
    let supply = SupplyTracker::new(chain.clone(), Arc::new(MockMetadataStore::new()));
    let policy = Arc::new(GraduationPolicy::new(
        chain.clone(),
        DEFAULT_GRADUATION_THRESHOLD,
    ));
    let engine = QuotationEngine::new(chain.clone(), supply, policy, clock.clone(), 10_000);

    let bonding_quote = engine
        .buy_quote(&mint(), Lamports::new(1_000_000_000), &config())
        .await
        .unwrap();
    // Curve price at 800k tokens sold: 20k + 0.04 * 800k = 52k lamports.
    assert_eq!(bonding_quote.pre_trade_price.lamports_per_token(9), 52_000);

    // Graduation lands: reserves over threshold and a live pool.
    chain.set_graduation_flag(&mint(), true);
    chain.set_pool(
        &mint(),
        PoolState::new(
            Lamports::new(30_010_000_000),
            TokenAmount::from_whole(200_000, 9),
        ),
    );
    clock.advance_ms(10_000);

    let graduated_quote = engine
        .buy_quote(&mint(), Lamports::new(1_000_000_000), &config())
        .await
        .unwrap();
    // Pool ratio: 30.01 SOL / 200k tokens = 150_050 lamports per token.
    assert_eq!(
        graduated_quote.pre_trade_price.lamports_per_token(9),
        150_050
    );
}
