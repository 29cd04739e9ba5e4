//! Constant-product swap math for graduated tokens.
//!
//! After graduation the pool reserves are the pricing source: spot price is
//! the reserve ratio and fills hold `sol_reserves * token_reserves`
//! invariant across the swap. No fee is applied unless a caller supplies
//! one explicitly upstream.

use crate::curve::CurveError;
use crate::domain::{Lamports, PoolState, ScaledPrice, TokenAmount, PRICE_SCALE};

/// Spot price from the reserve ratio, in scaled lamports per raw unit.
pub fn spot_price(pool: &PoolState) -> Result<ScaledPrice, CurveError> {
    let sol = pool.sol_reserves.as_u64() as u128;
    let tokens = pool.token_reserves.as_u64() as u128;
    if tokens == 0 {
        return Err(CurveError::InvalidRange);
    }
    let scaled = sol.checked_mul(PRICE_SCALE).ok_or(CurveError::Overflow)? / tokens;
    Ok(ScaledPrice::new(scaled))
}

/// Tokens received for depositing `sol_in`:
/// `token_reserves - k / (sol_reserves + sol_in)`.
pub fn tokens_out_for_sol(pool: &PoolState, sol_in: Lamports) -> Result<TokenAmount, CurveError> {
    let sol = pool.sol_reserves.as_u64() as u128;
    let tokens = pool.token_reserves.as_u64() as u128;
    if sol == 0 || tokens == 0 {
        return Err(CurveError::InvalidRange);
    }
    let k = sol.checked_mul(tokens).ok_or(CurveError::Overflow)?;
    let new_sol = sol
        .checked_add(sol_in.as_u64() as u128)
        .ok_or(CurveError::Overflow)?;
    // Round the remaining token side up so the pool never pays out more
    // than the invariant allows.
    let new_tokens = k.div_ceil(new_sol);
    let out = tokens - new_tokens;
    u64::try_from(out)
        .map(TokenAmount::new)
        .map_err(|_| CurveError::Overflow)
}

/// Lamports received for depositing `tokens_in`:
/// `sol_reserves - k / (token_reserves + tokens_in)`.
pub fn sol_out_for_tokens(pool: &PoolState, tokens_in: TokenAmount) -> Result<Lamports, CurveError> {
    let sol = pool.sol_reserves.as_u64() as u128;
    let tokens = pool.token_reserves.as_u64() as u128;
    if sol == 0 || tokens == 0 {
        return Err(CurveError::InvalidRange);
    }
    let k = sol.checked_mul(tokens).ok_or(CurveError::Overflow)?;
    let new_tokens = tokens
        .checked_add(tokens_in.as_u64() as u128)
        .ok_or(CurveError::Overflow)?;
    let new_sol = k.div_ceil(new_tokens);
    let out = sol - new_sol;
    u64::try_from(out)
        .map(Lamports::new)
        .map_err(|_| CurveError::Overflow)
}

/// Pool state after a buy, for post-trade price evaluation.
pub fn pool_after_buy(
    pool: &PoolState,
    sol_in: Lamports,
    tokens_out: TokenAmount,
) -> PoolState {
    PoolState::new(
        Lamports::new(pool.sol_reserves.as_u64() + sol_in.as_u64()),
        pool.token_reserves.saturating_sub(tokens_out),
    )
}

/// Pool state after a sell, for post-trade price evaluation.
pub fn pool_after_sell(
    pool: &PoolState,
    tokens_in: TokenAmount,
    sol_out: Lamports,
) -> PoolState {
    PoolState::new(
        Lamports::new(pool.sol_reserves.as_u64().saturating_sub(sol_out.as_u64())),
        TokenAmount::new(pool.token_reserves.as_u64() + tokens_in.as_u64()),
    )
}
