//! JSON-RPC chain state reader for the launch program's indexer.

use super::{ChainStateReader, DataSourceError};
use crate::domain::{Lamports, Mint, PoolState, TokenAmount};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Chain state reader over a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcChainReader {
    client: Client,
    rpc_url: String,
}

impl RpcChainReader {
    /// Create a new reader against the given RPC URL.
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
        }
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, DataSourceError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        let response = retry(backoff, || async {
            let response = self
                .client
                .post(&self.rpc_url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await?;

        if let Some(err) = response.get("error") {
            return Err(DataSourceError::Other(err.to_string()));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| DataSourceError::ParseError("Missing result field".to_string()))
    }
}

#[async_trait]
impl ChainStateReader for RpcChainReader {
    async fn get_tokens_sold(&self, mint: &Mint) -> Result<TokenAmount, DataSourceError> {
        debug!("Fetching tokens sold for mint={}", mint);
        let result = self
            .call("getTokensSold", serde_json::json!([mint.as_str()]))
            .await?;
        parse_amount_field(&result, "amount").map(TokenAmount::new)
    }

    async fn get_pool_reserves(&self, mint: &Mint) -> Result<PoolState, DataSourceError> {
        debug!("Fetching pool reserves for mint={}", mint);
        let result = self
            .call("getPoolReserves", serde_json::json!([mint.as_str()]))
            .await?;
        parse_pool_reserves(&result)
    }

    async fn get_sol_reserves(&self, mint: &Mint) -> Result<Lamports, DataSourceError> {
        debug!("Fetching SOL reserves for mint={}", mint);
        let result = self
            .call("getSolReserves", serde_json::json!([mint.as_str()]))
            .await?;
        parse_amount_field(&result, "lamports").map(Lamports::new)
    }

    async fn get_graduation_flag(&self, mint: &Mint) -> Result<bool, DataSourceError> {
        debug!("Fetching graduation flag for mint={}", mint);
        let result = self
            .call("getGraduationFlag", serde_json::json!([mint.as_str()]))
            .await?;
        result
            .as_bool()
            .ok_or_else(|| DataSourceError::ParseError("Expected boolean result".to_string()))
    }
}

/// Amounts arrive as decimal strings, the convention for u64 token values
/// that exceed the safe JSON integer range.
fn parse_amount_field(value: &serde_json::Value, field: &str) -> Result<u64, DataSourceError> {
    let raw = value
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError(format!("Missing {} field", field)))?;
    raw.parse::<u64>()
        .map_err(|e| DataSourceError::ParseError(format!("Invalid {}: {}", field, e)))
}

fn parse_pool_reserves(value: &serde_json::Value) -> Result<PoolState, DataSourceError> {
    let sol = parse_amount_field(value, "sol")?;
    let token = parse_amount_field(value, "token")?;
    Ok(PoolState::new(Lamports::new(sol), TokenAmount::new(token)))
}
