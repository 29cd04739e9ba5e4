//! HTTP SOL/USD price oracle.

use super::{DataSourceError, PriceOracle};
use crate::domain::Decimal;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Price oracle over a simple-price HTTP endpoint.
///
/// Expects a response of the shape `{"solana": {"usd": 142.37}}`. A single
/// bounded attempt; the caller's cache is the fallback path, so there is no
/// retry loop here.
#[derive(Debug, Clone)]
pub struct HttpPriceOracle {
    client: Client,
    url: String,
}

impl HttpPriceOracle {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            url,
        }
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn sol_usd_price(&self) -> Result<Option<Decimal>, DataSourceError> {
        debug!("Fetching SOL/USD price");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: "Oracle request failed".to_string(),
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;

        Ok(parse_sol_usd(&body))
    }
}

/// Oracle used when no price endpoint is configured. Always reports the
/// feed as unavailable, so USD figures degrade to the configured fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPriceOracle;

#[async_trait]
impl PriceOracle for NullPriceOracle {
    async fn sol_usd_price(&self) -> Result<Option<Decimal>, DataSourceError> {
        Ok(None)
    }
}

fn parse_sol_usd(body: &serde_json::Value) -> Option<Decimal> {
    let raw = body.get("solana")?.get("usd")?.as_f64()?;
    let parsed = Decimal::from_f64(raw);
    if parsed.is_none() {
        warn!("Oracle returned non-finite SOL/USD value");
    }
    parsed
}
