//! Live off-chain quoting service client.

use super::{DataSourceError, QuoteStrategy};
use crate::curve::CurveConfig;
use crate::domain::{PricingView, Quote, QuoteRequest};
use crate::error::QuoteError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// One of the two interchangeable quote strategies: a hosted service that
/// simulates the trade server-side against its own chain view.
///
/// Quotes are latency-sensitive, so this makes a single bounded attempt;
/// the engine's fallback path is the local calculator, not a retry loop.
#[derive(Debug, Clone)]
pub struct RemoteQuoteService {
    client: Client,
    base_url: String,
}

impl RemoteQuoteService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    async fn post_quote(&self, request: &QuoteRequest) -> Result<Quote, DataSourceError> {
        let url = format!("{}/quote", self.base_url);
        debug!(
            "Requesting remote quote mint={} direction={} amount_in={}",
            request.mint, request.direction, request.amount_in
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: "Quote service request failed".to_string(),
            });
        }

        response
            .json::<Quote>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl QuoteStrategy for RemoteQuoteService {
    async fn quote(
        &self,
        request: &QuoteRequest,
        _view: &PricingView,
        _config: &CurveConfig,
    ) -> Result<Quote, QuoteError> {
        self.post_quote(request)
            .await
            .map_err(|e| QuoteError::Unavailable(e.to_string()))
    }
}
