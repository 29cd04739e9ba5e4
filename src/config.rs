use crate::domain::{Decimal, Lamports};
use crate::engine::DEFAULT_GRADUATION_THRESHOLD;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub oracle_url: Option<String>,
    pub quote_service_url: Option<String>,
    pub graduation_threshold: Lamports,
    pub market_cap_ttl_ms: i64,
    pub quote_cache_ttl_ms: i64,
    pub sol_usd_fallback: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let rpc_url = env_map
            .get("RPC_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("RPC_URL".to_string()))?;

        let oracle_url = env_map.get("ORACLE_URL").cloned();
        let quote_service_url = env_map.get("QUOTE_SERVICE_URL").cloned();

        let graduation_threshold = match env_map.get("GRADUATION_THRESHOLD_LAMPORTS") {
            Some(raw) => raw.parse::<u64>().map(Lamports::new).map_err(|_| {
                ConfigError::InvalidValue(
                    "GRADUATION_THRESHOLD_LAMPORTS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?,
            None => DEFAULT_GRADUATION_THRESHOLD,
        };

        let market_cap_ttl_ms = env_map
            .get("MARKET_CAP_TTL_MS")
            .map(|s| s.as_str())
            .unwrap_or("15000")
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "MARKET_CAP_TTL_MS".to_string(),
                    "must be a valid i64".to_string(),
                )
            })?;

        let quote_cache_ttl_ms = env_map
            .get("QUOTE_CACHE_TTL_MS")
            .map(|s| s.as_str())
            .unwrap_or("10000")
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "QUOTE_CACHE_TTL_MS".to_string(),
                    "must be a valid i64".to_string(),
                )
            })?;

        let sol_usd_fallback = Decimal::from_str_canonical(
            env_map
                .get("SOL_USD_FALLBACK")
                .map(|s| s.as_str())
                .unwrap_or("0"),
        )
        .map_err(|_| {
            ConfigError::InvalidValue(
                "SOL_USD_FALLBACK".to_string(),
                "must be a valid decimal".to_string(),
            )
        })?;

        Ok(Config {
            rpc_url,
            oracle_url,
            quote_service_url,
            graduation_threshold,
            market_cap_ttl_ms,
            quote_cache_ttl_ms,
            sol_usd_fallback,
        })
    }
}
