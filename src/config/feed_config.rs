//! Rate feed configuration parsing from environment variables.

use crate::domain::rates::CurrencyPair;
use crate::infrastructure::frankfurter::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use std::time::Duration;

/// Upstream rate feed configuration
#[derive(Debug, Clone)]
pub struct FeedEnvConfig {
    pub base_url: String,
    pub pair: CurrencyPair,
    pub timeout: Duration,
}

impl Default for FeedEnvConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pair: CurrencyPair::usd_krw(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FeedEnvConfig {
    pub(crate) fn from_lookup(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let pair = match var("FX_PAIR") {
            Some(raw) => raw.parse().context("Failed to parse FX_PAIR")?,
            None => defaults.pair,
        };

        Ok(Self {
            base_url: var("FX_FEED_BASE_URL").unwrap_or(defaults.base_url),
            pair,
            timeout: var("FX_FEED_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        })
    }
}
