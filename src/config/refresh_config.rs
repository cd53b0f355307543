//! Refresh cadence and window configuration.

use crate::application::refresh::{DEFAULT_REFRESH_INTERVAL, DEFAULT_WINDOW_DAYS};
use crate::domain::rates::SeedPolicy;
use anyhow::{Context, Result};
use std::time::Duration;

/// Longest trailing window accepted from the environment.
pub const MAX_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone)]
pub struct RefreshEnvConfig {
    pub interval: Duration,
    pub window_days: u32,
    pub seed_policy: SeedPolicy,
}

impl Default for RefreshEnvConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            window_days: DEFAULT_WINDOW_DAYS,
            seed_policy: SeedPolicy::default(),
        }
    }
}

impl RefreshEnvConfig {
    pub(crate) fn from_lookup(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let seed_policy = match var("SERIES_SEED_POLICY") {
            Some(raw) => raw.parse().context("Failed to parse SERIES_SEED_POLICY")?,
            None => defaults.seed_policy,
        };

        Ok(Self {
            interval: var("REFRESH_INTERVAL_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            window_days: var("REFRESH_WINDOW_DAYS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|days| (1..=MAX_WINDOW_DAYS).contains(days))
                .unwrap_or(defaults.window_days),
            seed_policy,
        })
    }
}
