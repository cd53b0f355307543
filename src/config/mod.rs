//! Configuration module for Ratewatch.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Feed, Refresh, Analysis and Preferences.

mod analysis_config;
mod feed_config;
mod refresh_config;

pub use analysis_config::AnalysisEnvConfig;
pub use feed_config::FeedEnvConfig;
pub use refresh_config::{MAX_WINDOW_DAYS, RefreshEnvConfig};

use crate::application::refresh::RefreshConfig;
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Frankfurter feed and Gemini analysis
    Live,
    /// Synthetic feed and offline analysis, no network
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'live' or 'mock'", s),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub feed: FeedEnvConfig,
    pub refresh: RefreshEnvConfig,
    pub analysis: AnalysisEnvConfig,
    /// Overrides the default `~/.ratewatch/notification_settings.json`.
    pub preferences_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            feed: FeedEnvConfig::default(),
            refresh: RefreshEnvConfig::default(),
            analysis: AnalysisEnvConfig::default(),
            preferences_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`; blank values count as unset.
    pub(crate) fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match var("MODE") {
            Some(raw) => raw.parse::<Mode>()?,
            None => Mode::Live,
        };

        Ok(Self {
            mode,
            feed: FeedEnvConfig::from_lookup(&var)?,
            refresh: RefreshEnvConfig::from_lookup(&var)?,
            analysis: AnalysisEnvConfig::from_lookup(&var),
            preferences_path: var("PREFERENCES_PATH").map(PathBuf::from),
        })
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            pair: self.feed.pair.clone(),
            interval: self.refresh.interval,
            window_days: self.refresh.window_days,
            seed_policy: self.refresh.seed_policy,
        }
    }
}
