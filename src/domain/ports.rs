use crate::domain::errors::{AnalysisError, RateError};
use crate::domain::preferences::NotificationPreferences;
use crate::domain::rates::{CurrencyPair, SparseSeries};
use crate::domain::signal::{AnalysisInput, RawAdvantage};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Upstream daily rate feed.
///
/// Implementations make a single outbound call per `fetch` and never retry;
/// retry cadence belongs to the refresh scheduler.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SparseSeries, RateError>;
}

/// Bounded "how good is buying now" scoring.
#[async_trait]
pub trait AdvantageAnalyzer: Send + Sync {
    async fn score_advantage(&self, input: &AnalysisInput) -> Result<RawAdvantage, AnalysisError>;
}

/// Free-text commentary on recent movement.
#[async_trait]
pub trait NarrativeAnalyzer: Send + Sync {
    async fn narrate(&self, input: &AnalysisInput) -> Result<String, AnalysisError>;
}

/// Key-value persistence for notification preferences.
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Option<NotificationPreferences>>;
    fn save(&self, preferences: &NotificationPreferences) -> Result<()>;
}
