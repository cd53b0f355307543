use crate::domain::errors::RateError;
use crate::domain::rates::{DenseSeries, Rate, Window};
use crate::domain::signal::SignalDerivation;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RefreshStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Why the last cycle failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub message: String,
    pub retryable: bool,
}

/// Immutable snapshot published to observers on every transition.
///
/// A new snapshot is built for each transition; fields are never updated in
/// place. `series` is shared between snapshots that carry the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshState {
    /// Sequence number of the cycle that committed this snapshot (0 = none yet).
    pub version: u64,
    /// Sequence number of the cycle that produced `series`.
    pub series_version: u64,
    pub series: Arc<DenseSeries>,
    pub current_rate: Option<Rate>,
    pub last_updated: Option<DateTime<Utc>>,
    pub window: Option<Window>,
    pub status: RefreshStatus,
    pub failure: Option<RefreshFailure>,
}

impl RefreshState {
    pub fn idle() -> Self {
        Self {
            version: 0,
            series_version: 0,
            series: Arc::new(DenseSeries::empty()),
            current_rate: None,
            last_updated: None,
            window: None,
            status: RefreshStatus::Idle,
            failure: None,
        }
    }

    pub(crate) fn loading(&self) -> Self {
        Self {
            status: RefreshStatus::Loading,
            failure: None,
            ..self.clone()
        }
    }

    pub(crate) fn ready(
        version: u64,
        series: DenseSeries,
        window: Window,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let current_rate = SignalDerivation::current_rate(&series);
        Self {
            version,
            series_version: version,
            series: Arc::new(series),
            current_rate,
            last_updated: Some(completed_at),
            window: Some(window),
            status: RefreshStatus::Ready,
            failure: None,
        }
    }

    /// Keeps the previous series, current rate and timestamp.
    pub(crate) fn failed(&self, version: u64, error: &RateError) -> Self {
        Self {
            version,
            status: RefreshStatus::Failed,
            failure: Some(RefreshFailure {
                message: error.to_string(),
                retryable: error.is_retryable(),
            }),
            ..self.clone()
        }
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }

    /// A failure with nothing to show yet. Background failures with a
    /// series still on screen are not blocking.
    pub fn is_blocking_failure(&self) -> bool {
        self.status == RefreshStatus::Failed && !self.has_data()
    }
}

impl Default for RefreshState {
    fn default() -> Self {
        Self::idle()
    }
}
