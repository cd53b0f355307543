use thiserror::Error;

/// Errors raised while acquiring a rate series from the upstream feed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateError {
    #[error("Rate feed unavailable: {reason}")]
    UpstreamUnavailable { reason: String },

    #[error("Malformed rate feed response: {reason}")]
    MalformedResponse { reason: String },
}

impl RateError {
    /// Rate failures never stop the schedule; the next tick retries.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Errors raised by the analysis collaborator or its preconditions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Analysis unavailable: {reason}")]
    AnalysisUnavailable { reason: String },

    #[error("Insufficient data for analysis: {points} point(s), need at least 2")]
    InsufficientData { points: usize },
}

/// Errors related to notification preference validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("Invalid email address: {email:?}")]
    InvalidEmail { email: String },
}
