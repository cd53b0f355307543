use crate::domain::errors::AnalysisError;
use crate::domain::rates::{DenseSeries, NormalizedPoint, Rate};
use std::fmt;

/// Minimum number of points the analysis collaborator is given.
pub const MIN_ANALYSIS_POINTS: usize = 2;

/// Derives the current rate from a normalized series and packages the series
/// for the analysis collaborator. Performs no analysis itself.
pub struct SignalDerivation;

impl SignalDerivation {
    /// Rate of the chronologically last point; `None` for an empty series.
    pub fn current_rate(series: &DenseSeries) -> Option<Rate> {
        series.last().map(|p| p.rate)
    }

    pub fn analysis_input(series: &DenseSeries) -> Result<AnalysisInput, AnalysisError> {
        if series.len() < MIN_ANALYSIS_POINTS {
            return Err(AnalysisError::InsufficientData {
                points: series.len(),
            });
        }

        let current_rate = Self::current_rate(series).ok_or(AnalysisError::InsufficientData {
            points: series.len(),
        })?;

        Ok(AnalysisInput {
            points: series.points().to_vec(),
            current_rate,
        })
    }
}

/// What the analysis collaborator receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisInput {
    pub points: Vec<NormalizedPoint>,
    pub current_rate: Rate,
}

impl AnalysisInput {
    /// Ordered rates, comma separated.
    pub fn rate_list(&self) -> String {
        self.points
            .iter()
            .map(|p| p.rate.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One `M/D: rate` line per point.
    pub fn dated_lines(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{}: {}", p.label(), p.rate))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Score exactly as the collaborator returned it, before any clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAdvantage {
    pub score: f64,
    pub reason: String,
}

/// How attractive buying the base currency is right now, `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvantageScore {
    score: u8,
    reason: String,
}

impl AdvantageScore {
    /// Rounds to the nearest integer and clamps into `[0, 100]`.
    pub fn from_raw(raw: RawAdvantage) -> Result<Self, AnalysisError> {
        if raw.score.is_nan() {
            return Err(AnalysisError::AnalysisUnavailable {
                reason: "collaborator returned a non-numeric score".to_string(),
            });
        }

        let score = raw.score.round().clamp(0.0, 100.0) as u8;
        Ok(Self {
            score,
            reason: raw.reason.trim().to_string(),
        })
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn band(&self) -> AdvantageBand {
        AdvantageBand::from_score(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvantageBand {
    Favorable,
    Moderate,
    Cautious,
    Unfavorable,
}

impl AdvantageBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => Self::Favorable,
            50..=74 => Self::Moderate,
            25..=49 => Self::Cautious,
            _ => Self::Unfavorable,
        }
    }
}

impl fmt::Display for AdvantageBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Favorable => write!(f, "Favorable"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Cautious => write!(f, "Cautious"),
            Self::Unfavorable => write!(f, "Unfavorable"),
        }
    }
}
