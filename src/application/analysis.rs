//! Consumer-side state for the two analysis calls.
//!
//! The advantage score is requested once per committed series; a failure
//! stays visible until the next series arrives. The narrative is only ever
//! requested by the user. Neither call touches the refresh state.

use crate::application::refresh::RefreshState;
use crate::domain::errors::AnalysisError;
use crate::domain::ports::{AdvantageAnalyzer, NarrativeAnalyzer};
use crate::domain::signal::{AdvantageScore, SignalDerivation};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(AnalysisError),
}

impl<T> AnalysisState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            AnalysisState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

struct AdvantageSlot {
    series_version: u64,
    state: AnalysisState<AdvantageScore>,
}

pub struct AnalysisDesk {
    advantage_analyzer: Option<Arc<dyn AdvantageAnalyzer>>,
    narrative_analyzer: Option<Arc<dyn NarrativeAnalyzer>>,
    advantage: RwLock<AdvantageSlot>,
    narrative: RwLock<AnalysisState<String>>,
}

impl AnalysisDesk {
    pub fn new(
        advantage_analyzer: Option<Arc<dyn AdvantageAnalyzer>>,
        narrative_analyzer: Option<Arc<dyn NarrativeAnalyzer>>,
    ) -> Self {
        Self {
            advantage_analyzer,
            narrative_analyzer,
            advantage: RwLock::new(AdvantageSlot {
                series_version: 0,
                state: AnalysisState::Idle,
            }),
            narrative: RwLock::new(AnalysisState::Idle),
        }
    }

    /// Desk with no collaborator; every request reports `AnalysisUnavailable`.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub async fn advantage_state(&self) -> AnalysisState<AdvantageScore> {
        self.advantage.read().await.state.clone()
    }

    pub async fn narrative_state(&self) -> AnalysisState<String> {
        self.narrative.read().await.clone()
    }

    /// Scores the series carried by `state` if it has not been scored yet.
    ///
    /// Returns `None` when nothing was requested (no series, or this series
    /// version was already handled, successfully or not).
    pub async fn on_series(&self, state: &RefreshState) -> Option<AnalysisState<AdvantageScore>> {
        let version = state.series_version;
        {
            let mut slot = self.advantage.write().await;
            if version == 0 || version <= slot.series_version {
                return None;
            }
            slot.series_version = version;
            slot.state = AnalysisState::Loading;
        }

        let outcome = self.score(state).await;
        let next = match outcome {
            Ok(score) => {
                info!(
                    "AnalysisDesk: advantage {}% ({}) for series #{}",
                    score.score(),
                    score.band(),
                    version
                );
                AnalysisState::Ready(score)
            }
            Err(e) => {
                warn!("AnalysisDesk: advantage scoring failed for series #{}: {}", version, e);
                AnalysisState::Failed(e)
            }
        };

        let mut slot = self.advantage.write().await;
        if slot.series_version != version {
            // A newer series took over while this call was in flight
            return None;
        }
        slot.state = next.clone();
        Some(next)
    }

    async fn score(&self, state: &RefreshState) -> Result<AdvantageScore, AnalysisError> {
        let analyzer = self
            .advantage_analyzer
            .as_ref()
            .ok_or_else(not_configured)?;
        let input = SignalDerivation::analysis_input(&state.series)?;
        let raw = analyzer.score_advantage(&input).await?;
        AdvantageScore::from_raw(raw)
    }

    /// User-triggered narrative. A request while one is already running
    /// returns the current `Loading` state without issuing another call.
    pub async fn request_narrative(&self, state: &RefreshState) -> AnalysisState<String> {
        {
            let mut narrative = self.narrative.write().await;
            if narrative.is_loading() {
                return AnalysisState::Loading;
            }
            *narrative = AnalysisState::Loading;
        }

        let next = match self.narrate(state).await {
            Ok(text) => {
                info!("AnalysisDesk: narrative ready ({} chars)", text.len());
                AnalysisState::Ready(text)
            }
            Err(e) => {
                warn!("AnalysisDesk: narrative failed: {}", e);
                AnalysisState::Failed(e)
            }
        };

        *self.narrative.write().await = next.clone();
        next
    }

    async fn narrate(&self, state: &RefreshState) -> Result<String, AnalysisError> {
        let analyzer = self
            .narrative_analyzer
            .as_ref()
            .ok_or_else(not_configured)?;
        let input = SignalDerivation::analysis_input(&state.series)?;
        let text = analyzer.narrate(&input).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(AnalysisError::AnalysisUnavailable {
                reason: "collaborator returned an empty narrative".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

fn not_configured() -> AnalysisError {
    AnalysisError::AnalysisUnavailable {
        reason: "analysis is not configured".to_string(),
    }
}
