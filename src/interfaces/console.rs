//! Plain-text rendering of the dashboard for terminal use.

use crate::application::analysis::{AnalysisDesk, AnalysisState};
use crate::application::refresh::{RefreshScheduler, RefreshState, RefreshStatus};
use crate::domain::preferences::NotificationPreferences;
use crate::domain::signal::AdvantageScore;
use crate::interfaces::view_models::{ChartView, DashboardViewModel, format_rate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

const BAR_WIDTH: usize = 40;

pub struct ConsoleReporter {
    pair_label: String,
    show_chart: bool,
}

impl ConsoleReporter {
    pub fn new(pair_label: impl Into<String>) -> Self {
        Self {
            pair_label: pair_label.into(),
            show_chart: true,
        }
    }

    pub fn without_chart(mut self) -> Self {
        self.show_chart = false;
        self
    }

    /// Runs `scheduler` and hands every rendered state and advantage score to
    /// `emit` until `shutdown` resolves. With `once`, returns after the first
    /// completed refresh and its score.
    ///
    /// Scoring runs on spawned tasks, so a slow analyzer holds back neither
    /// the rate display nor shutdown. Unfinished scoring is aborted on return.
    pub async fn watch<S, E>(
        &self,
        scheduler: &RefreshScheduler,
        analysis: Arc<AnalysisDesk>,
        once: bool,
        shutdown: S,
        mut emit: E,
    ) where
        S: Future<Output = ()>,
        E: FnMut(String),
    {
        let (tx, mut states) = mpsc::unbounded_channel::<Arc<RefreshState>>();
        let handle = scheduler.start(move |state| {
            let _ = tx.send(state);
        });
        let mut scoring = JoinSet::new();
        let mut completed = false;
        tokio::pin!(shutdown);

        loop {
            if once && completed && scoring.is_empty() {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("ConsoleReporter: shutdown requested");
                    break;
                }
                Some(state) = states.recv() => {
                    emit(self.render_state(&state));
                    if state.status != RefreshStatus::Loading {
                        completed = true;
                    }
                    let desk = analysis.clone();
                    scoring.spawn(async move { desk.on_series(&state).await });
                }
                Some(joined) = scoring.join_next() => match joined {
                    Ok(Some(advantage)) => emit(self.render_advantage(&advantage)),
                    Ok(None) => {}
                    Err(e) => warn!("ConsoleReporter: scoring task failed: {}", e),
                },
            }
        }

        handle.stop();
    }

    pub fn render_state(&self, state: &RefreshState) -> String {
        let view = DashboardViewModel::build(state);
        let mut out = String::new();

        if view.show_loading {
            out.push_str("Loading exchange rate data...\n");
            return out;
        }
        if let Some(error) = &view.blocking_error {
            out.push_str(error);
            out.push('\n');
            return out;
        }
        if view.no_data {
            out.push_str("No exchange rate data for this period.\n");
            return out;
        }

        if let Some(headline) = &view.headline {
            out.push_str(&format!("{}  {}", self.pair_label, headline.rate_text));
            if let Some(updated) = &headline.updated_text {
                out.push_str(&format!("  (updated {})", updated));
            }
            out.push('\n');
        }
        if let Some(note) = &view.stale_note {
            out.push_str(&format!("  {}\n", note));
        }
        if let (true, Some(chart)) = (self.show_chart, &view.chart) {
            out.push_str(&render_chart(chart));
        }
        out
    }

    pub fn render_advantage(&self, state: &AnalysisState<AdvantageScore>) -> String {
        match state {
            AnalysisState::Idle => String::new(),
            AnalysisState::Loading => "Analyzing...\n".to_string(),
            AnalysisState::Ready(_) => match DashboardViewModel::advantage(state) {
                Some(view) => format!(
                    "Exchange advantage: {}% ({})\n  {}\n",
                    view.score, view.band, view.reason
                ),
                None => String::new(),
            },
            AnalysisState::Failed(e) => DashboardViewModel::analysis_error(e)
                .map(|msg| format!("{}\n", msg))
                .unwrap_or_default(),
        }
    }

    pub fn render_narrative(&self, state: &AnalysisState<String>) -> String {
        match state {
            AnalysisState::Idle => String::new(),
            AnalysisState::Loading => "Generating analysis...\n".to_string(),
            AnalysisState::Ready(text) => format!("{}\n", text),
            AnalysisState::Failed(e) => DashboardViewModel::analysis_error(e)
                .map(|msg| format!("{}\n", msg))
                .unwrap_or_else(|| "Not enough data to analyze yet.\n".to_string()),
        }
    }

    pub fn render_preferences(&self, prefs: &NotificationPreferences) -> String {
        let email = if prefs.email.is_empty() {
            "(not set)"
        } else {
            prefs.email.as_str()
        };
        let on_off = |flag: bool| if flag { "on" } else { "off" };
        format!(
            "Email: {}\n09:00 summary: {}\n18:00 summary: {}\n",
            email,
            on_off(prefs.notify_at_9am),
            on_off(prefs.notify_at_6pm)
        )
    }
}

fn render_chart(chart: &ChartView) -> String {
    let span = chart.y_max - chart.y_min;
    let mut out = String::new();
    for bar in &chart.bars {
        let filled = if span > Decimal::ZERO {
            ((bar.rate - chart.y_min) / span * Decimal::from(BAR_WIDTH))
                .round()
                .to_usize()
                .unwrap_or(0)
                .min(BAR_WIDTH)
        } else {
            0
        };
        let glyph = if bar.highlight { '▒' } else { '█' };
        out.push_str(&format!(
            "{:>5} {:<width$} {}\n",
            bar.label,
            glyph.to_string().repeat(filled),
            format_rate(bar.rate),
            width = BAR_WIDTH
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{AnalysisError, RateError};
    use crate::domain::rates::{SeriesNormalizer, SparseSeries, Window};
    use crate::domain::signal::RawAdvantage;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn ready_state() -> RefreshState {
        let d = |n| NaiveDate::from_ymd_opt(2026, 3, n).unwrap();
        let sparse: SparseSeries = vec![(d(2), dec!(1380)), (d(4), dec!(1395.5))]
            .into_iter()
            .collect();
        let window = Window::new(d(2), d(5)).unwrap();
        let series = SeriesNormalizer::default().normalize(&sparse, window);
        RefreshState::ready(1, series, window, Utc::now())
    }

    #[test]
    fn test_render_ready_state() {
        let text = ConsoleReporter::new("USD/KRW").render_state(&ready_state());
        assert!(text.starts_with("USD/KRW  1,395.5"));
        assert!(text.contains("  3/2 "));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_render_without_chart() {
        let text = ConsoleReporter::new("USD/KRW")
            .without_chart()
            .render_state(&ready_state());
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_render_blocking_failure() {
        let failed = RefreshState::idle().failed(
            1,
            &RateError::MalformedResponse {
                reason: "no rates".to_string(),
            },
        );
        let text = ConsoleReporter::new("USD/KRW").render_state(&failed);
        assert!(text.starts_with("Failed to load"));
    }

    #[test]
    fn test_render_advantage_states() {
        let reporter = ConsoleReporter::new("USD/KRW");
        let score = AdvantageScore::from_raw(RawAdvantage {
            score: 40.0,
            reason: "Near the monthly high".to_string(),
        })
        .unwrap();
        let text = reporter.render_advantage(&AnalysisState::Ready(score));
        assert!(text.contains("40% (Cautious)"));

        let insufficient = AnalysisState::Failed(AnalysisError::InsufficientData { points: 1 });
        assert!(reporter.render_advantage(&insufficient).is_empty());
        assert!(reporter.render_advantage(&AnalysisState::Idle).is_empty());
    }

    #[test]
    fn test_render_preferences() {
        let prefs = NotificationPreferences {
            email: String::new(),
            notify_at_9am: true,
            notify_at_6pm: false,
        };
        let text = ConsoleReporter::new("USD/KRW").render_preferences(&prefs);
        assert!(text.contains("(not set)"));
        assert!(text.contains("09:00 summary: on"));
        assert!(text.contains("18:00 summary: off"));
    }
}
