use crate::application::analysis::AnalysisState;
use crate::application::refresh::{RefreshState, RefreshStatus};
use crate::domain::errors::AnalysisError;
use crate::domain::signal::{AdvantageBand, AdvantageScore};
use chrono::Local;
use rust_decimal::Decimal;

const AXIS_STEP: Decimal = Decimal::TEN;

pub struct RateHeadline {
    pub rate_text: String,
    pub updated_text: Option<String>,
}

pub struct ChartBar {
    pub label: String,
    pub rate: Decimal,
    /// Sundays are drawn in the highlight color.
    pub highlight: bool,
}

pub struct ChartView {
    pub bars: Vec<ChartBar>,
    pub y_min: Decimal,
    pub y_max: Decimal,
}

pub struct AdvantageView {
    pub score: u8,
    pub band: AdvantageBand,
    pub reason: String,
}

/// What the dashboard should show for a given refresh snapshot.
pub struct DashboardView {
    pub show_loading: bool,
    /// Full-page error: the first acquisition failed and nothing is on screen.
    pub blocking_error: Option<String>,
    /// Quiet note for a failed background refresh while old data stays visible.
    pub stale_note: Option<String>,
    pub headline: Option<RateHeadline>,
    pub chart: Option<ChartView>,
    pub no_data: bool,
}

pub struct DashboardViewModel;

impl DashboardViewModel {
    pub fn build(state: &RefreshState) -> DashboardView {
        let show_loading = state.status == RefreshStatus::Loading;
        let blocking = state.is_blocking_failure();

        let blocking_error = blocking.then(|| {
            "Failed to load exchange rate data. Please try again shortly.".to_string()
        });

        let stale_note = match (&state.status, &state.failure) {
            (RefreshStatus::Failed, Some(_)) if !blocking => Some(match state.last_updated {
                Some(at) => format!(
                    "Refresh failed; showing data from {}",
                    at.with_timezone(&Local).format("%H:%M:%S")
                ),
                None => "Refresh failed; showing earlier data".to_string(),
            }),
            _ => None,
        };

        let headline = match state.current_rate {
            Some(rate) if !show_loading && !blocking => Some(RateHeadline {
                rate_text: format_rate(rate.value()),
                updated_text: state
                    .last_updated
                    .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string()),
            }),
            _ => None,
        };

        let chart = if show_loading || blocking {
            None
        } else {
            Self::chart(state)
        };

        let no_data = state.status == RefreshStatus::Ready && !state.has_data();

        DashboardView {
            show_loading,
            blocking_error,
            stale_note,
            headline,
            chart,
            no_data,
        }
    }

    fn chart(state: &RefreshState) -> Option<ChartView> {
        let min = state.series.min_rate()?.value();
        let max = state.series.max_rate()?.value();

        let bars = state
            .series
            .iter()
            .map(|point| ChartBar {
                label: point.label(),
                rate: point.rate.value(),
                highlight: point.is_sunday(),
            })
            .collect();

        Some(ChartView {
            bars,
            y_min: (min / AXIS_STEP).floor() * AXIS_STEP - AXIS_STEP,
            y_max: (max / AXIS_STEP).ceil() * AXIS_STEP + AXIS_STEP,
        })
    }

    /// `None` while there is nothing to show: idle, loading, or too little data.
    pub fn advantage(state: &AnalysisState<AdvantageScore>) -> Option<AdvantageView> {
        state.ready().map(|score| AdvantageView {
            score: score.score(),
            band: score.band(),
            reason: score.reason().to_string(),
        })
    }

    pub fn analysis_error(error: &AnalysisError) -> Option<String> {
        match error {
            AnalysisError::InsufficientData { .. } => None,
            AnalysisError::AnalysisUnavailable { .. } => {
                Some("AI analysis failed. Please try again later.".to_string())
            }
        }
    }
}

/// Thousands separators, fraction digits kept as-is (e.g. `1,385.2`).
pub fn format_rate(value: Decimal) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
