use crate::domain::errors::{AnalysisError, RateError};
use crate::domain::ports::{AdvantageAnalyzer, NarrativeAnalyzer, RateSource};
use crate::domain::rates::{CurrencyPair, SparseSeries};
use crate::domain::signal::{AnalysisInput, RawAdvantage};
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::info;

/// Offline feed producing a stable synthetic business-day series.
///
/// The quote for a date depends only on the date, so repeated cycles agree
/// on history. Weekends are never quoted, and the business day before
/// `start` is included, mirroring how real feeds snap range starts.
#[derive(Debug, Clone)]
pub struct MockRateSource {
    base_rate: f64,
}

impl MockRateSource {
    pub fn new(base_rate: f64) -> Self {
        Self { base_rate }
    }

    fn quote(&self, date: NaiveDate) -> Option<Decimal> {
        let day = f64::from(date.num_days_from_ce());
        let mut rng = StdRng::seed_from_u64(date.num_days_from_ce() as u64);
        let noise: f64 = rng.random_range(-4.0..4.0);
        let value = self.base_rate + (day / 9.0).sin() * 18.0 + noise;
        Decimal::from_f64(value).map(|d| d.round_dp(4))
    }
}

impl Default for MockRateSource {
    fn default() -> Self {
        Self::new(1390.0)
    }
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SparseSeries, RateError> {
        info!("MockRateSource: generating {} rates {}..{}", pair, start, end);

        let mut sparse = SparseSeries::new();

        if !is_business_day(start) {
            let mut day = start;
            while let Some(prev) = day.pred_opt() {
                day = prev;
                if is_business_day(day) {
                    if let Some(value) = self.quote(day) {
                        sparse.insert(day, value);
                    }
                    break;
                }
            }
        }

        let mut day = start;
        while day <= end {
            if is_business_day(day) {
                if let Some(value) = self.quote(day) {
                    sparse.insert(day, value);
                }
            }
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(sparse)
    }
}

/// Offline analysis collaborator.
///
/// Scores by where the current rate sits in the window's range (a lower
/// rate is better for buying the base currency) and summarises the range.
#[derive(Debug, Clone, Default)]
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

fn range(input: &AnalysisInput) -> Option<(Decimal, Decimal)> {
    let min = input.points.iter().map(|p| p.rate.value()).min()?;
    let max = input.points.iter().map(|p| p.rate.value()).max()?;
    Some((min, max))
}

#[async_trait]
impl AdvantageAnalyzer for MockAnalyzer {
    async fn score_advantage(&self, input: &AnalysisInput) -> Result<RawAdvantage, AnalysisError> {
        let (min, max) = range(input).ok_or(AnalysisError::InsufficientData {
            points: input.points.len(),
        })?;
        let current = input.current_rate.value();

        let spread = max - min;
        let score = if spread.is_zero() {
            50.0
        } else {
            ((max - current) / spread * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(50.0)
        };

        Ok(RawAdvantage {
            score,
            reason: format!(
                "Current rate {} within the recent range {} - {}.",
                current, min, max
            ),
        })
    }
}

#[async_trait]
impl NarrativeAnalyzer for MockAnalyzer {
    async fn narrate(&self, input: &AnalysisInput) -> Result<String, AnalysisError> {
        let (min, max) = range(input).ok_or(AnalysisError::InsufficientData {
            points: input.points.len(),
        })?;
        let first = input
            .points
            .first()
            .map(|p| p.rate.value())
            .unwrap_or_default();
        let current = input.current_rate.value();

        let trend = match current.cmp(&first) {
            std::cmp::Ordering::Greater => "rising",
            std::cmp::Ordering::Less => "falling",
            std::cmp::Ordering::Equal => "flat",
        };

        Ok(format!(
            "## Offline summary\n\nOver {} days the rate moved from {} to {} ({}), \
             ranging between {} and {}. No market commentary is available in mock mode.",
            input.points.len(),
            first,
            current,
            trend,
            min,
            max
        ))
    }
}
