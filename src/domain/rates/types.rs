use anyhow::{Result, anyhow};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Currency pair quoted as BASE/QUOTE (e.g. USD/KRW)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        }
    }

    pub fn usd_krw() -> Self {
        Self::new("USD", "KRW")
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::usd_krw()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let is_code = |c: &str| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic());

        match s.trim().split_once('/') {
            Some((base, quote)) if is_code(base) && is_code(quote) => Ok(Self::new(base, quote)),
            _ => Err(anyhow!(
                "Invalid currency pair: {}. Expected BASE/QUOTE, e.g. USD/KRW",
                s
            )),
        }
    }
}

/// A strictly positive exchange rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(Decimal);

impl Rate {
    /// Returns `None` for zero or negative values.
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Rounds half away from zero to 2 decimal places.
    /// `None` when the rounded value would no longer be positive.
    pub fn round2(&self) -> Option<Self> {
        Self::new(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single observed quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatedRate {
    pub date: NaiveDate,
    pub rate: Rate,
}

/// Date → raw rate mapping as returned by a feed.
///
/// Absence of a date means "no quote that day". Values are kept as received,
/// so non-positive entries may be present; `valid_rates` filters them out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseSeries {
    observations: BTreeMap<NaiveDate, Decimal>,
}

impl SparseSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, value: Decimal) {
        self.observations.insert(date, value);
    }

    pub fn get(&self, date: NaiveDate) -> Option<Decimal> {
        self.observations.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Positive observations, ascending by date.
    pub fn valid_rates(&self) -> impl Iterator<Item = DatedRate> + '_ {
        self.observations.iter().filter_map(|(date, value)| {
            Rate::new(*value).map(|rate| DatedRate { date: *date, rate })
        })
    }
}

impl FromIterator<(NaiveDate, Decimal)> for SparseSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

/// Inclusive calendar-day range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// `days`-long window ending on `today`. A zero length is treated as one day.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.max(1) - 1);
        let start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every calendar day in the window, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// One calendar day of the dense series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    pub rate: Rate,
    pub weekday: Weekday,
}

impl NormalizedPoint {
    pub fn new(date: NaiveDate, rate: Rate) -> Self {
        Self {
            date,
            rate,
            weekday: date.weekday(),
        }
    }

    /// 0 = Sunday .. 6 = Saturday
    pub fn weekday_index(&self) -> u32 {
        self.weekday.num_days_from_sunday()
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday == Weekday::Sun
    }

    /// Axis label, `M/D` without padding.
    pub fn label(&self) -> String {
        format!("{}/{}", self.date.month(), self.date.day())
    }
}

/// Gap-free daily series, ascending by date with at most one point per day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenseSeries {
    points: Vec<NormalizedPoint>,
}

impl DenseSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts by date and keeps the first point for any duplicated day.
    pub fn from_points(mut points: Vec<NormalizedPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub(crate) fn from_sorted(points: Vec<NormalizedPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&NormalizedPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&NormalizedPoint> {
        self.points.last()
    }

    pub fn rates(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.rate.value()).collect()
    }

    pub fn min_rate(&self) -> Option<Rate> {
        self.points.iter().map(|p| p.rate).min()
    }

    pub fn max_rate(&self) -> Option<Rate> {
        self.points.iter().map(|p| p.rate).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_currency_pair_parsing() {
        let pair: CurrencyPair = "usd/krw".parse().unwrap();
        assert_eq!(pair, CurrencyPair::usd_krw());
        assert_eq!(pair.to_string(), "USD/KRW");

        assert!("USDKRW".parse::<CurrencyPair>().is_err());
        assert!("US/KRW".parse::<CurrencyPair>().is_err());
        assert!("USD/K1W".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_rate_rejects_non_positive() {
        assert!(Rate::new(dec!(0)).is_none());
        assert!(Rate::new(dec!(-1.5)).is_none());
        assert_eq!(Rate::new(dec!(1385.2)).unwrap().value(), dec!(1385.2));
    }

    #[test]
    fn test_rate_round2_half_away_from_zero() {
        let rate = Rate::new(dec!(1385.125)).unwrap();
        assert_eq!(rate.round2().unwrap().value(), dec!(1385.13));

        let rate = Rate::new(dec!(1385.124)).unwrap();
        assert_eq!(rate.round2().unwrap().value(), dec!(1385.12));

        // Rounds to zero, so no longer a valid rate
        assert!(Rate::new(dec!(0.004)).unwrap().round2().is_none());
    }

    #[test]
    fn test_trailing_window_is_thirty_days_inclusive() {
        let window = Window::trailing(date(2026, 3, 10), 30);
        assert_eq!(window.start(), date(2026, 2, 9));
        assert_eq!(window.end(), date(2026, 3, 10));
        assert_eq!(window.len_days(), 30);
        assert_eq!(window.days().count(), 30);
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        assert!(Window::new(date(2026, 1, 2), date(2026, 1, 1)).is_none());
        let single = Window::new(date(2026, 1, 1), date(2026, 1, 1)).unwrap();
        assert_eq!(single.len_days(), 1);
        assert_eq!(single.days().collect::<Vec<_>>(), vec![date(2026, 1, 1)]);
    }

    #[test]
    fn test_point_weekday_and_label() {
        // 2026-03-01 is a Sunday
        let point = NormalizedPoint::new(date(2026, 3, 1), Rate::new(dec!(1400)).unwrap());
        assert_eq!(point.weekday_index(), 0);
        assert!(point.is_sunday());
        assert_eq!(point.label(), "3/1");

        let saturday = NormalizedPoint::new(date(2026, 3, 7), Rate::new(dec!(1400)).unwrap());
        assert_eq!(saturday.weekday_index(), 6);
    }

    #[test]
    fn test_sparse_series_valid_rates_skip_non_positive() {
        let sparse: SparseSeries = vec![
            (date(2026, 1, 3), dec!(0)),
            (date(2026, 1, 1), dec!(1300)),
            (date(2026, 1, 2), dec!(-4)),
        ]
        .into_iter()
        .collect();

        let valid: Vec<_> = sparse.valid_rates().collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].date, date(2026, 1, 1));
        assert_eq!(sparse.len(), 3);
    }

    #[test]
    fn test_dense_series_from_points_sorts_and_dedups() {
        let r = |v| Rate::new(v).unwrap();
        let series = DenseSeries::from_points(vec![
            NormalizedPoint::new(date(2026, 1, 2), r(dec!(2))),
            NormalizedPoint::new(date(2026, 1, 1), r(dec!(1))),
            NormalizedPoint::new(date(2026, 1, 2), r(dec!(3))),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().date, date(2026, 1, 1));
        assert_eq!(series.min_rate().unwrap().value(), dec!(1));
        assert_eq!(series.max_rate().unwrap().value(), dec!(2));
    }
}
