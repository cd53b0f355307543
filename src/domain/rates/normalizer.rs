//! Sparse-to-dense series normalization.
//!
//! Feeds quote on business days only. Charting needs one bar per calendar
//! day, so gaps are filled with the last observation carried forward (LOCF).
//! Rounding to 2 decimal places happens when a point is emitted, never on
//! the carried value itself.

use crate::domain::rates::types::{DenseSeries, NormalizedPoint, Rate, SparseSeries, Window};
use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Where the carried value comes from before the first in-window observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Only observations dated on or before the window start may seed the
    /// series. Leading days with nothing to carry are omitted.
    #[default]
    PriorObservation,
    /// Seed from the earliest positive observation anywhere in the payload,
    /// back-filling a leading gap with a later quote. Reproduces the
    /// chart history of the first dashboard release (`SERIES_SEED_POLICY=earliest`).
    EarliestObservation,
}

impl FromStr for SeedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prior" => Ok(SeedPolicy::PriorObservation),
            "earliest" => Ok(SeedPolicy::EarliestObservation),
            _ => Err(anyhow!(
                "Invalid SERIES_SEED_POLICY: {}. Must be 'prior' or 'earliest'",
                s
            )),
        }
    }
}

impl fmt::Display for SeedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedPolicy::PriorObservation => write!(f, "prior"),
            SeedPolicy::EarliestObservation => write!(f, "earliest"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesNormalizer {
    seed_policy: SeedPolicy,
}

impl SeriesNormalizer {
    pub fn new(seed_policy: SeedPolicy) -> Self {
        Self { seed_policy }
    }

    /// Produces one point per calendar day of `window`, ascending.
    ///
    /// Non-positive observations are treated as missing. Days before any
    /// usable observation are skipped rather than emitted with a zero rate.
    pub fn normalize(&self, sparse: &SparseSeries, window: Window) -> DenseSeries {
        let mut last_known = self.seed(sparse, window);
        let mut points = Vec::with_capacity(window.len_days());

        for day in window.days() {
            if let Some(raw) = sparse.get(day) {
                match Rate::new(raw) {
                    Some(rate) => last_known = Some(rate),
                    None => debug!(
                        "SeriesNormalizer: dropping non-positive rate {} on {}",
                        raw, day
                    ),
                }
            }

            let Some(carried) = last_known else {
                continue;
            };

            match carried.round2() {
                Some(rounded) => points.push(NormalizedPoint::new(day, rounded)),
                None => debug!(
                    "SeriesNormalizer: rate {} rounds to zero on {}, skipping day",
                    carried, day
                ),
            }
        }

        DenseSeries::from_sorted(points)
    }

    fn seed(&self, sparse: &SparseSeries, window: Window) -> Option<Rate> {
        match self.seed_policy {
            SeedPolicy::PriorObservation => sparse
                .valid_rates()
                .take_while(|obs| obs.date <= window.start())
                .last()
                .map(|obs| obs.rate),
            SeedPolicy::EarliestObservation => sparse.valid_rates().next().map(|obs| obs.rate),
        }
    }
}
