//! Frankfurter (ECB reference rates) daily feed.
//!
//! `GET {base}/{start}..{end}?from=USD&to=KRW` answers with
//! `{"base":"USD","rates":{"2026-03-02":{"KRW":1452.3}, ...}}`. Only business
//! days are quoted, and the range may begin on the business day before
//! `start` when `start` falls on a weekend or holiday.

use crate::domain::errors::RateError;
use crate::domain::ports::RateSource;
use crate::domain::rates::{CurrencyPair, SparseSeries};
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    base: Option<String>,
    rates: BTreeMap<String, HashMap<String, serde_json::Number>>,
}

pub struct FrankfurterRateSource {
    client: Client,
    base_url: Url,
}

impl FrankfurterRateSource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid FX feed base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("FX feed base URL cannot carry a path: {}", base_url);
        }

        Ok(Self {
            client: HttpClientFactory::create_client(timeout),
            base_url,
        })
    }

    fn range_url(&self, start: NaiveDate, end: NaiveDate) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{}..{}", start, end));
        }
        url
    }
}

#[async_trait]
impl RateSource for FrankfurterRateSource {
    async fn fetch(
        &self,
        pair: &CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SparseSeries, RateError> {
        let url = self.range_url(start, end);
        info!("Fetching {} rates {}..{} from Frankfurter", pair, start, end);

        let response = self
            .client
            .get(url)
            .query(&[("from", pair.base.as_str()), ("to", pair.quote.as_str())])
            .send()
            .await
            .map_err(|e| RateError::UpstreamUnavailable {
                reason: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(RateError::UpstreamUnavailable {
                reason: format!("Frankfurter returned status {}", response.status()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RateError::UpstreamUnavailable {
                reason: format!("failed to read response body: {}", e),
            })?;

        let sparse = parse_rates(&body, pair)?;
        debug!(
            "Frankfurter: {} quoted days for {} in {}..{}",
            sparse.len(),
            pair,
            start,
            end
        );
        Ok(sparse)
    }
}

/// Parses a range response into a date → rate mapping for `pair.quote`.
///
/// Dates without a quote for the requested currency are skipped.
pub fn parse_rates(body: &str, pair: &CurrencyPair) -> Result<SparseSeries, RateError> {
    let payload: FrankfurterResponse =
        serde_json::from_str(body).map_err(|e| RateError::MalformedResponse {
            reason: format!("unexpected payload shape: {}", e),
        })?;

    if let Some(base) = payload.base.as_deref() {
        if !base.eq_ignore_ascii_case(&pair.base) {
            return Err(RateError::MalformedResponse {
                reason: format!("expected base {}, got {}", pair.base, base),
            });
        }
    }

    let mut sparse = SparseSeries::new();
    for (day, quotes) in payload.rates {
        let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|_| {
            RateError::MalformedResponse {
                reason: format!("invalid date key {:?}", day),
            }
        })?;

        let Some(number) = quotes.get(&pair.quote) else {
            debug!("Frankfurter: no {} quote on {}", pair.quote, date);
            continue;
        };

        sparse.insert(date, parse_decimal(number)?);
    }

    Ok(sparse)
}

fn parse_decimal(number: &serde_json::Number) -> Result<Decimal, RateError> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| RateError::MalformedResponse {
            reason: format!("rate {} is not a decimal number", text),
        })
}
