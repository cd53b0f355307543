use async_trait::async_trait;
use chrono::NaiveDate;
use ratewatch::application::analysis::AnalysisDesk;
use ratewatch::application::refresh::{RefreshConfig, RefreshScheduler};
use ratewatch::domain::errors::{AnalysisError, RateError};
use ratewatch::domain::ports::{AdvantageAnalyzer, NarrativeAnalyzer, RateSource};
use ratewatch::domain::rates::{CurrencyPair, SparseSeries};
use ratewatch::domain::signal::{AnalysisInput, RawAdvantage};
use ratewatch::interfaces::console::ConsoleReporter;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, d).unwrap()
}

struct FixedRateSource;

#[async_trait]
impl RateSource for FixedRateSource {
    async fn fetch(
        &self,
        _pair: &CurrencyPair,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<SparseSeries, RateError> {
        Ok(vec![(day(2, 27), dec!(1390)), (day(3, 16), dec!(1402.5))]
            .into_iter()
            .collect())
    }
}

// Scores immediately, or never when built with `stalled`.
struct SlowAnalyzer {
    stalled: bool,
    calls: AtomicUsize,
}

impl SlowAnalyzer {
    fn immediate() -> Arc<Self> {
        Arc::new(Self {
            stalled: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn stalled() -> Arc<Self> {
        Arc::new(Self {
            stalled: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AdvantageAnalyzer for SlowAnalyzer {
    async fn score_advantage(&self, _input: &AnalysisInput) -> Result<RawAdvantage, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled {
            std::future::pending::<()>().await;
        }
        Ok(RawAdvantage {
            score: 70.0,
            reason: "Below the monthly average".to_string(),
        })
    }
}

#[async_trait]
impl NarrativeAnalyzer for SlowAnalyzer {
    async fn narrate(&self, _input: &AnalysisInput) -> Result<String, AnalysisError> {
        Ok("Flat.".to_string())
    }
}

fn scheduler(interval: Duration) -> RefreshScheduler {
    let config = RefreshConfig {
        interval,
        ..RefreshConfig::default()
    };
    RefreshScheduler::new(Arc::new(FixedRateSource), config).with_today(|| day(3, 31))
}

fn desk(analyzer: &Arc<SlowAnalyzer>) -> Arc<AnalysisDesk> {
    Arc::new(AnalysisDesk::new(
        Some(analyzer.clone() as Arc<dyn AdvantageAnalyzer>),
        Some(analyzer.clone() as Arc<dyn NarrativeAnalyzer>),
    ))
}

#[tokio::test]
async fn test_stalled_scoring_blocks_neither_display_nor_shutdown() {
    let analyzer = SlowAnalyzer::stalled();
    let scheduler = scheduler(Duration::from_millis(30));
    let reporter = ConsoleReporter::new("USD/KRW").without_chart();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let session = reporter.watch(
        &scheduler,
        desk(&analyzer),
        false,
        async {
            let _ = stop_rx.await;
        },
        move |text| {
            let _ = out_tx.send(text);
        },
    );

    let driver = async {
        let mut headlines = 0;
        while headlines < 3 {
            let text = out_rx.recv().await.expect("output closed");
            assert!(!text.contains("Exchange advantage"));
            if text.starts_with("USD/KRW  1,402.5") {
                headlines += 1;
            }
        }
        assert!(analyzer.calls.load(Ordering::SeqCst) >= 1);
        stop_tx.send(()).unwrap();
    };

    timeout(Duration::from_secs(2), async { tokio::join!(session, driver) })
        .await
        .expect("watch did not return after shutdown");
}

#[tokio::test]
async fn test_once_prints_first_refresh_and_its_score() {
    let analyzer = SlowAnalyzer::immediate();
    let scheduler = scheduler(Duration::from_secs(3600));
    let reporter = ConsoleReporter::new("USD/KRW").without_chart();
    let mut output = Vec::new();

    timeout(
        Duration::from_secs(2),
        reporter.watch(
            &scheduler,
            desk(&analyzer),
            true,
            std::future::pending::<()>(),
            |text| output.push(text),
        ),
    )
    .await
    .expect("watch --once did not finish");

    assert_eq!(output[0], "Loading exchange rate data...\n");
    assert!(output[1].starts_with("USD/KRW  1,402.5"));
    assert!(output.iter().any(|text| text.contains("Exchange advantage: 70% (Moderate)")));
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
}
