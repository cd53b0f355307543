//! Periodic re-acquisition of the trailing rate series.
//!
//! Every cycle gets a monotonically increasing sequence number. Cycles may
//! overlap; a cycle commits only if its number is above the last committed
//! one, so a slow, older cycle can never overwrite a newer result. Stopping
//! the scheduler flips a flag under the same lock that guards commits, so no
//! observer sees a transition after `stop()` returns.

use crate::application::refresh::state::{RefreshState, RefreshStatus};
use crate::domain::ports::RateSource;
use crate::domain::rates::{CurrencyPair, SeedPolicy, SeriesNormalizer, Window};
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(10);

type UpdateCallback = Box<dyn Fn(Arc<RefreshState>) + Send + Sync>;
type TodayFn = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub pair: CurrencyPair,
    pub interval: Duration,
    pub window_days: u32,
    pub seed_policy: SeedPolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            pair: CurrencyPair::usd_krw(),
            interval: DEFAULT_REFRESH_INTERVAL,
            window_days: DEFAULT_WINDOW_DAYS,
            seed_policy: SeedPolicy::default(),
        }
    }
}

pub struct RefreshScheduler {
    source: Arc<dyn RateSource>,
    config: RefreshConfig,
    today: TodayFn,
}

impl RefreshScheduler {
    pub fn new(source: Arc<dyn RateSource>, config: RefreshConfig) -> Self {
        Self {
            source,
            config,
            today: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Overrides the calendar used to compute each cycle's window.
    pub fn with_today<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    /// Runs the first cycle immediately, then one per `interval` until the
    /// returned handle is stopped or dropped. Must be called from within a
    /// tokio runtime.
    ///
    /// `on_update` runs while the commit lock is held: it should hand the
    /// snapshot off (e.g. to a channel) and must not call back into the handle.
    pub fn start<F>(&self, on_update: F) -> ScheduleHandle
    where
        F: Fn(Arc<RefreshState>) + Send + Sync + 'static,
    {
        let (cancel_tx, _) = watch::channel(false);
        let runner = Arc::new(CycleRunner {
            source: self.source.clone(),
            normalizer: SeriesNormalizer::new(self.config.seed_policy),
            config: self.config.clone(),
            today: self.today.clone(),
            next_seq: AtomicU64::new(0),
            commit: Mutex::new(CommitLog {
                stopped: false,
                last_committed: 0,
                current: Arc::new(RefreshState::idle()),
                on_update: Box::new(on_update),
            }),
            cancel_tx,
        });

        info!(
            "RefreshScheduler: starting {} refresh (window: {} days, interval: {:?}, seed: {})",
            self.config.pair, self.config.window_days, self.config.interval, self.config.seed_policy
        );

        runner.launch_cycle();
        let timer = tokio::spawn(run_timer(runner.clone()));

        ScheduleHandle { runner, timer }
    }
}

/// Owner of a running schedule. Dropping the handle stops the schedule.
pub struct ScheduleHandle {
    runner: Arc<CycleRunner>,
    timer: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Cancels the timer and any in-flight cycle. Idempotent.
    pub fn stop(&self) {
        self.runner.stop();
        self.timer.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.runner.lock().stopped
    }

    /// Last published snapshot.
    pub fn latest(&self) -> Arc<RefreshState> {
        self.runner.lock().current.clone()
    }

    /// Starts an out-of-band cycle, e.g. for a user-requested retry.
    pub fn refresh_now(&self) {
        self.runner.launch_cycle();
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct CommitLog {
    stopped: bool,
    last_committed: u64,
    current: Arc<RefreshState>,
    on_update: UpdateCallback,
}

struct CycleRunner {
    source: Arc<dyn RateSource>,
    normalizer: SeriesNormalizer,
    config: RefreshConfig,
    today: TodayFn,
    next_seq: AtomicU64,
    commit: Mutex<CommitLog>,
    cancel_tx: watch::Sender<bool>,
}

impl CycleRunner {
    fn lock(&self) -> MutexGuard<'_, CommitLog> {
        // A panicking observer must not wedge the schedule
        self.commit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stop(&self) {
        {
            let mut log = self.lock();
            if log.stopped {
                return;
            }
            log.stopped = true;
        }
        self.cancel_tx.send_replace(true);
        info!("RefreshScheduler: stopped");
    }

    /// Allocates a sequence number, publishes `Loading` when there is
    /// nothing on screen yet, and spawns the acquisition.
    fn launch_cycle(self: &Arc<Self>) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut log = self.lock();
            if log.stopped {
                debug!("RefreshScheduler: not launching cycle #{} after stop", seq);
                return;
            }
            if !log.current.has_data() && log.current.status != RefreshStatus::Loading {
                let next = Arc::new(log.current.loading());
                log.current = next.clone();
                (log.on_update)(next);
            }
        }

        tokio::spawn(self.clone().run_cycle(seq));
    }

    async fn run_cycle(self: Arc<Self>, seq: u64) {
        let window = Window::trailing((self.today)(), self.config.window_days);
        let mut cancel_rx = self.cancel_tx.subscribe();

        debug!(
            "RefreshScheduler: cycle #{} fetching {} for {}",
            seq, self.config.pair, window
        );

        let outcome = tokio::select! {
            _ = cancelled(&mut cancel_rx) => {
                debug!("RefreshScheduler: cycle #{} cancelled in flight", seq);
                return;
            }
            result = self.source.fetch(&self.config.pair, window.start(), window.end()) => result,
        };

        match outcome {
            Ok(sparse) => {
                let series = self.normalizer.normalize(&sparse, window);
                let points = series.len();
                let committed = self.commit(seq, move |_| {
                    RefreshState::ready(seq, series, window, Utc::now())
                });
                if committed {
                    info!(
                        "RefreshScheduler: cycle #{} committed {} points ({} observations)",
                        seq,
                        points,
                        sparse.len()
                    );
                }
            }
            Err(error) => {
                let committed = self.commit(seq, |current| current.failed(seq, &error));
                if committed {
                    warn!("RefreshScheduler: cycle #{} failed: {}", seq, error);
                }
            }
        }
    }

    /// Publishes the state built by `build` unless stopped or superseded.
    fn commit<B>(&self, seq: u64, build: B) -> bool
    where
        B: FnOnce(&RefreshState) -> RefreshState,
    {
        let mut log = self.lock();

        if log.stopped {
            debug!("RefreshScheduler: discarding cycle #{} after stop", seq);
            return false;
        }
        if seq <= log.last_committed {
            debug!(
                "RefreshScheduler: discarding stale cycle #{} (already committed #{})",
                seq, log.last_committed
            );
            return false;
        }

        let next = Arc::new(build(&log.current));
        log.last_committed = seq;
        log.current = next.clone();
        (log.on_update)(next);
        true
    }
}

async fn run_timer(runner: Arc<CycleRunner>) {
    let period = runner.config.interval.max(MIN_REFRESH_INTERVAL);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cancel_rx = runner.cancel_tx.subscribe();

    loop {
        tokio::select! {
            _ = cancelled(&mut cancel_rx) => break,
            _ = ticker.tick() => runner.launch_cycle(),
        }
    }

    debug!("RefreshScheduler: timer exited");
}

/// Resolves once the schedule has been stopped.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}
