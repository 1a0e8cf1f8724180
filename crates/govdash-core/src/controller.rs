use crate::clock::Clock;
use crate::retry::{fetch_with_retry, RetryPolicy, Sleeper};
use crate::source::ProposalSource;
use chrono::{DateTime, Utc};
use govdash_models::{Proposal, ProposalFilter, ProposalStatus};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_POLL_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Success,
    Error(String),
}

/// Everything a list view needs to render.
#[derive(Debug, Clone)]
pub struct ListState {
    pub load: LoadState,
    pub proposals: Vec<Proposal>,
    pub filter: ProposalFilter,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            load: LoadState::Loading,
            proposals: Vec::new(),
            filter: ProposalFilter::default(),
            last_updated: None,
        }
    }
}

impl ListState {
    /// Proposals admitted by the current filter, with their status at `now`.
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<(&Proposal, ProposalStatus)> {
        self.filter.apply(&self.proposals, now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub limit: u32,
    pub interval: Duration,
    pub retry: RetryPolicy,
    pub filter: ProposalFilter,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_POLL_LIMIT,
            interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
            filter: ProposalFilter::default(),
        }
    }
}

struct Inner<S, C, Z> {
    source: S,
    clock: C,
    sleeper: Z,
    config: PollerConfig,
    alive: AtomicBool,
    generation: AtomicU64,
    state: watch::Sender<ListState>,
}

impl<S, C, Z> Inner<S, C, Z> {
    fn is_live(&self, generation: u64) -> bool {
        self.alive.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl<S, C, Z> Inner<S, C, Z>
where
    S: ProposalSource,
    C: Clock,
    Z: Sleeper,
{
    async fn run_cycle(&self, generation: u64) {
        if !self.is_live(generation) {
            return;
        }
        self.state.send_modify(|s| s.load = LoadState::Loading);

        let result = fetch_with_retry(
            &self.source,
            &self.sleeper,
            &self.config.retry,
            self.config.limit,
        )
        .await;

        // Teardown does not cancel the request, it only drops the outcome.
        if !self.is_live(generation) {
            tracing::debug!("Discarding proposal fetch result from a stopped controller");
            return;
        }

        match result {
            Ok(proposals) => {
                tracing::info!(count = proposals.len(), "Proposals refreshed");
                let now = self.clock.now();
                self.state.send_modify(move |s| {
                    s.load = LoadState::Success;
                    s.proposals = proposals;
                    s.last_updated = Some(now);
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load proposals");
                self.state.send_modify(move |s| {
                    s.load = LoadState::Error(e.to_string());
                    s.proposals.clear();
                });
            }
        }
    }
}

/// Polls proposals on a fixed period and publishes the list state.
///
/// A cycle runs as soon as [`start`](Self::start) is called and then once per
/// interval. Each tick spawns its own cycle, so a slow cycle may overlap the
/// next one. [`stop`](Self::stop) cancels the timer and discards the results of
/// any cycle still in flight.
pub struct PollingController<S, C, Z> {
    inner: Arc<Inner<S, C, Z>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<S, C, Z> PollingController<S, C, Z>
where
    S: ProposalSource,
    C: Clock,
    Z: Sleeper,
{
    pub fn new(source: S, clock: C, sleeper: Z, config: PollerConfig) -> Self {
        let (state, _) = watch::channel(ListState {
            filter: config.filter,
            ..ListState::default()
        });
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                sleeper,
                config,
                alive: AtomicBool::new(true),
                generation: AtomicU64::new(0),
                state,
            }),
            timer: Mutex::new(None),
        }
    }

    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut timer = self.lock_timer();
        if timer.is_some() {
            tracing::debug!("Polling controller already running");
            return;
        }

        self.inner.alive.store(true, Ordering::SeqCst);
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let inner = self.inner.clone();
        let period = self.inner.config.interval;
        tracing::info!(
            interval_secs = period.as_secs(),
            limit = self.inner.config.limit,
            "Starting proposal polling"
        );

        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                // The first tick completes immediately.
                ticker.tick().await;
                let inner = inner.clone();
                tokio::spawn(async move {
                    inner.run_cycle(generation).await;
                });
            }
        }));
    }

    /// Run one fetch cycle on the caller's task.
    pub async fn refresh(&self) {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        self.inner.run_cycle(generation).await;
    }

    /// Filtered proposals with their status at the clock's current time.
    pub fn visible(&self) -> Vec<(Proposal, ProposalStatus)> {
        let now = self.inner.clock.now();
        let state = self.inner.state.borrow();
        state
            .visible(now)
            .into_iter()
            .map(|(p, status)| (p.clone(), status))
            .collect()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }
}

impl<S, C, Z> PollingController<S, C, Z> {
    pub fn stop(&self) {
        self.inner.alive.store(false, Ordering::SeqCst);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.lock_timer().take() {
            handle.abort();
            tracing::info!("Stopped proposal polling");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_timer().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState {
        self.inner.state.borrow().clone()
    }

    /// Changes which proposals are visible. Does not trigger a fetch.
    pub fn set_filter(&self, filter: ProposalFilter) {
        self.inner.state.send_modify(|s| s.filter = filter);
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S, C, Z> Drop for PollingController<S, C, Z> {
    fn drop(&mut self) {
        self.stop();
    }
}
