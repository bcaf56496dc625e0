//! Periodic activity refresh with a degraded synthetic mode.
//!
//! Every poll interval the scheduler runs a cycle: one fetch per active
//! floor plus the first floor, each as its own task. A floor whose previous
//! fetch is still outstanding is skipped rather than queued. Failed fetches
//! keep the floor's last known state. When every fetch of a cycle failed
//! because the backend could not be reached, the scheduler perturbs the
//! current levels of every floor and applies them flagged as synthetic, so
//! the tower keeps breathing while the backend is down.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use frontier_types::{ActivitySnapshot, ActivitySource, FloorId, PulseResponse, Room};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::handle::TowerHandle;

/// Errors from a single pulse fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The backend could not be reached (connect failure or timeout).
    #[error("pulse source unreachable: {reason}")]
    Unreachable {
        /// Transport-level detail.
        reason: String,
    },

    /// The backend answered with a non-success status.
    #[error("pulse source returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response could not be used.
    #[error("malformed pulse response: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },
}

impl FetchError {
    /// Whether this failure means the backend is unreachable.
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// A source of per-floor activity pulses.
///
/// The production implementation queries the pulse HTTP API; tests script
/// responses directly.
pub trait PulseSource: Send + Sync + 'static {
    /// Fetch the current pulse for `floor`.
    fn fetch_pulse(
        &self,
        floor: FloorId,
    ) -> impl Future<Output = Result<PulseResponse, FetchError>> + Send;
}

// ---------------------------------------------------------------------------
// Synthetic activity
// ---------------------------------------------------------------------------

/// How degraded mode draws its perturbations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticMode {
    /// Seeded from the thread RNG at startup.
    Random,
    /// Reproducible sequence from a fixed seed.
    Seeded(u64),
    /// No perturbation; levels are re-applied unchanged.
    Frozen,
}

impl SyntheticMode {
    /// Mode named by the scheduler configuration. Unknown names fall back
    /// to [`SyntheticMode::Random`].
    pub fn from_config(config: &SchedulerConfig) -> Self {
        match config.synthetic_mode.as_str() {
            "seeded" => Self::Seeded(config.synthetic_seed),
            "frozen" => Self::Frozen,
            _ => Self::Random,
        }
    }
}

/// Generator of synthetic activity snapshots.
#[derive(Debug)]
pub struct SyntheticActivity {
    rng: Option<SmallRng>,
    delta: f64,
}

impl SyntheticActivity {
    /// Generator perturbing each level by a uniform draw from
    /// `[-delta, delta]`.
    pub fn new(mode: SyntheticMode, delta: f64) -> Self {
        let rng = match mode {
            SyntheticMode::Random => Some(SmallRng::from_rng(&mut rand::rng())),
            SyntheticMode::Seeded(seed) => Some(SmallRng::seed_from_u64(seed)),
            SyntheticMode::Frozen => None,
        };
        Self {
            rng,
            delta: if delta.is_finite() { delta.abs() } else { 0.0 },
        }
    }

    /// Snapshot of `rooms` with every level perturbed and reclamped.
    pub fn perturb(&mut self, rooms: &[Room]) -> ActivitySnapshot {
        let delta = self.delta;
        ActivitySnapshot::new(
            rooms
                .iter()
                .map(|room| {
                    let shift = match self.rng.as_mut() {
                        Some(rng) if delta > 0.0 => rng.random_range(-delta..=delta),
                        _ => 0.0,
                    };
                    (room.id.clone(), (room.activity + shift).clamp(0.0, 1.0))
                })
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Whether the polling loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not polling.
    Idle,
    /// Polling on the configured interval.
    Polling,
}

/// Outcome of one polling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Floors whose pulse was applied.
    pub updated: Vec<FloorId>,
    /// Floors whose fetch or apply failed.
    pub failed: Vec<FloorId>,
    /// Floors skipped because a fetch was still in flight.
    pub skipped: Vec<FloorId>,
    /// Whether synthetic activity was generated this cycle.
    pub degraded: bool,
}

/// Polling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    /// Time between cycles.
    pub interval: Duration,
    /// Generate synthetic activity when the backend is unreachable.
    pub synthetic_fallback: bool,
    /// Randomness mode for synthetic activity.
    pub mode: SyntheticMode,
    /// Largest synthetic change per room per cycle.
    pub delta: f64,
}

impl From<&SchedulerConfig> for SchedulerSettings {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            synthetic_fallback: config.synthetic_fallback,
            mode: SyntheticMode::from_config(config),
            delta: config.synthetic_delta,
        }
    }
}

enum FetchOutcome {
    Applied,
    Failed(FetchError),
}

/// Drives periodic pulse fetches into the store.
#[derive(Debug)]
pub struct PulseScheduler<S> {
    tower: TowerHandle,
    source: Arc<S>,
    settings: SchedulerSettings,
    in_flight: Arc<Mutex<BTreeSet<FloorId>>>,
    synthetic: Arc<Mutex<SyntheticActivity>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<S> Clone for PulseScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            tower: self.tower.clone(),
            source: Arc::clone(&self.source),
            settings: self.settings,
            in_flight: Arc::clone(&self.in_flight),
            synthetic: Arc::clone(&self.synthetic),
            task: Arc::clone(&self.task),
        }
    }
}

impl<S: PulseSource> PulseScheduler<S> {
    /// Create an idle scheduler.
    pub fn new(tower: TowerHandle, source: S, settings: SchedulerSettings) -> Self {
        Self {
            tower,
            source: Arc::new(source),
            synthetic: Arc::new(Mutex::new(SyntheticActivity::new(
                settings.mode,
                settings.delta,
            ))),
            settings,
            in_flight: Arc::new(Mutex::new(BTreeSet::new())),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Current state.
    pub async fn state(&self) -> SchedulerState {
        match self.task.lock().await.as_ref() {
            Some(task) if !task.is_finished() => SchedulerState::Polling,
            _ => SchedulerState::Idle,
        }
    }

    /// Enter polling. Returns `false` if already polling.
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }
        let this = self.clone();
        *task = Some(tokio::spawn(async move { this.run().await }));
        info!(
            interval = ?self.settings.interval,
            synthetic_fallback = self.settings.synthetic_fallback,
            "Pulse scheduler started"
        );
        true
    }

    /// Stop polling. Fetches already in flight still complete and apply.
    pub async fn stop(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
            info!("Pulse scheduler stopped");
        }
    }

    /// The polling loop: one cycle per interval tick, each on its own task
    /// so a slow cycle never delays the next tick.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let this = self.clone();
            tokio::spawn(async move {
                this.run_cycle().await;
            });
        }
    }

    /// Floors currently being fetched.
    pub async fn in_flight(&self) -> Vec<FloorId> {
        self.in_flight.lock().await.iter().copied().collect()
    }

    /// Run one cycle to completion.
    pub async fn run_cycle(&self) -> CycleReport {
        let targets = self.cycle_targets().await;
        let mut report = CycleReport::default();
        let mut tasks = Vec::with_capacity(targets.len());

        for floor in targets {
            if !self.in_flight.lock().await.insert(floor) {
                debug!(floor = %floor, "Fetch still in flight; skipping floor this cycle");
                report.skipped.push(floor);
                continue;
            }
            let this = self.clone();
            tasks.push((floor, tokio::spawn(async move { this.fetch_and_apply(floor).await })));
        }

        let mut unreachable = 0_usize;
        let attempted = tasks.len();
        for (floor, task) in tasks {
            match task.await {
                Ok(FetchOutcome::Applied) => report.updated.push(floor),
                Ok(FetchOutcome::Failed(err)) => {
                    if err.is_unreachable() {
                        unreachable = unreachable.saturating_add(1);
                    }
                    report.failed.push(floor);
                }
                Err(e) => {
                    warn!(floor = %floor, error = %e, "Pulse fetch task ended abnormally");
                    report.failed.push(floor);
                }
            }
        }

        if self.settings.synthetic_fallback && attempted > 0 && unreachable == attempted {
            self.degrade().await;
            report.degraded = true;
        }

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            degraded = report.degraded,
            "Pulse cycle complete"
        );
        report
    }

    /// Active floors plus the first floor, ascending and deduplicated.
    async fn cycle_targets(&self) -> BTreeSet<FloorId> {
        let store = self.tower.read().await;
        let mut targets: BTreeSet<FloorId> = store.active_floor_ids().into_iter().collect();
        if let Some(first) = store.first_floor() {
            targets.insert(first);
        }
        targets
    }

    async fn fetch_and_apply(&self, floor: FloorId) -> FetchOutcome {
        let outcome = match self.fetch_snapshot(floor).await {
            Ok(snapshot) => match self
                .tower
                .apply_activity_snapshot(floor, &snapshot, ActivitySource::Live)
                .await
            {
                Ok(_) => FetchOutcome::Applied,
                Err(e) => FetchOutcome::Failed(FetchError::Malformed {
                    reason: e.to_string(),
                }),
            },
            Err(e) => FetchOutcome::Failed(e),
        };
        if let FetchOutcome::Failed(err) = &outcome {
            warn!(floor = %floor, error = %err, "Pulse fetch failed; keeping last known state");
        }
        self.in_flight.lock().await.remove(&floor);
        outcome
    }

    async fn fetch_snapshot(&self, floor: FloorId) -> Result<ActivitySnapshot, FetchError> {
        let pulse = self.source.fetch_pulse(floor).await?;
        if !pulse.is_well_formed() {
            return Err(FetchError::Malformed {
                reason: "non-finite activity level".to_owned(),
            });
        }
        Ok(pulse.to_snapshot())
    }

    /// Apply a perturbed snapshot to every floor, flagged synthetic.
    async fn degrade(&self) {
        let snapshots: Vec<(FloorId, ActivitySnapshot)> = {
            let store = self.tower.read().await;
            let mut synthetic = self.synthetic.lock().await;
            store
                .floors()
                .map(|f| (f.floor, synthetic.perturb(&f.rooms)))
                .collect()
        };
        warn!(
            floors = snapshots.len(),
            "Pulse source unreachable; generating synthetic activity"
        );
        for (floor, snapshot) in snapshots {
            if let Err(e) = self
                .tower
                .apply_activity_snapshot(floor, &snapshot, ActivitySource::Synthetic)
                .await
            {
                warn!(floor = %floor, error = %e, "Failed to apply synthetic snapshot");
            }
        }
    }
}
