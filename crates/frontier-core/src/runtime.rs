//! Runtime wiring: store, camera frame task, and scheduler.
//!
//! [`TowerRuntime::start`] resolves the layout, initializes the store,
//! spawns the camera frame task, and starts the pulse scheduler. The
//! returned runtime exposes the handles the observer and push channel use.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use frontier_types::CameraView;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::camera::{CameraController, CameraTimings, overview_pose};
use crate::config::TowerConfig;
use crate::handle::TowerHandle;
use crate::layout::resolve_layout;
use crate::scheduler::{PulseScheduler, PulseSource, SchedulerSettings};
use crate::store::{FocusChange, TowerStore};

/// Monotonic clock the camera samples against.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    /// A clock whose zero is now.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Time since the clock started.
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Shared camera controller plus the clock it runs on.
#[derive(Debug, Clone)]
pub struct CameraHandle {
    controller: Arc<RwLock<CameraController>>,
    clock: FrameClock,
}

impl CameraHandle {
    /// Share `controller`, sampling against `clock`.
    pub fn new(controller: CameraController, clock: FrameClock) -> Self {
        Self {
            controller: Arc::new(RwLock::new(controller)),
            clock,
        }
    }

    /// Camera view at the current instant.
    pub async fn view(&self) -> CameraView {
        let now = self.clock.now();
        self.controller.read().await.view(now)
    }

    /// Retarget the camera for a focus change at the current instant.
    pub async fn apply_focus(&self, change: &FocusChange) {
        let now = self.clock.now();
        self.controller.write().await.follow(&change.target, now);
        debug!(focused = ?change.focused, mode = ?change.mode, "Camera retargeted");
    }

    /// Advance the camera state machine to the current instant.
    pub async fn tick(&self) {
        let now = self.clock.now();
        self.controller.write().await.tick(now);
    }
}

/// Frame task: applies focus changes as they arrive and ticks the camera
/// every `frame_interval`. Ends when every focus sender is gone.
pub async fn run_frame_loop(
    camera: CameraHandle,
    mut focus_rx: mpsc::UnboundedReceiver<FocusChange>,
    frame_interval: Duration,
) {
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            change = focus_rx.recv() => match change {
                Some(change) => camera.apply_focus(&change).await,
                None => {
                    debug!("Focus channel closed; frame loop exiting");
                    return;
                }
            },
            _ = frames.tick() => camera.tick().await,
        }
    }
}

/// The running engine core.
#[derive(Debug)]
pub struct TowerRuntime<S> {
    tower: TowerHandle,
    camera: CameraHandle,
    scheduler: PulseScheduler<S>,
    frame_task: JoinHandle<()>,
}

impl<S: PulseSource> TowerRuntime<S> {
    /// Load the layout, build the store, and start the frame task and
    /// pulse scheduler.
    pub async fn start(config: &TowerConfig, source: S) -> Self {
        let resolved = resolve_layout(config.layout.path.as_deref().map(Path::new));
        let store = TowerStore::from_layout(resolved);
        let initial_pose = overview_pose(&store.tower_frame());
        let (tower, focus_rx) = TowerHandle::new(store);

        let camera = CameraHandle::new(
            CameraController::new(initial_pose, CameraTimings::from(&config.camera)),
            FrameClock::start(),
        );
        let frame_task = tokio::spawn(run_frame_loop(
            camera.clone(),
            focus_rx,
            Duration::from_millis(config.camera.frame_interval_ms),
        ));

        let scheduler = PulseScheduler::new(
            tower.clone(),
            source,
            SchedulerSettings::from(&config.scheduler),
        );
        scheduler.start().await;

        info!("Tower runtime started");
        Self {
            tower,
            camera,
            scheduler,
            frame_task,
        }
    }

    /// Handle to the shared store.
    pub const fn tower(&self) -> &TowerHandle {
        &self.tower
    }

    /// Handle to the shared camera.
    pub const fn camera(&self) -> &CameraHandle {
        &self.camera
    }

    /// The pulse scheduler.
    pub const fn scheduler(&self) -> &PulseScheduler<S> {
        &self.scheduler
    }

    /// Stop polling and the frame task.
    pub async fn shutdown(self) {
        self.scheduler.stop().await;
        self.frame_task.abort();
        info!("Tower runtime stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use frontier_types::{CameraMode, CameraPhase, FloorId, LayoutOrigin};

    use super::*;
    use crate::layout::{ResolvedLayout, synthetic_layout};

    #[tokio::test(start_paused = true)]
    async fn focus_drives_camera_to_floor() {
        let store = TowerStore::from_layout(ResolvedLayout {
            layout: synthetic_layout(),
            origin: LayoutOrigin::Synthetic,
        });
        let start = overview_pose(&store.tower_frame());
        let (tower, focus_rx) = TowerHandle::new(store);
        let camera = CameraHandle::new(
            CameraController::new(start, CameraTimings::default()),
            FrameClock::start(),
        );
        let frame_task = tokio::spawn(run_frame_loop(
            camera.clone(),
            focus_rx,
            Duration::from_millis(16),
        ));

        tower.set_focused_floor(Some(FloorId(9))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mid = camera.view().await;
        assert_eq!(mid.mode, CameraMode::Focused);
        assert_eq!(mid.phase, CameraPhase::Animating);

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        let done = camera.view().await;
        assert_eq!(done.phase, CameraPhase::Idle);
        let frame = tower.read().await.floor_frame(FloorId(9)).unwrap();
        assert_eq!(done.pose, crate::camera::focus_pose(&frame));

        frame_task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn frame_loop_exits_when_senders_drop() {
        let (tower, focus_rx) = TowerHandle::new(TowerStore::new());
        let camera = CameraHandle::new(
            CameraController::new(Default::default(), CameraTimings::default()),
            FrameClock::start(),
        );
        let task = tokio::spawn(run_frame_loop(camera, focus_rx, Duration::from_millis(16)));
        drop(tower);
        assert!(task.await.is_ok());
    }
}
