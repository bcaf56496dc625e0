//! Scheduler scenarios against a scripted pulse source.
//!
//! Each test builds a two-floor tower, scripts per-floor responses, and
//! runs cycles directly through [`PulseScheduler::run_cycle`].

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use frontier_core::handle::TowerHandle;
use frontier_core::layout::{FloorLayout, ResolvedLayout, TowerLayout};
use frontier_core::scheduler::{
    FetchError, PulseScheduler, PulseSource, SchedulerSettings, SchedulerState, SyntheticMode,
};
use frontier_core::store::TowerStore;
use frontier_types::{
    ActivitySource, FloorId, LayoutOrigin, PulseResponse, Room, RoomId, RoomPulse,
};

#[derive(Debug, Clone)]
enum Script {
    Levels(Vec<(&'static str, f64)>),
    Delayed(Duration, Vec<(&'static str, f64)>),
    Fail(FetchError),
}

#[derive(Debug, Default)]
struct ScriptedSource {
    scripts: Mutex<BTreeMap<FloorId, Script>>,
}

impl ScriptedSource {
    fn with(scripts: Vec<(u32, Script)>) -> Self {
        Self {
            scripts: Mutex::new(
                scripts
                    .into_iter()
                    .map(|(floor, script)| (FloorId(floor), script))
                    .collect(),
            ),
        }
    }
}

fn pulse(levels: &[(&str, f64)]) -> PulseResponse {
    PulseResponse {
        floor_id: None,
        timestamp: None,
        rooms: levels
            .iter()
            .map(|&(id, level)| (RoomId::from(id), RoomPulse { level, trend: None }))
            .collect(),
        overall_activity: None,
        metadata: None,
    }
}

impl PulseSource for ScriptedSource {
    async fn fetch_pulse(&self, floor: FloorId) -> Result<PulseResponse, FetchError> {
        let script = self.scripts.lock().unwrap().get(&floor).cloned();
        match script {
            Some(Script::Levels(levels)) => Ok(pulse(&levels)),
            Some(Script::Delayed(delay, levels)) => {
                tokio::time::sleep(delay).await;
                Ok(pulse(&levels))
            }
            Some(Script::Fail(err)) => Err(err),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

fn room(id: &str, name: &str, activity: f64) -> Room {
    Room {
        id: RoomId::from(id),
        name: name.to_owned(),
        x: 0.0,
        y: 0.0,
        width: 80.0,
        height: 60.0,
        capacity: 20,
        activity,
    }
}

/// Floor 1: two idle rooms. Floor 2: one active lab and one idle lounge.
fn tower() -> TowerHandle {
    let layout = TowerLayout {
        floors: vec![
            FloorLayout {
                floor: FloorId(1),
                rooms: vec![room("f1-a", "Meeting Room", 0.0), room("f1-b", "Cafe", 0.1)],
            },
            FloorLayout {
                floor: FloorId(2),
                rooms: vec![room("f2-lab", "AI Lab", 0.5), room("f2-lounge", "Lounge", 0.05)],
            },
        ],
    };
    let (handle, _focus_rx) = TowerHandle::new(TowerStore::from_layout(ResolvedLayout {
        layout,
        origin: LayoutOrigin::Resource,
    }));
    handle
}

fn settings(mode: SyntheticMode) -> SchedulerSettings {
    SchedulerSettings {
        interval: Duration::from_millis(5_000),
        synthetic_fallback: true,
        mode,
        delta: 0.1,
    }
}

fn unreachable() -> Script {
    Script::Fail(FetchError::Unreachable {
        reason: "connection refused".to_owned(),
    })
}

async fn levels(tower: &TowerHandle, floor: u32) -> Vec<f64> {
    tower
        .read()
        .await
        .floor(FloorId(floor))
        .unwrap()
        .rooms
        .iter()
        .map(|r| r.activity)
        .collect()
}

#[tokio::test]
async fn failed_floor_keeps_state_while_other_updates() {
    let tower = tower();
    let source = ScriptedSource::with(vec![
        (1, Script::Levels(vec![("f1-a", 0.8), ("f1-b", 0.3)])),
        (2, Script::Fail(FetchError::Status { status: 500 })),
    ]);
    let before = tower.read().await.floor(FloorId(2)).cloned().unwrap();
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));

    let report = scheduler.run_cycle().await;

    assert_eq!(report.updated, vec![FloorId(1)]);
    assert_eq!(report.failed, vec![FloorId(2)]);
    assert!(!report.degraded);
    assert_eq!(levels(&tower, 1).await, vec![0.8, 0.3]);
    assert_eq!(tower.read().await.floor(FloorId(2)).cloned().unwrap(), before);
    assert_eq!(tower.read().await.floor_bubbles(FloorId(1)).unwrap().len(), 2);
}

#[tokio::test]
async fn cycle_targets_active_floors_and_first_floor() {
    let tower = tower();
    // Floor 1 is idle but always polled; floor 2 is polled because it is active.
    let source = ScriptedSource::with(vec![
        (1, Script::Levels(vec![])),
        (2, Script::Levels(vec![("f2-lab", 0.1)])),
    ]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));

    let first = scheduler.run_cycle().await;
    assert_eq!(first.updated, vec![FloorId(1), FloorId(2)]);

    // Floor 2 is now idle, so only the first floor is fetched.
    let second = scheduler.run_cycle().await;
    assert_eq!(second.updated, vec![FloorId(1)]);
}

#[tokio::test]
async fn all_unreachable_frozen_flags_synthetic_without_change() {
    let tower = tower();
    let source = ScriptedSource::with(vec![(1, unreachable()), (2, unreachable())]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));
    let before_1 = levels(&tower, 1).await;
    let before_2 = levels(&tower, 2).await;

    let report = scheduler.run_cycle().await;

    assert!(report.degraded);
    assert_eq!(levels(&tower, 1).await, before_1);
    assert_eq!(levels(&tower, 2).await, before_2);
    let store = tower.read().await;
    assert!(store.floors().all(|f| f.source == ActivitySource::Synthetic));
}

#[tokio::test]
async fn seeded_degraded_mode_stays_bounded() {
    let tower = tower();
    let source = ScriptedSource::with(vec![(1, unreachable()), (2, unreachable())]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Seeded(7)));

    for _ in 0..10 {
        let before = [levels(&tower, 1).await, levels(&tower, 2).await].concat();
        let report = scheduler.run_cycle().await;
        let after = [levels(&tower, 1).await, levels(&tower, 2).await].concat();
        // Floor 2 may drop below the threshold and fall out of the cycle,
        // but floor 1 is always fetched and always unreachable.
        assert!(report.degraded);
        for (b, a) in before.iter().zip(&after) {
            assert!((0.0..=1.0).contains(a));
            assert!((a - b).abs() <= 0.1 + 1e-12);
        }
    }
}

#[tokio::test]
async fn mixed_failures_do_not_degrade() {
    let tower = tower();
    let source = ScriptedSource::with(vec![
        (1, unreachable()),
        (2, Script::Fail(FetchError::Status { status: 503 })),
    ]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));

    let report = scheduler.run_cycle().await;

    assert!(!report.degraded);
    assert_eq!(report.failed, vec![FloorId(1), FloorId(2)]);
    let store = tower.read().await;
    assert!(store.floors().all(|f| f.source == ActivitySource::Live));
}

#[tokio::test]
async fn disabled_fallback_never_degrades() {
    let tower = tower();
    let source = ScriptedSource::with(vec![(1, unreachable()), (2, unreachable())]);
    let mut config = settings(SyntheticMode::Frozen);
    config.synthetic_fallback = false;
    let scheduler = PulseScheduler::new(tower.clone(), source, config);

    assert!(!scheduler.run_cycle().await.degraded);
}

#[tokio::test]
async fn non_finite_pulse_is_rejected() {
    let tower = tower();
    let source = ScriptedSource::with(vec![
        (1, Script::Levels(vec![("f1-a", 0.9), ("f1-b", f64::INFINITY)])),
        (2, Script::Levels(vec![("f2-lab", 0.9)])),
    ]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));

    let report = scheduler.run_cycle().await;

    assert_eq!(report.failed, vec![FloorId(1)]);
    assert_eq!(levels(&tower, 1).await, vec![0.0, 0.1]);
    assert_eq!(levels(&tower, 2).await, vec![0.9, 0.05]);
}

#[tokio::test(start_paused = true)]
async fn in_flight_floor_is_skipped() {
    let tower = tower();
    let source = ScriptedSource::with(vec![
        (1, Script::Delayed(Duration::from_secs(10), vec![("f1-a", 0.6)])),
        (2, Script::Levels(vec![("f2-lab", 0.7)])),
    ]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));

    let slow = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_cycle().await })
    };
    // Wait until floor 2 of the slow cycle has landed and only floor 1
    // remains outstanding.
    while scheduler.in_flight().await != vec![FloorId(1)]
        || levels(&tower, 2).await.first() != Some(&0.7)
    {
        tokio::task::yield_now().await;
    }

    let fast = scheduler.run_cycle().await;
    assert_eq!(fast.skipped, vec![FloorId(1)]);
    assert_eq!(fast.updated, vec![FloorId(2)]);

    let slow = slow.await.unwrap();
    assert_eq!(slow.updated, vec![FloorId(1), FloorId(2)]);
    assert!(scheduler.in_flight().await.is_empty());
    assert_eq!(levels(&tower, 1).await, vec![0.6, 0.1]);
}

#[tokio::test(start_paused = true)]
async fn start_polls_until_stopped() {
    let tower = tower();
    let source = ScriptedSource::with(vec![
        (1, Script::Levels(vec![("f1-a", 0.4)])),
        (2, Script::Levels(vec![("f2-lab", 0.9)])),
    ]);
    let scheduler = PulseScheduler::new(tower.clone(), source, settings(SyntheticMode::Frozen));
    assert_eq!(scheduler.state().await, SchedulerState::Idle);

    assert!(scheduler.start().await);
    assert!(!scheduler.start().await);
    assert_eq!(scheduler.state().await, SchedulerState::Polling);

    // The first interval tick fires immediately.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(levels(&tower, 1).await, vec![0.4, 0.1]);

    scheduler.stop().await;
    assert_eq!(scheduler.state().await, SchedulerState::Idle);
}

#[tokio::test]
async fn pushed_room_update_touches_one_room() {
    let tower = tower();
    let before_bubbles = tower.read().await.floor_bubbles(FloorId(1)).unwrap().len();
    assert_eq!(before_bubbles, 0);

    let update = tower
        .apply_room_activity(&RoomId::from("f1-b"), 0.64)
        .await
        .unwrap();

    assert_eq!(update.floor, FloorId(1));
    assert_eq!(update.rooms_updated, 1);
    assert_eq!(levels(&tower, 1).await, vec![0.0, 0.64]);
    assert_eq!(levels(&tower, 2).await, vec![0.5, 0.05]);
    let store = tower.read().await;
    let bubbles = store.floor_bubbles(FloorId(1)).unwrap();
    assert_eq!(bubbles.len(), 1);
    assert_eq!(bubbles.first().map(|b| b.attendees), Some(13));
}
