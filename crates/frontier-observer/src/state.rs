//! Shared application state for the observer server.

use chrono::{DateTime, Utc};
use frontier_core::handle::{TowerChange, TowerHandle};
use frontier_core::runtime::CameraHandle;
use frontier_types::{FloorId, TowerView};
use serde::Serialize;
use tokio::sync::broadcast;

/// What prompted a streamed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// Initial state sent on connect.
    Snapshot,
    /// A floor's activity changed.
    Activity,
    /// Focus or camera mode changed.
    Focus,
}

/// JSON message pushed to `WebSocket` readers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerUpdate {
    /// What prompted the update.
    pub kind: UpdateKind,
    /// Floor the change concerns, if any.
    pub floor: Option<FloorId>,
    /// Full tower view after the change.
    pub view: TowerView,
}

impl TowerUpdate {
    /// Pair a store change with the view taken after it.
    pub fn from_change(change: &TowerChange, view: TowerView) -> Self {
        let (kind, floor) = match change {
            TowerChange::Activity(update) => (UpdateKind::Activity, Some(update.floor)),
            TowerChange::Focus(focus) => (UpdateKind::Focus, focus.focused),
        };
        Self { kind, floor, view }
    }
}

/// Shared state injected into every handler.
///
/// Cheap to clone: the tower and camera handles are reference-counted.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The shared tower store.
    pub tower: TowerHandle,
    /// The shared camera.
    pub camera: CameraHandle,
    /// When the server state was created.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state over the engine's handles.
    pub fn new(tower: TowerHandle, camera: CameraHandle) -> Self {
        Self {
            tower,
            camera,
            started_at: Utc::now(),
        }
    }

    /// Subscribe to store change announcements.
    pub fn subscribe(&self) -> broadcast::Receiver<TowerChange> {
        self.tower.subscribe()
    }
}
