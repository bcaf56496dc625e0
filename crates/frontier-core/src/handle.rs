//! Shared access to the tower store.
//!
//! [`TowerHandle`] wraps the store in an `Arc<RwLock<_>>` and is cheap to
//! clone. Every mutation goes through it so that each store operation runs
//! under a single write lock, every change is announced on a broadcast
//! channel for stream readers, and focus changes reach the camera frame
//! task over an mpsc channel.

use std::sync::Arc;

use frontier_types::{ActivitySnapshot, ActivitySource, FloorId, RoomId, TowerView};
use tokio::sync::{RwLock, RwLockReadGuard, broadcast, mpsc};
use tracing::debug;

use crate::store::{FloorUpdate, FocusChange, StoreError, TowerStore};

/// Capacity of the change broadcast channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
const CHANGE_CAPACITY: usize = 256;

/// A change announced after a store mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TowerChange {
    /// A floor's activity was replaced.
    Activity(FloorUpdate),
    /// Focus or camera mode changed.
    Focus(FocusChange),
}

/// Cloneable handle to the shared store.
#[derive(Debug, Clone)]
pub struct TowerHandle {
    store: Arc<RwLock<TowerStore>>,
    changes: broadcast::Sender<TowerChange>,
    focus_tx: mpsc::UnboundedSender<FocusChange>,
}

impl TowerHandle {
    /// Wrap `store`, returning the handle and the receiving end of the
    /// focus-change channel for the camera frame task.
    pub fn new(store: TowerStore) -> (Self, mpsc::UnboundedReceiver<FocusChange>) {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        let (focus_tx, focus_rx) = mpsc::unbounded_channel();
        (
            Self {
                store: Arc::new(RwLock::new(store)),
                changes,
                focus_tx,
            },
            focus_rx,
        )
    }

    /// Acquire a read guard on the store.
    pub async fn read(&self) -> RwLockReadGuard<'_, TowerStore> {
        self.store.read().await
    }

    /// Cloned view of the whole tower.
    pub async fn view(&self) -> TowerView {
        self.store.read().await.view()
    }

    /// Subscribe to change announcements.
    pub fn subscribe(&self) -> broadcast::Receiver<TowerChange> {
        self.changes.subscribe()
    }

    /// See [`TowerStore::apply_activity_snapshot`].
    pub async fn apply_activity_snapshot(
        &self,
        floor: FloorId,
        snapshot: &ActivitySnapshot,
        source: ActivitySource,
    ) -> Result<FloorUpdate, StoreError> {
        let mut store = self.store.write().await;
        let update = store.apply_activity_snapshot(floor, snapshot, source)?;
        self.announce(TowerChange::Activity(update));
        drop(store);
        Ok(update)
    }

    /// See [`TowerStore::apply_room_activity`].
    pub async fn apply_room_activity(
        &self,
        room: &RoomId,
        level: f64,
    ) -> Result<FloorUpdate, StoreError> {
        let mut store = self.store.write().await;
        let update = store.apply_room_activity(room, level)?;
        self.announce(TowerChange::Activity(update));
        drop(store);
        Ok(update)
    }

    /// See [`TowerStore::set_focused_floor`]. The resulting change, if any,
    /// is forwarded to the camera.
    ///
    /// Forwarding happens under the write lock, so the camera receives
    /// focus changes in the order the store committed them.
    pub async fn set_focused_floor(
        &self,
        floor: Option<FloorId>,
    ) -> Result<Option<FocusChange>, StoreError> {
        let mut store = self.store.write().await;
        let change = store.set_focused_floor(floor)?;
        if let Some(change) = change {
            self.forward_focus(change);
        }
        drop(store);
        Ok(change)
    }

    /// See [`TowerStore::enter_orbital`].
    pub async fn enter_orbital(&self) -> Option<FocusChange> {
        let mut store = self.store.write().await;
        let change = store.enter_orbital();
        if let Some(change) = change {
            self.forward_focus(change);
        }
        drop(store);
        change
    }

    fn forward_focus(&self, change: FocusChange) {
        if self.focus_tx.send(change).is_err() {
            debug!("Camera frame task is not running; focus change not forwarded");
        }
        self.announce(TowerChange::Focus(change));
    }

    fn announce(&self, change: TowerChange) {
        // No subscribers is not an error.
        let _ = self.changes.send(change);
    }
}
