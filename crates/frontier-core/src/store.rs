//! Canonical tower activity state.
//!
//! [`TowerStore`] owns the floors, their rooms, the derived bubbles, and
//! the focus/camera mode. Every mutation is a single method call that
//! either validates and applies completely or returns an error having
//! changed nothing. The runtime keeps the store behind one write lock, so
//! readers only ever see a whole operation's before or after.

use chrono::{DateTime, Utc};
use frontier_types::{
    ActivitySnapshot, ActivitySource, BoundingBox, CameraMode, EventBubble, FloorData, FloorId,
    LayoutOrigin, Room, RoomId, TowerMetrics, TowerView,
};
use tracing::{debug, info};

use crate::bubbles::{self, FLOOR_HEIGHT, FloorPlacement};
use crate::camera::{CameraTarget, FloorFrame, TowerFrame};
use crate::color;
use crate::layout::ResolvedLayout;

/// Padding added around a floor's room extents.
pub const FLOOR_PADDING: f64 = 20.0;

/// Opacity of the focused floor, and of every floor with no focus.
pub const OPACITY_FULL: f64 = 1.0;

/// Opacity of floors that are not focused while another one is.
pub const OPACITY_GHOSTED: f64 = 0.1;

/// Rooms above this level count as high activity in [`TowerMetrics`].
pub const HIGH_ACTIVITY_THRESHOLD: f64 = 0.7;

/// Errors returned by store mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The floor is not part of the loaded tower.
    #[error("unknown floor: {0}")]
    UnknownFloor(FloorId),

    /// No floor contains the room.
    #[error("unknown room: {0}")]
    UnknownRoom(RoomId),

    /// A snapshot carried a NaN or infinite level.
    #[error("non-finite activity level {level} for room {room}")]
    NonFiniteLevel {
        /// The offending room.
        room: RoomId,
        /// The rejected level.
        level: f64,
    },
}

/// Emitted when the focus or camera mode changes; consumed by the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusChange {
    /// Focused floor before the change.
    pub previous: Option<FloorId>,
    /// Focused floor after the change.
    pub focused: Option<FloorId>,
    /// Camera mode after the change.
    pub mode: CameraMode,
    /// What the camera should frame next.
    pub target: CameraTarget,
}

/// Summary of one applied snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorUpdate {
    /// Floor that was updated.
    pub floor: FloorId,
    /// Rooms whose level came from the snapshot.
    pub rooms_updated: usize,
    /// Bubbles on the floor after the update.
    pub bubble_count: usize,
    /// Whether the floor is active after the update.
    pub active: bool,
}

#[derive(Debug, Clone)]
struct FloorState {
    data: FloorData,
    bubbles: Vec<EventBubble>,
}

impl FloorState {
    fn placement(&self) -> FloorPlacement {
        FloorPlacement::at_level(self.data.floor, self.data.level)
    }

    fn frame(&self) -> FloorFrame {
        FloorFrame {
            bounds: self.data.bounds,
            elevation: self.placement().elevation,
        }
    }
}

/// The single owned aggregate of tower activity state.
#[derive(Debug, Clone)]
pub struct TowerStore {
    floors: Vec<FloorState>,
    focused: Option<FloorId>,
    camera_mode: CameraMode,
    loading: bool,
    last_update: Option<DateTime<Utc>>,
    layout_origin: LayoutOrigin,
}

impl Default for TowerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerStore {
    /// An empty store that is still loading.
    pub const fn new() -> Self {
        Self {
            floors: Vec::new(),
            focused: None,
            camera_mode: CameraMode::Overview,
            loading: true,
            last_update: None,
            layout_origin: LayoutOrigin::Synthetic,
        }
    }

    /// A store initialized from `resolved`.
    pub fn from_layout(resolved: ResolvedLayout) -> Self {
        let mut store = Self::new();
        store.initialize(resolved);
        store
    }

    /// Build the fixed floor list from a resolved layout.
    ///
    /// Initial activity comes from the layout's per-room hints, and bubbles
    /// are derived from it. Focus resets to overview.
    pub fn initialize(&mut self, resolved: ResolvedLayout) {
        let ResolvedLayout { layout, origin } = resolved;
        self.floors = layout
            .floors
            .into_iter()
            .zip(0_u32..)
            .map(|(floor_layout, level)| {
                let floor = floor_layout.floor;
                let rooms = floor_layout.rooms;
                let placement = FloorPlacement::at_level(floor, level);
                let bubbles =
                    bubbles::derive(placement, &rooms, &ActivitySnapshot::new(Default::default()));
                let active = rooms.iter().any(|r| bubbles::is_lively(r.activity));
                let heat = color::floor_heat(&rooms);
                FloorState {
                    data: FloorData {
                        floor,
                        level,
                        label: format!("Floor {}", floor.number()),
                        bounds: floor_bounds(&rooms),
                        rooms,
                        opacity: OPACITY_FULL,
                        active,
                        source: ActivitySource::Live,
                        updated_at: None,
                        heat,
                    },
                    bubbles,
                }
            })
            .collect();
        self.focused = None;
        self.camera_mode = CameraMode::Overview;
        self.layout_origin = origin;
        self.last_update = None;
        self.loading = false;

        info!(
            floors = self.floors.len(),
            rooms = self.floors.iter().map(|f| f.data.rooms.len()).sum::<usize>(),
            bubbles = self.floors.iter().map(|f| f.bubbles.len()).sum::<usize>(),
            origin = ?origin,
            "Tower store initialized"
        );
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Focus a floor, or return to the overview with `None`.
    ///
    /// Returns `Ok(None)` when the requested focus is already in effect.
    pub fn set_focused_floor(
        &mut self,
        floor: Option<FloorId>,
    ) -> Result<Option<FocusChange>, StoreError> {
        let target = match floor {
            Some(id) => CameraTarget::Floor(self.state(id)?.frame()),
            None => CameraTarget::Overview(self.tower_frame()),
        };
        let mode = target.mode();
        if self.focused == floor && self.camera_mode == mode {
            return Ok(None);
        }
        Ok(Some(self.apply_focus(floor, target)))
    }

    /// Switch to orbiting the tower, clearing any floor focus.
    ///
    /// Returns `None` when already orbiting.
    pub fn enter_orbital(&mut self) -> Option<FocusChange> {
        if self.camera_mode == CameraMode::Orbital {
            return None;
        }
        let target = CameraTarget::Orbit(self.tower_frame());
        Some(self.apply_focus(None, target))
    }

    fn apply_focus(&mut self, floor: Option<FloorId>, target: CameraTarget) -> FocusChange {
        let previous = self.focused;
        for state in &mut self.floors {
            state.data.opacity = opacity_for(state.data.floor, floor);
        }
        self.focused = floor;
        self.camera_mode = target.mode();
        info!(
            previous = ?previous,
            focused = ?floor,
            mode = ?self.camera_mode,
            "Focus changed"
        );
        FocusChange {
            previous,
            focused: floor,
            mode: self.camera_mode,
            target,
        }
    }

    // -----------------------------------------------------------------------
    // Activity
    // -----------------------------------------------------------------------

    /// Apply a snapshot to one floor.
    ///
    /// The whole snapshot is validated first; on error nothing changes.
    /// Rooms in the snapshot take its clamped level, rooms absent from it
    /// keep theirs, and entries for rooms not on the floor are ignored.
    /// The floor's bubbles are then re-derived wholesale.
    pub fn apply_activity_snapshot(
        &mut self,
        floor: FloorId,
        snapshot: &ActivitySnapshot,
        source: ActivitySource,
    ) -> Result<FloorUpdate, StoreError> {
        let index = self
            .floors
            .iter()
            .position(|f| f.data.floor == floor)
            .ok_or(StoreError::UnknownFloor(floor))?;
        if let Some((room, &level)) = snapshot.levels.iter().find(|(_, l)| !l.is_finite()) {
            return Err(StoreError::NonFiniteLevel {
                room: room.clone(),
                level,
            });
        }

        let state = self
            .floors
            .get_mut(index)
            .ok_or(StoreError::UnknownFloor(floor))?;

        let mut rooms_updated = 0_usize;
        for room in &mut state.data.rooms {
            if let Some(level) = snapshot.level(&room.id) {
                room.activity = level.clamp(0.0, 1.0);
                rooms_updated = rooms_updated.saturating_add(1);
            }
        }
        if rooms_updated < snapshot.levels.len() {
            let on_floor = &state.data.rooms;
            for room in snapshot.levels.keys() {
                if !on_floor.iter().any(|r| &r.id == room) {
                    debug!(floor = %floor, room = %room, "Ignoring snapshot entry for room not on floor");
                }
            }
        }

        state.bubbles = bubbles::derive(state.placement(), &state.data.rooms, snapshot);
        state.data.heat = color::floor_heat(&state.data.rooms);
        state.data.active = state
            .data
            .rooms
            .iter()
            .any(|r| bubbles::is_lively(r.activity));
        state.data.source = source;
        state.data.updated_at = Some(snapshot.taken_at);
        self.last_update = Some(snapshot.taken_at);

        let update = FloorUpdate {
            floor,
            rooms_updated,
            bubble_count: state.bubbles.len(),
            active: state.data.active,
        };
        debug!(
            floor = %floor,
            rooms = update.rooms_updated,
            bubbles = update.bubble_count,
            active = update.active,
            source = ?source,
            "Applied activity snapshot"
        );
        Ok(update)
    }

    /// Apply a single room's level, as delivered by the push channel.
    pub fn apply_room_activity(
        &mut self,
        room: &RoomId,
        level: f64,
    ) -> Result<FloorUpdate, StoreError> {
        let floor = self
            .floor_of_room(room)
            .ok_or_else(|| StoreError::UnknownRoom(room.clone()))?;
        self.apply_activity_snapshot(
            floor,
            &ActivitySnapshot::single(room.clone(), level),
            ActivitySource::Live,
        )
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Floors in tower order.
    pub fn floors(&self) -> impl Iterator<Item = &FloorData> {
        self.floors.iter().map(|f| &f.data)
    }

    /// One floor by id.
    pub fn floor(&self, id: FloorId) -> Option<&FloorData> {
        self.state(id).ok().map(|f| &f.data)
    }

    /// Bubbles across every floor, in floor then room order.
    pub fn bubbles(&self) -> impl Iterator<Item = &EventBubble> {
        self.floors.iter().flat_map(|f| f.bubbles.iter())
    }

    /// Bubbles on one floor.
    pub fn floor_bubbles(&self, id: FloorId) -> Option<&[EventBubble]> {
        self.state(id).ok().map(|f| f.bubbles.as_slice())
    }

    /// Currently focused floor.
    pub const fn focused_floor(&self) -> Option<FloorId> {
        self.focused
    }

    /// Current camera framing mode.
    pub const fn camera_mode(&self) -> CameraMode {
        self.camera_mode
    }

    /// True until [`initialize`](Self::initialize) has run.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Where the layout came from.
    pub const fn layout_origin(&self) -> LayoutOrigin {
        self.layout_origin
    }

    /// When any floor's activity last changed.
    pub const fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Floors whose active flag is set.
    pub fn active_floor_ids(&self) -> Vec<FloorId> {
        self.floors()
            .filter(|f| f.active)
            .map(|f| f.floor)
            .collect()
    }

    /// Lowest floor of the tower.
    pub fn first_floor(&self) -> Option<FloorId> {
        self.floors.first().map(|f| f.data.floor)
    }

    /// Floor that contains `room`.
    pub fn floor_of_room(&self, room: &RoomId) -> Option<FloorId> {
        self.floors()
            .find(|f| f.rooms.iter().any(|r| &r.id == room))
            .map(|f| f.floor)
    }

    /// Union of every floor's bounds.
    pub fn tower_bounds(&self) -> BoundingBox {
        let mut bounds = self.floors().map(|f| f.bounds);
        let first = bounds.next().unwrap_or_default();
        bounds.fold(first, |acc, b| acc.union(&b))
    }

    /// Framing geometry for the whole tower.
    pub fn tower_frame(&self) -> TowerFrame {
        let count = u32::try_from(self.floors.len()).unwrap_or(u32::MAX);
        TowerFrame {
            bounds: self.tower_bounds(),
            height: f64::from(count) * FLOOR_HEIGHT,
        }
    }

    /// Framing geometry for one floor.
    pub fn floor_frame(&self, id: FloorId) -> Option<FloorFrame> {
        self.state(id).ok().map(FloorState::frame)
    }

    /// Aggregate figures across the tower.
    #[allow(clippy::cast_precision_loss)]
    pub fn tower_metrics(&self) -> TowerMetrics {
        let rooms: Vec<&Room> = self.floors().flat_map(|f| f.rooms.iter()).collect();
        let total: f64 = rooms.iter().map(|r| r.activity).sum();
        // Room counts are far below 2^52.
        let average = if rooms.is_empty() {
            0.0
        } else {
            total / rooms.len() as f64
        };
        TowerMetrics {
            floor_count: count_u32(self.floors.len()),
            room_count: count_u32(rooms.len()),
            average_activity: average,
            high_activity_rooms: count_u32(
                rooms
                    .iter()
                    .filter(|r| r.activity > HIGH_ACTIVITY_THRESHOLD)
                    .count(),
            ),
            bubble_count: count_u32(self.bubbles().count()),
            active_floor_count: count_u32(self.floors().filter(|f| f.active).count()),
        }
    }

    /// Cloned read-only snapshot for the renderer.
    pub fn view(&self) -> TowerView {
        TowerView {
            floors: self.floors().cloned().collect(),
            bubbles: self.bubbles().cloned().collect(),
            focused_floor: self.focused,
            camera_mode: self.camera_mode,
            loading: self.loading,
            last_update: self.last_update,
            layout_origin: self.layout_origin,
            metrics: self.tower_metrics(),
        }
    }

    fn state(&self, id: FloorId) -> Result<&FloorState, StoreError> {
        self.floors
            .iter()
            .find(|f| f.data.floor == id)
            .ok_or(StoreError::UnknownFloor(id))
    }
}

/// Opacity of `floor` given the current focus.
pub fn opacity_for(floor: FloorId, focused: Option<FloorId>) -> f64 {
    match focused {
        Some(f) if f != floor => OPACITY_GHOSTED,
        _ => OPACITY_FULL,
    }
}

/// Room extents plus [`FLOOR_PADDING`] on every side.
pub fn floor_bounds(rooms: &[Room]) -> BoundingBox {
    let Some(first) = rooms.first() else {
        return BoundingBox::default();
    };
    let seed = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x + first.width,
        max_y: first.y + first.height,
    };
    let tight = rooms.iter().fold(seed, |acc, r| {
        acc.union(&BoundingBox {
            min_x: r.x,
            min_y: r.y,
            max_x: r.x + r.width,
            max_y: r.y + r.height,
        })
    });
    BoundingBox {
        min_x: tight.min_x - FLOOR_PADDING,
        min_y: tight.min_y - FLOOR_PADDING,
        max_x: tight.max_x + FLOOR_PADDING,
        max_y: tight.max_y + FLOOR_PADDING,
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::layout::{FloorLayout, TowerLayout};

    fn room(id: &str, name: &str, x: f64, capacity: u32, activity: f64) -> Room {
        Room {
            id: RoomId::from(id),
            name: name.to_owned(),
            x,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            capacity,
            activity,
        }
    }

    fn store() -> TowerStore {
        let layout = TowerLayout {
            floors: vec![
                FloorLayout {
                    floor: FloorId(1),
                    rooms: vec![
                        room("roomA", "Meeting Room", 0.0, 20, 0.0),
                        room("roomB", "Hacker Lounge", 150.0, 40, 0.0),
                    ],
                },
                FloorLayout {
                    floor: FloorId(3),
                    rooms: vec![room("lab", "AI Lab", 0.0, 10, 0.5)],
                },
            ],
        };
        TowerStore::from_layout(ResolvedLayout {
            layout,
            origin: LayoutOrigin::Resource,
        })
    }

    fn snap(levels: &[(&str, f64)]) -> ActivitySnapshot {
        ActivitySnapshot::new(
            levels
                .iter()
                .map(|&(id, l)| (RoomId::from(id), l))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn new_store_is_loading() {
        let s = TowerStore::new();
        assert!(s.is_loading());
        assert_eq!(s.floors().count(), 0);
        assert_eq!(s.tower_metrics().average_activity, 0.0);
    }

    #[test]
    fn initialize_derives_from_hints() {
        let s = store();
        assert!(!s.is_loading());
        assert_eq!(s.layout_origin(), LayoutOrigin::Resource);
        assert_eq!(s.first_floor(), Some(FloorId(1)));
        assert_eq!(s.active_floor_ids(), vec![FloorId(3)]);
        assert_eq!(s.bubbles().count(), 1);
        let floor3 = s.floor(FloorId(3)).unwrap();
        assert_eq!(floor3.level, 1);
        assert_eq!(floor3.label, "Floor 3");
    }

    #[test]
    fn bounds_are_padded() {
        let s = store();
        let b = s.floor(FloorId(1)).unwrap().bounds;
        assert_eq!(b.min_x, -20.0);
        assert_eq!(b.max_x, 270.0);
        assert_eq!(b.max_y, 70.0);
        assert_eq!(s.tower_bounds().max_x, 270.0);
    }

    #[test]
    fn two_room_snapshot() {
        let mut s = store();
        let update = s
            .apply_activity_snapshot(
                FloorId(1),
                &snap(&[("roomA", 0.1), ("roomB", 0.75)]),
                ActivitySource::Live,
            )
            .unwrap();
        assert_eq!(update.rooms_updated, 2);
        assert_eq!(update.bubble_count, 1);
        let bubbles = s.floor_bubbles(FloorId(1)).unwrap();
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles.first().map(|b| b.attendees), Some(30));
        assert!(s.floor(FloorId(1)).unwrap().active);
    }

    #[test]
    fn heat_tracks_applied_levels() {
        let mut s = store();
        let lab = s.floor(FloorId(3)).unwrap().heat.first().cloned().unwrap();
        assert_eq!(lab.heat_color, color::MEDIUM.to_hex());

        s.apply_activity_snapshot(
            FloorId(1),
            &snap(&[("roomA", 0.0), ("roomB", 1.0)]),
            ActivitySource::Live,
        )
        .unwrap();
        let heat = &s.floor(FloorId(1)).unwrap().heat;
        let colors: Vec<&str> = heat.iter().map(|h| h.heat_color.as_str()).collect();
        assert_eq!(colors, vec!["#3b82f6", "#ef4444"]);
        assert_eq!(heat.last().map(|h| h.pulse_intensity), Some(1.0));
    }

    #[test]
    fn levels_are_clamped() {
        let mut s = store();
        s.apply_activity_snapshot(
            FloorId(1),
            &snap(&[("roomA", -2.0), ("roomB", 9.5)]),
            ActivitySource::Live,
        )
        .unwrap();
        let rooms = &s.floor(FloorId(1)).unwrap().rooms;
        assert_eq!(rooms.first().map(|r| r.activity), Some(0.0));
        assert_eq!(rooms.get(1).map(|r| r.activity), Some(1.0));
    }

    #[test]
    fn non_finite_snapshot_changes_nothing() {
        let mut s = store();
        let before = s.view();
        let err = s
            .apply_activity_snapshot(
                FloorId(1),
                &snap(&[("roomA", 0.9), ("roomB", f64::NAN)]),
                ActivitySource::Live,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NonFiniteLevel { .. }));
        assert_eq!(s.view(), before);
    }

    #[test]
    fn unknown_floor_is_rejected() {
        let mut s = store();
        let err = s
            .apply_activity_snapshot(FloorId(99), &snap(&[]), ActivitySource::Live)
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownFloor(FloorId(99)));
        assert_eq!(
            s.set_focused_floor(Some(FloorId(99))).unwrap_err(),
            StoreError::UnknownFloor(FloorId(99))
        );
    }

    #[test]
    fn threshold_floor_is_inactive() {
        let mut s = store();
        s.apply_activity_snapshot(FloorId(3), &snap(&[("lab", 0.2)]), ActivitySource::Live)
            .unwrap();
        assert!(!s.floor(FloorId(3)).unwrap().active);
        assert!(s.floor_bubbles(FloorId(3)).unwrap().is_empty());
    }

    #[test]
    fn foreign_rooms_are_ignored() {
        let mut s = store();
        let update = s
            .apply_activity_snapshot(
                FloorId(1),
                &snap(&[("lab", 0.9), ("roomA", 0.5)]),
                ActivitySource::Live,
            )
            .unwrap();
        assert_eq!(update.rooms_updated, 1);
        assert_eq!(
            s.floor(FloorId(3)).unwrap().rooms.first().map(|r| r.activity),
            Some(0.5)
        );
    }

    #[test]
    fn focus_sets_binary_opacity() {
        let mut s = store();
        let change = s.set_focused_floor(Some(FloorId(3))).unwrap().unwrap();
        assert_eq!(change.focused, Some(FloorId(3)));
        assert_eq!(change.mode, CameraMode::Focused);
        assert_eq!(s.floor(FloorId(3)).unwrap().opacity, OPACITY_FULL);
        assert_eq!(s.floor(FloorId(1)).unwrap().opacity, OPACITY_GHOSTED);

        let back = s.set_focused_floor(None).unwrap().unwrap();
        assert_eq!(back.previous, Some(FloorId(3)));
        assert_eq!(back.mode, CameraMode::Overview);
        assert!(s.floors().all(|f| f.opacity == OPACITY_FULL));
    }

    #[test]
    fn repeated_focus_is_idempotent() {
        let mut s = store();
        assert!(s.set_focused_floor(Some(FloorId(3))).unwrap().is_some());
        let view = s.view();
        assert!(s.set_focused_floor(Some(FloorId(3))).unwrap().is_none());
        assert_eq!(s.view(), view);
        // Overview with nothing focused is already in effect at start.
        let mut fresh = store();
        assert!(fresh.set_focused_floor(None).unwrap().is_none());
    }

    #[test]
    fn orbital_clears_focus() {
        let mut s = store();
        s.set_focused_floor(Some(FloorId(1))).unwrap();
        let change = s.enter_orbital().unwrap();
        assert_eq!(change.mode, CameraMode::Orbital);
        assert_eq!(s.focused_floor(), None);
        assert!(s.floors().all(|f| f.opacity == OPACITY_FULL));
        assert!(s.enter_orbital().is_none());

        // Overview from orbit is a real change even with no focus.
        assert!(s.set_focused_floor(None).unwrap().is_some());
        assert_eq!(s.camera_mode(), CameraMode::Overview);
    }

    #[test]
    fn room_push_updates_one_room() {
        let mut s = store();
        let update = s.apply_room_activity(&RoomId::from("roomB"), 0.64).unwrap();
        assert_eq!(update.floor, FloorId(1));
        assert_eq!(update.rooms_updated, 1);
        let rooms = &s.floor(FloorId(1)).unwrap().rooms;
        assert_eq!(rooms.first().map(|r| r.activity), Some(0.0));
        assert_eq!(rooms.get(1).map(|r| r.activity), Some(0.64));
        assert_eq!(
            s.apply_room_activity(&RoomId::from("nope"), 0.5).unwrap_err(),
            StoreError::UnknownRoom(RoomId::from("nope"))
        );
    }

    #[test]
    fn source_and_timestamps_follow_snapshot() {
        let mut s = store();
        let snapshot = snap(&[("lab", 0.4)]);
        s.apply_activity_snapshot(FloorId(3), &snapshot, ActivitySource::Synthetic)
            .unwrap();
        let floor = s.floor(FloorId(3)).unwrap();
        assert_eq!(floor.source, ActivitySource::Synthetic);
        assert_eq!(floor.updated_at, Some(snapshot.taken_at));
        assert_eq!(s.last_update(), Some(snapshot.taken_at));
    }

    #[test]
    fn metrics() {
        let mut s = store();
        s.apply_activity_snapshot(
            FloorId(1),
            &snap(&[("roomA", 0.8), ("roomB", 0.2)]),
            ActivitySource::Live,
        )
        .unwrap();
        let m = s.tower_metrics();
        assert_eq!(m.floor_count, 2);
        assert_eq!(m.room_count, 3);
        assert!((m.average_activity - 0.5).abs() < 1e-12);
        assert_eq!(m.high_activity_rooms, 1);
        assert_eq!(m.bubble_count, 2);
        assert_eq!(m.active_floor_count, 2);
    }
}
