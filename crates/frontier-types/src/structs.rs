//! Core entity structs: geometry, rooms, floors, bubbles, and the
//! read-only views handed to the rendering collaborator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActivitySource, CameraMode, CameraPhase, EventType, LayoutOrigin};
use crate::ids::{FloorId, RoomId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in the renderer's 3D space.
///
/// `x`/`z` span the layout plane (layout `x`/`y`), `y` is elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// Horizontal axis (layout x).
    pub x: f64,
    /// Vertical axis (elevation).
    pub y: f64,
    /// Depth axis (layout y).
    pub z: f64,
}

impl Vec3 {
    /// Construct a point from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation between `self` and `other`.
    ///
    /// Written as `a * (1 - t) + b * t` so that `t = 0` yields exactly
    /// `self` and `t = 1` yields exactly `other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self {
            x: self.x.mul_add(s, other.x * t),
            y: self.y.mul_add(s, other.y * t),
            z: self.z.mul_add(s, other.z * t),
        }
    }
}

/// Camera placement: where it sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CameraPose {
    /// Camera position.
    pub position: Vec3,
    /// Look-at point.
    pub look_at: Vec3,
}

impl CameraPose {
    /// Construct a pose.
    pub const fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Interpolate position and look-at independently.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            look_at: self.look_at.lerp(other.look_at, t),
        }
    }
}

/// Axis-aligned rectangle on the layout plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// Smallest layout x.
    pub min_x: f64,
    /// Smallest layout y.
    pub min_y: f64,
    /// Largest layout x.
    pub max_x: f64,
    /// Largest layout y.
    pub max_y: f64,
}

impl BoundingBox {
    /// Extent along layout x.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along layout y.
    pub fn depth(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point on the layout plane as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

// ---------------------------------------------------------------------------
// Rooms and floors
// ---------------------------------------------------------------------------

/// A room with its static geometry and current activity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Display name shown on the floor plan.
    pub name: String,
    /// Left edge on the layout plane.
    pub x: f64,
    /// Top edge on the layout plane.
    pub y: f64,
    /// Extent along layout x.
    pub width: f64,
    /// Extent along layout y.
    pub height: f64,
    /// Seating capacity (at least 1).
    pub capacity: u32,
    /// Current activity level in `[0, 1]`.
    pub activity: f64,
}

impl Room {
    /// Center of the room on the layout plane as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (self.width.mul_add(0.5, self.x), self.height.mul_add(0.5, self.y))
    }
}

/// One floor of the tower as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FloorData {
    /// Building floor number.
    pub floor: FloorId,
    /// Ordinal position in the loaded tower (0 = lowest floor).
    pub level: u32,
    /// Display label (e.g. `Floor 9`).
    pub label: String,
    /// Rooms in layout order.
    pub rooms: Vec<Room>,
    /// Rendering opacity: 1.0 or 0.1 (ghosted).
    pub opacity: f64,
    /// True when any room is above the liveliness threshold.
    pub active: bool,
    /// Room extents plus padding.
    pub bounds: BoundingBox,
    /// Provenance of the current activity levels.
    pub source: ActivitySource,
    /// When activity on this floor last changed.
    pub updated_at: Option<DateTime<Utc>>,
    /// Heat-map values per room, in room order.
    pub heat: Vec<RoomHeat>,
}

/// Heat-map rendering values for one room, derived from its activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RoomHeat {
    /// Room the values belong to.
    pub room_id: RoomId,
    /// Fill color on the activity ramp (`#rrggbb`).
    pub heat_color: String,
    /// Translucent stroke/halo color (`rgba(...)`).
    pub halo_color: String,
    /// Heartbeat strength: `0.1 + 0.9 * activity`.
    pub pulse_intensity: f64,
}

/// Derived visual entity for a room above the liveliness threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EventBubble {
    /// Room the bubble belongs to.
    pub room_id: RoomId,
    /// Room display name.
    pub room_name: String,
    /// Floor the room is on.
    pub floor: FloorId,
    /// Anchor point in 3D space.
    pub position: Vec3,
    /// Rendered radius.
    pub size: f64,
    /// Fill color (`#rrggbb`) for the event type.
    pub color: String,
    /// Event classification inferred from the room name.
    pub event_type: EventType,
    /// Estimated attendee count.
    pub attendees: u32,
    /// Whether the room is above the liveliness threshold.
    pub active: bool,
    /// Pulse strength, equal to the room's activity.
    pub pulse_intensity: f64,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time room activity levels for one floor.
///
/// Levels are raw inputs; the store clamps them on apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    /// Activity level per room.
    pub levels: BTreeMap<RoomId, f64>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl ActivitySnapshot {
    /// Snapshot of the given levels stamped with the current time.
    pub fn new(levels: BTreeMap<RoomId, f64>) -> Self {
        Self {
            levels,
            taken_at: Utc::now(),
        }
    }

    /// Degenerate snapshot covering a single room.
    pub fn single(room: RoomId, level: f64) -> Self {
        let mut levels = BTreeMap::new();
        levels.insert(room, level);
        Self::new(levels)
    }

    /// Level for `room`, if present.
    pub fn level(&self, room: &RoomId) -> Option<f64> {
        self.levels.get(room).copied()
    }
}

/// Aggregate activity figures across the tower.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TowerMetrics {
    /// Number of floors.
    pub floor_count: u32,
    /// Number of rooms across all floors.
    pub room_count: u32,
    /// Mean room activity (0 when there are no rooms).
    pub average_activity: f64,
    /// Rooms above 0.7 activity.
    pub high_activity_rooms: u32,
    /// Current bubble count.
    pub bubble_count: u32,
    /// Floors with the active flag set.
    pub active_floor_count: u32,
}

/// Read-only snapshot of the whole tower for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TowerView {
    /// Floors in tower order.
    pub floors: Vec<FloorData>,
    /// Bubbles across all floors, in floor then room order.
    pub bubbles: Vec<EventBubble>,
    /// Focused floor, if any.
    pub focused_floor: Option<FloorId>,
    /// Camera framing mode.
    pub camera_mode: CameraMode,
    /// True until the layout has been loaded.
    pub loading: bool,
    /// When any activity last changed.
    pub last_update: Option<DateTime<Utc>>,
    /// Provenance of the room layout.
    pub layout_origin: LayoutOrigin,
    /// Aggregate figures.
    pub metrics: TowerMetrics,
}

/// Read-only snapshot of the camera for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CameraView {
    /// Framing mode.
    pub mode: CameraMode,
    /// State machine phase.
    pub phase: CameraPhase,
    /// Pose at the sampling instant.
    pub pose: CameraPose,
    /// Pose the camera is heading to (equal to `pose` when idle).
    pub target: CameraPose,
}
