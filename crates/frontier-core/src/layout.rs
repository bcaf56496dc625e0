//! Room layout loading with a built-in fallback tower.
//!
//! The layout resource is a JSON object keyed by floor identifier, each
//! entry an ordered list of room records:
//!
//! ```json
//! {
//!   "floor2": [
//!     {"id": "conf-room-1", "name": "Innovation Lab", "x": 50, "y": 100,
//!      "width": 120, "height": 80, "capacity": 12, "baseActivityHeat": 0.7}
//!   ]
//! }
//! ```
//!
//! [`resolve_layout`] never fails: when the resource is missing or invalid
//! it logs the reason and returns [`synthetic_layout`] instead.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use frontier_types::{FloorId, LayoutOrigin, Room, RoomId};
use serde::Deserialize;
use tracing::{info, warn};

/// Errors that can occur while loading a layout resource.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The resource could not be read.
    #[error("failed to read layout {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The resource is not valid layout JSON.
    #[error("failed to parse layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A floor key could not be interpreted as a floor number.
    #[error("unrecognized floor key: {0}")]
    UnknownFloorKey(String),

    /// Two keys name the same floor (e.g. `floor2` and `2`).
    #[error("floor {0} appears more than once")]
    DuplicateFloor(FloorId),

    /// A room id appears more than once in the tower.
    #[error("room {0} appears more than once")]
    DuplicateRoom(RoomId),

    /// A room record has invalid geometry or capacity.
    #[error("invalid room {room}: {reason}")]
    InvalidRoom {
        /// The offending room.
        room: RoomId,
        /// What is wrong with it.
        reason: String,
    },

    /// The resource contains no rooms at all.
    #[error("layout contains no rooms")]
    Empty,
}

/// A room record as it appears in the layout resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomRecord {
    id: String,
    name: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    capacity: u32,
    #[serde(default, rename = "baseActivityHeat", alias = "activityHint")]
    activity_hint: Option<f64>,
}

/// Rooms of one floor in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorLayout {
    /// Building floor number.
    pub floor: FloorId,
    /// Rooms with their initial activity.
    pub rooms: Vec<Room>,
}

/// Every floor of the tower, lowest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerLayout {
    /// Floors sorted by floor number.
    pub floors: Vec<FloorLayout>,
}

impl TowerLayout {
    /// Total number of rooms across floors.
    pub fn room_count(&self) -> usize {
        self.floors.iter().map(|f| f.rooms.len()).sum()
    }
}

/// A layout together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    /// The floors and rooms.
    pub layout: TowerLayout,
    /// Resource or built-in fallback.
    pub origin: LayoutOrigin,
}

/// Parse and validate a layout resource.
///
/// # Errors
///
/// Returns a [`LayoutError`] if the JSON is malformed, a floor key is not
/// a floor number, ids collide, a room has non-positive extent, negative
/// or non-finite position, or zero capacity, or there are no rooms.
pub fn parse_layout(json: &str) -> Result<TowerLayout, LayoutError> {
    let raw: BTreeMap<String, Vec<RoomRecord>> = serde_json::from_str(json)?;

    let mut by_floor: BTreeMap<FloorId, Vec<Room>> = BTreeMap::new();
    let mut seen_rooms = BTreeSet::new();

    for (key, records) in raw {
        let floor = FloorId::parse_key(&key).ok_or(LayoutError::UnknownFloorKey(key))?;
        if by_floor.contains_key(&floor) {
            return Err(LayoutError::DuplicateFloor(floor));
        }
        let mut rooms = Vec::with_capacity(records.len());
        for record in records {
            let room = validate_record(record)?;
            if !seen_rooms.insert(room.id.clone()) {
                return Err(LayoutError::DuplicateRoom(room.id));
            }
            rooms.push(room);
        }
        by_floor.insert(floor, rooms);
    }

    let layout = TowerLayout {
        floors: by_floor
            .into_iter()
            .filter(|(_, rooms)| !rooms.is_empty())
            .map(|(floor, rooms)| FloorLayout { floor, rooms })
            .collect(),
    };
    if layout.floors.is_empty() {
        return Err(LayoutError::Empty);
    }
    Ok(layout)
}

/// Read and parse a layout resource from disk.
///
/// # Errors
///
/// Returns [`LayoutError::Io`] if the file cannot be read, otherwise any
/// error from [`parse_layout`].
pub fn load_layout(path: &Path) -> Result<TowerLayout, LayoutError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_layout(&contents)
}

/// Load the configured layout, falling back to [`synthetic_layout`].
pub fn resolve_layout(path: Option<&Path>) -> ResolvedLayout {
    let Some(path) = path else {
        info!("no layout resource configured, using built-in tower layout");
        return ResolvedLayout {
            layout: synthetic_layout(),
            origin: LayoutOrigin::Synthetic,
        };
    };

    match load_layout(path) {
        Ok(layout) => {
            info!(
                path = %path.display(),
                floors = layout.floors.len(),
                rooms = layout.room_count(),
                "layout loaded"
            );
            ResolvedLayout {
                layout,
                origin: LayoutOrigin::Resource,
            }
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "layout unavailable, using built-in tower layout"
            );
            ResolvedLayout {
                layout: synthetic_layout(),
                origin: LayoutOrigin::Synthetic,
            }
        }
    }
}

fn validate_record(record: RoomRecord) -> Result<Room, LayoutError> {
    let id = RoomId(record.id);
    let invalid = |reason: &str| LayoutError::InvalidRoom {
        room: id.clone(),
        reason: reason.to_owned(),
    };

    if record.capacity == 0 {
        return Err(invalid("capacity must be at least 1"));
    }
    let coords = [record.x, record.y, record.width, record.height];
    if coords.iter().any(|v| !v.is_finite()) {
        return Err(invalid("geometry must be finite"));
    }
    if record.x < 0.0 || record.y < 0.0 {
        return Err(invalid("position must not be negative"));
    }
    if record.width <= 0.0 || record.height <= 0.0 {
        return Err(invalid("extent must be positive"));
    }
    let activity = match record.activity_hint {
        Some(hint) if !hint.is_finite() => return Err(invalid("activity hint must be finite")),
        Some(hint) => hint.clamp(0.0, 1.0),
        None => 0.0,
    };

    Ok(Room {
        id,
        name: record.name,
        x: record.x,
        y: record.y,
        width: record.width,
        height: record.height,
        capacity: record.capacity,
        activity,
    })
}

// ---------------------------------------------------------------------------
// Built-in tower
// ---------------------------------------------------------------------------

/// Rooms per row in the built-in grid.
const GRID_COLUMNS: u32 = 3;
/// Built-in room footprint.
const GRID_ROOM_WIDTH: f64 = 120.0;
const GRID_ROOM_HEIGHT: f64 = 80.0;
/// Gap between built-in rooms and from the origin.
const GRID_GAP: f64 = 30.0;

/// `(id, name, capacity, activity hint)` per built-in floor.
type RoomSeed = (&'static str, &'static str, u32, f64);

const SYNTHETIC_FLOORS: [(u32, &[RoomSeed]); 5] = [
    (
        2,
        &[
            ("f2-stage", "Main Stage Lounge", 60, 0.7),
            ("f2-hack", "Hackathon Workshop", 30, 0.5),
            ("f2-cafe", "Community Cafe", 25, 0.6),
            ("f2-breakout", "Breakout Room A", 10, 0.15),
        ],
    ),
    (
        4,
        &[
            ("f4-robotics", "Robotics Lab", 16, 0.8),
            ("f4-hardware", "Hardware Workshop", 20, 0.4),
            ("f4-bay", "Prototype Bay", 8, 0.25),
            ("f4-pod", "Focus Pod", 2, 0.1),
        ],
    ),
    (
        9,
        &[
            ("f9-ai", "AI Research Lab", 24, 0.9),
            ("f9-training", "Model Training Lab", 12, 0.55),
            ("f9-seminar", "Seminar Room", 40, 0.3),
            ("f9-quiet", "Quiet Lounge", 12, 0.2),
        ],
    ),
    (
        15,
        &[
            ("f15-biohack", "Biohacking Studio", 14, 0.65),
            ("f15-neuro", "Neuro Commons", 20, 0.35),
            ("f15-reading", "Bio Reading Room", 10, 0.12),
        ],
    ),
    (
        16,
        &[
            ("f16-trading", "Crypto Trading Floor", 30, 0.75),
            ("f16-dao", "DAO Governance Room", 18, 0.45),
            ("f16-cafe", "Crypto Cafe", 22, 0.5),
            ("f16-roof", "Rooftop Lounge", 50, 0.85),
        ],
    ),
];

/// Deterministic fallback layout for the tower's live floors.
///
/// Floors 2, 4, 9, 15 and 16, each a three-column grid of rooms whose
/// names cover every event-type keyword.
pub fn synthetic_layout() -> TowerLayout {
    let floors = SYNTHETIC_FLOORS
        .iter()
        .map(|(floor, seeds)| FloorLayout {
            floor: FloorId(*floor),
            rooms: seeds
                .iter()
                .zip(0_u32..)
                .map(|(seed, slot)| synthetic_room(seed, slot))
                .collect(),
        })
        .collect();
    TowerLayout { floors }
}

fn synthetic_room(&(id, name, capacity, hint): &RoomSeed, slot: u32) -> Room {
    let column = f64::from(slot % GRID_COLUMNS);
    let row = f64::from(slot / GRID_COLUMNS);
    Room {
        id: RoomId::from(id),
        name: name.to_owned(),
        x: (GRID_ROOM_WIDTH + GRID_GAP).mul_add(column, GRID_GAP),
        y: (GRID_ROOM_HEIGHT + GRID_GAP).mul_add(row, GRID_GAP),
        width: GRID_ROOM_WIDTH,
        height: GRID_ROOM_HEIGHT,
        capacity,
        activity: hint,
    }
}
