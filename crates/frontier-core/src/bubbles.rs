//! Bubble derivation: rooms plus an activity snapshot in, event bubbles out.
//!
//! Derivation is a pure transform. It never mutates rooms, never draws
//! randomness, and emits bubbles in room order, so the same inputs always
//! give the same output.

use frontier_types::{ActivitySnapshot, EventBubble, EventType, FloorId, Room, Vec3};

/// Rooms at or below this activity produce no bubble and do not mark their
/// floor active.
pub const LIVELINESS_THRESHOLD: f64 = 0.2;

/// Smallest bubble radius.
pub const BASE_SIZE: f64 = 8.0;

/// Largest bubble radius.
pub const MAX_SIZE: f64 = 24.0;

/// Activity-to-radius multiplier before clamping.
pub const SIZE_SCALE: f64 = 30.0;

/// Vertical extent of one floor band, in layout units.
pub const FLOOR_HEIGHT: f64 = 60.0;

/// Ordered keyword table. The first keyword found in the lowercased room
/// name decides the event type.
const KEYWORDS: [(&str, EventType); 6] = [
    ("lab", EventType::Ai),
    ("crypto", EventType::Crypto),
    ("bio", EventType::Biotech),
    ("workshop", EventType::Workshop),
    ("lounge", EventType::Social),
    ("cafe", EventType::Social),
];

/// Where a floor sits in the tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorPlacement {
    /// Floor the bubbles belong to.
    pub floor: FloorId,
    /// Elevation of the floor's base plane.
    pub elevation: f64,
}

impl FloorPlacement {
    /// Placement of the floor at ordinal `level` (0 = lowest).
    pub fn at_level(floor: FloorId, level: u32) -> Self {
        Self {
            floor,
            elevation: f64::from(level) * FLOOR_HEIGHT,
        }
    }

    /// Elevation of the middle of the floor's vertical band.
    pub fn band_center(&self) -> f64 {
        FLOOR_HEIGHT.mul_add(0.5, self.elevation)
    }
}

/// Infer the event type from a room name.
pub fn classify_event_type(room_name: &str) -> EventType {
    let lowered = room_name.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map_or(EventType::General, |&(_, event_type)| event_type)
}

/// Fill color for an event type.
pub const fn event_color(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Ai => "#8b5cf6",
        EventType::Crypto => "#f59e0b",
        EventType::Biotech => "#10b981",
        EventType::Workshop => "#3b82f6",
        EventType::Social => "#ec4899",
        EventType::General => "#6b7280",
    }
}

/// Bubble radius for an activity level, clamped to `[BASE_SIZE, MAX_SIZE]`.
pub fn bubble_size(activity: f64) -> f64 {
    (activity * SIZE_SCALE).clamp(BASE_SIZE, MAX_SIZE)
}

/// Estimated attendee count: `round(activity * capacity)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_attendees(activity: f64, capacity: u32) -> u32 {
    // activity is in [0, 1], so the product lies in [0, capacity].
    (activity.clamp(0.0, 1.0) * f64::from(capacity))
        .round()
        .clamp(0.0, f64::from(capacity)) as u32
}

/// Whether an activity level clears the liveliness threshold.
pub fn is_lively(activity: f64) -> bool {
    activity > LIVELINESS_THRESHOLD
}

/// Effective activity of `room`: the snapshot's level (clamped) if present,
/// otherwise the room's stored level.
fn effective_activity(room: &Room, snapshot: &ActivitySnapshot) -> f64 {
    snapshot
        .level(&room.id)
        .filter(|level| level.is_finite())
        .map_or(room.activity, |level| level.clamp(0.0, 1.0))
}

/// Derive the bubble set for one floor.
pub fn derive(
    placement: FloorPlacement,
    rooms: &[Room],
    snapshot: &ActivitySnapshot,
) -> Vec<EventBubble> {
    let y = placement.band_center();
    rooms
        .iter()
        .filter_map(|room| {
            let activity = effective_activity(room, snapshot);
            if !is_lively(activity) {
                return None;
            }
            let event_type = classify_event_type(&room.name);
            let (cx, cz) = room.center();
            Some(EventBubble {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                floor: placement.floor,
                position: Vec3::new(cx, y, cz),
                size: bubble_size(activity),
                color: event_color(event_type).to_owned(),
                event_type,
                attendees: estimate_attendees(activity, room.capacity),
                active: true,
                pulse_intensity: activity,
            })
        })
        .collect()
}
