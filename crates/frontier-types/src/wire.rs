//! Inbound payloads from the activity backend.
//!
//! - [`PulseResponse`] -- body of `GET /api/floors/{floor}/pulse`
//! - [`PushMessage`] -- messages on the optional push channel
//!
//! Timestamps are kept as the raw strings the backend sends; the backend
//! emits naive ISO-8601 values without an offset, which the engine never
//! needs to interpret.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::Trend;
use crate::ids::RoomId;
use crate::structs::ActivitySnapshot;

/// Per-room entry of a pulse response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPulse {
    /// Activity level, nominally in `[0, 1]`.
    pub level: f64,
    /// Activity direction, when the backend reports one.
    #[serde(default)]
    pub trend: Option<Trend>,
}

/// Summary block the backend attaches to a pulse response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseMetadata {
    /// Number of rooms on the floor.
    #[serde(default)]
    pub total_rooms: u32,
    /// Mean activity across the floor.
    #[serde(default)]
    pub average_activity: f64,
    /// Rooms above 0.7 activity.
    #[serde(default)]
    pub high_activity_rooms: u32,
}

/// Response body of the activity-pulse query for one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseResponse {
    /// Floor key echoed by the backend (e.g. `floor2`).
    #[serde(default)]
    pub floor_id: Option<String>,
    /// When the backend produced the pulse.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Per-room pulses.
    pub rooms: BTreeMap<RoomId, RoomPulse>,
    /// Overall activity scalar for the floor.
    #[serde(default)]
    pub overall_activity: Option<f64>,
    /// Optional summary block.
    #[serde(default)]
    pub metadata: Option<PulseMetadata>,
}

impl PulseResponse {
    /// Whether every level (and the overall scalar, if present) is finite.
    pub fn is_well_formed(&self) -> bool {
        self.rooms.values().all(|p| p.level.is_finite())
            && self.overall_activity.is_none_or(f64::is_finite)
    }

    /// Convert into an activity snapshot stamped with the current time.
    pub fn to_snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot::new(
            self.rooms
                .iter()
                .map(|(id, pulse)| (id.clone(), pulse.level))
                .collect(),
        )
    }
}

/// A message received on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// Activity update for a single room.
    RoomActivity {
        /// Room the update applies to.
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// New activity level.
        #[serde(rename = "activityLevel")]
        activity_level: f64,
        /// Backend timestamp (string or epoch number).
        #[serde(default)]
        timestamp: Option<serde_json::Value>,
    },
    /// Any other message type; ignored by the engine.
    #[serde(other)]
    Other,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn parse_backend_pulse() {
        let json = r#"{
            "floorId": "floor1",
            "timestamp": "2025-06-01T12:00:00.123456",
            "rooms": {
                "conf-room-1": {"level": 0.72, "timestamp": "2025-06-01T12:00:00"},
                "booth-1": {"level": 0.1, "trend": "falling"}
            },
            "metadata": {"totalRooms": 2, "averageActivity": 0.41, "highActivityRooms": 1}
        }"#;
        let pulse: PulseResponse = serde_json::from_str(json).unwrap_or_else(|e| {
            panic!("pulse should parse: {e}");
        });
        assert_eq!(pulse.rooms.len(), 2);
        assert!(pulse.is_well_formed());
        let booth = pulse.rooms.get(&RoomId::from("booth-1"));
        assert_eq!(booth.and_then(|p| p.trend), Some(Trend::Falling));
        assert_eq!(pulse.metadata.map(|m| m.high_activity_rooms), Some(1));

        let snapshot = pulse_snapshot_level(json, "conf-room-1");
        assert_eq!(snapshot, Some(0.72));
    }

    fn pulse_snapshot_level(json: &str, room: &str) -> Option<f64> {
        let pulse: PulseResponse = serde_json::from_str(json).ok()?;
        pulse.to_snapshot().level(&RoomId::from(room))
    }

    #[test]
    fn unknown_trend_is_tolerated() {
        let json = r#"{"rooms": {"a": {"level": 0.5, "trend": "sideways"}}}"#;
        let pulse: Result<PulseResponse, _> = serde_json::from_str(json);
        let trend = pulse
            .ok()
            .and_then(|p| p.rooms.get(&RoomId::from("a")).and_then(|r| r.trend));
        assert_eq!(trend, Some(Trend::Unknown));
    }

    #[test]
    fn missing_rooms_is_malformed() {
        let json = r#"{"error": "Floor floor7 not found", "floors": ["floor1"]}"#;
        assert!(serde_json::from_str::<PulseResponse>(json).is_err());
    }

    #[test]
    fn parse_room_activity_push() {
        let json = r#"{"type": "room_activity", "roomId": "lounge-1", "activityLevel": 0.64, "timestamp": 1717243200}"#;
        let msg: Result<PushMessage, _> = serde_json::from_str(json);
        match msg {
            Ok(PushMessage::RoomActivity {
                room_id,
                activity_level,
                ..
            }) => {
                assert_eq!(room_id, RoomId::from("lounge-1"));
                assert_eq!(activity_level, 0.64);
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn other_push_types_are_ignored() {
        let json = r#"{"type": "pong"}"#;
        let msg: Result<PushMessage, _> = serde_json::from_str(json);
        assert!(matches!(msg, Ok(PushMessage::Other)));
    }
}
