//! Type-safe identifiers for rooms and floors.
//!
//! Room identifiers come from the layout resource and the pulse API as
//! opaque strings (e.g. `conf-room-1`). Floors are addressed by their
//! building floor number; the layout resource and pulse API spell them
//! several ways (`floor2`, `2`, `Floor 2`), which [`FloorId::parse_key`]
//! normalizes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a room, as published by the layout resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoomId(pub String);

impl RoomId {
    /// Create a room identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Building floor number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct FloorId(pub u32);

impl FloorId {
    /// Return the floor number.
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Parse a floor key as used by the layout resource and pulse API.
    ///
    /// Accepts a bare number (`"9"`) or a number prefixed by `floor`
    /// in any case, optionally separated by a space, dash, or underscore
    /// (`"floor9"`, `"Floor 9"`, `"floor-9"`). Returns `None` otherwise.
    pub fn parse_key(key: &str) -> Option<Self> {
        let trimmed = key.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let digits = lowered
            .strip_prefix("floor")
            .map_or(lowered.as_str(), |rest| {
                rest.trim_start_matches([' ', '-', '_'])
            });
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }

    /// The canonical key used when talking to the pulse API (`floor{n}`).
    pub fn api_key(self) -> String {
        format!("floor{}", self.0)
    }
}

impl core::fmt::Display for FloorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FloorId {
    fn from(n: u32) -> Self {
        Self(n)
    }
}
