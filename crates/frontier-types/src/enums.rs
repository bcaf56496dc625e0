//! Enumeration types for the tower activity engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event classification
// ---------------------------------------------------------------------------

/// Kind of event a bubble represents, inferred from the room name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// AI research and lab sessions.
    #[serde(rename = "AI")]
    Ai,
    /// Crypto and web3 meetups.
    Crypto,
    /// Biotech and life-science gatherings.
    Biotech,
    /// Hands-on workshops.
    Workshop,
    /// Lounges, cafes, and other social spaces.
    Social,
    /// Anything that does not match a keyword.
    General,
}

impl EventType {
    /// Every event type in legend order.
    pub const ALL: [Self; 6] = [
        Self::Ai,
        Self::Crypto,
        Self::Biotech,
        Self::Workshop,
        Self::Social,
        Self::General,
    ];

    /// Display label used by the renderer's legend.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::Crypto => "Crypto",
            Self::Biotech => "Biotech",
            Self::Workshop => "Workshop",
            Self::Social => "Social",
            Self::General => "General",
        }
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// High-level camera framing mode held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CameraMode {
    /// Whole tower in view, every floor opaque.
    #[default]
    Overview,
    /// One floor framed, the others ghosted.
    Focused,
    /// Slow orbit around the tower with no floor focused.
    Orbital,
}

/// Phase of the camera transition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CameraPhase {
    /// Resting at a fixed pose.
    #[default]
    Idle,
    /// Interpolating toward a target pose.
    Animating,
    /// Circling the tower along the orbit path.
    Orbiting,
}

/// Easing curve applied to normalized transition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Easing {
    /// Cubic ease-in-out.
    Cubic,
    /// Quartic ease-in-out.
    Quartic,
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where a floor's current activity levels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ActivitySource {
    /// Layout hints or real pulse/push data.
    #[default]
    Live,
    /// Generated locally while the pulse API is unreachable.
    Synthetic,
}

/// Where the tower's room layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LayoutOrigin {
    /// Loaded from the configured layout resource.
    Resource,
    /// Built-in fallback layout.
    #[default]
    Synthetic,
}

/// Direction of a room's activity as reported by the pulse API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Activity is increasing.
    Rising,
    /// Activity is decreasing.
    Falling,
    /// Activity is roughly flat.
    Stable,
    /// Any value this engine does not know about.
    #[serde(other)]
    Unknown,
}
