//! Shared type definitions for the Frontier Tower activity engine.
//!
//! This crate is the single source of truth for the data the engine holds
//! and hands to the rendering collaborator. Renderer-facing types flow to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Room and floor identifiers
//! - [`enums`] -- Event types, camera modes, provenance flags
//! - [`structs`] -- Geometry, rooms, floors, bubbles, and renderer views
//! - [`wire`] -- Pulse API responses and push-channel messages

pub mod enums;
pub mod ids;
pub mod structs;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use enums::{ActivitySource, CameraMode, CameraPhase, Easing, EventType, LayoutOrigin, Trend};
pub use ids::{FloorId, RoomId};
pub use structs::{
    ActivitySnapshot, BoundingBox, CameraPose, CameraView, EventBubble, FloorData, Room,
    RoomHeat, TowerMetrics, TowerView, Vec3,
};
pub use wire::{PulseMetadata, PulseResponse, PushMessage, RoomPulse};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for renderer-facing types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::RoomId::export_all();
        let _ = crate::ids::FloorId::export_all();

        let _ = crate::enums::EventType::export_all();
        let _ = crate::enums::CameraMode::export_all();
        let _ = crate::enums::CameraPhase::export_all();
        let _ = crate::enums::Easing::export_all();
        let _ = crate::enums::ActivitySource::export_all();
        let _ = crate::enums::LayoutOrigin::export_all();

        let _ = crate::structs::Vec3::export_all();
        let _ = crate::structs::CameraPose::export_all();
        let _ = crate::structs::BoundingBox::export_all();
        let _ = crate::structs::Room::export_all();
        let _ = crate::structs::FloorData::export_all();
        let _ = crate::structs::EventBubble::export_all();
        let _ = crate::structs::TowerMetrics::export_all();
        let _ = crate::structs::TowerView::export_all();
        let _ = crate::structs::CameraView::export_all();
    }
}
