//! Core engine for the Frontier Tower activity visualization.
//!
//! Holds per-room and per-floor activity, derives event bubbles on every
//! update, maps activity to color and pulse, drives the camera between
//! overview and focused framing, and keeps activity fresh from the pulse
//! API on a fixed interval.
//!
//! # Modules
//!
//! - [`layout`] -- Room layout loading with a built-in fallback tower
//! - [`color`] -- Activity color ramp and heartbeat pulse (pure functions)
//! - [`bubbles`] -- Event bubble derivation from rooms and snapshots
//! - [`store`] -- The canonical tower state and its mutations
//! - [`handle`] -- Shared, announcing access to the store
//! - [`camera`] -- Camera transition state machine and framing poses
//! - [`scheduler`] -- Periodic pulse polling with a degraded synthetic mode
//! - [`runtime`] -- Wiring of store, camera frame task, and scheduler
//! - [`config`] -- YAML configuration

pub mod bubbles;
pub mod camera;
pub mod color;
pub mod config;
pub mod handle;
pub mod layout;
pub mod runtime;
pub mod scheduler;
pub mod store;
