//! Read-only snapshot surface for the Frontier Tower renderer.
//!
//! An Axum server exposing:
//!
//! - **REST endpoints** for the tower view, floors, bubbles, camera, and
//!   aggregate metrics
//! - **`WebSocket` endpoints**: `/ws/tower` streams a full view after
//!   every store change, `/ws/floors/{id}` streams one floor
//! - **`POST /api/focus`**, the single mutating endpoint, which routes
//!   through the store's focus operations
//!
//! Handlers hold the store's read lock only long enough to clone what
//! they return, so readers never observe a half-applied update.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, TowerUpdate, UpdateKind};
