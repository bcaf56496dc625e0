//! Axum router construction for the observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled for the browser-based renderer.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router for the observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/tower` -- `WebSocket` stream of tower updates
/// - `GET /ws/floors/{id}` -- `WebSocket` stream of one floor
/// - `GET /api/tower` -- full tower view
/// - `GET /api/floors` -- floors in tower order
/// - `GET /api/floors/{id}` -- one floor with its bubbles
/// - `GET /api/bubbles` -- bubbles, optionally `?floor=9`
/// - `GET /api/camera` -- camera view sampled now
/// - `GET /api/metrics` -- aggregate activity figures
/// - `GET /api/health` -- liveness probe
/// - `GET /api/pulse` -- heartbeat scale, `?t=&intensity=&baseScale=`
/// - `GET /api/legend` -- event-type and activity colors
/// - `POST /api/focus` -- focus a floor, overview, or orbit
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/tower", get(ws::ws_tower))
        .route("/ws/floors/{id}", get(ws::ws_floor))
        // REST API
        .route("/api/tower", get(handlers::get_tower))
        .route("/api/floors", get(handlers::list_floors))
        .route("/api/floors/{id}", get(handlers::get_floor))
        .route("/api/bubbles", get(handlers::list_bubbles))
        .route("/api/camera", get(handlers::get_camera))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/health", get(handlers::health))
        .route("/api/pulse", get(handlers::get_pulse))
        .route("/api/legend", get(handlers::get_legend))
        .route("/api/focus", post(handlers::set_focus))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
