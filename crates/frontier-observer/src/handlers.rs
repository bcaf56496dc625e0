//! REST endpoint handlers.
//!
//! Every read handler takes the store's read lock for one clone of the
//! data it returns. `POST /api/focus` is the only mutating endpoint and
//! goes through the store's focus operations.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/tower` | Full tower view |
//! | `GET` | `/api/floors` | Floors in tower order |
//! | `GET` | `/api/floors/{id}` | One floor with its bubbles |
//! | `GET` | `/api/bubbles` | Bubbles, optionally for one floor |
//! | `GET` | `/api/camera` | Camera view at the current instant |
//! | `GET` | `/api/metrics` | Aggregate activity figures |
//! | `GET` | `/api/health` | Liveness and loading state |
//! | `GET` | `/api/pulse` | Heartbeat scale at an instant |
//! | `GET` | `/api/legend` | Event-type and activity colors |
//! | `POST` | `/api/focus` | Focus a floor, return to overview, or orbit |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use frontier_core::{bubbles, color};
use frontier_types::{CameraMode, EventType, FloorId};
use serde::{Deserialize, Serialize};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/bubbles`.
#[derive(Debug, Deserialize)]
pub struct BubblesQuery {
    /// Restrict to one floor (`9`, `floor9`, ...).
    pub floor: Option<String>,
}

/// Request body for `POST /api/focus`.
#[derive(Debug, Deserialize)]
pub struct FocusRequest {
    /// Floor to focus, or `null` for the overview.
    #[serde(default)]
    pub floor: Option<u32>,
    /// Orbit the tower instead of focusing.
    #[serde(default)]
    pub orbital: bool,
}

/// Query parameters for `GET /api/pulse`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseQuery {
    /// Wall-clock milliseconds; defaults to now.
    pub t: Option<u64>,
    /// Pulse strength; wins over `activity` when both are given.
    pub intensity: Option<f64>,
    /// Activity level to derive the intensity from.
    pub activity: Option<f64>,
    /// Scale at rest; defaults to 1.
    pub base_scale: Option<f64>,
}

/// Response body for `POST /api/focus`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FocusResponse {
    /// Whether the request changed anything.
    changed: bool,
    /// Focused floor after the request.
    focused_floor: Option<FloorId>,
    /// Camera mode after the request.
    camera_mode: CameraMode,
}

fn parse_floor(raw: &str) -> Result<FloorId, ObserverError> {
    FloorId::parse_key(raw).ok_or_else(|| ObserverError::InvalidFloor(raw.to_owned()))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with tower status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = state.tower.read().await.tower_metrics();
    let floors = metrics.floor_count;
    let rooms = metrics.room_count;
    let bubbles = metrics.bubble_count;
    let active = metrics.active_floor_count;
    let average = format!("{:.2}", metrics.average_activity);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Frontier Tower</title>
    <style>
        body {{ background: #0d1117; color: #c9d1d9; font-family: monospace; padding: 2rem; }}
        h1 {{ color: #58a6ff; }}
        .metric {{ display: inline-block; background: #161b22; border: 1px solid #30363d;
                   border-radius: 6px; padding: 1rem 1.5rem; margin: 0.5rem 0.5rem 0.5rem 0; }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Frontier Tower</h1>
    <div>
        <div class="metric"><div class="label">Floors</div><div class="value">{floors}</div></div>
        <div class="metric"><div class="label">Active floors</div><div class="value">{active}</div></div>
        <div class="metric"><div class="label">Rooms</div><div class="value">{rooms}</div></div>
        <div class="metric"><div class="label">Bubbles</div><div class="value">{bubbles}</div></div>
        <div class="metric"><div class="label">Avg activity</div><div class="value">{average}</div></div>
    </div>
    <ul>
        <li><a href="/api/tower">/api/tower</a></li>
        <li><a href="/api/floors">/api/floors</a></li>
        <li><a href="/api/bubbles">/api/bubbles</a></li>
        <li><a href="/api/camera">/api/camera</a></li>
        <li><a href="/api/metrics">/api/metrics</a></li>
        <li><a href="/api/health">/api/health</a></li>
        <li><a href="/api/pulse">/api/pulse</a></li>
        <li><a href="/api/legend">/api/legend</a></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Return the full tower view.
pub async fn get_tower(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.tower.view().await)
}

/// List floors in tower order.
pub async fn list_floors(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let store = state.tower.read().await;
    let floors: Vec<_> = store.floors().collect();
    Ok(Json(serde_json::json!({
        "count": floors.len(),
        "focusedFloor": store.focused_floor(),
        "floors": floors,
    })))
}

/// Return one floor together with its bubbles.
pub async fn get_floor(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_floor(&raw)?;
    let store = state.tower.read().await;
    let floor = store
        .floor(id)
        .ok_or_else(|| ObserverError::NotFound(format!("floor {id}")))?;
    Ok(Json(serde_json::json!({
        "floor": floor,
        "bubbles": store.floor_bubbles(id).unwrap_or_default(),
    })))
}

/// List bubbles, optionally restricted to one floor.
pub async fn list_bubbles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BubblesQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let store = state.tower.read().await;
    let bubbles: Vec<_> = match params.floor.as_deref() {
        Some(raw) => {
            let id = parse_floor(raw)?;
            store
                .floor_bubbles(id)
                .ok_or_else(|| ObserverError::NotFound(format!("floor {id}")))?
                .iter()
                .collect()
        }
        None => store.bubbles().collect(),
    };
    Ok(Json(serde_json::json!({
        "count": bubbles.len(),
        "bubbles": bubbles,
    })))
}

/// Return the camera view sampled now.
pub async fn get_camera(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.camera.view().await)
}

/// Return aggregate activity figures.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.tower.read().await.tower_metrics())
}

/// Liveness probe with loading state and uptime.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.tower.read().await;
    let uptime = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();
    Json(serde_json::json!({
        "status": "ok",
        "loading": store.is_loading(),
        "layoutOrigin": store.layout_origin(),
        "lastUpdate": store.last_update(),
        "uptimeSeconds": uptime,
    }))
}

/// Sample the heartbeat pulse.
///
/// Stateless: the same `t`, intensity, and base scale always give the
/// same scale, so clients can sample it independently.
pub async fn get_pulse(
    Query(params): Query<PulseQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let time_ms = params
        .t
        .unwrap_or_else(|| u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default());
    let intensity = params
        .intensity
        .unwrap_or_else(|| params.activity.map_or(1.0, color::pulse_intensity));
    let base_scale = params.base_scale.unwrap_or(1.0);
    if !intensity.is_finite() || !base_scale.is_finite() {
        return Err(ObserverError::InvalidRequest(
            "intensity and baseScale must be finite".to_owned(),
        ));
    }

    Ok(Json(serde_json::json!({
        "timeMs": time_ms,
        "heartbeat": color::heartbeat(time_ms),
        "intensity": intensity,
        "baseScale": base_scale,
        "scale": color::pulse_scale(time_ms, intensity, base_scale),
    })))
}

/// Colors for the renderer's legend.
pub async fn get_legend() -> impl IntoResponse {
    let event_types: Vec<_> = EventType::ALL
        .iter()
        .map(|&event_type| {
            serde_json::json!({
                "eventType": event_type,
                "label": event_type.label(),
                "color": bubbles::event_color(event_type),
            })
        })
        .collect();
    let activity: Vec<_> = [0.0, 0.25, 0.5, 0.75, 1.0]
        .iter()
        .map(|&level| {
            serde_json::json!({
                "level": level,
                "color": color::activity_color_hex(level),
            })
        })
        .collect();
    Json(serde_json::json!({
        "eventTypes": event_types,
        "activity": activity,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/focus
// ---------------------------------------------------------------------------

/// Focus a floor, return to the overview, or start orbiting.
///
/// `{"floor": 9}` focuses floor 9, `{"floor": null}` returns to the
/// overview, and `{"orbital": true}` orbits the tower. Repeating the
/// current focus succeeds with `changed: false`.
pub async fn set_focus(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FocusRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let change = match (request.orbital, request.floor) {
        (true, Some(_)) => {
            return Err(ObserverError::InvalidRequest(
                "orbital and floor are mutually exclusive".to_owned(),
            ));
        }
        (true, None) => state.tower.enter_orbital().await,
        (false, floor) => state.tower.set_focused_floor(floor.map(FloorId)).await?,
    };

    let store = state.tower.read().await;
    Ok(Json(FocusResponse {
        changed: change.is_some(),
        focused_floor: store.focused_floor(),
        camera_mode: store.camera_mode(),
    }))
}
