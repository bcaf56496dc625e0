//! `WebSocket` streams of tower updates.
//!
//! Two endpoints share one connection loop:
//!
//! - `GET /ws/tower` sends a `connected` message, the current view as a
//!   `snapshot`, and then one [`TowerUpdate`] per store change.
//! - `GET /ws/floors/{id}` sends a `connected` message and a snapshot of
//!   one floor, then a [`FloorFeedUpdate`] for each activity change on a
//!   subscribed floor and for each focus change.
//!
//! Clients may send `{"type": "ping"}` (answered with `pong`) and
//! `{"type": "subscribe", "channel": "floor-pulse-9"}`, which adds a floor
//! to a floor stream. A client that falls behind skips to the newest
//! change; every message carries current state, so only intermediate
//! frames are lost.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use frontier_core::handle::TowerChange;
use frontier_core::store::TowerStore;
use frontier_types::{CameraMode, EventBubble, FloorData, FloorId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::{AppState, TowerUpdate, UpdateKind};

/// Channel name prefix clients use to subscribe to a floor.
pub const FLOOR_CHANNEL_PREFIX: &str = "floor-pulse-";

/// Control message sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Liveness check.
    Ping,
    /// Add a floor channel to this stream.
    Subscribe {
        /// Channel name, e.g. `floor-pulse-9`.
        channel: String,
    },
    /// Anything else; ignored.
    #[serde(other)]
    Other,
}

/// Control message sent to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// First message on every connection.
    Connected {
        /// Channel name (`tower` or `floor-pulse-N`).
        channel: String,
        /// Floor of a floor stream.
        #[serde(skip_serializing_if = "Option::is_none")]
        floor: Option<FloorId>,
    },
    /// Reply to a ping.
    Pong,
    /// A subscription was accepted.
    Subscribed {
        /// The accepted channel.
        channel: String,
    },
    /// A client message could not be honored.
    Error {
        /// What went wrong.
        message: String,
    },
}

/// Per-floor state pushed on a floor stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorFeedUpdate {
    /// What prompted the update.
    pub kind: UpdateKind,
    /// The floor after the change.
    pub floor: FloorData,
    /// Bubbles on that floor.
    pub bubbles: Vec<EventBubble>,
    /// Focused floor after the change.
    pub focused_floor: Option<FloorId>,
    /// Camera mode after the change.
    pub camera_mode: CameraMode,
}

impl FloorFeedUpdate {
    /// Read the current state of `floor` from the store.
    pub fn read(store: &TowerStore, floor: FloorId, kind: UpdateKind) -> Option<Self> {
        Some(Self {
            kind,
            floor: store.floor(floor)?.clone(),
            bubbles: store.floor_bubbles(floor)?.to_vec(),
            focused_floor: store.focused_floor(),
            camera_mode: store.camera_mode(),
        })
    }
}

/// Which changes a connection receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamScope {
    /// Every change, as full tower views.
    Tower,
    /// Activity on these floors plus focus changes, as floor updates.
    Floors(BTreeSet<FloorId>),
}

impl StreamScope {
    /// Whether `change` should be sent on this stream.
    pub fn wants(&self, change: &TowerChange) -> bool {
        match (self, change) {
            (Self::Tower, _) | (Self::Floors(_), TowerChange::Focus(_)) => true,
            (Self::Floors(floors), TowerChange::Activity(update)) => {
                floors.contains(&update.floor)
            }
        }
    }

    /// Handle a text frame from the client, returning the reply to send.
    ///
    /// `is_known` reports whether a floor exists in the tower.
    pub fn handle_client_text(
        &mut self,
        text: &str,
        is_known: impl Fn(FloorId) -> bool,
    ) -> Option<ControlMessage> {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(m) => m,
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable client message");
                return None;
            }
        };
        match message {
            ClientMessage::Ping => Some(ControlMessage::Pong),
            ClientMessage::Subscribe { channel } => Some(self.subscribe(channel, is_known)),
            ClientMessage::Other => None,
        }
    }

    fn subscribe(&mut self, channel: String, is_known: impl Fn(FloorId) -> bool) -> ControlMessage {
        let floor = channel
            .strip_prefix(FLOOR_CHANNEL_PREFIX)
            .and_then(FloorId::parse_key);
        match floor {
            Some(floor) if is_known(floor) => {
                if let Self::Floors(floors) = self {
                    floors.insert(floor);
                }
                ControlMessage::Subscribed { channel }
            }
            Some(floor) => ControlMessage::Error {
                message: format!("unknown floor {floor}"),
            },
            None => ControlMessage::Error {
                message: format!("unknown channel {channel}"),
            },
        }
    }
}

/// Upgrade to a `WebSocket` and stream tower updates.
///
/// # Route
///
/// `GET /ws/tower`
pub async fn ws_tower(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state, StreamScope::Tower))
}

/// Upgrade to a `WebSocket` and stream one floor.
///
/// The floor is checked before the upgrade, so an unknown floor is a
/// plain 404 and an unreadable one a 400.
///
/// # Route
///
/// `GET /ws/floors/{id}`
pub async fn ws_floor(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ObserverError> {
    let floor =
        FloorId::parse_key(&raw).ok_or_else(|| ObserverError::InvalidFloor(raw.clone()))?;
    if state.tower.read().await.floor(floor).is_none() {
        return Err(ObserverError::NotFound(format!("floor {floor}")));
    }
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    let scope = StreamScope::Floors(BTreeSet::from([floor]));
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, state, scope)))
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, message: &T) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "Failed to serialize stream message");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Send the state after `change` (or the initial snapshot), shaped for the scope.
async fn send_state(
    socket: &mut WebSocket,
    state: &AppState,
    scope: &StreamScope,
    change: Option<&TowerChange>,
) -> bool {
    match scope {
        StreamScope::Tower => {
            let view = state.tower.view().await;
            let update = match change {
                Some(c) => TowerUpdate::from_change(c, view),
                None => TowerUpdate {
                    kind: UpdateKind::Snapshot,
                    floor: None,
                    view,
                },
            };
            send_json(socket, &update).await
        }
        StreamScope::Floors(floors) => {
            let (kind, targets): (UpdateKind, Vec<FloorId>) = match change {
                None => (UpdateKind::Snapshot, floors.iter().copied().collect()),
                Some(TowerChange::Activity(update)) => (UpdateKind::Activity, vec![update.floor]),
                Some(TowerChange::Focus(_)) => {
                    (UpdateKind::Focus, floors.iter().copied().collect())
                }
            };
            let updates: Vec<FloorFeedUpdate> = {
                let store = state.tower.read().await;
                targets
                    .into_iter()
                    .filter_map(|floor| FloorFeedUpdate::read(&store, floor, kind))
                    .collect()
            };
            for update in &updates {
                if !send_json(socket, update).await {
                    return false;
                }
            }
            true
        }
    }
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, mut scope: StreamScope) {
    debug!(scope = ?scope, "WebSocket client connected");

    // Subscribe before taking the initial state so no change slips between.
    let mut rx = state.subscribe();
    let connected = match &scope {
        StreamScope::Tower => ControlMessage::Connected {
            channel: "tower".to_owned(),
            floor: None,
        },
        StreamScope::Floors(floors) => {
            let floor = floors.iter().next().copied();
            ControlMessage::Connected {
                channel: floor.map_or_else(String::new, |f| {
                    format!("{FLOOR_CHANNEL_PREFIX}{}", f.number())
                }),
                floor,
            }
        }
    };
    if !send_json(&mut socket, &connected).await
        || !send_state(&mut socket, &state, &scope, None).await
    {
        debug!("WebSocket client disconnected before initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(change) => {
                        if scope.wants(&change)
                            && !send_state(&mut socket, &state, &scope, Some(&change)).await
                        {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Change channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        let reply = {
                            let store = state.tower.read().await;
                            scope.handle_client_text(text.as_str(), |f| store.floor(f).is_some())
                        };
                        if let Some(reply) = reply {
                            if !send_json(&mut socket, &reply).await {
                                return;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
