//! Push channel listener.
//!
//! Subscribes to the configured NATS subject and applies each
//! `room_activity` message to the store as a single-room update. Other
//! message types are ignored. When the connection cannot be made, or the
//! subscription ends, the listener waits a fixed delay and tries again.

use std::time::Duration;

use frontier_core::config::PushConfig;
use frontier_core::handle::TowerHandle;
use frontier_types::PushMessage;
use futures::StreamExt as _;
use tracing::{debug, info, warn};

/// Errors from one connection attempt.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// Could not connect to the NATS server.
    #[error("failed to connect to NATS at {url}: {message}")]
    Connect {
        /// Server URL.
        url: String,
        /// Client detail.
        message: String,
    },

    /// Could not subscribe to the subject.
    #[error("failed to subscribe to {subject}: {message}")]
    Subscribe {
        /// Subject name.
        subject: String,
        /// Client detail.
        message: String,
    },
}

/// Apply one raw push payload to the tower.
///
/// Returns `true` when a room update was applied.
pub async fn handle_payload(tower: &TowerHandle, payload: &[u8]) -> bool {
    let message = match serde_json::from_slice::<PushMessage>(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "Failed to decode push message");
            return false;
        }
    };

    match message {
        PushMessage::RoomActivity {
            room_id,
            activity_level,
            ..
        } => match tower.apply_room_activity(&room_id, activity_level).await {
            Ok(update) => {
                debug!(
                    room = %room_id,
                    level = activity_level,
                    floor = %update.floor,
                    bubbles = update.bubble_count,
                    "Push update applied"
                );
                true
            }
            Err(e) => {
                warn!(room = %room_id, error = %e, "Push update rejected");
                false
            }
        },
        PushMessage::Other => false,
    }
}

async fn listen_once(config: &PushConfig, tower: &TowerHandle) -> Result<(), PushError> {
    let client = async_nats::connect(&config.nats_url)
        .await
        .map_err(|e| PushError::Connect {
            url: config.nats_url.clone(),
            message: e.to_string(),
        })?;
    let mut sub = client
        .subscribe(config.subject.clone())
        .await
        .map_err(|e| PushError::Subscribe {
            subject: config.subject.clone(),
            message: e.to_string(),
        })?;

    info!(subject = config.subject, "Push channel subscribed");
    while let Some(msg) = sub.next().await {
        handle_payload(tower, &msg.payload).await;
    }
    Ok(())
}

/// Listen on the push channel forever, reconnecting after a fixed delay.
pub async fn run_push_listener(config: PushConfig, tower: TowerHandle) {
    let delay = Duration::from_millis(config.reconnect_delay_ms);
    loop {
        match listen_once(&config, &tower).await {
            Ok(()) => warn!("Push subscription ended"),
            Err(e) => warn!(error = %e, "Push channel unavailable"),
        }
        debug!(?delay, "Reconnecting push channel after delay");
        tokio::time::sleep(delay).await;
    }
}
