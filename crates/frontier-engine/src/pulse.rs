//! HTTP pulse source.
//!
//! [`HttpPulseSource`] fetches `GET {base_url}/api/floors/floor{n}/pulse`
//! and sorts failures into the scheduler's categories: transport errors
//! and timeouts are unreachable, a non-2xx answer is a status failure, and
//! a body that does not decode is malformed.

use std::time::Duration;

use frontier_core::config::PulseConfig;
use frontier_core::scheduler::{FetchError, PulseSource};
use frontier_types::{FloorId, PulseResponse};
use tracing::debug;

use crate::error::EngineError;

/// Pulse source backed by the activity REST API.
#[derive(Debug, Clone)]
pub struct HttpPulseSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPulseSource {
    /// Build a source with the configured base URL and request timeout.
    pub fn new(config: &PulseConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| EngineError::PulseClient {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// URL of the pulse endpoint for one floor.
    pub fn pulse_url(&self, floor: FloorId) -> String {
        format!("{}/api/floors/{}/pulse", self.base_url, floor.api_key())
    }
}

/// Map a transport-level `reqwest` failure to a fetch error.
fn classify(err: &reqwest::Error) -> FetchError {
    if err.is_decode() {
        return FetchError::Malformed {
            reason: err.to_string(),
        };
    }
    if let Some(status) = err.status() {
        return FetchError::Status {
            status: status.as_u16(),
        };
    }
    FetchError::Unreachable {
        reason: err.to_string(),
    }
}

impl PulseSource for HttpPulseSource {
    async fn fetch_pulse(&self, floor: FloorId) -> Result<PulseResponse, FetchError> {
        let url = self.pulse_url(floor);
        debug!(%floor, url, "Fetching pulse");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed {
            reason: e.to_string(),
        })
    }
}
