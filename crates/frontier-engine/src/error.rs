//! Error types for the engine binary.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: frontier_core::config::ConfigError,
    },

    /// The HTTP client for the pulse API could not be built.
    #[error("pulse client error: {message}")]
    PulseClient {
        /// Description of the failure.
        message: String,
    },

    /// The snapshot API server failed.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: frontier_observer::ServerError,
    },
}
