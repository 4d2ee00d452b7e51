use dsm_client::{AuthReason, DsmError};
use thiserror::Error;

/// High-level API errors for AudioStation operations.
///
/// This enum abstracts the DSM transport details into the categories the
/// caller needs to distinguish: transport failures, malformed responses,
/// terminal auth failures, device-reported rejections, and client-side
/// validation failures that never reach the network.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error (connection, timeout, HTTP status).
    #[error("network error: {0}")]
    Network(String),

    /// The device answered with something that could not be mapped into
    /// the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Login rejected; requires operator intervention.
    #[error("authentication failed: {0}")]
    Auth(AuthReason),

    /// The device rejected the request with an API error code, e.g. an
    /// unknown player id.
    #[error("device rejected {api} request with code {code}")]
    Device { api: String, code: i64 },

    /// Volume outside the accepted `0..=100` range, rejected before any
    /// network call. The device does not validate volume server-side and
    /// behaves unpredictably when sent an out-of-range value.
    #[error("volume {0} out of range 0..=100")]
    InvalidVolume(i64),
}

/// Type alias for results that can return an [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<DsmError> for ApiError {
    fn from(error: DsmError) -> Self {
        match error {
            DsmError::Network(msg) => ApiError::Network(msg),
            DsmError::Parse(msg) => ApiError::Parse(msg),
            DsmError::Auth(reason) => ApiError::Auth(reason),
            DsmError::Api { api, code } => ApiError::Device { api, code },
        }
    }
}
