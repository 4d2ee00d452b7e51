use thiserror::Error;

/// DSM API error codes that indicate the session token is no longer valid.
///
/// 105: insufficient privilege (stale token after permission change),
/// 106: session timeout, 107: session interrupted by a duplicate login,
/// 119: SID not found.
const SESSION_EXPIRED_CODES: [i64; 4] = [105, 106, 107, 119];

/// Reason a DSM login attempt was rejected.
///
/// These are terminal conditions that require operator intervention
/// (fixing credentials, re-enabling the account, completing a two-factor
/// flow) and are never retried automatically.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthReason {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    AccountDisabled,
    #[error("permission denied")]
    PermissionDenied,
    #[error("two-factor authentication required")]
    TwoFactorRequired,
    #[error("two-factor authentication failed")]
    TwoFactorFailed,
    #[error("login rejected with code {0}")]
    Unknown(i64),
}

impl AuthReason {
    /// Map a `SYNO.API.Auth` error code to a login failure reason.
    pub fn from_code(code: i64) -> Self {
        match code {
            400 => AuthReason::InvalidCredentials,
            401 => AuthReason::AccountDisabled,
            402 => AuthReason::PermissionDenied,
            403 => AuthReason::TwoFactorRequired,
            404 => AuthReason::TwoFactorFailed,
            other => AuthReason::Unknown(other),
        }
    }
}

/// Errors raised by the DSM client.
#[derive(Debug, Error)]
pub enum DsmError {
    /// Network-level failure: connection refused, timeout, non-200 HTTP
    /// status, TLS handshake problems.
    #[error("network error: {0}")]
    Network(String),

    /// The device answered, but the response body was not the expected
    /// JSON envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Login was rejected. Not retried automatically.
    #[error("authentication failed: {0}")]
    Auth(AuthReason),

    /// The device rejected an authenticated request with an API error code.
    #[error("api {api} returned error code {code}")]
    Api { api: String, code: i64 },
}

impl DsmError {
    /// Whether this error means the held session token is no longer valid
    /// and a re-login may transparently recover the call.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, DsmError::Api { code, .. } if SESSION_EXPIRED_CODES.contains(code))
    }
}

/// Type alias for results that can return a [`DsmError`].
pub type Result<T> = std::result::Result<T, DsmError>;
