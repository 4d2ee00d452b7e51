//! Operation trait for AudioStation API calls.
//!
//! Each API call is described by a stateless type implementing
//! [`AudioStationOperation`]: the wire constants (API name, method,
//! protocol version, HTTP verb), a pure request-to-parameters mapping,
//! and a pure envelope-to-response mapping. Keeping both mappings pure
//! makes the positional queue-update semantics unit-testable without a
//! device.

use serde_json::Value;

use crate::error::Result;

pub use dsm_client::HttpMethod;

/// API key for remote player listing, queue queries and mutations, and
/// transport control.
pub const REMOTE_PLAYER_API: &str = "SYNO.AudioStation.RemotePlayer";
/// API key for remote player status polling.
pub const REMOTE_PLAYER_STATUS_API: &str = "SYNO.AudioStation.RemotePlayerStatus";

/// A single AudioStation API operation.
pub trait AudioStationOperation {
    /// Typed request data.
    type Request;
    /// Typed, normalized response data.
    type Response;

    /// DSM API key, e.g. `SYNO.AudioStation.RemotePlayer`.
    const API: &'static str;
    /// API method, e.g. `updateplaylist`.
    const METHOD: &'static str;
    /// Wire protocol version. The device silently rejects queue
    /// mutations carrying the wrong version.
    const VERSION: u32;
    /// HTTP verb the method is invoked with.
    const HTTP: HttpMethod;

    /// Map the request to wire parameters. Pure.
    fn build_params(request: &Self::Request) -> Result<Vec<(String, String)>>;

    /// Map the response envelope to the typed response. Pure.
    fn parse_response(envelope: &Value) -> Result<Self::Response>;
}

/// Prefix a raw player id with the `uuid:` scheme the remote player API
/// expects in its `id` parameter.
pub(crate) fn uuid_param(player_id: &str) -> String {
    format!("uuid:{}", player_id)
}
