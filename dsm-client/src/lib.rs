//! Blocking client for the Synology DSM web API.
//!
//! This crate provides the transport and session layer used by
//! `audiostation-api`. It speaks the DSM JSON envelope protocol
//! (`{"success": bool, "data": …, "error": {"code": n}}`), owns the
//! session token obtained from `SYNO.API.Auth`, and transparently
//! re-authenticates exactly once when the device reports that the
//! session has expired mid-call.

mod config;
mod error;

pub use config::DsmConfig;
pub use error::{AuthReason, DsmError, Result};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

const AUTH_API: &str = "SYNO.API.Auth";
const AUTH_VERSION: u32 = 6;
const AUTH_SESSION: &str = "AudioStation";
const AUTH_PATH: &str = "webapi/auth.cgi";
const ENTRY_PATH: &str = "webapi/entry.cgi";

/// HTTP method used for an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Per-device session state guarded by one mutex so that concurrent
/// callers never race a re-login.
#[derive(Debug, Default)]
struct SessionState {
    sid: Option<String>,
    device_token: Option<String>,
}

/// A blocking DSM web API client.
///
/// The client is `Send + Sync`; clones of an `Arc<DsmClient>` share one
/// session token and one HTTP connection pool. All calls block on network
/// I/O, so embedders must dispatch them off latency-sensitive threads.
///
/// # Session lifecycle
///
/// The first authenticated call (or an explicit [`DsmClient::login`])
/// performs the login. When a call fails with a session-expired error
/// code the client invalidates the token, re-logs-in once, and retries
/// the call once; a second failure is surfaced to the caller. Login
/// failures ([`DsmError::Auth`]) are never retried.
#[derive(Debug)]
pub struct DsmClient {
    agent: ureq::Agent,
    config: DsmConfig,
    session: Mutex<SessionState>,
}

impl DsmClient {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns `DsmError::Network` if the TLS connector cannot be
    /// constructed (only attempted when certificate verification is
    /// disabled).
    pub fn new(config: DsmConfig) -> Result<Self> {
        let mut builder = ureq::AgentBuilder::new().timeout(config.timeout);
        if config.use_https && !config.verify_tls {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| DsmError::Network(format!("TLS setup failed: {}", e)))?;
            builder = builder.tls_connector(Arc::new(connector));
        }
        let session = SessionState {
            sid: None,
            device_token: config.device_token.clone(),
        };
        Ok(Self {
            agent: builder.build(),
            config,
            session: Mutex::new(session),
        })
    }

    /// The connection settings this client was built with.
    pub fn config(&self) -> &DsmConfig {
        &self.config
    }

    /// Device token issued by the DSM, if any.
    ///
    /// Present after a login against a device that grants one, or when
    /// supplied via [`DsmConfig::device_token`]. Callers should persist
    /// it to allow OTP-free re-login.
    pub fn device_token(&self) -> Option<String> {
        self.session.lock().device_token.clone()
    }

    /// Log in eagerly. Calls that need a session also log in lazily, so
    /// this is only required to validate credentials up front.
    pub fn login(&self) -> Result<()> {
        let mut state = self.session.lock();
        if state.sid.is_none() {
            self.login_locked(&mut state)?;
        }
        Ok(())
    }

    /// Log out and discard the session token.
    ///
    /// Best effort: a failed logout only leaves a stale session on the
    /// device, so failures are logged at debug level and swallowed.
    pub fn logout(&self) {
        let sid = self.session.lock().sid.take();
        let Some(sid) = sid else { return };
        let url = format!("{}/{}", self.config.base_url(), AUTH_PATH);
        let result = self
            .agent
            .get(&url)
            .query("api", AUTH_API)
            .query("version", &AUTH_VERSION.to_string())
            .query("method", "logout")
            .query("session", AUTH_SESSION)
            .query("_sid", &sid)
            .call();
        if let Err(err) = result {
            debug!(host = %self.config.host, error = %err, "logout failed");
        }
    }

    /// Issue an authenticated GET against `entry.cgi`.
    pub fn get(
        &self,
        api: &str,
        method: &str,
        version: u32,
        params: &[(String, String)],
    ) -> Result<Value> {
        self.call(HttpMethod::Get, api, method, version, params, None)
    }

    /// Issue an authenticated POST (form-encoded) against `entry.cgi`.
    pub fn post(
        &self,
        api: &str,
        method: &str,
        version: u32,
        params: &[(String, String)],
    ) -> Result<Value> {
        self.call(HttpMethod::Post, api, method, version, params, None)
    }

    /// Issue an authenticated request, optionally overriding the
    /// configured timeout for this call only.
    ///
    /// Returns the full response envelope. A logical rejection
    /// (`success=false` without an error code, which the device uses for
    /// e.g. playlist updates it will not apply) is returned as a normal
    /// envelope for the caller to report, not as an error.
    ///
    /// # Errors
    ///
    /// * `DsmError::Network` on transport failure or timeout.
    /// * `DsmError::Parse` if the body is not a valid envelope.
    /// * `DsmError::Auth` if a (re-)login is needed and rejected.
    /// * `DsmError::Api` if the device reports an error code. A
    ///   session-expired code triggers one transparent re-login and one
    ///   retry before being surfaced.
    pub fn call(
        &self,
        http: HttpMethod,
        api: &str,
        method: &str,
        version: u32,
        params: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let sid = self.ensure_session()?;
        match self.request_once(http, api, method, version, params, &sid, timeout) {
            Err(err) if err.is_session_expired() => {
                debug!(api, method, "session expired, re-authenticating");
                let fresh = self.reauthenticate(&sid)?;
                self.request_once(http, api, method, version, params, &fresh, timeout)
            }
            other => other,
        }
    }

    fn ensure_session(&self) -> Result<String> {
        let mut state = self.session.lock();
        match &state.sid {
            Some(sid) => Ok(sid.clone()),
            None => self.login_locked(&mut state),
        }
    }

    /// Replace the token that a failed call used. If another caller
    /// already rotated it, reuse the fresh token instead of issuing a
    /// parallel login.
    fn reauthenticate(&self, stale: &str) -> Result<String> {
        let mut state = self.session.lock();
        match &state.sid {
            Some(current) if current != stale => Ok(current.clone()),
            _ => {
                state.sid = None;
                self.login_locked(&mut state)
            }
        }
    }

    fn login_locked(&self, state: &mut SessionState) -> Result<String> {
        debug!(host = %self.config.host, account = %self.config.username, "logging in");
        let url = format!("{}/{}", self.config.base_url(), AUTH_PATH);
        let mut request = self
            .agent
            .get(&url)
            .query("api", AUTH_API)
            .query("version", &AUTH_VERSION.to_string())
            .query("method", "login")
            .query("account", &self.config.username)
            .query("passwd", &self.config.password)
            .query("session", AUTH_SESSION)
            .query("format", "sid");
        if let Some(token) = &state.device_token {
            request = request.query("device_id", token);
        }

        let value = request_json(request.call())?;
        let success = envelope_success(AUTH_API, &value)?;
        if !success {
            let code = value
                .pointer("/error/code")
                .and_then(Value::as_i64)
                .unwrap_or(-1);
            return Err(DsmError::Auth(AuthReason::from_code(code)));
        }

        let sid = value
            .pointer("/data/sid")
            .and_then(Value::as_str)
            .ok_or_else(|| DsmError::Parse("login response missing sid".to_string()))?
            .to_string();
        if let Some(did) = value.pointer("/data/did").and_then(Value::as_str) {
            state.device_token = Some(did.to_string());
        }
        state.sid = Some(sid.clone());
        Ok(sid)
    }

    #[allow(clippy::too_many_arguments)]
    fn request_once(
        &self,
        http: HttpMethod,
        api: &str,
        method: &str,
        version: u32,
        params: &[(String, String)],
        sid: &str,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.config.base_url(), ENTRY_PATH);
        let base = [
            ("api".to_string(), api.to_string()),
            ("method".to_string(), method.to_string()),
            ("version".to_string(), version.to_string()),
            ("_sid".to_string(), sid.to_string()),
        ];

        let value = match http {
            HttpMethod::Get => {
                let mut request = self.agent.get(&url);
                if let Some(timeout) = timeout {
                    request = request.timeout(timeout);
                }
                for (key, val) in base.iter().chain(params.iter()) {
                    request = request.query(key, val);
                }
                request_json(request.call())?
            }
            HttpMethod::Post => {
                let mut request = self.agent.post(&url);
                if let Some(timeout) = timeout {
                    request = request.timeout(timeout);
                }
                let form: Vec<(&str, &str)> = base
                    .iter()
                    .chain(params.iter())
                    .map(|(key, val)| (key.as_str(), val.as_str()))
                    .collect();
                request_json(request.send_form(&form))?
            }
        };

        let success = envelope_success(api, &value)?;
        if !success {
            if let Some(code) = value.pointer("/error/code").and_then(Value::as_i64) {
                return Err(DsmError::Api {
                    api: api.to_string(),
                    code,
                });
            }
        }
        Ok(value)
    }
}

fn request_json(result: std::result::Result<ureq::Response, ureq::Error>) -> Result<Value> {
    let response = result.map_err(map_transport)?;
    response
        .into_json::<Value>()
        .map_err(|e| DsmError::Parse(format!("invalid JSON response: {}", e)))
}

fn envelope_success(api: &str, value: &Value) -> Result<bool> {
    value
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| DsmError::Parse(format!("{}: response missing success flag", api)))
}

fn map_transport(err: ureq::Error) -> DsmError {
    match err {
        ureq::Error::Status(code, _) => DsmError::Network(format!("HTTP status {}", code)),
        ureq::Error::Transport(transport) => DsmError::Network(transport.to_string()),
    }
}
