use std::time::Duration;

const DEFAULT_PORT_HTTP: u16 = 5000;
const DEFAULT_PORT_HTTPS: u16 = 5001;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a DSM device, supplied once at client
/// construction.
///
/// Defaults follow common DSM installs: HTTPS on port 5001 with
/// certificate verification disabled (NAS devices usually run with a
/// self-signed certificate), a 10 second request timeout, and no device
/// token.
///
/// # Example
///
/// ```rust
/// use dsm_client::DsmConfig;
///
/// let config = DsmConfig::new("nas.local", "admin", "hunter2")
///     .port(5001)
///     .verify_tls(true);
/// assert_eq!(config.base_url(), "https://nas.local:5001");
/// ```
#[derive(Debug, Clone)]
pub struct DsmConfig {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    pub verify_tls: bool,
    pub username: String,
    pub password: String,
    pub device_token: Option<String>,
    pub timeout: Duration,
}

impl DsmConfig {
    /// Create a configuration with default port/TLS/timeout settings.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT_HTTPS,
            use_https: true,
            verify_tls: false,
            username: username.into(),
            password: password.into(),
            device_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Switch between HTTPS and plain HTTP. Disabling HTTPS also resets
    /// the port to the plain-HTTP default (5000) if it is still the HTTPS
    /// default, and vice versa.
    pub fn use_https(mut self, use_https: bool) -> Self {
        if !use_https && self.port == DEFAULT_PORT_HTTPS {
            self.port = DEFAULT_PORT_HTTP;
        } else if use_https && self.port == DEFAULT_PORT_HTTP {
            self.port = DEFAULT_PORT_HTTPS;
        }
        self.use_https = use_https;
        self
    }

    /// Whether to verify the device TLS certificate.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Provide a device token issued by a previous two-factor login,
    /// allowing OTP-free re-login.
    pub fn device_token(mut self, token: impl Into<String>) -> Self {
        self.device_token = Some(token.into());
        self
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the device web API, without a trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}
