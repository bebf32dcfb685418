//! Configuration Module
//!
//! Handles loading and managing client configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default backend address when `API_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Client configuration parameters.
///
/// Read once at startup and handed to [`crate::ApiClient::new`]; the client
/// never consults the environment on its own.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address every relative path is joined onto
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// Emit request/response trace lines
    pub debug: bool,
    /// Coalesce concurrent cache-eligible reads for the same key
    pub single_flight: bool,
}

impl ClientConfig {
    /// Creates a new ClientConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Backend address (default: http://localhost:8080)
    /// - `API_TIMEOUT_MS` - Request timeout in milliseconds (default: 10000)
    /// - `DEBUG_API` - `true` enables request tracing (default: false)
    /// - `API_SINGLE_FLIGHT` - `false` disables read coalescing (default: true)
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_millis(
                env::var("API_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            ),
            debug: env::var("DEBUG_API")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            single_flight: env::var("API_SINGLE_FLIGHT")
                .map(|v| !v.trim().eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        }
    }

    /// Sets the base address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables debug tracing.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enables or disables single-flight coalescing of reads.
    pub fn with_single_flight(mut self, single_flight: bool) -> Self {
        self.single_flight = single_flight;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            debug: false,
            single_flight: true,
        }
    }
}

/// Only the literal `true` (any case) turns a flag on.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
