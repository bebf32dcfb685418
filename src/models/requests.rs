//! Per-call read options
//!
//! TTL, payload validator and cancellation token for a single read.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Predicate over a decoded payload; `false` rejects it
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Options for [`crate::ApiClient::read`]
///
/// # Fields
/// - `ttl`: cache window; `None` or zero disables caching for the call
/// - `validate`: rejects payloads, cached or live
/// - `cancel`: aborts the live fetch when cancelled
#[derive(Clone, Default)]
pub struct ReadOptions {
    pub ttl: Option<Duration>,
    pub validate: Option<Validator>,
    pub cancel: Option<CancellationToken>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// TTL to cache under, if caching is enabled for the call.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.ttl.filter(|ttl| !ttl.is_zero())
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("ttl", &self.ttl)
            .field("validate", &self.validate.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}
