//! API Client
//!
//! Entry points every data-fetching call goes through: cached reads, live
//! writes and cache invalidation.
//!
//! # Read path
//! 1. Derive the cache key from path and canonical parameters
//! 2. With a non-zero TTL, serve a fresh entry (validated) without touching the network
//! 3. Otherwise fetch through transport and pipeline, honoring cancellation
//! 4. Validate and decode; only then store the payload if the call is cache-eligible

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::{CacheKey, CacheStats, CacheStore};
use crate::client::credentials::{CredentialStore, EnvCredentialStore};
use crate::client::pipeline::{Pipeline, Reply};
use crate::client::single_flight::InFlight;
use crate::client::transport::{query_pairs, Transport};
use crate::config::ClientConfig;
use crate::error::{ApiError, NormalizedError, Result};
use crate::models::{Fetched, ReadOptions, Validator};

type FetchResult = std::result::Result<Reply, NormalizedError>;

// == Gateway ==
/// Transport wrapped in the request/response pipeline.
#[derive(Debug)]
struct Gateway {
    transport: Transport,
    pipeline: Pipeline,
}

impl Gateway {
    async fn get(&self, path: &str, query: &[(String, String)]) -> FetchResult {
        let request = self
            .transport
            .get(path, query)
            .map_err(|e| self.pipeline.reject_unsent(Method::GET, self.transport.url_for(path), e))?;
        self.dispatch(request).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> FetchResult {
        let request = self
            .transport
            .post(path, body)
            .map_err(|e| self.pipeline.reject_unsent(Method::POST, self.transport.url_for(path), e))?;
        self.dispatch(request).await
    }

    /// Request stage, send, response stage; in that order, every time.
    async fn dispatch(&self, request: reqwest::Request) -> FetchResult {
        let (request, ctx) = self.pipeline.before_send(request);
        let outcome = self.transport.execute(request).await;
        self.pipeline.after_receive(ctx, outcome).await
    }
}

// == Api Client ==
/// Outbound gateway shared by every call site.
///
/// Cloning is cheap and clones share the cache, so build one client at
/// startup and hand it out.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<Gateway>,
    cache: Arc<Mutex<CacheStore>>,
    in_flight: Option<InFlight<FetchResult>>,
}

impl ApiClient {
    // == Constructors ==
    /// Creates a client that reads its bearer token from the environment.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_credentials(config, Arc::new(EnvCredentialStore))
    }

    /// Creates a client with an explicit credential store.
    pub fn with_credentials(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let pipeline = Pipeline::new(credentials, config.debug);

        debug!(
            base_url = transport.base_url(),
            timeout_ms = config.timeout.as_millis() as u64,
            single_flight = config.single_flight,
            "API client initialized"
        );

        Ok(Self {
            gateway: Arc::new(Gateway {
                transport,
                pipeline,
            }),
            cache: Arc::new(Mutex::new(CacheStore::new())),
            in_flight: config.single_flight.then(InFlight::new),
        })
    }

    pub fn base_url(&self) -> &str {
        self.gateway.transport.base_url()
    }

    // == Read ==
    /// GET `path`, optionally served from the cache.
    ///
    /// # Arguments
    /// * `path` - Path relative to the base address
    /// * `params` - Query parameters; must be a JSON object (or absent)
    /// * `options` - TTL, validator and cancellation token
    ///
    /// # Errors
    /// * `ApiError::Format` - validator rejected the payload, or it does not decode into `T`
    /// * `ApiError::Cancelled` - token cancelled before the response arrived
    /// * `ApiError::Normalized` - network or HTTP failure
    pub async fn read<T>(&self, path: &str, params: Option<&Value>, options: &ReadOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.read_with_origin(path, params, options)
            .await
            .map(Fetched::into_value)
    }

    /// Same as [`ApiClient::read`], reporting whether the value was cached.
    pub async fn read_with_origin<T>(
        &self,
        path: &str,
        params: Option<&Value>,
        options: &ReadOptions,
    ) -> Result<Fetched<T>>
    where
        T: DeserializeOwned,
    {
        check_params(params)?;
        let key = CacheKey::new(path, params);
        let ttl = options.cache_ttl();

        if let Some(ttl) = ttl {
            let hit = self.cache.lock().get_fresh(&key, ttl);
            if let Some(entry) = hit {
                // A cached payload that fails validation is an error, not a miss
                let value = accept(&entry.payload, options.validate.as_ref())?;
                return Ok(Fetched::cached(value, entry.cached_at));
            }
        }

        let reply = self
            .fetch(path, &key, params, ttl.is_some(), options.cancel.as_ref())
            .await?;
        let value = accept(&reply.payload, options.validate.as_ref())?;

        if ttl.is_some() {
            self.cache.lock().insert(key, reply.payload);
        }

        Ok(Fetched::network(value))
    }

    async fn fetch(
        &self,
        path: &str,
        key: &CacheKey,
        params: Option<&Value>,
        cache_eligible: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<Reply> {
        let gateway = Arc::clone(&self.gateway);
        let path = path.to_string();
        let query = query_pairs(params);
        let start = move || async move { gateway.get(&path, &query).await }.boxed();

        let pending: BoxFuture<'static, FetchResult> = match &self.in_flight {
            Some(in_flight) if cache_eligible => {
                let (shared, joined) = in_flight.join_or_start(key.as_str(), start);
                if joined {
                    debug!(key = %key, "joined pending fetch");
                    self.cache.lock().record_coalesced();
                }
                shared.boxed()
            }
            _ => start(),
        };

        cancellable(cancel, async move { pending.await.map_err(ApiError::from) }).await
    }

    // == Write ==
    /// POST `body` to `path` and decode the response.
    ///
    /// Never reads or writes the cache; invalidate with
    /// [`ApiClient::clear_cache`] afterwards if needed.
    pub async fn write<T>(
        &self,
        path: &str,
        body: Option<&Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let reply = cancellable(cancel, async {
            self.gateway.post(path, body).await.map_err(ApiError::from)
        })
        .await?;

        T::deserialize(&reply.payload).map_err(|e| {
            NormalizedError::new(format!("unexpected response body: {}", e), Some(reply.status))
                .into()
        })
    }

    /// [`ApiClient::write`] with any serializable body.
    pub async fn write_json<T, B>(
        &self,
        path: &str,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.write(path, Some(&body), cancel).await
    }

    // == Cache Control ==
    /// Removes every cached entry, or those whose key starts with `prefix`.
    ///
    /// Returns how many entries were removed.
    pub fn clear_cache(&self, prefix: Option<&str>) -> usize {
        self.cache.lock().clear(prefix)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Number of coalesced fetches still waiting on the network.
    pub fn pending_fetches(&self) -> usize {
        self.in_flight.as_ref().map_or(0, InFlight::pending)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url())
            .field("debug", &self.gateway.pipeline.debug())
            .field("cached_entries", &self.cache.lock().len())
            .field("single_flight", &self.in_flight.is_some())
            .finish()
    }
}

// == Helpers ==
/// Runs `fut` unless `cancel` fires first.
///
/// An already-cancelled token wins without polling `fut`, so nothing is sent.
async fn cancellable<T, F>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        },
        None => fut.await,
    }
}

fn check_params(params: Option<&Value>) -> Result<()> {
    match params {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ApiError::InvalidRequest(
            "query parameters must be a JSON object".to_string(),
        )),
    }
}

/// Validates a payload and decodes it into `T`.
fn accept<T: DeserializeOwned>(payload: &Value, validate: Option<&Validator>) -> Result<T> {
    if let Some(validate) = validate {
        if !validate(payload) {
            return Err(ApiError::Format("payload rejected by validator".to_string()));
        }
    }
    T::deserialize(payload).map_err(|e| ApiError::Format(e.to_string()))
}
