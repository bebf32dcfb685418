//! Hextech API - client-side HTTP gateway
//!
//! Every data-fetching call goes through one [`ApiClient`]: bearer auth is
//! attached uniformly, failures come back as one error shape, and GET
//! responses can be memoized for a per-call TTL.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{ApiClient, ChampionsApi, CredentialStore, EnvCredentialStore, MemoryCredentialStore};
pub use config::ClientConfig;
pub use error::{ApiError, NormalizedError, Result};
pub use models::{Fetched, Origin, ReadOptions};
pub use tokio_util::sync::CancellationToken;
