//! Client Module
//!
//! The outbound HTTP gateway: transport, request/response pipeline,
//! credential lookup, single-flight reads and the public [`ApiClient`].

mod api;
pub mod champions;
pub mod credentials;
pub mod pipeline;
pub mod single_flight;
pub mod transport;

pub use api::ApiClient;
pub use champions::ChampionsApi;
pub use credentials::{CredentialStore, EnvCredentialStore, MemoryCredentialStore, TOKEN_KEY};
pub use pipeline::{Pipeline, Reply, RequestContext, TransportFailure, FALLBACK_ERROR_MESSAGE};
pub use transport::Transport;
