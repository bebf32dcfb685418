//! Request/Response Pipeline
//!
//! The two interception points every call passes through. The request stage
//! attaches the bearer token and opens a [`RequestContext`]; the response
//! stage closes it, decodes the body and folds every failure into a
//! [`NormalizedError`].

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::credentials::CredentialStore;
use crate::error::NormalizedError;

/// Message used when no failure source has anything better to say
pub const FALLBACK_ERROR_MESSAGE: &str = "network error";

// == Request Context ==
/// Per-request metadata handed from the request stage to the response stage.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub url: String,
    pub started_at: Instant,
}

impl RequestContext {
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

// == Reply ==
/// Successful response: status and decoded JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub payload: Value,
}

// == Transport Failure ==
/// Everything that can go wrong between send and decode.
#[derive(Debug)]
pub enum TransportFailure {
    /// No response: connect error, timeout, invalid request
    Network(reqwest::Error),
    /// Response with a non-success status; body decoded if it was JSON,
    /// read error kept if it could not be read at all
    Http {
        status: StatusCode,
        body: Option<Value>,
        read_error: Option<String>,
    },
    /// Success status but the body could not be read or decoded
    Body { status: StatusCode, message: String },
}

impl TransportFailure {
    /// Status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Network(err) => err.status().map(|s| s.as_u16()),
            TransportFailure::Http { status, .. } | TransportFailure::Body { status, .. } => {
                Some(status.as_u16())
            }
        }
    }

    /// Picks the caller-facing message.
    ///
    /// Order: body `message`, body `error`, transport-level message, fallback.
    pub fn message(&self) -> String {
        let from_body = match self {
            TransportFailure::Http { body: Some(body), .. } => {
                body_field(body, "message").or_else(|| body_field(body, "error"))
            }
            _ => None,
        };

        let from_transport = match self {
            TransportFailure::Network(err) => Some(err.to_string()),
            TransportFailure::Body { message, .. } => Some(message.clone()),
            TransportFailure::Http { read_error, .. } => read_error.clone(),
        };

        from_body
            .or(from_transport.filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
    }

    pub fn normalize(&self) -> NormalizedError {
        NormalizedError::new(self.message(), self.status())
    }
}

/// Non-empty string field of a JSON object body.
fn body_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

// == Pipeline ==
/// Interception points wrapped around every request.
#[derive(Debug, Clone)]
pub struct Pipeline {
    credentials: Arc<dyn CredentialStore>,
    debug: bool,
}

impl Pipeline {
    pub fn new(credentials: Arc<dyn CredentialStore>, debug: bool) -> Self {
        Self { credentials, debug }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Request stage: attach credentials and open the request context.
    pub fn before_send(&self, mut request: Request) -> (Request, RequestContext) {
        if let Some(token) = self.credentials.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    request.headers_mut().insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("stored token is not a valid header value, sending unauthenticated"),
            }
        }

        let ctx = RequestContext {
            method: request.method().clone(),
            url: request.url().to_string(),
            started_at: Instant::now(),
        };

        if self.debug {
            debug!(method = %ctx.method, url = %ctx.url, "API >>");
        }

        (request, ctx)
    }

    /// Response stage: decode on success, normalize on failure.
    pub async fn after_receive(
        &self,
        ctx: RequestContext,
        outcome: reqwest::Result<Response>,
    ) -> Result<Reply, NormalizedError> {
        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Err(self.reject(&ctx, TransportFailure::Network(err))),
        };

        let status = response.status();
        if !status.is_success() {
            let (body, read_error) = match response.bytes().await {
                Ok(bytes) => (serde_json::from_slice::<Value>(&bytes).ok(), None),
                Err(err) => (None, Some(err.to_string())),
            };
            let failure = TransportFailure::Http {
                status,
                body,
                read_error,
            };
            return Err(self.reject(&ctx, failure));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let failure = TransportFailure::Body {
                    status,
                    message: err.to_string(),
                };
                return Err(self.reject(&ctx, failure));
            }
        };

        let payload = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(payload) => payload,
                Err(err) => {
                    let failure = TransportFailure::Body {
                        status,
                        message: format!("malformed response body: {}", err),
                    };
                    return Err(self.reject(&ctx, failure));
                }
            }
        };

        if self.debug {
            debug!(
                status = status.as_u16(),
                method = %ctx.method,
                url = %ctx.url,
                elapsed_ms = ctx.elapsed_ms(),
                "API <<"
            );
        }

        Ok(Reply {
            status: status.as_u16(),
            payload,
        })
    }

    /// Normalize a failure and trace it.
    pub fn reject(&self, ctx: &RequestContext, failure: TransportFailure) -> NormalizedError {
        let normalized = failure.normalize();
        if self.debug {
            debug!(
                status = ?normalized.status_code,
                method = %ctx.method,
                url = %ctx.url,
                message = %normalized.message,
                "API !!"
            );
        }
        normalized
    }

    /// Normalize a request that failed before it could be sent.
    pub fn reject_unsent(&self, method: Method, url: String, err: reqwest::Error) -> NormalizedError {
        let ctx = RequestContext {
            method,
            url,
            started_at: Instant::now(),
        };
        self.reject(&ctx, TransportFailure::Network(err))
    }
}
