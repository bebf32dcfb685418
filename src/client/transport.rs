//! Transport
//!
//! Configured HTTP client holding the base address and request timeout. It
//! only builds and executes requests; authentication, tracing and error
//! normalization belong to the pipeline.

use reqwest::{Client, Request, Response, Url};
use serde_json::Value;

use crate::cache::canonical_json;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// Client for the backend API
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    /// Create a new Transport from the client configuration
    ///
    /// # Returns
    /// * `Ok(Transport)` - ready to send requests
    /// * `Err(ApiError::Config)` - if the base URL is not an http(s) URL with a host, or the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self> {
        check_base_url(&config.base_url)?;

        let mut builder = Client::builder();
        if !config.timeout.is_zero() {
            builder = builder.timeout(config.timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a request path against the base address
    ///
    /// Absolute `http(s)://` paths are used unchanged.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a GET request with flattened query parameters
    pub fn get(&self, path: &str, query: &[(String, String)]) -> reqwest::Result<Request> {
        let mut builder = self.client.get(self.url_for(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder.build()
    }

    /// Build a POST request with an optional JSON body
    pub fn post(&self, path: &str, body: Option<&Value>) -> reqwest::Result<Request> {
        let mut builder = self.client.post(self.url_for(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.build()
    }

    /// Send a prepared request
    pub async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        self.client.execute(request).await
    }
}

/// Base address must be an `http(s)` URL with a host
fn check_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::Config(format!("base URL '{}': {}", base_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Config(format!(
            "base URL '{}': scheme must be http or https, got '{}'",
            base_url,
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::Config(format!("base URL '{}': missing host", base_url)));
    }
    Ok(())
}

/// Flatten query parameters into `key=value` pairs
///
/// Fields come out in sorted order. Strings are sent verbatim, numbers and
/// booleans as their JSON text, `null` is dropped, arrays repeat the key and
/// nested objects are sent as canonical JSON.
pub fn query_pairs(params: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = params else {
        return Vec::new();
    };

    let mut names: Vec<&String> = map.keys().collect();
    names.sort();

    let mut pairs = Vec::with_capacity(names.len());
    for name in names {
        match &map[name] {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = query_text(item) {
                        pairs.push((name.clone(), text));
                    }
                }
            }
            value => {
                if let Some(text) = query_text(value) {
                    pairs.push((name.clone(), text));
                }
            }
        }
    }
    pairs
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(canonical_json(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn transport(base: &str) -> Transport {
        Transport::new(&ClientConfig::default().with_base_url(base)).unwrap()
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let t = transport("http://localhost:8080/");
        assert_eq!(t.url_for("/api/champions/stats"), "http://localhost:8080/api/champions/stats");
        assert_eq!(t.url_for("api/champions"), "http://localhost:8080/api/champions");
    }

    #[test]
    fn test_url_for_keeps_absolute_urls() {
        let t = transport("http://localhost:8080");
        assert_eq!(t.url_for("https://cdn.example.com/x.json"), "https://cdn.example.com/x.json");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = Transport::new(&ClientConfig::default().with_base_url("not a url"));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_base_url_without_scheme_is_config_error() {
        // Parses as scheme "localhost" with path "8080"
        for base in ["localhost:8080", "mailto:dev@example.com", "file:///tmp/api"] {
            let result = Transport::new(&ClientConfig::default().with_base_url(base));
            assert!(matches!(result, Err(ApiError::Config(_))), "{} should be rejected", base);
        }
    }

    #[test]
    fn test_https_base_url_is_accepted() {
        let t = transport("https://api.example.com/v1");
        assert_eq!(t.url_for("/items"), "https://api.example.com/v1/items");
    }

    #[test]
    fn test_zero_timeout_is_accepted() {
        let config = ClientConfig::default().with_timeout(Duration::ZERO);
        assert!(Transport::new(&config).is_ok());
    }

    #[test]
    fn test_get_request_carries_query() {
        let t = transport("http://localhost:8080");
        let query = query_pairs(Some(&json!({"role": "mid", "page": 2})));
        let request = t.get("/api/champions", &query).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/api/champions?page=2&role=mid"
        );
    }

    #[test]
    fn test_post_request_carries_json_body() {
        let t = transport("http://localhost:8080");
        let request = t.post("/api/login", Some(&json!({"user": "teemo"}))).unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/json"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"user":"teemo"}"#);
    }

    #[test]
    fn test_query_pairs_flattening() {
        let params = json!({
            "q": "ahri",
            "limit": 10,
            "ranked": true,
            "skip": null,
            "roles": ["mid", "support"],
            "range": {"to": 2, "from": 1}
        });

        assert_eq!(
            query_pairs(Some(&params)),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("q".to_string(), "ahri".to_string()),
                ("range".to_string(), r#"{"from":1,"to":2}"#.to_string()),
                ("ranked".to_string(), "true".to_string()),
                ("roles".to_string(), "mid".to_string()),
                ("roles".to_string(), "support".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_without_params() {
        assert!(query_pairs(None).is_empty());
        assert!(query_pairs(Some(&json!({}))).is_empty());
    }
}
