// GraphQL HTTP client for the GitHub aggregation endpoint.
// Handles authentication, rate limiting, and mapping service responses to errors.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, USER_AGENT},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{BlogError, Result};

use super::operations::{Operation, OperationKind};
use super::types::RateLimit;

/// A fully-merged request ready to be sent.
#[derive(Debug, Clone)]
pub struct GraphQlRequest {
    pub operation: &'static Operation,
    pub variables: Value,
}

/// Sends GraphQL requests and returns the `data` member of the response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value>;
}

/// The reader's own token, swapped on login and logout.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.token().is_some()
    }
}

/// Connection settings for [`GraphQlClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub app_id: Option<String>,
    pub origin: Option<String>,
    /// Service token used for anonymous reads.
    pub service_token: Option<String>,
    /// Name of the variable the service token came from, for error messages.
    pub service_token_env: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// GraphQL client with authentication and rate limit tracking.
pub struct GraphQlClient {
    client: Client,
    settings: ClientSettings,
    credentials: Credentials,
    rate_limit: Mutex<RateLimit>,
}

impl GraphQlClient {
    /// Create a new client. Reads use the viewer token when logged in,
    /// otherwise the service token; mutations always need the viewer token.
    pub fn new(settings: ClientSettings, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("issuepress"));
        if let Some(origin) = &settings.origin {
            headers.insert(
                ORIGIN,
                HeaderValue::from_str(origin).map_err(|e| BlogError::Other(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(BlogError::Api)?;

        Ok(Self {
            client,
            settings,
            credentials,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn token_for(&self, kind: OperationKind) -> Result<String> {
        match (kind, self.credentials.token()) {
            (_, Some(token)) => Ok(token),
            (OperationKind::Mutation, None) => Err(BlogError::Unauthorized),
            (OperationKind::Query, None) => self
                .settings
                .service_token
                .clone()
                .ok_or_else(|| BlogError::MissingToken(self.settings.service_token_env.clone())),
        }
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let mut rate_limit = self.rate_limit.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(BlogError::Unauthorized),
            StatusCode::NOT_FOUND => Err(BlogError::NotFound(response.url().to_string())),
            StatusCode::FORBIDDEN => {
                let rate_limit = self.rate_limit();
                if rate_limit.limit > 0 && rate_limit.remaining == 0 {
                    let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                        .map(|dt| dt.format("%H:%M:%S").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    return Err(BlogError::RateLimited { reset_at });
                }
                let body = response.text().await.unwrap_or_default();
                if is_cors_rejection(&body) {
                    Err(BlogError::MissingCorsOrigin)
                } else {
                    Err(BlogError::Other(format!("Forbidden: {}", body)))
                }
            }
            status => Err(BlogError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl Transport for GraphQlClient {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value> {
        let token = self.token_for(request.operation.kind)?;
        let body = json!({
            "query": request.operation.text,
            "operationName": request.operation.name,
            "variables": request.variables,
        });

        let mut builder = self
            .client
            .post(&self.settings.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .json(&body);
        if let Some(app_id) = &self.settings.app_id {
            builder = builder.query(&[("app_id", app_id)]);
        }

        debug!(operation = request.operation.name, "sending GraphQL request");
        let response = builder.send().await.map_err(BlogError::Api)?;
        self.update_rate_limit(&response);
        let response = self.check_response(response).await?;
        let payload: GraphQlResponse = response.json().await?;
        into_data(payload)
    }
}

/// Reduce a GraphQL response to its data, surfacing the first error when
/// the service returned none.
fn into_data(payload: GraphQlResponse) -> Result<Value> {
    let first_error = payload
        .errors
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|e| e.message);

    if let Some(message) = &first_error {
        if is_cors_rejection(message) {
            return Err(BlogError::MissingCorsOrigin);
        }
    }

    match (payload.data, first_error) {
        (Some(data), _) if !data.is_null() => Ok(data),
        (_, Some(message)) => Err(BlogError::GraphQl(message)),
        _ => Err(BlogError::GraphQl("Empty response".to_string())),
    }
}

/// The service answers an origin outside its allow-list with a CORS error.
fn is_cors_rejection(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("cors") || (message.contains("origin") && message.contains("allow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> GraphQlResponse {
        serde_json::from_value(value).unwrap()
    }

    fn settings(service_token: Option<&str>) -> ClientSettings {
        ClientSettings {
            endpoint: "https://example.com/graphql".to_string(),
            app_id: None,
            origin: None,
            service_token: service_token.map(str::to_string),
            service_token_env: "OG_GITHUB_TOKEN".to_string(),
        }
    }

    #[test]
    fn test_into_data_prefers_data() {
        let data = into_data(response(json!({
            "data": { "gitHub": null },
            "errors": [{ "message": "partial" }]
        })))
        .unwrap();
        assert_eq!(data, json!({ "gitHub": null }));
    }

    #[test]
    fn test_into_data_first_error() {
        let err = into_data(response(json!({
            "data": null,
            "errors": [{ "message": "first" }, { "message": "second" }]
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "first");
    }

    #[test]
    fn test_into_data_cors() {
        let err = into_data(response(json!({
            "errors": [{ "message": "Missing CORS origin for app" }]
        })))
        .unwrap_err();
        assert!(matches!(err, BlogError::MissingCorsOrigin));
    }

    #[test]
    fn test_cors_detection() {
        assert!(is_cors_rejection("Origin not allowed for this app"));
        assert!(!is_cors_rejection("Could not resolve to an Issue"));
    }

    #[test]
    fn test_token_selection() {
        let credentials = Credentials::new();
        let client = GraphQlClient::new(settings(Some("service")), credentials.clone()).unwrap();

        assert_eq!(client.token_for(OperationKind::Query).unwrap(), "service");
        assert!(matches!(
            client.token_for(OperationKind::Mutation),
            Err(BlogError::Unauthorized)
        ));

        credentials.set("viewer".to_string());
        assert_eq!(client.token_for(OperationKind::Query).unwrap(), "viewer");
        assert_eq!(client.token_for(OperationKind::Mutation).unwrap(), "viewer");
    }

    #[test]
    fn test_missing_service_token() {
        let client = GraphQlClient::new(settings(None), Credentials::new()).unwrap();
        let err = client.token_for(OperationKind::Query).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing OG_GITHUB_TOKEN environment variable"
        );
    }
}
