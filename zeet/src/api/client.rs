use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use super::error::ApiError;
use super::graphql::{GraphQlRequest, GraphQlResponse};
use super::pool::{ConnectionPoolConfig, ConnectionPoolManager, ConnectionStats};

pub const DEFAULT_API_URL: &str = "https://anchor.zeet.co";

/// The two GraphQL schemas served by the Zeet API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    V0,
    V1,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::V0 => "graphql",
            Endpoint::V1 => "v1/graphql",
        }
    }
}

/// Zeet GraphQL API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    v0_url: Url,
    v1_url: Url,
    auth_header: Option<String>,
    retry_config: RetryConfig,
    pool_manager: ConnectionPoolManager,
}

#[derive(Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(api_url: &str, token: Option<&str>, user_agent: &str) -> Result<Self, ApiError> {
        Self::with_config(api_url, token, user_agent, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        api_url: &str,
        token: Option<&str>,
        user_agent: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let pool_config = ConnectionPoolConfig {
            request_timeout: std::time::Duration::from_secs(retry_config.timeout_seconds),
            ..Default::default()
        };

        let pool_manager = ConnectionPoolManager::new(pool_config);
        let http_client = pool_manager.build_client(user_agent)?;

        // Url::join drops the last segment unless the base ends with a slash
        let base = Url::parse(&format!("{}/", api_url.trim_end_matches('/')))?;
        let v0_url = base.join(Endpoint::V0.path())?;
        let v1_url = base.join(Endpoint::V1.path())?;

        let auth_header = token
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t));

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                v0_url,
                v1_url,
                auth_header,
                retry_config,
                pool_manager,
            }),
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::V0 => &self.inner.v0_url,
            Endpoint::V1 => &self.inner.v1_url,
        }
    }

    /// Get connection pool statistics
    pub async fn get_connection_stats(&self) -> ConnectionStats {
        self.inner.pool_manager.get_stats().await
    }

    /// Legacy API operations (repos, marketplace)
    pub fn v0(&self) -> crate::api::v0::V0Api<'_> {
        crate::api::v0::V0Api::new(self)
    }

    /// Current API operations (teams, groups, blueprints, projects)
    pub fn v1(&self) -> crate::api::v1::V1Api<'_> {
        crate::api::v1::V1Api::new(self)
    }

    /// Run a GraphQL operation and decode its `data` into `T`
    pub async fn execute<V, T>(
        &self,
        endpoint: Endpoint,
        operation_name: &str,
        query: &str,
        variables: &V,
    ) -> Result<T, ApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint);
        let body = GraphQlRequest {
            operation_name,
            query,
            variables,
        };

        tracing::debug!(operation = operation_name, %url, "GraphQL request");

        let body = &body;
        let idempotent = !is_mutation(query);
        let inner = &self.inner;
        let response: GraphQlResponse = self
            .execute_with_retry(
                || async move {
                    let mut request = inner.http_client.post(url.clone()).json(body);
                    if let Some(auth) = &inner.auth_header {
                        request = request.header(AUTHORIZATION, auth);
                    }
                    request.send().await
                },
                operation_name,
                idempotent,
            )
            .await?;

        response.into_data().inspect_err(|e| {
            tracing::error!(operation = operation_name, "GraphQL operation failed: {}", e);
        })
    }

    /// Execute request with retry logic
    ///
    /// A mutation that may have reached the server is sent once. It is only
    /// retried when the connection could not be established.
    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        operation: &str,
        idempotent: bool,
    ) -> Result<GraphQlResponse, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying {} after {}ms (attempt {})",
                    operation,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            let retryable = match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        self.inner.pool_manager.record_request(true).await;
                        return self.parse_success_response(response).await;
                    }

                    self.inner.pool_manager.record_request(false).await;

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        tracing::error!("{} rejected: authentication failed", operation);
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return self.handle_error_response(response).await;
                    }
                    idempotent
                }
                Err(e) => {
                    self.inner.pool_manager.record_request(false).await;

                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                    idempotent || e.is_connect()
                }
            };

            attempt += 1;
            if !retryable {
                break;
            }
        }

        let err = last_error.unwrap_or(ApiError::ServiceUnavailable);
        tracing::error!("{} failed after {} attempts: {}", operation, attempt, err);
        Err(err)
    }

    /// Parse successful response
    async fn parse_success_response(
        &self,
        response: reqwest::Response,
    ) -> Result<GraphQlResponse, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<GraphQlResponse>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // GraphQL servers often report request errors with a 4xx status
        if let Ok(GraphQlResponse {
            errors: Some(errors),
            ..
        }) = serde_json::from_str::<GraphQlResponse>(&text)
        {
            if !errors.is_empty() {
                return Err(ApiError::GraphQl(errors));
            }
        }

        tracing::error!("API returned HTTP {}: {}", status, text);
        Err(ApiError::Http {
            status,
            message: text,
        })
    }
}

fn is_mutation(query: &str) -> bool {
    query.trim_start().starts_with("mutation")
}
