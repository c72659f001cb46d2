//! Transport dispatcher for GraphQL queries and mutations.

use std::sync::Arc;
use std::time::Duration;

use http::header::CONTENT_TYPE;

use super::request::GraphQlRequest;
use super::response::GraphQlResponse;
use crate::config::HttpApiConfig;
use crate::error::{Result, classify_status};
use crate::targets;

/// Builder for creating a GraphQL client.
pub struct GraphQlClientBuilder {
    config: HttpApiConfig,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl GraphQlClientBuilder {
    /// Create a new builder for the given endpoint.
    pub fn new(config: HttpApiConfig) -> Self {
        Self {
            config,
            timeout: None,
            user_agent: None,
        }
    }

    /// Set a request timeout.
    ///
    /// No timeout is applied unless one is set here.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the GraphQL client.
    pub fn build(self) -> Result<GraphQlClient> {
        // Idle connections are never kept, so no socket outlives its call.
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(GraphQlClient {
            inner: Arc::new(GraphQlClientInner {
                http: builder.build()?,
                config: self.config,
            }),
        })
    }
}

struct GraphQlClientInner {
    http: reqwest::Client,
    config: HttpApiConfig,
}

/// A GraphQL client for queries and mutations.
///
/// The client holds no per-call state: every [`execute`](Self::execute) issues
/// exactly one `POST /query-or-mutation`, with no retry, caching, or
/// de-duplication of identical concurrent requests. Cloning is cheap.
///
/// # Example
///
/// ```ignore
/// use omni_chat::{GraphQlClient, GraphQlRequest, HttpApiConfig, HttpProtocol};
///
/// let client = GraphQlClient::new(HttpApiConfig::new(HttpProtocol::Http, "localhost:8080"))?;
///
/// let request = GraphQlRequest::query("query ReadAccount { readAccount { id } }");
/// let response = client.query_or_mutate(&request, Some(&access_token)).await?;
/// let account: Account = response.field("readAccount")?;
/// ```
#[derive(Clone)]
pub struct GraphQlClient {
    inner: Arc<GraphQlClientInner>,
}

impl GraphQlClient {
    /// Create a client with default settings.
    pub fn new(config: HttpApiConfig) -> Result<Self> {
        GraphQlClientBuilder::new(config).build()
    }

    /// Create a new builder for configuring a GraphQL client.
    pub fn builder(config: HttpApiConfig) -> GraphQlClientBuilder {
        GraphQlClientBuilder::new(config)
    }

    /// Get the endpoint configuration.
    pub fn config(&self) -> &HttpApiConfig {
        &self.inner.config
    }

    /// Execute a query or mutation and return the raw response.
    ///
    /// `Authorization: Bearer <credential>` is attached if and only if a
    /// credential is supplied. Status triage, first match wins:
    /// 401 is `Unauthorized`, 500..=599 is `InternalServerError`, anything
    /// else but 200 is `Connection`. A 200 body that isn't a GraphQL response
    /// is also `Connection`. GraphQL `errors` are returned untouched; use
    /// [`query_or_mutate`](Self::query_or_mutate) to fold them into a failure.
    pub async fn execute(
        &self,
        request: &GraphQlRequest,
        credential: Option<&str>,
    ) -> Result<GraphQlResponse> {
        let url = self.inner.config.query_or_mutation_url()?;

        tracing::debug!(
            target: targets::GRAPHQL,
            url = %url,
            operation = ?request.operation_type(),
            authenticated = credential.is_some(),
            "Dispatching GraphQL operation"
        );

        let mut req = self
            .inner
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        if let Some(token) = credential {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        tracing::debug!(target: targets::GRAPHQL, status, "Received GraphQL response");

        if let Some(err) = classify_status(status, 200) {
            return Err(err);
        }

        let body = response.bytes().await?;
        let graphql_response: GraphQlResponse = serde_json::from_slice(&body)?;

        tracing::trace!(
            target: targets::GRAPHQL,
            errors = graphql_response.errors.len(),
            "Parsed GraphQL response"
        );

        Ok(graphql_response)
    }

    /// Execute a query or mutation, failing on any GraphQL error.
    ///
    /// Only `errors[0]` is mapped; see [`GraphQlResponse::error`].
    pub async fn query_or_mutate(
        &self,
        request: &GraphQlRequest,
        credential: Option<&str>,
    ) -> Result<GraphQlResponse> {
        self.execute(request, credential).await?.into_result()
    }
}

/// Execute one operation against `config` without a long-lived client.
///
/// Builds a fresh client for the single call.
pub async fn execute(
    config: &HttpApiConfig,
    request: &GraphQlRequest,
    credential: Option<&str>,
) -> Result<GraphQlResponse> {
    GraphQlClient::new(config.clone())?
        .execute(request, credential)
        .await
}

/// Like [`execute`], then fold GraphQL errors into a failure.
pub async fn query_or_mutate(
    config: &HttpApiConfig,
    request: &GraphQlRequest,
    credential: Option<&str>,
) -> Result<GraphQlResponse> {
    execute(config, request, credential).await?.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpProtocol;

    #[test]
    fn test_builder() {
        let config = HttpApiConfig::new(HttpProtocol::Https, "api.example.com");
        let client = GraphQlClient::builder(config.clone())
            .timeout(Duration::from_secs(5))
            .user_agent("omni-chat-tests")
            .build()
            .unwrap();
        assert_eq!(client.config(), &config);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = HttpApiConfig::new(HttpProtocol::Http, addr.to_string());
        let request = GraphQlRequest::query("query Q{x}");
        let result = execute(&config, &request, None).await;
        assert!(matches!(result, Err(crate::ApiError::Connection(_))));
    }
}
