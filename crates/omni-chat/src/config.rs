//! Endpoint configuration for the HTTP and WebSocket APIs.
//!
//! Both variants carry the same `api_url` (a host with an optional port, such
//! as `localhost:8080`). They differ only in the scheme vocabulary, so a value
//! of the wrong kind cannot be handed to the wrong transport.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, Result};

/// Scheme used for request/response traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpProtocol {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl HttpProtocol {
    /// The scheme as it appears in a URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for HttpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpProtocol {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(ApiError::Connection(format!("Unsupported HTTP protocol: {other}"))),
        }
    }
}

/// Scheme used for subscription traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WsProtocol {
    /// Plain WebSocket.
    #[default]
    Ws,
    /// WebSocket over TLS.
    Wss,
}

impl WsProtocol {
    /// The scheme as it appears in a URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl fmt::Display for WsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WsProtocol {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ws" => Ok(Self::Ws),
            "wss" => Ok(Self::Wss),
            other => Err(ApiError::Connection(format!(
                "Unsupported WebSocket protocol: {other}"
            ))),
        }
    }
}

/// Configuration for the HTTP API (GraphQL queries, mutations, and REST).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpApiConfig {
    /// The scheme.
    pub protocol: HttpProtocol,
    /// Host with an optional port, e.g. `localhost:8080`.
    pub api_url: String,
}

impl HttpApiConfig {
    /// Create a new configuration.
    pub fn new(protocol: HttpProtocol, api_url: impl Into<String>) -> Self {
        Self {
            protocol,
            api_url: api_url.into(),
        }
    }

    /// URL of the single GraphQL request/response endpoint.
    pub fn query_or_mutation_url(&self) -> Result<Url> {
        self.endpoint("/query-or-mutation")
    }

    /// URL of an arbitrary path on the HTTP API. `path` must start with `/`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}{}",
            self.protocol, self.api_url, path
        ))?)
    }
}

/// Configuration for the WebSocket API (GraphQL subscriptions).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsApiConfig {
    /// The scheme.
    pub protocol: WsProtocol,
    /// Host with an optional port, e.g. `localhost:8080`.
    pub api_url: String,
}

impl WsApiConfig {
    /// Create a new configuration.
    pub fn new(protocol: WsProtocol, api_url: impl Into<String>) -> Self {
        Self {
            protocol,
            api_url: api_url.into(),
        }
    }

    /// URL of a subscription stream, e.g. `/messages-subscription`.
    pub fn subscription_url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}{}",
            self.protocol, self.api_url, path
        ))?)
    }
}
