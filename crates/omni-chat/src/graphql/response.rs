//! GraphQL response types.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ApiError, Result};

/// A GraphQL error returned by the server.
///
/// The Omni Chat API puts a machine-readable code such as `INVALID_CHAT_ID`
/// in `message`. Any other fields (locations, path, extensions) are kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// The error message, which is the error code for this API.
    pub message: String,

    /// Remaining fields of the error object.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphQlError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: Map::new(),
        }
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GraphQlError {}

/// A GraphQL response from the server.
///
/// `data` and `errors` may both be present. This client folds any error into
/// a failure; see [`GraphQlResponse::into_result`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// Results keyed by each operation's declared result key.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,

    /// Errors that occurred during execution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
}

impl GraphQlResponse {
    /// Check if the response contains errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the first error, if any.
    pub fn first_error(&self) -> Option<&GraphQlError> {
        self.errors.first()
    }

    /// Map the errors onto an [`ApiError`].
    ///
    /// Only the first error's code is inspected; the rest are ignored.
    pub fn error(&self) -> Option<ApiError> {
        self.first_error()
            .map(|err| ApiError::from_graphql_code(&err.message))
    }

    /// Fail with the mapped error if the response carries any errors.
    pub fn into_result(self) -> Result<Self> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Get the raw value of a data entry.
    pub fn raw_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }

    /// Parse a specific entry from the data.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // For a response like: { "data": { "readAccount": { "id": 1, ... } } }
    /// let account: Account = response.field("readAccount")?;
    /// ```
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        if let Some(err) = self.error() {
            return Err(err);
        }
        let value = self
            .raw_field(key)
            .ok_or_else(|| ApiError::Connection(format!("Field '{key}' not found in response")))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Take the value of the single data entry.
    ///
    /// Subscription frames carry exactly one entry keyed by the operation's
    /// result key. If there are several, the first by key order wins.
    pub fn into_single_data(self) -> Option<Value> {
        self.data
            .and_then(|data| data.into_iter().next().map(|(_, value)| value))
    }
}
