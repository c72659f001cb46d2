//! GraphQL request types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::targets;

/// A GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// A query operation (read-only).
    #[default]
    Query,
    /// A mutation operation (modifies data).
    Mutation,
    /// A subscription operation (streamed over a WebSocket).
    Subscription,
}

/// A GraphQL request.
///
/// The document is opaque: it is passed to the server untouched. Serializes
/// to `{"query": ..., "variables": ...}`, omitting `variables` when none were set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    /// The GraphQL document.
    pub query: String,

    /// Variables for the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,

    /// The operation type (not serialized).
    #[serde(skip)]
    pub(crate) operation_type: OperationType,
}

impl GraphQlRequest {
    /// Create a new query request.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQlRequest::query("query ReadAccount { readAccount { id } }");
    /// ```
    pub fn query(document: impl Into<String>) -> Self {
        Self::with_type(document, OperationType::Query)
    }

    /// Create a new mutation request.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQlRequest::mutation(r#"
    ///     mutation SetOnline($isOnline: Boolean!) {
    ///         setOnline(isOnline: $isOnline)
    ///     }
    /// "#)
    /// .variable("isOnline", true);
    /// ```
    pub fn mutation(document: impl Into<String>) -> Self {
        Self::with_type(document, OperationType::Mutation)
    }

    /// Create a new subscription request.
    pub fn subscription(document: impl Into<String>) -> Self {
        Self::with_type(document, OperationType::Subscription)
    }

    fn with_type(document: impl Into<String>, operation_type: OperationType) -> Self {
        Self {
            query: document.into(),
            variables: None,
            operation_type,
        }
    }

    /// Set a variable value.
    ///
    /// Values that fail to serialize are skipped and logged; use
    /// [`GraphQlRequest::try_variable`] to surface the failure instead.
    pub fn variable(self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        match serde_json::to_value(value) {
            Ok(value) => self.with_value(name, value),
            Err(err) => {
                tracing::debug!(
                    target: targets::GRAPHQL,
                    variable = %name,
                    error = %err,
                    "Skipping unserializable variable"
                );
                self
            }
        }
    }

    /// Set a variable value, failing if it can't be serialized.
    pub fn try_variable(self, name: impl Into<String>, value: impl Serialize) -> Result<Self> {
        let name = name.into();
        let value = serde_json::to_value(value).map_err(|err| {
            ApiError::Connection(format!("Variable '{name}' is not serializable: {err}"))
        })?;
        Ok(self.with_value(name, value))
    }

    fn with_value(mut self, name: String, value: Value) -> Self {
        self.variables
            .get_or_insert_with(Map::new)
            .insert(name, value);
        self
    }

    /// Set a variable only when `value` is `Some`.
    pub fn optional_variable<T: Serialize>(self, name: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => self.variable(name, value),
            None => self,
        }
    }

    /// Get the operation type.
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Check if this is a subscription.
    pub fn is_subscription(&self) -> bool {
        self.operation_type == OperationType::Subscription
    }
}
