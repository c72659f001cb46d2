//! Relay-style cursor pagination.
//!
//! Cursors are opaque: they are only ever echoed back to the server.

use serde::{Deserialize, Serialize};

use crate::graphql::GraphQlRequest;

/// An opaque position in a paginated list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    /// Create a cursor from its server representation.
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    /// The server representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(cursor: String) -> Self {
        Self(cursor)
    }
}

impl From<&str> for Cursor {
    fn from(cursor: &str) -> Self {
        Self(cursor.to_owned())
    }
}

/// Paginate forward: the `first` items `after` a cursor.
///
/// Unset fields are left to the server's defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardPagination {
    pub first: Option<i32>,
    pub after: Option<Cursor>,
}

impl ForwardPagination {
    /// Request the first `first` items.
    pub fn first(first: i32) -> Self {
        Self {
            first: Some(first),
            after: None,
        }
    }

    /// Continue after `cursor`.
    pub fn after(mut self, cursor: impl Into<Cursor>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Write the `first` and `after` variables.
    pub fn apply(&self, request: GraphQlRequest) -> GraphQlRequest {
        request
            .optional_variable("first", self.first)
            .optional_variable("after", self.after.as_ref())
    }
}

/// Paginate backward: the `last` items `before` a cursor.
///
/// Unset fields are left to the server's defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackwardPagination {
    pub last: Option<i32>,
    pub before: Option<Cursor>,
}

impl BackwardPagination {
    /// Request the last `last` items.
    pub fn last(last: i32) -> Self {
        Self {
            last: Some(last),
            before: None,
        }
    }

    /// Continue before `cursor`.
    pub fn before(mut self, cursor: impl Into<Cursor>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Write the `last` and `before` variables.
    pub fn apply(&self, request: GraphQlRequest) -> GraphQlRequest {
        request
            .optional_variable("last", self.last)
            .optional_variable("before", self.before.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: Cursor,
}

/// One page of a paginated list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Pagination for the page after this one, or `None` on the last page.
    ///
    /// The page size is left to the caller.
    pub fn next_page(&self) -> Option<ForwardPagination> {
        if !self.page_info.has_next_page {
            return None;
        }
        let after = self.page_info.end_cursor.clone()?;
        Some(ForwardPagination {
            first: None,
            after: Some(after),
        })
    }

    /// Pagination for the page before this one, or `None` on the first page.
    pub fn previous_page(&self) -> Option<BackwardPagination> {
        if !self.page_info.has_previous_page {
            return None;
        }
        let before = self.page_info.start_cursor.clone()?;
        Some(BackwardPagination {
            last: None,
            before: Some(before),
        })
    }

    /// Iterate over the nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}
