//! Typed client for the Omni Chat API.
//!
//! The backend speaks three protocols:
//!
//! - **GraphQL over HTTP**: every query and mutation is a `POST /query-or-mutation`
//! - **GraphQL over WebSocket**: one socket per subscription topic
//! - **REST**: media files and images
//!
//! Every operation yields a typed value or fails with one [`ApiError`].
//!
//! # Example
//!
//! ```ignore
//! use omni_chat::{HttpApiConfig, HttpProtocol, Login, operations};
//! use omni_chat::operations::RequestTokenSetResult;
//!
//! let config = HttpApiConfig::new(HttpProtocol::Http, "localhost:8080");
//! let login = Login::new("john_doe", "password");
//! match operations::request_token_set(&config, &login).await? {
//!     RequestTokenSetResult::TokenSet(tokens) => {
//!         let account = operations::read_account(&config, &tokens.access_token).await?;
//!         println!("Signed in as {}", account.username);
//!     }
//!     other => println!("Sign in failed: {other:?}"),
//! }
//! ```
//!
//! # Logging
//!
//! Events are emitted through `tracing` at `debug` and `trace` level under the
//! targets in [`targets`]. Credentials are never logged.

pub mod config;
mod error;
pub mod graphql;
pub mod models;
pub mod operations;
pub mod pagination;
pub mod rest;
pub mod validation;

pub use config::{HttpApiConfig, HttpProtocol, WsApiConfig, WsProtocol};
pub use error::{ApiError, DomainError, MediaKind, Result, classify_status};
pub use graphql::{
    GraphQlClient, GraphQlClientBuilder, GraphQlError, GraphQlRequest, GraphQlResponse,
    SubscriptionHandle, SubscriptionState, SubscriptionTopic, subscribe, subscribe_to,
};
pub use models::{Account, Login, TokenSet};
pub use pagination::{BackwardPagination, Connection, Cursor, Edge, ForwardPagination, PageInfo};
pub use rest::{ImageType, MediaFile, RestClient, UploadKind};
pub use validation::ScalarError;

/// Log targets for filtering, e.g. `RUST_LOG=omni_chat::subscription=trace`.
pub mod targets {
    /// Queries and mutations.
    pub const GRAPHQL: &str = "omni_chat::graphql";
    /// Subscription connections and frames.
    pub const SUBSCRIPTION: &str = "omni_chat::subscription";
    /// REST media requests.
    pub const REST: &str = "omni_chat::rest";
}
