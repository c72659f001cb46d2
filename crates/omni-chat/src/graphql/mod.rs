//! GraphQL transport for the Omni Chat API.
//!
//! Queries and mutations are posted to `/query-or-mutation`; subscriptions run
//! over one WebSocket per topic.
//!
//! # Queries and Mutations
//!
//! ```ignore
//! use omni_chat::graphql::{GraphQlClient, GraphQlRequest};
//!
//! let client = GraphQlClient::new(http_config)?;
//! let request = GraphQlRequest::mutation(
//!     "mutation SetOnline($isOnline: Boolean!) { setOnline(isOnline: $isOnline) }",
//! )
//! .variable("isOnline", true);
//! client.query_or_mutate(&request, Some(&access_token)).await?;
//! ```
//!
//! # Subscriptions
//!
//! ```ignore
//! use omni_chat::graphql::{TypingStatuses, subscribe_to};
//!
//! let handle = subscribe_to::<TypingStatuses, _, _>(
//!     &ws_config,
//!     &access_token,
//!     |status| println!("{status:?}"),
//!     |err| eprintln!("subscription failed: {err}"),
//! );
//!
//! // Later
//! handle.close();
//! ```

mod client;
mod request;
mod response;
mod subscription;
mod topics;

pub use client::{GraphQlClient, GraphQlClientBuilder, execute, query_or_mutate};
pub use request::{GraphQlRequest, OperationType};
pub use response::{GraphQlError, GraphQlResponse};
pub use subscription::{SubscriptionHandle, SubscriptionState, subscribe};
pub use topics::{
    Accounts, AccountsSubscription, GroupChats, GroupChatsSubscription, Messages,
    MessagesSubscription, NewActionMessage, NewGroupChatInviteMessage, NewPicMessage,
    NewPollMessage, NewTextMessage, OnlineStatuses, OnlineStatusesSubscription,
    SubscriptionTopic, TypingStatuses, TypingStatusesSubscription, subscribe_to,
};
