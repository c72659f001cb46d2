//! Data shapes shared by operations and subscription topics.
//!
//! Input types only serialize the fields declared by the server's input
//! schema. Output types ignore unknown fields, including `__typename` when it
//! is not used as a discriminant.

use serde::{Deserialize, Serialize};

/// Credentials for requesting a token set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl Login {
    /// Create a new login.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// An access token and the refresh token used to renew it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
}

/// A user's account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

/// Input for creating an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    pub username: String,
    pub password: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Input for updating an account. `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

/// Who may join a group chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupChatPublicity {
    NotInvitable,
    Invitable,
    Public,
}

/// Input for creating a group chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupChatInput {
    pub title: String,
    pub description: String,
    pub user_id_list: Vec<i32>,
    pub admin_id_list: Vec<i32>,
    pub is_broadcast: bool,
    pub publicity: GroupChatPublicity,
}

/// Input for a message carrying actions the recipients can trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionMessageInput {
    pub text: String,
    pub actions: Vec<String>,
}

/// Input for a poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PollInput {
    pub title: String,
    pub options: Vec<String>,
}

/// Delivery state of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageState {
    Sent,
    Delivered,
    Read,
}

/// Fields common to every message in a chat.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub message_id: i32,
    pub sender: Account,
    pub state: MessageState,
    pub sent: String,
}

/// The message a message replies to, if any.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    pub has_context: bool,
    pub id: Option<i32>,
}

/// Fields common to every newly sent message pushed over a subscription.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub chat_id: i32,
    pub message_id: i32,
    pub sender: Account,
    pub state: MessageState,
    pub sent: String,
    pub context: MessageContext,
    pub is_forwarded: bool,
}

/// Text with actions that recipients can trigger.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ActionableMessage {
    pub text: String,
    pub actions: Vec<String>,
}

/// One option of a poll and the IDs of the users who voted for it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PollOption {
    pub option: String,
    pub votes: Vec<i32>,
}

/// A poll.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Poll {
    pub title: String,
    pub options: Vec<PollOption>,
}

/// Marker for payloads whose only field is the empty placeholder string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    #[serde(default)]
    pub placeholder: String,
}
