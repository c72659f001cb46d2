//! Typed queries and mutations.
//!
//! Each wrapper validates its inputs, dispatches one request through
//! [`query_or_mutate`], and decodes the operation's result key. Union results
//! are decoded by `__typename`.

use serde::Deserialize;

use crate::config::HttpApiConfig;
use crate::error::Result;
use crate::graphql::{GraphQlRequest, query_or_mutate};
use crate::models::{
    Account, AccountInput, AccountUpdate, ActionMessageInput, GroupChatInput, Login,
    MessageSummary, Placeholder, PollInput, TokenSet,
};
use crate::pagination::{BackwardPagination, Connection, Edge, ForwardPagination};
use crate::validation::{
    validate_account_input, validate_account_update, validate_action_message_input,
    validate_group_chat_input, validate_login, validate_poll_input,
};

macro_rules! account_fields {
    () => {
        "__typename id username emailAddress firstName lastName bio"
    };
}

macro_rules! placeholder {
    ($kind:literal) => {
        concat!("... on ", $kind, " { __typename placeholder } ")
    };
}

macro_rules! message_summary {
    ($kind:literal) => {
        concat!(
            "... on ",
            $kind,
            " { __typename messageId sender { ",
            account_fields!(),
            " } state sent } "
        )
    };
}

/// Result of [`request_token_set`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum RequestTokenSetResult {
    TokenSet(TokenSet),
    NonexistentUser(Placeholder),
    UnverifiedEmailAddress(Placeholder),
    IncorrectPassword(Placeholder),
}

/// The user isn't in the chat, or the chat doesn't exist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InvalidChatId {
    #[serde(default)]
    pub placeholder: String,
}

/// Result of [`search_chat_messages`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum SearchChatMessagesResult {
    /// Matches in chronological order.
    MessageEdges { edges: Vec<Edge<MessageSummary>> },
    InvalidChatId(InvalidChatId),
}

/// Rejection of [`create_account`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum CreateAccountResult {
    UsernameTaken(Placeholder),
    EmailAddressTaken(Placeholder),
    /// The email address's domain isn't allowed on this server.
    InvalidDomain(Placeholder),
}

/// Rejection of [`update_account`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum UpdateAccountResult {
    UsernameTaken(Placeholder),
    EmailAddressTaken(Placeholder),
}

/// Result of [`create_group_chat`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum CreateGroupChatResult {
    CreatedChatId { id: i32 },
    /// The admins weren't a subset of the users.
    InvalidAdminId(Placeholder),
}

/// Rejection of [`create_action_message`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum CreateActionMessageResult {
    InvalidChatId(InvalidChatId),
    /// There were no actions, or they weren't unique.
    InvalidAction(Placeholder),
    InvalidMessageId(Placeholder),
}

/// Rejection of [`create_poll_message`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum CreatePollMessageResult {
    InvalidChatId(InvalidChatId),
    InvalidMessageId(Placeholder),
    InvalidPoll(Placeholder),
}

/// Exchange a login for a token set.
///
/// The login is validated before any request is made.
pub async fn request_token_set(
    config: &HttpApiConfig,
    login: &Login,
) -> Result<RequestTokenSetResult> {
    validate_login(login)?;
    let request = GraphQlRequest::query(concat!(
        "query RequestTokenSet($login: Login!) { requestTokenSet(login: $login) { ",
        "... on TokenSet { __typename accessToken refreshToken } ",
        placeholder!("NonexistentUser"),
        placeholder!("UnverifiedEmailAddress"),
        placeholder!("IncorrectPassword"),
        "} }"
    ))
    .variable("login", login);
    query_or_mutate(config, &request, None)
        .await?
        .field("requestTokenSet")
}

/// Renew an expiring access token.
pub async fn refresh_token_set(config: &HttpApiConfig, refresh_token: &str) -> Result<TokenSet> {
    let request = GraphQlRequest::query(
        "query RefreshTokenSet($refreshToken: ID!) { refreshTokenSet(refreshToken: $refreshToken) { accessToken refreshToken } }",
    )
    .variable("refreshToken", refresh_token);
    query_or_mutate(config, &request, None)
        .await?
        .field("refreshTokenSet")
}

/// Create an account and email the user a verification link.
///
/// The user can't log in until they verify their email address. Returns
/// `None` on success.
pub async fn create_account(
    config: &HttpApiConfig,
    account: &AccountInput,
) -> Result<Option<CreateAccountResult>> {
    validate_account_input(account)?;
    let request = GraphQlRequest::mutation(concat!(
        "mutation CreateAccount($account: AccountInput!) { createAccount(account: $account) { ",
        placeholder!("UsernameTaken"),
        placeholder!("EmailAddressTaken"),
        placeholder!("InvalidDomain"),
        "} }"
    ))
    .variable("account", account);
    query_or_mutate(config, &request, None)
        .await?
        .field("createAccount")
}

/// Update the user's account.
///
/// Only the fields that are set are changed, and nothing changes if any of
/// them is rejected. Returns `None` on success.
pub async fn update_account(
    config: &HttpApiConfig,
    access_token: &str,
    update: &AccountUpdate,
) -> Result<Option<UpdateAccountResult>> {
    validate_account_update(update)?;
    let request = GraphQlRequest::mutation(concat!(
        "mutation UpdateAccount($update: AccountUpdate!) { updateAccount(update: $update) { ",
        placeholder!("UsernameTaken"),
        placeholder!("EmailAddressTaken"),
        "} }"
    ))
    .variable("update", update);
    query_or_mutate(config, &request, Some(access_token))
        .await?
        .field("updateAccount")
}

/// Create a group chat.
///
/// The user is implicitly a member and an admin. Nonexistent users are ignored.
pub async fn create_group_chat(
    config: &HttpApiConfig,
    access_token: &str,
    chat: &GroupChatInput,
) -> Result<CreateGroupChatResult> {
    validate_group_chat_input(chat)?;
    let request = GraphQlRequest::mutation(concat!(
        "mutation CreateGroupChat($chat: GroupChatInput!) { createGroupChat(chat: $chat) { ",
        "... on CreatedChatId { __typename id } ",
        placeholder!("InvalidAdminId"),
        "} }"
    ))
    .variable("chat", chat);
    query_or_mutate(config, &request, Some(access_token))
        .await?
        .field("createGroupChat")
}

/// Send a message whose actions recipients can trigger. Meant for bots.
///
/// Returns `None` on success.
pub async fn create_action_message(
    config: &HttpApiConfig,
    access_token: &str,
    chat_id: i32,
    message: &ActionMessageInput,
    context_message_id: Option<i32>,
) -> Result<Option<CreateActionMessageResult>> {
    validate_action_message_input(message)?;
    let request = GraphQlRequest::mutation(concat!(
        "mutation CreateActionMessage($chatId: Int!, $message: ActionMessageInput!, $contextMessageId: Int) { ",
        "createActionMessage(chatId: $chatId, message: $message, contextMessageId: $contextMessageId) { ",
        placeholder!("InvalidChatId"),
        placeholder!("InvalidAction"),
        placeholder!("InvalidMessageId"),
        "} }"
    ))
    .variable("chatId", chat_id)
    .variable("message", message)
    .optional_variable("contextMessageId", context_message_id);
    query_or_mutate(config, &request, Some(access_token))
        .await?
        .field("createActionMessage")
}

/// Send a poll. Returns `None` on success.
pub async fn create_poll_message(
    config: &HttpApiConfig,
    access_token: &str,
    chat_id: i32,
    poll: &PollInput,
    context_message_id: Option<i32>,
) -> Result<Option<CreatePollMessageResult>> {
    validate_poll_input(poll)?;
    let request = GraphQlRequest::mutation(concat!(
        "mutation CreatePollMessage($chatId: Int!, $poll: PollInput!, $contextMessageId: Int) { ",
        "createPollMessage(chatId: $chatId, poll: $poll, contextMessageId: $contextMessageId) { ",
        placeholder!("InvalidChatId"),
        placeholder!("InvalidMessageId"),
        placeholder!("InvalidPoll"),
        "} }"
    ))
    .variable("chatId", chat_id)
    .variable("poll", poll)
    .optional_variable("contextMessageId", context_message_id);
    query_or_mutate(config, &request, Some(access_token))
        .await?
        .field("createPollMessage")
}

/// Read the authenticated user's account.
pub async fn read_account(config: &HttpApiConfig, access_token: &str) -> Result<Account> {
    let request = GraphQlRequest::query(concat!(
        "query ReadAccount { readAccount { ",
        account_fields!(),
        " } }"
    ));
    query_or_mutate(config, &request, Some(access_token))
        .await?
        .field("readAccount")
}

/// Search users by username, email address, first name, and last name,
/// case-insensitively.
pub async fn search_users(
    config: &HttpApiConfig,
    query: &str,
    pagination: &ForwardPagination,
) -> Result<Connection<Account>> {
    let request = GraphQlRequest::query(concat!(
        "query SearchUsers($query: String!, $first: Int, $after: Cursor) { ",
        "searchUsers(query: $query, first: $first, after: $after) { ",
        "edges { node { ",
        account_fields!(),
        " } cursor } ",
        "pageInfo { hasNextPage hasPreviousPage startCursor endCursor } ",
        "} }"
    ))
    .variable("query", query);
    let request = pagination.apply(request);
    query_or_mutate(config, &request, None)
        .await?
        .field("searchUsers")
}

/// Set whether the user is online.
pub async fn set_online(config: &HttpApiConfig, access_token: &str, is_online: bool) -> Result<()> {
    let request = GraphQlRequest::mutation(
        "mutation SetOnline($isOnline: Boolean!) { setOnline(isOnline: $isOnline) }",
    )
    .variable("isOnline", is_online);
    query_or_mutate(config, &request, Some(access_token)).await?;
    Ok(())
}

/// Set whether the user is typing.
///
/// Returns `Some` if the user isn't in the chat.
pub async fn set_typing(
    config: &HttpApiConfig,
    access_token: &str,
    is_typing: bool,
) -> Result<Option<InvalidChatId>> {
    let request = GraphQlRequest::mutation(
        concat!(
            "mutation SetTyping($isTyping: Boolean!) { setTyping(isTyping: $isTyping) { ",
            placeholder!("InvalidChatId"),
            "} }"
        ),
    )
    .variable("isTyping", is_typing);
    query_or_mutate(config, &request, Some(access_token))
        .await?
        .field("setTyping")
}

/// Search a chat's messages case-insensitively.
///
/// Text, poll titles and options, action texts and actions, and picture
/// captions are matched. An access token is only needed if the chat isn't
/// public.
pub async fn search_chat_messages(
    config: &HttpApiConfig,
    access_token: Option<&str>,
    chat_id: i32,
    query: &str,
    pagination: &BackwardPagination,
) -> Result<SearchChatMessagesResult> {
    let request = GraphQlRequest::query(concat!(
        "query SearchChatMessages($chatId: Int!, $query: String!, $last: Int, $before: Cursor) { ",
        "searchChatMessages(chatId: $chatId, query: $query, last: $last, before: $before) { ",
        "... on MessageEdges { __typename edges { node { ",
        message_summary!("TextMessage"),
        message_summary!("ActionMessage"),
        message_summary!("AudioMessage"),
        message_summary!("GroupChatInviteMessage"),
        message_summary!("DocMessage"),
        message_summary!("VideoMessage"),
        message_summary!("PicMessage"),
        message_summary!("PollMessage"),
        "} cursor } } ",
        placeholder!("InvalidChatId"),
        "} }"
    ))
    .variable("chatId", chat_id)
    .variable("query", query);
    let request = pagination.apply(request);
    query_or_mutate(config, &request, access_token)
        .await?
        .field("searchChatMessages")
}
