//! Typed subscription topics.
//!
//! Each topic has its own WebSocket route and its own closed union of
//! messages, discriminated by `__typename`. The first message of every topic
//! is `CreatedSubscription`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::subscription::{SubscriptionHandle, subscribe_operation};
use crate::config::WsApiConfig;
use crate::error::ApiError;
use crate::models::{
    Account, ActionableMessage, GroupChatPublicity, MessageState, NewMessage, Poll,
};

macro_rules! account_fields {
    () => {
        "__typename id username emailAddress firstName lastName bio"
    };
}

macro_rules! new_message_fields {
    () => {
        concat!(
            "__typename chatId messageId sender { ",
            account_fields!(),
            " } state sent context { hasContext id } isForwarded"
        )
    };
}

/// A subscription stream served by the Omni Chat API.
pub trait SubscriptionTopic {
    /// WebSocket route of the stream.
    const PATH: &'static str;
    /// Result key of the subscription field, e.g. `subscribeToMessages`.
    const OPERATION: &'static str;
    /// The subscription document.
    const DOCUMENT: &'static str;
    /// Messages pushed on the stream.
    type Message: DeserializeOwned + Send + 'static;
}

/// Open a typed subscription to `S`.
///
/// See [`subscribe`](super::subscribe) for the delivery contract. Each
/// frame's value is read from its [`SubscriptionTopic::OPERATION`] entry.
pub fn subscribe_to<S, M, E>(
    config: &WsApiConfig,
    access_token: &str,
    on_message: M,
    on_error: E,
) -> SubscriptionHandle
where
    S: SubscriptionTopic,
    M: FnMut(S::Message) + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    subscribe_operation::<S::Message, M, E>(
        config,
        access_token,
        S::PATH,
        S::DOCUMENT,
        S::OPERATION,
        on_message,
        on_error,
    )
}

/// Changes to the user's account, contacts, and blocked users.
pub struct Accounts;

/// A message pushed by [`Accounts`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum AccountsSubscription {
    CreatedSubscription {
        #[serde(default)]
        placeholder: String,
    },
    NewContact(Account),
    UpdatedAccount(Account),
    UpdatedProfilePic {
        id: i32,
    },
    DeletedContact {
        id: i32,
    },
    BlockedAccount(Account),
    UnblockedAccount {
        id: i32,
    },
    DeletedAccount {
        id: i32,
    },
}

impl SubscriptionTopic for Accounts {
    const PATH: &'static str = "/accounts-subscription";
    const OPERATION: &'static str = "subscribeToAccounts";
    const DOCUMENT: &'static str = concat!(
        "subscription SubscribeToAccounts { subscribeToAccounts { ",
        "... on CreatedSubscription { __typename placeholder } ",
        "... on NewContact { ", account_fields!(), " } ",
        "... on UpdatedAccount { ", account_fields!(), " } ",
        "... on UpdatedProfilePic { __typename id } ",
        "... on DeletedContact { __typename id } ",
        "... on BlockedAccount { ", account_fields!(), " } ",
        "... on UnblockedAccount { __typename id } ",
        "... on DeletedAccount { __typename id } ",
        "} }"
    );
    type Message = AccountsSubscription;
}

/// A text message.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTextMessage {
    #[serde(flatten)]
    pub message: NewMessage,
    pub text_message: String,
}

/// A message with triggerable actions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActionMessage {
    #[serde(flatten)]
    pub message: NewMessage,
    pub actionable_message: ActionableMessage,
}

/// A picture, fetched separately over REST.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPicMessage {
    #[serde(flatten)]
    pub message: NewMessage,
    pub caption: Option<String>,
}

/// A poll.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPollMessage {
    #[serde(flatten)]
    pub message: NewMessage,
    pub poll: Poll,
}

/// An invitation to a group chat.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroupChatInviteMessage {
    #[serde(flatten)]
    pub message: NewMessage,
    pub invite_code: String,
}

/// New, updated, and deleted messages in the user's chats.
pub struct Messages;

/// A message pushed by [`Messages`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum MessagesSubscription {
    CreatedSubscription {
        #[serde(default)]
        placeholder: String,
    },
    NewTextMessage(NewTextMessage),
    NewActionMessage(NewActionMessage),
    NewPicMessage(NewPicMessage),
    NewAudioMessage(NewMessage),
    NewGroupChatInviteMessage(NewGroupChatInviteMessage),
    NewDocMessage(NewMessage),
    NewVideoMessage(NewMessage),
    NewPollMessage(NewPollMessage),
    UpdatedMessage {
        chat_id: i32,
        message_id: i32,
        state: MessageState,
        has_star: bool,
    },
    TriggeredAction {
        message_id: i32,
        action: String,
        triggered_by: Account,
    },
    DeletedMessage {
        chat_id: i32,
        message_id: i32,
    },
    MessageDeletionPoint {
        chat_id: i32,
        until: String,
    },
    DeletionOfEveryMessage {
        chat_id: i32,
    },
    UserChatMessagesRemoval {
        chat_id: i32,
        user_id: i32,
    },
    UnstarredChat {
        id: i32,
    },
}

impl SubscriptionTopic for Messages {
    const PATH: &'static str = "/messages-subscription";
    const OPERATION: &'static str = "subscribeToMessages";
    const DOCUMENT: &'static str = concat!(
        "subscription SubscribeToMessages { subscribeToMessages { ",
        "... on CreatedSubscription { __typename placeholder } ",
        "... on NewTextMessage { ", new_message_fields!(), " textMessage } ",
        "... on NewActionMessage { ", new_message_fields!(),
        " actionableMessage { text actions } } ",
        "... on NewPicMessage { ", new_message_fields!(), " caption } ",
        "... on NewAudioMessage { ", new_message_fields!(), " } ",
        "... on NewGroupChatInviteMessage { ", new_message_fields!(), " inviteCode } ",
        "... on NewDocMessage { ", new_message_fields!(), " } ",
        "... on NewVideoMessage { ", new_message_fields!(), " } ",
        "... on NewPollMessage { ", new_message_fields!(),
        " poll { title options { option votes } } } ",
        "... on UpdatedMessage { __typename chatId messageId state hasStar } ",
        "... on TriggeredAction { __typename messageId action triggeredBy { ",
        account_fields!(), " } } ",
        "... on DeletedMessage { __typename chatId messageId } ",
        "... on MessageDeletionPoint { __typename chatId until } ",
        "... on DeletionOfEveryMessage { __typename chatId } ",
        "... on UserChatMessagesRemoval { __typename chatId userId } ",
        "... on UnstarredChat { __typename id } ",
        "} }"
    );
    type Message = MessagesSubscription;
}

/// Online statuses of the user's contacts and chat members.
pub struct OnlineStatuses;

/// A message pushed by [`OnlineStatuses`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum OnlineStatusesSubscription {
    CreatedSubscription {
        #[serde(default)]
        placeholder: String,
    },
    OnlineStatus {
        user_id: i32,
        is_online: bool,
        /// `None` if the user has never set an online status.
        last_online: Option<String>,
    },
}

impl SubscriptionTopic for OnlineStatuses {
    const PATH: &'static str = "/online-statuses-subscription";
    const OPERATION: &'static str = "subscribeToOnlineStatuses";
    const DOCUMENT: &'static str = concat!(
        "subscription SubscribeToOnlineStatuses { subscribeToOnlineStatuses { ",
        "... on CreatedSubscription { __typename placeholder } ",
        "... on OnlineStatus { __typename userId isOnline lastOnline } ",
        "} }"
    );
    type Message = OnlineStatusesSubscription;
}

/// Typing statuses in the user's chats, excluding the user's own.
pub struct TypingStatuses;

/// A message pushed by [`TypingStatuses`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum TypingStatusesSubscription {
    CreatedSubscription {
        #[serde(default)]
        placeholder: String,
    },
    TypingStatus {
        chat_id: i32,
        user_id: i32,
        is_typing: bool,
    },
}

impl SubscriptionTopic for TypingStatuses {
    const PATH: &'static str = "/typing-statuses-subscription";
    const OPERATION: &'static str = "subscribeToTypingStatuses";
    const DOCUMENT: &'static str = concat!(
        "subscription SubscribeToTypingStatuses { subscribeToTypingStatuses { ",
        "... on CreatedSubscription { __typename placeholder } ",
        "... on TypingStatus { __typename chatId userId isTyping } ",
        "} }"
    );
    type Message = TypingStatusesSubscription;
}

/// Membership and metadata changes of the user's group chats.
pub struct GroupChats;

/// A message pushed by [`GroupChats`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum GroupChatsSubscription {
    CreatedSubscription {
        #[serde(default)]
        placeholder: String,
    },
    /// The user was added to this chat.
    GroupChatId {
        id: i32,
    },
    /// `None` fields haven't changed.
    UpdatedGroupChat {
        chat_id: i32,
        title: Option<String>,
        description: Option<String>,
        new_users: Option<Vec<Account>>,
        removed_users: Option<Vec<Account>>,
        admin_id_list: Option<Vec<i32>>,
        is_broadcast: Option<bool>,
        publicity: Option<GroupChatPublicity>,
    },
    UpdatedGroupChatPic {
        id: i32,
    },
    ExitedUsers {
        chat_id: i32,
        user_id_list: Vec<i32>,
    },
}

impl SubscriptionTopic for GroupChats {
    const PATH: &'static str = "/group-chats-subscription";
    const OPERATION: &'static str = "subscribeToGroupChats";
    const DOCUMENT: &'static str = concat!(
        "subscription SubscribeToGroupChats { subscribeToGroupChats { ",
        "... on CreatedSubscription { __typename placeholder } ",
        "... on GroupChatId { __typename id } ",
        "... on UpdatedGroupChatPic { __typename id } ",
        "... on UpdatedGroupChat { __typename chatId title description ",
        "newUsers { ", account_fields!(), " } ",
        "removedUsers { ", account_fields!(), " } ",
        "adminIdList isBroadcast publicity } ",
        "... on ExitedUsers { __typename chatId userIdList } ",
        "} }"
    );
    type Message = GroupChatsSubscription;
}
