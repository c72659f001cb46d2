//! Error types for the Omni Chat client.
//!
//! Every operation either yields a typed value or fails with exactly one
//! [`ApiError`]. Transport-level triage lives in [`classify_status`]; the
//! application-level vocabulary lives in [`DomainError`].

use crate::validation::ScalarError;

/// Errors returned by every Omni Chat operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The credential was missing or rejected (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// The server failed (HTTP 5xx or the `INTERNAL_SERVER_ERROR` code).
    #[error("Internal server error")]
    InternalServerError,

    /// Unreachable server, malformed response, or any unclassified status or code.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An application-level rejection from the server.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A value was rejected by a scalar validator before any request was made.
    #[error(transparent)]
    Scalar(#[from] ScalarError),
}

impl ApiError {
    /// Map a GraphQL error code to an error.
    ///
    /// Unknown codes degrade to [`ApiError::Connection`].
    pub fn from_graphql_code(code: &str) -> Self {
        if code == "INTERNAL_SERVER_ERROR" {
            return Self::InternalServerError;
        }
        match DomainError::from_graphql_code(code) {
            Some(err) => Self::Domain(err),
            None => Self::Connection(format!("Unrecognized error code: {code}")),
        }
    }

    /// Check whether this is a transport-level failure rather than a rejection.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::InternalServerError | Self::Connection(_)
        )
    }
}

/// Media kinds whose uploads can be rejected as an invalid file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// `image`
    Image,
    /// `audio`
    Audio,
    /// `video`
    Video,
    /// `doc`
    Doc,
}

impl MediaKind {
    /// Lowercase name used in REST paths and multipart field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Doc => "doc",
        }
    }
}

/// Application-level rejections reported by the server.
///
/// The GraphQL variants come from `errors[0].message`; the REST variants come
/// from the `reason` field of a 400 response body or from the status table of
/// a specific REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum DomainError {
    #[error("Nonexistent user")]
    NonexistentUser,
    #[error("Unverified email address")]
    UnverifiedEmailAddress,
    #[error("Email address already verified")]
    EmailAddressVerified,
    #[error("Username taken")]
    UsernameTaken,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Email address taken")]
    EmailAddressTaken,
    #[error("Invalid chat ID")]
    InvalidChatId,
    #[error("Invalid admin ID")]
    InvalidAdminId,
    #[error("Unregistered email address")]
    UnregisteredEmailAddress,
    #[error("Invalid user ID")]
    InvalidUserId,
    #[error("Invalid message ID")]
    InvalidMessageId,
    #[error("Cannot delete account")]
    CannotDeleteAccount,
    #[error("Invalid poll")]
    InvalidPoll,
    #[error("Nonexistent option")]
    NonexistentOption,
    #[error("Invalid invite code")]
    InvalidInviteCode,
    #[error("Invalid invited chat")]
    InvalidInvitedChat,
    #[error("Invalid domain")]
    InvalidDomain,
    #[error("Invalid action")]
    InvalidAction,

    // REST rejections.
    #[error("User not in chat")]
    UserNotInChat,
    #[error("Invalid context message")]
    InvalidContextMessage,
    #[error("Must be admin")]
    MustBeAdmin,
    #[error("Invalid caption")]
    InvalidCaption,
    #[error("Invalid image")]
    InvalidImage,
    #[error("Invalid audio")]
    InvalidAudio,
    #[error("Invalid video")]
    InvalidVideo,
    #[error("Invalid doc")]
    InvalidDoc,
    #[error("Nonexistent user ID")]
    NonexistentUserId,
    #[error("Nonexistent chat")]
    NonexistentChat,
}

impl DomainError {
    /// Look up a GraphQL error code. Returns `None` for codes outside the vocabulary.
    pub fn from_graphql_code(code: &str) -> Option<Self> {
        let err = match code {
            "NONEXISTENT_USER" => Self::NonexistentUser,
            "UNVERIFIED_EMAIL_ADDRESS" => Self::UnverifiedEmailAddress,
            "EMAIL_ADDRESS_VERIFIED" => Self::EmailAddressVerified,
            "USERNAME_TAKEN" => Self::UsernameTaken,
            "INCORRECT_PASSWORD" => Self::IncorrectPassword,
            "EMAIL_ADDRESS_TAKEN" => Self::EmailAddressTaken,
            "INVALID_CHAT_ID" => Self::InvalidChatId,
            "INVALID_ADMIN_ID" => Self::InvalidAdminId,
            "UNREGISTERED_EMAIL_ADDRESS" => Self::UnregisteredEmailAddress,
            "INVALID_USER_ID" => Self::InvalidUserId,
            "INVALID_MESSAGE_ID" => Self::InvalidMessageId,
            "CANNOT_DELETE_ACCOUNT" => Self::CannotDeleteAccount,
            "INVALID_POLL" => Self::InvalidPoll,
            "NONEXISTENT_OPTION" => Self::NonexistentOption,
            "INVALID_INVITE_CODE" => Self::InvalidInviteCode,
            "INVALID_INVITED_CHAT" => Self::InvalidInvitedChat,
            "INVALID_DOMAIN" => Self::InvalidDomain,
            "INVALID_ACTION" => Self::InvalidAction,
            _ => return None,
        };
        Some(err)
    }

    /// Look up the `reason` of a rejected media upload.
    ///
    /// `INVALID_FILE` resolves to the error matching the uploaded kind.
    pub fn from_upload_reason(reason: &str, kind: MediaKind) -> Option<Self> {
        let err = match reason {
            "USER_NOT_IN_CHAT" => Self::UserNotInChat,
            "INVALID_CONTEXT_MESSAGE" => Self::InvalidContextMessage,
            "MUST_BE_ADMIN" => Self::MustBeAdmin,
            "INVALID_CAPTION" => Self::InvalidCaption,
            "INVALID_FILE" => match kind {
                MediaKind::Image => Self::InvalidImage,
                MediaKind::Audio => Self::InvalidAudio,
                MediaKind::Video => Self::InvalidVideo,
                MediaKind::Doc => Self::InvalidDoc,
            },
            _ => return None,
        };
        Some(err)
    }

    /// The wire code of a GraphQL rejection, or `None` for REST-only variants.
    pub fn graphql_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NonexistentUser => "NONEXISTENT_USER",
            Self::UnverifiedEmailAddress => "UNVERIFIED_EMAIL_ADDRESS",
            Self::EmailAddressVerified => "EMAIL_ADDRESS_VERIFIED",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::IncorrectPassword => "INCORRECT_PASSWORD",
            Self::EmailAddressTaken => "EMAIL_ADDRESS_TAKEN",
            Self::InvalidChatId => "INVALID_CHAT_ID",
            Self::InvalidAdminId => "INVALID_ADMIN_ID",
            Self::UnregisteredEmailAddress => "UNREGISTERED_EMAIL_ADDRESS",
            Self::InvalidUserId => "INVALID_USER_ID",
            Self::InvalidMessageId => "INVALID_MESSAGE_ID",
            Self::CannotDeleteAccount => "CANNOT_DELETE_ACCOUNT",
            Self::InvalidPoll => "INVALID_POLL",
            Self::NonexistentOption => "NONEXISTENT_OPTION",
            Self::InvalidInviteCode => "INVALID_INVITE_CODE",
            Self::InvalidInvitedChat => "INVALID_INVITED_CHAT",
            Self::InvalidDomain => "INVALID_DOMAIN",
            Self::InvalidAction => "INVALID_ACTION",
            _ => return None,
        };
        Some(code)
    }
}

/// Triage a transport status.
///
/// Evaluated in order: 401, then 500..=599, then anything other than
/// `success`. Returns `None` when the status is the expected success code.
pub fn classify_status(status: u16, success: u16) -> Option<ApiError> {
    match status {
        401 => Some(ApiError::Unauthorized),
        500..=599 => Some(ApiError::InternalServerError),
        s if s != success => Some(ApiError::Connection(format!(
            "Unexpected HTTP status {s}"
        ))),
        _ => None,
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Connection(format!("Malformed response: {err}"))
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::Connection(format!("Invalid URL: {err}"))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ApiError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

/// A specialized Result type for Omni Chat operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_priority() {
        assert_eq!(classify_status(401, 200), Some(ApiError::Unauthorized));
        assert_eq!(classify_status(500, 200), Some(ApiError::InternalServerError));
        assert_eq!(classify_status(599, 200), Some(ApiError::InternalServerError));
        assert!(matches!(
            classify_status(404, 200),
            Some(ApiError::Connection(_))
        ));
        assert!(matches!(
            classify_status(600, 200),
            Some(ApiError::Connection(_))
        ));
        assert_eq!(classify_status(200, 200), None);
        assert!(classify_status(200, 204).is_some());
        assert_eq!(classify_status(204, 204), None);
    }

    #[test]
    fn test_graphql_code_mapping() {
        assert_eq!(
            ApiError::from_graphql_code("INVALID_CHAT_ID"),
            ApiError::Domain(DomainError::InvalidChatId)
        );
        assert_eq!(
            ApiError::from_graphql_code("INTERNAL_SERVER_ERROR"),
            ApiError::InternalServerError
        );
        assert!(matches!(
            ApiError::from_graphql_code("SOME_UNKNOWN_CODE"),
            ApiError::Connection(_)
        ));
    }

    #[test]
    fn test_graphql_code_round_trips_for_every_known_code() {
        let codes = [
            "NONEXISTENT_USER",
            "UNVERIFIED_EMAIL_ADDRESS",
            "EMAIL_ADDRESS_VERIFIED",
            "USERNAME_TAKEN",
            "INCORRECT_PASSWORD",
            "EMAIL_ADDRESS_TAKEN",
            "INVALID_CHAT_ID",
            "INVALID_ADMIN_ID",
            "UNREGISTERED_EMAIL_ADDRESS",
            "INVALID_USER_ID",
            "INVALID_MESSAGE_ID",
            "CANNOT_DELETE_ACCOUNT",
            "INVALID_POLL",
            "NONEXISTENT_OPTION",
            "INVALID_INVITE_CODE",
            "INVALID_INVITED_CHAT",
            "INVALID_DOMAIN",
            "INVALID_ACTION",
        ];
        for code in codes {
            let err = DomainError::from_graphql_code(code).unwrap();
            assert_eq!(err.graphql_code(), Some(code));
        }
    }

    #[test]
    fn test_upload_reason_depends_on_kind() {
        assert_eq!(
            DomainError::from_upload_reason("INVALID_FILE", MediaKind::Audio),
            Some(DomainError::InvalidAudio)
        );
        assert_eq!(
            DomainError::from_upload_reason("INVALID_FILE", MediaKind::Doc),
            Some(DomainError::InvalidDoc)
        );
        assert_eq!(
            DomainError::from_upload_reason("MUST_BE_ADMIN", MediaKind::Video),
            Some(DomainError::MustBeAdmin)
        );
        assert_eq!(DomainError::from_upload_reason("NOPE", MediaKind::Image), None);
        assert_eq!(DomainError::UserNotInChat.graphql_code(), None);
    }

    #[test]
    fn test_is_transport() {
        assert!(ApiError::Unauthorized.is_transport());
        assert!(!ApiError::Domain(DomainError::InvalidPoll).is_transport());
    }
}
