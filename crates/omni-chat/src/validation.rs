//! Scalar validation.
//!
//! The server rejects malformed scalars, but checking them locally saves a
//! round trip and gives a precise error. Validators accept silently or return
//! the [`ScalarError`] naming the violated scalar. They are run by operation
//! wrappers before a request is built, never by the dispatcher.
//!
//! Lengths are counted in characters, not bytes.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    AccountInput, AccountUpdate, ActionMessageInput, GroupChatInput, Login, PollInput,
};

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("UUID pattern is valid")
});

/// A scalar value that the server would reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ScalarError {
    #[error("Invalid DateTime")]
    DateTime,
    #[error("Invalid Username")]
    Username,
    #[error("Invalid Name")]
    Name,
    #[error("Invalid Bio")]
    Bio,
    #[error("Invalid Password")]
    Password,
    #[error("Invalid GroupChatTitle")]
    GroupChatTitle,
    #[error("Invalid GroupChatDescription")]
    GroupChatDescription,
    #[error("Invalid Uuid")]
    Uuid,
    #[error("Invalid MessageText")]
    MessageText,
}

/// Result of a scalar check.
pub type ValidationResult = std::result::Result<(), ScalarError>;

fn has_whitespace(value: &str) -> bool {
    value.chars().any(char::is_whitespace)
}

fn is_padded(value: &str) -> bool {
    value.trim() != value
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// 1-30 characters, no whitespace, no uppercase letters.
pub fn validate_username(value: &str) -> ValidationResult {
    let len = char_len(value);
    if has_whitespace(value) || value.chars().any(char::is_uppercase) || !(1..=30).contains(&len) {
        return Err(ScalarError::Username);
    }
    Ok(())
}

/// At most 30 characters, no whitespace.
pub fn validate_name(value: &str) -> ValidationResult {
    if has_whitespace(value) || char_len(value) > 30 {
        return Err(ScalarError::Name);
    }
    Ok(())
}

/// At most 2,500 characters without leading or trailing whitespace.
pub fn validate_bio(value: &str) -> ValidationResult {
    if char_len(value) > 2500 || is_padded(value) {
        return Err(ScalarError::Bio);
    }
    Ok(())
}

/// Any string without whitespace.
pub fn validate_password(value: &str) -> ValidationResult {
    if has_whitespace(value) {
        return Err(ScalarError::Password);
    }
    Ok(())
}

/// 1-70 characters, at least one of which isn't whitespace, unpadded.
pub fn validate_group_chat_title(value: &str) -> ValidationResult {
    let len = char_len(value);
    if !(1..=70).contains(&len) || value.trim().is_empty() || is_padded(value) {
        return Err(ScalarError::GroupChatTitle);
    }
    Ok(())
}

/// At most 1,000 characters, unpadded.
pub fn validate_group_chat_description(value: &str) -> ValidationResult {
    if char_len(value) > 1000 || is_padded(value) {
        return Err(ScalarError::GroupChatDescription);
    }
    Ok(())
}

/// 1-10,000 characters, at least one of which isn't whitespace, unpadded.
pub fn validate_message_text(value: &str) -> ValidationResult {
    let len = char_len(value);
    if !(1..=10_000).contains(&len) || value.trim().is_empty() || is_padded(value) {
        return Err(ScalarError::MessageText);
    }
    Ok(())
}

/// An ISO 8601 timestamp (RFC 3339 profile) or a bare calendar date.
pub fn validate_date_time(value: &str) -> ValidationResult {
    let valid = chrono::DateTime::parse_from_rfc3339(value).is_ok()
        || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if !valid {
        return Err(ScalarError::DateTime);
    }
    Ok(())
}

/// Hyphenated hexadecimal UUID in 8-4-4-4-12 form.
pub fn validate_uuid(value: &str) -> ValidationResult {
    if !UUID_REGEX.is_match(value) {
        return Err(ScalarError::Uuid);
    }
    Ok(())
}

/// Validate a [`Login`].
pub fn validate_login(login: &Login) -> ValidationResult {
    validate_username(&login.username)?;
    validate_password(&login.password)
}

/// Validate an [`AccountInput`]. Absent optional fields are skipped.
pub fn validate_account_input(input: &AccountInput) -> ValidationResult {
    validate_username(&input.username)?;
    validate_password(&input.password)?;
    if let Some(first_name) = &input.first_name {
        validate_name(first_name)?;
    }
    if let Some(last_name) = &input.last_name {
        validate_name(last_name)?;
    }
    if let Some(bio) = &input.bio {
        validate_bio(bio)?;
    }
    Ok(())
}

/// Validate an [`AccountUpdate`]. Fields left unchanged are skipped.
pub fn validate_account_update(update: &AccountUpdate) -> ValidationResult {
    if let Some(username) = &update.username {
        validate_username(username)?;
    }
    if let Some(password) = &update.password {
        validate_password(password)?;
    }
    if let Some(first_name) = &update.first_name {
        validate_name(first_name)?;
    }
    if let Some(last_name) = &update.last_name {
        validate_name(last_name)?;
    }
    if let Some(bio) = &update.bio {
        validate_bio(bio)?;
    }
    Ok(())
}

/// Validate a [`GroupChatInput`].
pub fn validate_group_chat_input(input: &GroupChatInput) -> ValidationResult {
    validate_group_chat_title(&input.title)?;
    validate_group_chat_description(&input.description)
}

/// Validate the text and every action of an [`ActionMessageInput`].
pub fn validate_action_message_input(input: &ActionMessageInput) -> ValidationResult {
    std::iter::once(&input.text)
        .chain(&input.actions)
        .try_for_each(|text| validate_message_text(text))
}

/// Validate the title and every option of a [`PollInput`].
pub fn validate_poll_input(input: &PollInput) -> ValidationResult {
    std::iter::once(&input.title)
        .chain(&input.options)
        .try_for_each(|text| validate_message_text(text))
}
