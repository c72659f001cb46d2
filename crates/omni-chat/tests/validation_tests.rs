//! Scalar validation tests.

use omni_chat::models::{
    AccountInput, AccountUpdate, GroupChatInput, GroupChatPublicity, Login, PollInput,
};
use omni_chat::validation::*;

#[test]
fn test_username() {
    assert_eq!(validate_username("username"), Ok(()));
    assert_eq!(validate_username("user name"), Err(ScalarError::Username));
    assert_eq!(validate_username("Username"), Err(ScalarError::Username));
    assert_eq!(validate_username(""), Err(ScalarError::Username));
    assert_eq!(validate_username(&"a".repeat(30)), Ok(()));
    assert_eq!(validate_username(&"a".repeat(31)), Err(ScalarError::Username));
}

#[test]
fn test_name() {
    assert_eq!(validate_name("Name"), Ok(()));
    assert_eq!(validate_name(""), Ok(()));
    assert_eq!(validate_name("Middle Name"), Err(ScalarError::Name));
    assert_eq!(validate_name(&"a".repeat(31)), Err(ScalarError::Name));
}

#[test]
fn test_bio() {
    assert_eq!(validate_bio("Bio"), Ok(()));
    assert_eq!(validate_bio(""), Ok(()));
    assert_eq!(validate_bio(&"a".repeat(2501)), Err(ScalarError::Bio));
    assert_eq!(validate_bio(" Bio "), Err(ScalarError::Bio));
}

#[test]
fn test_password() {
    assert_eq!(validate_password("password"), Ok(()));
    assert_eq!(validate_password("pass word"), Err(ScalarError::Password));
    assert_eq!(validate_password("pass\tword"), Err(ScalarError::Password));
}

#[test]
fn test_group_chat_title() {
    assert_eq!(validate_group_chat_title("Title"), Ok(()));
    assert_eq!(validate_group_chat_title(""), Err(ScalarError::GroupChatTitle));
    assert_eq!(validate_group_chat_title("   "), Err(ScalarError::GroupChatTitle));
    assert_eq!(validate_group_chat_title(" Title "), Err(ScalarError::GroupChatTitle));
    assert_eq!(
        validate_group_chat_title(&"a".repeat(71)),
        Err(ScalarError::GroupChatTitle)
    );
}

#[test]
fn test_group_chat_description() {
    assert_eq!(validate_group_chat_description("Description"), Ok(()));
    assert_eq!(validate_group_chat_description(""), Ok(()));
    assert_eq!(
        validate_group_chat_description(" Description "),
        Err(ScalarError::GroupChatDescription)
    );
    assert_eq!(
        validate_group_chat_description(&"a".repeat(1001)),
        Err(ScalarError::GroupChatDescription)
    );
}

#[test]
fn test_message_text() {
    assert_eq!(validate_message_text("Hi"), Ok(()));
    assert_eq!(validate_message_text(""), Err(ScalarError::MessageText));
    assert_eq!(validate_message_text("\n"), Err(ScalarError::MessageText));
    assert_eq!(validate_message_text(" Hi "), Err(ScalarError::MessageText));
    assert_eq!(validate_message_text(&"a".repeat(10_000)), Ok(()));
    assert_eq!(
        validate_message_text(&"a".repeat(10_001)),
        Err(ScalarError::MessageText)
    );
}

#[test]
fn test_date_time() {
    assert_eq!(validate_date_time("2021-08-04T08:52:16.510Z"), Ok(()));
    assert_eq!(validate_date_time("2021-08-04T08:52:16+05:30"), Ok(()));
    assert_eq!(validate_date_time("2021-08-04"), Ok(()));
    assert_eq!(validate_date_time("yesterday"), Err(ScalarError::DateTime));
    assert_eq!(validate_date_time("2021-13-04"), Err(ScalarError::DateTime));
}

#[test]
fn test_uuid() {
    assert_eq!(validate_uuid("8d2f1b1e-2c3a-4f5b-9a6c-7d8e9f0a1b2c"), Ok(()));
    assert_eq!(validate_uuid("not-a-uuid"), Err(ScalarError::Uuid));
}

#[test]
fn test_login() {
    assert_eq!(validate_login(&Login::new("john", "pass")), Ok(()));
    assert_eq!(
        validate_login(&Login::new("john", "pa ss")),
        Err(ScalarError::Password)
    );
}

#[test]
fn test_account_input() {
    let mut input = AccountInput {
        username: "john".into(),
        password: "pass".into(),
        email_address: "john@example.com".into(),
        first_name: None,
        last_name: None,
        bio: None,
    };
    assert_eq!(validate_account_input(&input), Ok(()));

    input.bio = Some(" padded".into());
    assert_eq!(validate_account_input(&input), Err(ScalarError::Bio));
}

#[test]
fn test_account_update_skips_absent_fields() {
    assert_eq!(validate_account_update(&AccountUpdate::default()), Ok(()));

    let update = AccountUpdate {
        first_name: Some("Mary Ann".into()),
        ..Default::default()
    };
    assert_eq!(validate_account_update(&update), Err(ScalarError::Name));
}

#[test]
fn test_group_chat_input() {
    let input = GroupChatInput {
        title: "Book Club".into(),
        description: " Weekly ".into(),
        user_id_list: vec![2, 3],
        admin_id_list: vec![1],
        is_broadcast: false,
        publicity: GroupChatPublicity::Invitable,
    };
    assert_eq!(
        validate_group_chat_input(&input),
        Err(ScalarError::GroupChatDescription)
    );
}

#[test]
fn test_poll_input() {
    let poll = PollInput {
        title: "Lunch?".into(),
        options: vec!["Pizza".into(), "".into()],
    };
    assert_eq!(validate_poll_input(&poll), Err(ScalarError::MessageText));
}
