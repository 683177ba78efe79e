use redis_keyspace::{commands::CommandError, key_value_store::StoreError};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_get_command() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::set_command("grape", "mango"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    let test_cases = vec![
        ("grape", TestUtils::expected_bulk_string("mango")),
        ("apple", TestUtils::expected_null()),
    ];

    for (key, expected) in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::get_command(key),
            &TestUtils::client_address(41844),
            &expected,
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_get_command_wrong_type() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::rpush_command("fruits", &["mango"]),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(1),
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::get_command("fruits"),
        &TestUtils::client_address(41844),
        CommandError::WrongType(StoreError::WrongType),
    )
    .await;
}

#[tokio::test]
async fn test_handle_get_command_invalid() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_error_response(
        TestUtils::invalid_command(&["GET", "grape", "mango"]),
        &TestUtils::client_address(41844),
        CommandError::WrongNumberOfArguments("get".to_string()),
    )
    .await;
}
