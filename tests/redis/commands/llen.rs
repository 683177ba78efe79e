use redis_keyspace::{commands::CommandError, key_value_store::StoreError};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_llen_command() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::rpush_command("fruits", &["mango", "raspberry", "apple"]),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(3),
    )
    .await;

    let test_cases = vec![
        ("fruits", TestUtils::expected_integer(3)),
        ("vegetables", TestUtils::expected_integer(0)),
    ];

    for (key, expected) in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::llen_command(key),
            &TestUtils::client_address(41844),
            &expected,
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_llen_command_errors() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::set_command("grape", "mango"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::llen_command("grape"),
        &TestUtils::client_address(41844),
        CommandError::WrongType(StoreError::WrongType),
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::invalid_command(&["LLEN"]),
        &TestUtils::client_address(41844),
        CommandError::WrongNumberOfArguments("llen".to_string()),
    )
    .await;
}
