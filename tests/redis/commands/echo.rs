use redis_keyspace::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_echo_command() {
    let mut env = TestEnv::new();

    let test_cases = vec!["grape", "Hello, World!", ""];

    for message in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::echo_command(message),
            &TestUtils::client_address(41844),
            &TestUtils::expected_bulk_string(message),
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_echo_command_invalid() {
    let mut env = TestEnv::new();

    let test_cases = vec![
        TestUtils::invalid_command(&["ECHO"]),
        TestUtils::invalid_command(&["ECHO", "grape", "mango"]),
    ];

    for command in test_cases {
        env.exec_command_immediate_error_response(
            command,
            &TestUtils::client_address(41844),
            CommandError::WrongNumberOfArguments("echo".to_string()),
        )
        .await;
    }
}
