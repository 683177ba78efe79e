use redis_keyspace::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lrange_command() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::rpush_command("list_key2", &["a", "b", "c", "d", "e"]),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(5),
    )
    .await;

    let test_cases = vec![
        (0, 1, vec!["a", "b"]),
        (2, 4, vec!["c", "d", "e"]),
        (-2, -1, vec!["d", "e"]),
        (0, -3, vec!["a", "b", "c"]),
        (-10, 1, vec!["a", "b"]),
        (0, 100, vec!["a", "b", "c", "d", "e"]),
        (3, 1, vec![]),
        (5, 10, vec![]),
    ];

    for (start, stop, expected) in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::lrange_command("list_key2", start, stop),
            &TestUtils::client_address(41844),
            &TestUtils::expected_bulk_string_array(&expected),
        )
        .await;
    }

    env.exec_command_immediate_success_response(
        TestUtils::lrange_command("missing", 0, -1),
        &TestUtils::client_address(41844),
        &TestUtils::expected_bulk_string_array(&[]),
    )
    .await;
}

#[tokio::test]
async fn test_handle_lrange_command_invalid() {
    let mut env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::invalid_command(&["LRANGE", "list_key2", "0"]),
            CommandError::WrongNumberOfArguments("lrange".to_string()),
        ),
        (
            TestUtils::invalid_command(&["LRANGE", "list_key2", "zero", "1"]),
            CommandError::NotAnInteger,
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_immediate_error_response(
            command,
            &TestUtils::client_address(41844),
            expected_error,
        )
        .await;
    }
}
