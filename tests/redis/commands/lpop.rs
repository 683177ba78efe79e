use redis_keyspace::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lpop_command() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::rpush_command("fruits", &["mango", "raspberry"]),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(2),
    )
    .await;

    let test_cases = vec![
        TestUtils::expected_bulk_string("mango"),
        TestUtils::expected_bulk_string("raspberry"),
        TestUtils::expected_null(),
    ];

    for expected in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::lpop_command("fruits"),
            &TestUtils::client_address(41844),
            &expected,
        )
        .await;
    }

    env.exec_command_immediate_success_response(
        TestUtils::exists_command(&["fruits"]),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(0),
    )
    .await;
}

#[tokio::test]
async fn test_handle_lpop_command_multiple_items() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::rpush_command("fruits", &["mango", "raspberry", "apple", "kiwi"]),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(4),
    )
    .await;

    let test_cases = vec![
        (2, TestUtils::expected_bulk_string_array(&["mango", "raspberry"])),
        (5, TestUtils::expected_bulk_string_array(&["apple", "kiwi"])),
        (1, TestUtils::expected_null_array()),
    ];

    for (count, expected) in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::lpop_command_multiple_items("fruits", count),
            &TestUtils::client_address(41844),
            &expected,
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_lpop_command_invalid() {
    let mut env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::invalid_command(&["LPOP"]),
            CommandError::WrongNumberOfArguments("lpop".to_string()),
        ),
        (
            TestUtils::invalid_command(&["LPOP", "fruits", "-1"]),
            CommandError::InvalidLPopCount,
        ),
        (
            TestUtils::invalid_command(&["LPOP", "fruits", "two"]),
            CommandError::InvalidLPopCount,
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
