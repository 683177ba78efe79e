use redis_keyspace::{commands::CommandError, stream::StreamError};

use crate::test_utils::{TestEnv, TestUtils};

async fn seed_stream(env: &mut TestEnv) {
    let entries = vec![
        ("1526985054069-0", vec!["temperature", "36", "humidity", "95"]),
        ("1526985054069-1", vec!["temperature", "37", "humidity", "94"]),
        ("1526985054070-0", vec!["temperature", "38", "humidity", "93"]),
    ];

    for (id, fields) in entries {
        env.exec_command_immediate_success_response(
            TestUtils::xadd_command("sensor", id, &fields),
            &TestUtils::client_address(41844),
            &TestUtils::expected_bulk_string(id),
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_xrange_command() {
    let mut env = TestEnv::new();
    seed_stream(&mut env).await;

    let first: (&str, &[&str]) = ("1526985054069-0", &["temperature", "36", "humidity", "95"]);
    let second: (&str, &[&str]) = ("1526985054069-1", &["temperature", "37", "humidity", "94"]);
    let third: (&str, &[&str]) = ("1526985054070-0", &["temperature", "38", "humidity", "93"]);

    let test_cases = vec![
        ("-", "+", vec![first, second, third]),
        ("1526985054069", "1526985054069", vec![first, second]),
        ("1526985054069-1", "+", vec![second, third]),
        ("-", "1526985054069-0", vec![first]),
        ("1526985054070-1", "+", vec![]),
        ("1526985054070", "1526985054069", vec![]),
    ];

    for (start, end, expected) in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::xrange_command("sensor", start, end),
            &TestUtils::client_address(41844),
            &TestUtils::expected_stream_entries(&expected),
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_xrange_command_missing_key() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::xrange_command("missing", "-", "+"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_stream_entries(&[]),
    )
    .await;
}

#[tokio::test]
async fn test_handle_xrange_command_invalid() {
    let mut env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::xrange_command("sensor", "abc", "+"),
            CommandError::InvalidStreamId(StreamError::InvalidId),
        ),
        (
            TestUtils::xrange_command("sensor", "-", "1-x"),
            CommandError::InvalidStreamId(StreamError::InvalidId),
        ),
        (
            TestUtils::invalid_command(&["XRANGE", "sensor", "-"]),
            CommandError::WrongNumberOfArguments("xrange".to_string()),
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
