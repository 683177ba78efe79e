use redis_keyspace::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_incr_command() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::set_command("grapes", "41"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    let test_cases = vec![
        ("grapes", TestUtils::expected_integer(42)),
        ("grapes", TestUtils::expected_integer(43)),
        ("mangoes", TestUtils::expected_integer(1)),
    ];

    for (key, expected) in test_cases {
        env.exec_command_immediate_success_response(
            TestUtils::incr_command(key),
            &TestUtils::client_address(41844),
            &expected,
        )
        .await;
    }

    env.exec_command_immediate_success_response(
        TestUtils::get_command("grapes"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_bulk_string("43"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_incr_command_not_an_integer() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::set_command("fruit", "mango"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::incr_command("fruit"),
        &TestUtils::client_address(41844),
        CommandError::NotAnInteger,
    )
    .await;

    env.exec_command_immediate_success_response(
        TestUtils::get_command("fruit"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_bulk_string("mango"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_incr_command_keeps_expiration() {
    let mut env = TestEnv::new();

    env.exec_command_immediate_success_response(
        TestUtils::set_command_with_expiration("counter", "1", 100),
        &TestUtils::client_address(41844),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_immediate_success_response(
        TestUtils::incr_command("counter"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_integer(2),
    )
    .await;

    TestUtils::sleep_ms(200).await;

    env.exec_command_immediate_success_response(
        TestUtils::get_command("counter"),
        &TestUtils::client_address(41844),
        &TestUtils::expected_null(),
    )
    .await;
}
