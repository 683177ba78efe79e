use redis_keyspace::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_watch_aborts_transaction_on_change() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);
    let other = TestUtils::client_address(41845);

    env.dispatch(TestUtils::set_command("balance", "10"), &client)
        .await;

    env.exec_command_immediate_success_response(
        TestUtils::watch_command(&["balance"]),
        &client,
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::incr_command("balance"), &client).await;

    env.dispatch(TestUtils::set_command("balance", "100"), &other)
        .await;

    env.exec_command_transaction_success_response(&client, &TestUtils::expected_null_array())
        .await;

    assert_eq!(
        env.dispatch(TestUtils::get_command("balance"), &client).await,
        TestUtils::expected_bulk_string("100")
    );

    // EXEC cleared the watch, so the next transaction runs.
    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::incr_command("balance"), &client).await;

    env.exec_command_transaction_success_response(
        &client,
        &format!("*1\r\n{}", TestUtils::expected_integer(101)),
    )
    .await;
}

#[tokio::test]
async fn test_watch_without_change_runs_transaction() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.dispatch(TestUtils::watch_command(&["balance", "missing"]), &client)
        .await;
    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::incr_command("balance"), &client).await;

    env.exec_command_transaction_success_response(
        &client,
        &format!("*1\r\n{}", TestUtils::expected_integer(1)),
    )
    .await;
}

#[tokio::test]
async fn test_watch_detects_delete_and_expiry() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.dispatch(TestUtils::set_command("deleted", "x"), &client)
        .await;
    env.dispatch(
        TestUtils::set_command_with_expiration("expiring", "x", 50),
        &client,
    )
    .await;

    for key in ["deleted", "expiring"] {
        env.dispatch(TestUtils::watch_command(&[key]), &client).await;

        if key == "deleted" {
            env.dispatch(TestUtils::del_command(&["deleted"]), &client)
                .await;
        } else {
            TestUtils::sleep_ms(100).await;
        }

        env.dispatch(TestUtils::multi_command(), &client).await;
        env.dispatch(TestUtils::ping_command(), &client).await;

        env.exec_command_transaction_success_response(&client, &TestUtils::expected_null_array())
            .await;
    }
}

#[tokio::test]
async fn test_unwatch() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.dispatch(TestUtils::watch_command(&["balance"]), &client)
        .await;

    env.exec_command_immediate_success_response(
        TestUtils::unwatch_command(),
        &client,
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.dispatch(TestUtils::set_command("balance", "5"), &client)
        .await;
    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::get_command("balance"), &client).await;

    env.exec_command_transaction_success_response(
        &client,
        &format!("*1\r\n{}", TestUtils::expected_bulk_string("5")),
    )
    .await;
}

#[tokio::test]
async fn test_discard_clears_watch() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.dispatch(TestUtils::watch_command(&["balance"]), &client)
        .await;
    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::discard_command(), &client).await;

    env.dispatch(TestUtils::set_command("balance", "5"), &client)
        .await;
    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::get_command("balance"), &client).await;

    env.exec_command_transaction_success_response(
        &client,
        &format!("*1\r\n{}", TestUtils::expected_bulk_string("5")),
    )
    .await;
}

#[tokio::test]
async fn test_watch_errors() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.exec_command_immediate_error_response(
        TestUtils::watch_command(&[]),
        &client,
        CommandError::WrongNumberOfArguments("watch".to_string()),
    )
    .await;

    env.dispatch(TestUtils::multi_command(), &client).await;

    env.exec_command_immediate_error_response(
        TestUtils::watch_command(&["balance"]),
        &client,
        CommandError::WatchInsideMulti,
    )
    .await;
}

#[tokio::test]
async fn test_watch_ignores_lpop_of_zero_elements() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);
    let other = TestUtils::client_address(41845);

    env.dispatch(TestUtils::rpush_command("list", &["a"]), &client)
        .await;
    env.dispatch(TestUtils::watch_command(&["list"]), &client)
        .await;

    assert_eq!(
        env.dispatch(TestUtils::lpop_command_multiple_items("list", 0), &other)
            .await,
        "*0\r\n"
    );

    env.dispatch(TestUtils::multi_command(), &client).await;
    env.dispatch(TestUtils::llen_command("list"), &client).await;

    env.exec_command_transaction_success_response(
        &client,
        &format!("*1\r\n{}", TestUtils::expected_integer(1)),
    )
    .await;
}
