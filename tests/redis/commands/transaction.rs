use redis_keyspace::{commands::CommandError, state::StateError};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_transaction_runs_queued_commands() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    let test_cases = vec![
        (TestUtils::multi_command(), TestUtils::expected_simple_string("OK")),
        (
            TestUtils::set_command("foo", "41"),
            TestUtils::expected_simple_string("QUEUED"),
        ),
        (
            TestUtils::incr_command("foo"),
            TestUtils::expected_simple_string("QUEUED"),
        ),
        (
            TestUtils::get_command("foo"),
            TestUtils::expected_simple_string("QUEUED"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_immediate_success_response(command, &client, &expected)
            .await;
    }

    // Nothing ran yet.
    assert!(env.get_store().await.get("foo").is_none());
    assert_eq!(
        env.get_state().await.get_transaction(&client).map(Vec::len),
        Some(3)
    );

    env.exec_command_transaction_success_response(
        &client,
        &format!(
            "*3\r\n{}{}{}",
            TestUtils::expected_simple_string("OK"),
            TestUtils::expected_integer(42),
            TestUtils::expected_bulk_string("42"),
        ),
    )
    .await;

    assert!(!env.get_state().await.is_in_transaction(&client));
}

#[tokio::test]
async fn test_transaction_error_does_not_abort_batch() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    assert_eq!(
        env.dispatch(TestUtils::set_command("foo", "bar"), &client).await,
        TestUtils::expected_simple_string("OK")
    );

    for command in [
        TestUtils::multi_command(),
        TestUtils::set_command("baz", "qux"),
        TestUtils::incr_command("foo"),
    ] {
        env.dispatch(command, &client).await;
    }

    env.exec_command_transaction_success_response(
        &client,
        "*2\r\n+OK\r\n-ERR value is not an integer or out of range\r\n",
    )
    .await;

    assert_eq!(
        env.dispatch(TestUtils::get_command("baz"), &client).await,
        TestUtils::expected_bulk_string("qux")
    );
    assert_eq!(
        env.dispatch(TestUtils::get_command("foo"), &client).await,
        TestUtils::expected_bulk_string("bar")
    );
}

#[tokio::test]
async fn test_empty_transaction() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.dispatch(TestUtils::multi_command(), &client).await;

    env.exec_command_transaction_success_response(&client, "*0\r\n")
        .await;
}

#[tokio::test]
async fn test_transaction_rejects_invalid_command_at_queue_time() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.dispatch(TestUtils::multi_command(), &client).await;

    let test_cases = vec![
        (
            TestUtils::invalid_command(&["FLUSHALL"]),
            CommandError::UnknownCommand("flushall".to_string()),
        ),
        (
            TestUtils::invalid_command(&["GET"]),
            CommandError::WrongNumberOfArguments("get".to_string()),
        ),
        (
            TestUtils::invalid_command(&["SET", "k", "v", "PX"]),
            CommandError::SyntaxError,
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_immediate_error_response(command, &client, expected_error)
            .await;
    }

    env.exec_command_immediate_success_response(
        TestUtils::set_command("k", "v"),
        &client,
        &TestUtils::expected_simple_string("QUEUED"),
    )
    .await;

    // Rejected commands were not buffered and the transaction stayed open.
    env.exec_command_transaction_success_response(&client, "*1\r\n+OK\r\n")
        .await;
}

#[tokio::test]
async fn test_discard_transaction() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    for command in [
        TestUtils::multi_command(),
        TestUtils::set_command("foo", "bar"),
    ] {
        env.dispatch(command, &client).await;
    }

    env.exec_command_immediate_success_response(
        TestUtils::discard_command(),
        &client,
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_immediate_success_response(
        TestUtils::get_command("foo"),
        &client,
        &TestUtils::expected_null(),
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::exec_command(),
        &client,
        CommandError::ExecWithoutMulti,
    )
    .await;
}

#[tokio::test]
async fn test_transaction_control_errors() {
    let mut env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    env.exec_command_immediate_error_response(
        TestUtils::exec_command(),
        &client,
        CommandError::ExecWithoutMulti,
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::discard_command(),
        &client,
        CommandError::DiscardWithoutMulti,
    )
    .await;

    env.dispatch(TestUtils::multi_command(), &client).await;

    env.exec_command_immediate_error_response(
        TestUtils::multi_command(),
        &client,
        CommandError::TransactionError(StateError::TransactionAlreadyStarted),
    )
    .await;

    assert_eq!(
        env.dispatch(TestUtils::multi_command(), &client).await,
        TestUtils::expected_error(CommandError::TransactionError(
            StateError::TransactionAlreadyStarted
        ))
    );

    // The transaction survives a nested MULTI.
    assert!(env.get_state().await.is_in_transaction(&client));
}

#[tokio::test]
async fn test_transactions_are_per_client() {
    let mut env = TestEnv::new();
    let first = TestUtils::client_address(41844);
    let second = TestUtils::client_address(41845);

    env.dispatch(TestUtils::multi_command(), &first).await;
    env.dispatch(TestUtils::set_command("foo", "1"), &first).await;

    // Another client runs commands immediately and sees nothing queued.
    env.exec_command_immediate_success_response(
        TestUtils::get_command("foo"),
        &second,
        &TestUtils::expected_null(),
    )
    .await;

    env.exec_command_immediate_error_response(
        TestUtils::exec_command(),
        &second,
        CommandError::ExecWithoutMulti,
    )
    .await;

    env.exec_command_transaction_success_response(&first, "*1\r\n+OK\r\n")
        .await;
}

#[tokio::test]
async fn test_transaction_push_serves_blocked_client() {
    let env = TestEnv::new();
    let client = TestUtils::client_address(41844);

    let blocked = TestUtils::spawn_blpop_task(
        &env,
        &["jobs"],
        "2",
        &TestUtils::client_address(41850),
    );
    TestUtils::sleep_ms(50).await;

    let mut env_mut = env.clone();

    for command in [
        TestUtils::multi_command(),
        TestUtils::rpush_command("jobs", &["a", "b"]),
        TestUtils::lpop_command("jobs"),
    ] {
        env_mut.dispatch(command, &client).await;
    }

    // The whole batch runs before the blocked client is served.
    env_mut
        .exec_command_transaction_success_response(
            &client,
            &format!(
                "*2\r\n{}{}",
                TestUtils::expected_integer(2),
                TestUtils::expected_bulk_string("a"),
            ),
        )
        .await;

    assert_eq!(
        TestUtils::wait_for_completion(blocked, std::time::Duration::from_secs(2)).await,
        Ok(TestUtils::expected_bulk_string_array(&["jobs", "b"]))
    );
}
