use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    commands::{
        CommandError,
        command_handler::{CommandResult, TransactionBatch},
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct ExecArguments;

impl ExecArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("exec"));
        }

        Ok(Self)
    }
}

/// Ends the client's transaction and hands its buffer back as a batch to run.
/// The watches are cleared here whether or not the batch ends up running.
pub async fn exec(
    client_address: &str,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    ExecArguments::parse(arguments)?;

    let mut state_guard = state.lock().await;

    let Ok(commands) = state_guard.remove_transaction(client_address) else {
        return Err(CommandError::ExecWithoutMulti);
    };

    let watched_keys = state_guard.take_watched_keys(client_address);

    Ok(CommandResult::Batch(TransactionBatch {
        commands,
        watched_keys,
    }))
}

/// Runs a transaction batch under a single keyspace lock, so no other client
/// observes or writes the keyspace part way through.
///
/// Replies with a null array, running nothing, if a watched key changed
/// since WATCH. Otherwise replies with one result per command, errors
/// included in their position. Blocked clients are served once the whole
/// batch has run.
pub async fn run_transaction_commands(
    client_address: &str,
    batch: TransactionBatch,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
) -> RespValue {
    let mut store_guard = store.lock().await;

    let watched_key_changed = batch
        .watched_keys
        .iter()
        .any(|(key, version)| store_guard.version(key) != *version);

    if watched_key_changed {
        debug!(client = client_address, "watched key changed, transaction aborted");
        return RespValue::NullArray;
    }

    let responses = batch
        .commands
        .iter()
        .map(|command| {
            command
                .execute(&mut store_guard)
                .unwrap_or_else(|e| e.as_resp())
        })
        .collect::<Vec<RespValue>>();

    let mut state_guard = state.lock().await;
    state_guard.serve_ready_keys(&mut store_guard);

    debug!(
        client = client_address,
        commands = responses.len(),
        "transaction executed"
    );

    RespValue::Array(responses)
}
