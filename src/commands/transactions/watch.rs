use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{CommandError, command_handler::CommandResult},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct WatchArguments {
    keys: Vec<String>,
}

impl WatchArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("watch"));
        }

        Ok(Self {
            keys: arguments.to_vec(),
        })
    }
}

pub struct UnwatchArguments;

impl UnwatchArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("unwatch"));
        }

        Ok(Self)
    }
}

/// Records the current version of each key. A later EXEC by the same client
/// aborts if any of them changed in the meantime.
pub async fn watch(
    client_address: &str,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let watch_arguments = WatchArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    let mut state_guard = state.lock().await;

    if state_guard.is_in_transaction(client_address) {
        return Err(CommandError::WatchInsideMulti);
    }

    for key in &watch_arguments.keys {
        let version = store_guard.version(key);
        state_guard.watch(client_address, key, version);
    }

    Ok(CommandResult::Response(RespValue::ok()))
}

pub async fn unwatch(
    client_address: &str,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    UnwatchArguments::parse(arguments)?;

    let mut state_guard = state.lock().await;
    state_guard.unwatch(client_address);

    Ok(CommandResult::Response(RespValue::ok()))
}
