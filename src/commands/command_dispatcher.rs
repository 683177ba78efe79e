use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    commands::{
        CommandHandler, command_handler::CommandResult, transactions::run_transaction_commands,
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

/// Turns one parsed request into its reply.
///
/// Errors of any kind become RESP error replies; nothing here ends the
/// connection.
pub async fn dispatch_command(
    input: RespValue,
    client_address: &str,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
) -> RespValue {
    let command = match CommandHandler::new(input) {
        Ok(command) => command,
        Err(e) => return e.as_resp(),
    };

    debug!(client = client_address, command = %command.name, "dispatching command");

    match command
        .handle_command(client_address, Arc::clone(&store), Arc::clone(&state))
        .await
    {
        Ok(CommandResult::Response(response)) => response,
        Ok(CommandResult::Batch(batch)) => {
            run_transaction_commands(client_address, batch, store, state).await
        }
        Err(e) => e.as_resp(),
    }
}
