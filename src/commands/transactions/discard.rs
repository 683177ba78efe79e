use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    commands::{CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::State,
};

pub struct DiscardArguments;

impl DiscardArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        match arguments {
            [] => Ok(Self),
            _ => Err(CommandError::wrong_number_of_arguments("discard")),
        }
    }
}

/// Drops the client's buffered commands and its watched keys.
pub async fn discard(
    client_address: &str,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    DiscardArguments::parse(arguments)?;

    let mut state_guard = state.lock().await;

    let discarded = state_guard
        .remove_transaction(client_address)
        .map_err(|_| CommandError::DiscardWithoutMulti)?;
    state_guard.unwatch(client_address);

    debug!(
        client = client_address,
        commands = discarded.len(),
        "transaction discarded"
    );

    Ok(CommandResult::Response(RespValue::ok()))
}
