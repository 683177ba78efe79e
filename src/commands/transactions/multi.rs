use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    commands::{CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::State,
};

pub struct MultiArguments;

impl MultiArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        match arguments {
            [] => Ok(Self),
            _ => Err(CommandError::wrong_number_of_arguments("multi")),
        }
    }
}

/// Opens a transaction: from here on the client's commands are buffered
/// until EXEC or DISCARD. Fails if one is already open, leaving it intact.
pub async fn multi(
    client_address: &str,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    MultiArguments::parse(arguments)?;

    state
        .lock()
        .await
        .start_transaction(client_address.to_string())?;

    debug!(client = client_address, "transaction started");

    Ok(CommandResult::Response(RespValue::ok()))
}
