use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct EchoArguments {
    message: String,
}

impl EchoArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [message] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("echo"));
        };

        Ok(Self {
            message: message.clone(),
        })
    }
}

/// Handles the Redis ECHO command.
///
/// Returns the single argument unchanged, as a bulk string.
///
/// # Examples
///
/// ```ignore
/// // ECHO "hello world"
/// let result = echo(&["hello world".to_string()]);
/// // Returns: RespValue::BulkString("hello world")
/// ```
pub fn echo(arguments: &[String]) -> Result<RespValue, CommandError> {
    let echo_arguments = EchoArguments::parse(arguments)?;

    Ok(RespValue::BulkString(echo_arguments.message))
}
