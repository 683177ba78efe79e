use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct GetArguments {
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("get"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Handles the Redis GET command.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The value stored at the key
/// * `Ok(RespValue::Null)` - If the key does not exist or has expired
/// * `Err(CommandError::WrongType)` - If the key holds a list or a stream
/// * `Err(CommandError::WrongNumberOfArguments)` - If not exactly one key is given
pub fn get(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    match store.get_string(&get_arguments.key)? {
        Some(value) => Ok(RespValue::BulkString(value.clone())),
        None => Ok(RespValue::Null),
    }
}
