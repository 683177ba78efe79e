use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct ExistsArguments {
    keys: Vec<String>,
}

impl ExistsArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("exists"));
        }

        Ok(Self {
            keys: arguments.to_vec(),
        })
    }
}

/// Handles the Redis EXISTS command. A key named twice is counted twice.
pub fn exists(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let exists_arguments = ExistsArguments::parse(arguments)?;

    let count = exists_arguments
        .keys
        .iter()
        .filter(|key| store.exists(key))
        .count();

    Ok(RespValue::Integer(count as i64))
}
