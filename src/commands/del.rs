use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct DelArguments {
    keys: Vec<String>,
}

impl DelArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("del"));
        }

        Ok(Self {
            keys: arguments.to_vec(),
        })
    }
}

/// Handles the Redis DEL command. Replies with the number of keys removed;
/// missing and expired keys are not counted.
pub fn del(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let del_arguments = DelArguments::parse(arguments)?;

    let removed = del_arguments
        .keys
        .iter()
        .filter(|key| store.delete(key))
        .count();

    Ok(RespValue::Integer(removed as i64))
}
