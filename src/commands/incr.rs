use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct IncrArguments {
    key: String,
}

impl IncrArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("incr"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Handles the Redis INCR command.
///
/// A missing key counts as 0. The stored string must parse as a signed 64-bit
/// integer and must not overflow when incremented; otherwise the value is left
/// untouched and an error is returned. The key's expiration is kept.
pub fn incr(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let updated = store.update_string(&incr_arguments.key, |current| {
        let current = match current {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| CommandError::NotAnInteger)?,
            None => 0,
        };

        current
            .checked_add(1)
            .map(|value| value.to_string())
            .ok_or(CommandError::NotAnInteger)
    })?;

    let Ok(value) = updated.parse::<i64>() else {
        return Err(CommandError::NotAnInteger);
    };

    Ok(RespValue::Integer(value))
}
