use std::time::Duration;

use tokio::time::Instant;

use crate::{
    commands::command_error::CommandError,
    expiry,
    key_value_store::{DataType, KeyValueStore, Value},
    resp::RespValue,
};

/// Represents the parsed arguments for the SET command
pub struct SetArguments {
    /// The key name to store the value under
    key: String,
    /// The value to be stored under the given key
    value: String,
    /// Time to live, if the key should expire
    ttl: Option<Duration>,
}

impl SetArguments {
    /// Parses command arguments into a SetArguments structure.
    ///
    /// # Arguments
    ///
    /// * `arguments` - One of:
    ///   - `[key, value]` - For permanent storage
    ///   - `[key, value, "PX", milliseconds]` - Expires after the given milliseconds
    ///   - `[key, value, "EX", seconds]` - Expires after the given seconds
    ///
    /// # Returns
    ///
    /// * `Ok(SetArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongNumberOfArguments)` - If fewer than 2 arguments are given
    /// * `Err(CommandError::SyntaxError)` - If the option is not PX or EX, or its value is missing
    /// * `Err(CommandError::NotAnInteger)` - If the expiration is not a valid integer
    /// * `Err(CommandError::InvalidExpireTime)` - If the expiration is zero
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let result = SetArguments::parse(&["mykey".to_string(), "hello".to_string()]);
    /// // Returns: Ok(SetArguments { key: "mykey", value: "hello", ttl: None })
    ///
    /// let result = SetArguments::parse(&[
    ///     "mykey".to_string(),
    ///     "hello".to_string(),
    ///     "PX".to_string(),
    ///     "1000".to_string(),
    /// ]);
    /// // Returns: Ok(SetArguments { key: "mykey", value: "hello", ttl: Some(1s) })
    /// ```
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let (key, value, options) = match arguments {
            [key, value, options @ ..] => (key, value, options),
            _ => return Err(CommandError::wrong_number_of_arguments("set")),
        };

        let ttl = match options {
            [] => None,
            [unit, amount] => {
                let Ok(amount) = amount.parse::<u64>() else {
                    return Err(CommandError::NotAnInteger);
                };

                if amount == 0 {
                    return Err(CommandError::InvalidExpireTime("set".to_string()));
                }

                match unit.to_uppercase().as_str() {
                    "PX" => Some(Duration::from_millis(amount)),
                    "EX" => Some(Duration::from_secs(amount)),
                    _ => return Err(CommandError::SyntaxError),
                }
            }
            _ => return Err(CommandError::SyntaxError),
        };

        Ok(Self {
            key: key.clone(),
            value: value.clone(),
            ttl,
        })
    }
}

/// Handles the Redis SET command.
///
/// Stores a string under the key, replacing any previous value of any type
/// and any previous expiration. The expiration is measured from the moment
/// the command runs, which for a queued command is EXEC time.
pub fn set(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    let expiration: Option<Instant> = set_arguments.ttl.map(expiry::deadline_after);

    store.set(
        set_arguments.key,
        Value::new(DataType::String(set_arguments.value), expiration),
    );

    Ok(RespValue::ok())
}
