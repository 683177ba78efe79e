use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct LpopArguments {
    key: String,
    count: Option<usize>,
}

impl LpopArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        match arguments {
            [key] => Ok(Self {
                key: key.clone(),
                count: None,
            }),
            [key, count] => {
                let Ok(count) = count.parse::<usize>() else {
                    return Err(CommandError::InvalidLPopCount);
                };

                Ok(Self {
                    key: key.clone(),
                    count: Some(count),
                })
            }
            _ => Err(CommandError::wrong_number_of_arguments("lpop")),
        }
    }
}

/// Handles the Redis LPOP command.
///
/// Without a count, pops one element and replies with it as a bulk string,
/// or nil if the key is missing. With a count, pops up to that many elements
/// and replies with an array, or a null array if the key is missing. The key
/// is deleted once its last element is popped.
pub fn lpop(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    let Some(count) = lpop_arguments.count else {
        let popped = store.update_list(&lpop_arguments.key, false, |list| list.pop_front())?;

        return match popped.flatten() {
            Some(value) => Ok(RespValue::BulkString(value)),
            None => Ok(RespValue::Null),
        };
    };

    // Popping nothing is a read; it must not touch the key's version.
    if count == 0 {
        return match store.get_list(&lpop_arguments.key)? {
            Some(_) => Ok(RespValue::Array(Vec::new())),
            None => Ok(RespValue::NullArray),
        };
    }

    let popped = store.update_list(&lpop_arguments.key, false, |list| {
        let count = count.min(list.len());
        list.drain(..count).collect::<Vec<String>>()
    })?;

    match popped {
        Some(values) => Ok(RespValue::array_from_strings(values)),
        None => Ok(RespValue::NullArray),
    }
}
