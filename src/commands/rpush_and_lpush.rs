use std::collections::VecDeque;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct PushArrayOperations {
    key: String,
    values: Vec<String>,
}

impl PushArrayOperations {
    pub fn parse(arguments: &[String], should_prepend: bool) -> Result<Self, CommandError> {
        let [key, values @ ..] = arguments else {
            return Err(push_arity_error(should_prepend));
        };

        if values.is_empty() {
            return Err(push_arity_error(should_prepend));
        }

        Ok(Self {
            key: key.clone(),
            values: values.to_vec(),
        })
    }
}

fn push_arity_error(should_prepend: bool) -> CommandError {
    if should_prepend {
        CommandError::wrong_number_of_arguments("lpush")
    } else {
        CommandError::wrong_number_of_arguments("rpush")
    }
}

pub fn rpush(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    push_array_operations(store, arguments, false)
}

pub fn lpush(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    push_array_operations(store, arguments, true)
}

/// Pushes the values onto the list at the key, creating it if needed, and
/// marks the key ready so blocked BLPOP clients get served.
///
/// Values are pushed one at a time in argument order, so `LPUSH k a b c`
/// leaves the list as `c b a`.
fn push_array_operations(
    store: &mut KeyValueStore,
    arguments: &[String],
    should_prepend: bool,
) -> Result<RespValue, CommandError> {
    let push_array_arguments = PushArrayOperations::parse(arguments, should_prepend)?;

    let list_length = store
        .update_list(&push_array_arguments.key, true, |list| {
            add_values_to_list(list, push_array_arguments.values, should_prepend);
            list.len()
        })?
        .unwrap_or(0);

    store.signal_ready(&push_array_arguments.key);

    Ok(RespValue::Integer(list_length as i64))
}

fn add_values_to_list(list: &mut VecDeque<String>, values: Vec<String>, should_prepend: bool) {
    if should_prepend {
        for value in values {
            list.push_front(value);
        }
    } else {
        list.extend(values);
    }
}
