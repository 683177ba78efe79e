use std::collections::VecDeque;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

/// Represents the parsed arguments for the LRANGE command.
pub struct LrangeArguments {
    /// The key of the list
    key: String,
    /// The starting index for the range (can be negative to count from the end)
    start_index: i64,
    /// The ending index for the range, inclusive (can be negative to count from the end)
    end_index: i64,
}

impl LrangeArguments {
    /// Parses and validates the arguments for the LRANGE command.
    ///
    /// # Arguments
    ///
    /// * `arguments` - The command arguments: [key, start_index, end_index]
    ///
    /// # Returns
    ///
    /// * `Ok(LrangeArguments)` - If the arguments are valid
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the number of arguments is not exactly 3
    /// * `Err(CommandError::NotAnInteger)` - If start or end index is not a valid integer
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key, start_index, end_index] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("lrange"));
        };

        let Ok(start_index) = start_index.parse::<i64>() else {
            return Err(CommandError::NotAnInteger);
        };

        let Ok(end_index) = end_index.parse::<i64>() else {
            return Err(CommandError::NotAnInteger);
        };

        Ok(Self {
            key: key.clone(),
            start_index,
            end_index,
        })
    }
}

/// Handles the Redis LRANGE command.
///
/// Returns the inclusive range of elements between the two indices. Negative
/// indices count from the end of the list, out of range indices are clamped,
/// and a missing key or an empty range yields an empty array.
///
/// # Examples
///
/// ```ignore
/// // RPUSH mylist a b c d e
/// // LRANGE mylist -2 -1
/// // Returns: ["d", "e"]
///
/// // LRANGE mylist 0 -3
/// // Returns: ["a", "b", "c"]
/// ```
pub fn lrange(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let Some(list) = store.get_list(&lrange_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    let Ok((start, end)) = validate_range_indexes(
        list,
        lrange_arguments.start_index,
        lrange_arguments.end_index,
    ) else {
        return Ok(RespValue::Array(Vec::new()));
    };

    Ok(RespValue::array_from_strings(
        list.range(start..=end).cloned(),
    ))
}

/// Validates and normalizes range indices for list operations.
///
/// Converts negative indices to positive equivalents and clamps them to the
/// list bounds.
///
/// # Returns
///
/// * `Ok((usize, usize))` - Normalized start and end indices if the range is not empty
/// * `Err(&str)` - Why the range is empty
fn validate_range_indexes(
    list: &VecDeque<String>,
    start_index: i64,
    end_index: i64,
) -> Result<(usize, usize), &'static str> {
    let len = list.len() as i64;

    if len == 0 {
        return Err("List is empty");
    }

    let mut start = if start_index < 0 {
        len.saturating_add(start_index)
    } else {
        start_index
    };
    let mut end = if end_index < 0 {
        len.saturating_add(end_index)
    } else {
        end_index
    };

    start = start.max(0);
    end = end.min(len - 1);

    if start >= len {
        return Err("Start index is out of bounds");
    }

    if start > end {
        return Err("Start index is bigger than end index after processing");
    }

    Ok((start as usize, end as usize))
}
