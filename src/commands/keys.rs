use globset::Glob;

use crate::{commands::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct KeysArguments {
    pub pattern: String,
}

impl KeysArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [pattern] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("keys"));
        };

        Ok(KeysArguments {
            pattern: pattern.clone(),
        })
    }
}

/// Handles the Redis KEYS command.
///
/// Returns every live key matching the glob pattern, sorted so replies are
/// stable.
pub fn keys(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let keys_arguments = KeysArguments::parse(arguments)?;

    let glob = Glob::new(&keys_arguments.pattern)
        .map_err(|e| CommandError::InvalidGlobPattern(e.to_string()))?
        .compile_matcher();

    let mut matching = store
        .keys()
        .into_iter()
        .filter(|key| glob.is_match(key))
        .collect::<Vec<String>>();
    matching.sort();

    Ok(RespValue::array_from_strings(matching))
}
