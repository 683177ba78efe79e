use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct LlenArguments {
    key: String,
}

impl LlenArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("llen"));
        };

        Ok(Self { key: key.clone() })
    }
}

pub fn llen(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let length = store
        .get_list(&llen_arguments.key)?
        .map_or(0, |list| list.len());

    Ok(RespValue::Integer(length as i64))
}
