use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct TypeArguments {
    key: String,
}

impl TypeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("type"));
        };

        Ok(Self { key: key.clone() })
    }
}

pub fn type_command(
    store: &mut KeyValueStore,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let type_name = store.type_of(&type_arguments.key).unwrap_or("none");

    Ok(RespValue::SimpleString(type_name.to_string()))
}
