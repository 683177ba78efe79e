use crate::{
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
    stream::{self, StreamFields, StreamIdRequest},
};

pub struct XaddArguments {
    key: String,
    id: StreamIdRequest,
    fields: StreamFields,
}

impl XaddArguments {
    /// Parses `[key, id, field, value, field, value, ...]`.
    ///
    /// The ID may be explicit (`5-3`), have an auto sequence (`5-*`) or be
    /// fully automatic (`*`). At least one field/value pair is required.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key, id, field_values @ ..] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("xadd"));
        };

        if field_values.is_empty() || field_values.len() % 2 != 0 {
            return Err(CommandError::wrong_number_of_arguments("xadd"));
        }

        let id = id.parse::<StreamIdRequest>()?;

        let fields = field_values
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect::<StreamFields>();

        Ok(Self {
            key: key.clone(),
            id,
            fields,
        })
    }
}

/// Handles the Redis XADD command.
///
/// Appends an entry to the stream at the key, creating the stream if needed,
/// and replies with the ID the entry received. An ID that is `0-0` or not
/// strictly greater than the stream's last ID is rejected and the stream is
/// left as it was.
pub fn xadd(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;
    let now_ms = stream::current_time_millis();

    let id = store.update_stream(&xadd_arguments.key, |stream| {
        stream
            .add(xadd_arguments.id, xadd_arguments.fields, now_ms)
            .map_err(CommandError::from)
    })?;
    store.signal_ready(&xadd_arguments.key);

    Ok(RespValue::BulkString(id.to_string()))
}
