use crate::{
    commands::{command_error::CommandError, stream_utils::parse_stream_entries_to_resp},
    key_value_store::KeyValueStore,
    resp::RespValue,
    stream::StreamId,
};

pub struct XrangeArguments {
    key: String,
    start: StreamId,
    end: StreamId,
}

impl XrangeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key, start, end] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("xrange"));
        };

        Ok(Self {
            key: key.clone(),
            start: StreamId::parse_range_bound(start, false)?,
            end: StreamId::parse_range_bound(end, true)?,
        })
    }
}

/// Handles the Redis XRANGE command: every entry whose ID lies between the
/// two bounds, inclusive, in ID order.
pub fn xrange(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xrange_arguments = XrangeArguments::parse(arguments)?;

    let Some(stream) = store.get_stream(&xrange_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    Ok(parse_stream_entries_to_resp(
        stream.range(xrange_arguments.start, xrange_arguments.end),
    ))
}
