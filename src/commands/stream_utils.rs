use crate::{
    resp::RespValue,
    stream::{StreamFields, StreamId},
};

/// Converts stream entries to the RESP shape XRANGE and XREAD reply with.
///
/// Each entry becomes a 2-element array: `[id, [field1, value1, field2, value2, ...]]`,
/// with fields in the order they were given to XADD.
///
/// # Examples
///
/// ```ignore
/// let fields = vec![("temp".to_string(), "25".to_string())];
/// let result = parse_stream_entries_to_resp(vec![(&StreamId::new(1234, 0), &fields)]);
/// // Encodes to: "*1\r\n*2\r\n$6\r\n1234-0\r\n*2\r\n$4\r\ntemp\r\n$2\r\n25\r\n"
/// ```
pub fn parse_stream_entries_to_resp<'a, I>(entries: I) -> RespValue
where
    I: IntoIterator<Item = (&'a StreamId, &'a StreamFields)>,
{
    let resp_entries = entries
        .into_iter()
        .map(|(id, fields)| {
            let flattened_fields = fields
                .iter()
                .flat_map(|(field, value)| [field.clone(), value.clone()]);

            RespValue::Array(vec![
                RespValue::BulkString(id.to_string()),
                RespValue::array_from_strings(flattened_fields),
            ])
        })
        .collect::<Vec<RespValue>>();

    RespValue::Array(resp_entries)
}
