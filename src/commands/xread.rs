use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

use crate::{
    blocking::{WaitOutcome, wait_for_handoff},
    commands::{command_error::CommandError, stream_utils::parse_stream_entries_to_resp},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
    stream::StreamId,
};

/// Where XREAD starts reading one stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadStart {
    /// Entries with an ID greater than this one.
    After(StreamId),
    /// `$`: only entries added after the command started.
    NewOnly,
}

impl ReadStart {
    fn parse(input: &str) -> Result<Self, CommandError> {
        if input == "$" {
            return Ok(ReadStart::NewOnly);
        }

        Ok(ReadStart::After(input.parse::<StreamId>()?))
    }
}

/// Represents the parsed arguments for the XREAD command
pub struct XreadArguments {
    /// Maximum number of entries returned per stream
    count: Option<usize>,
    /// How long to wait for new entries; zero waits forever
    block: Option<Duration>,
    /// Stream keys paired with where reading starts
    streams: Vec<(String, ReadStart)>,
}

impl XreadArguments {
    /// Parses `[COUNT n] [BLOCK ms] STREAMS key1 key2 ... id1 id2 ...`.
    ///
    /// # Returns
    ///
    /// * `Ok(XreadArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongNumberOfArguments)` - If no key/ID pair follows STREAMS
    /// * `Err(CommandError::SyntaxError)` - If an unknown option comes before STREAMS
    /// * `Err(CommandError::NotAnInteger)` - If the COUNT value is not a non-negative integer
    /// * `Err(CommandError::InvalidXReadTimeout)` - If the BLOCK value is not an integer
    /// * `Err(CommandError::NegativeTimeout)` - If the BLOCK value is negative
    /// * `Err(CommandError::UnbalancedXRead)` - If keys and IDs do not pair up
    /// * `Err(CommandError::InvalidStreamId)` - If an ID is malformed
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let mut count = None;
        let mut block = None;
        let mut index = 0;

        loop {
            let Some(option) = arguments.get(index) else {
                return Err(CommandError::wrong_number_of_arguments("xread"));
            };

            match option.to_uppercase().as_str() {
                "STREAMS" => {
                    index += 1;
                    break;
                }
                "COUNT" => {
                    let Some(value) = arguments.get(index + 1) else {
                        return Err(CommandError::SyntaxError);
                    };

                    let Ok(value) = value.parse::<usize>() else {
                        return Err(CommandError::NotAnInteger);
                    };

                    count = Some(value);
                    index += 2;
                }
                "BLOCK" => {
                    let Some(value) = arguments.get(index + 1) else {
                        return Err(CommandError::SyntaxError);
                    };

                    let Ok(milliseconds) = value.parse::<i64>() else {
                        return Err(CommandError::InvalidXReadTimeout);
                    };

                    let Ok(milliseconds) = u64::try_from(milliseconds) else {
                        return Err(CommandError::NegativeTimeout);
                    };

                    block = Some(Duration::from_millis(milliseconds));
                    index += 2;
                }
                _ => return Err(CommandError::SyntaxError),
            }
        }

        let keys_and_ids = &arguments[index..];

        if keys_and_ids.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("xread"));
        }

        if keys_and_ids.len() % 2 != 0 {
            return Err(CommandError::UnbalancedXRead);
        }

        let (keys, ids) = keys_and_ids.split_at(keys_and_ids.len() / 2);

        let mut streams = Vec::with_capacity(keys.len());

        for (key, id) in keys.iter().zip(ids) {
            streams.push((key.clone(), ReadStart::parse(id)?));
        }

        Ok(Self {
            count,
            block,
            streams,
        })
    }
}

/// Turns every `$` into the stream's current last ID, or 0-0 for a missing
/// stream.
fn resolve_start_ids(
    store: &mut KeyValueStore,
    streams: Vec<(String, ReadStart)>,
) -> Result<Vec<(String, StreamId)>, CommandError> {
    let mut resolved = Vec::with_capacity(streams.len());

    for (key, start) in streams {
        let id = match start {
            ReadStart::After(id) => id,
            ReadStart::NewOnly => store
                .get_stream(&key)?
                .map_or(StreamId::MIN, |stream| stream.last_id()),
        };

        resolved.push((key, id));
    }

    Ok(resolved)
}

fn read_streams(
    store: &mut KeyValueStore,
    streams: &[(String, StreamId)],
    limit: usize,
) -> Result<RespValue, CommandError> {
    let mut response = Vec::new();

    for (key, id) in streams {
        let Some(stream) = store.get_stream(key)? else {
            continue;
        };

        let entries = stream.entries_after(*id).take(limit).collect::<Vec<_>>();

        if entries.is_empty() {
            continue;
        }

        response.push(RespValue::Array(vec![
            RespValue::BulkString(key.clone()),
            parse_stream_entries_to_resp(entries),
        ]));
    }

    if response.is_empty() {
        return Ok(RespValue::NullArray);
    }

    Ok(RespValue::Array(response))
}

/// XREAD as a single read that never suspends, as run inside EXEC. BLOCK is
/// accepted and ignored.
///
/// For each stream, replies with the entries whose ID is strictly greater
/// than the paired ID, capped by COUNT when given. Streams without such
/// entries are left out; if none has any, the reply is a null array.
pub fn xread(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xread_arguments = XreadArguments::parse(arguments)?;
    let limit = xread_arguments.count.unwrap_or(usize::MAX);

    let streams = resolve_start_ids(store, xread_arguments.streams)?;

    read_streams(store, &streams, limit)
}

/// Handles the Redis XREAD command.
///
/// Without BLOCK this is a single read. With BLOCK, if no stream has entries
/// past its start ID, the client waits until an XADD to one of the streams
/// delivers some, the timeout elapses (zero never does) or it disconnects.
/// `$` is resolved once, when the command starts.
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - `[[key, entries]...]` for streams with new entries
/// * `Ok(RespValue::NullArray)` - If nothing arrived before the timeout
/// * `Err(CommandError::WrongType)` - If a key holds something other than a stream
pub async fn xread_blocking(
    client_address: &str,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let xread_arguments = XreadArguments::parse(arguments)?;
    let limit = xread_arguments.count.unwrap_or(usize::MAX);
    let deadline = xread_arguments
        .block
        .filter(|block| !block.is_zero())
        .map(|block| Instant::now() + block);

    let mut store_guard = store.lock().await;
    let streams = resolve_start_ids(&mut store_guard, xread_arguments.streams)?;
    let keys = streams
        .iter()
        .map(|(key, _)| key.clone())
        .collect::<Vec<String>>();

    loop {
        let response = read_streams(&mut store_guard, &streams, limit)?;

        if response != RespValue::NullArray || xread_arguments.block.is_none() {
            return Ok(response);
        }

        let (reader_id, mut receiver, disconnect_signal) = {
            let mut state_guard = state.lock().await;
            let (reader_id, receiver) = state_guard.stream_readers.register(client_address, &keys);

            (
                reader_id,
                receiver,
                state_guard.disconnect_signal(client_address),
            )
        };
        drop(store_guard);

        debug!(client = client_address, keys = ?keys, "client blocked on streams");

        match wait_for_handoff(&mut receiver, deadline, disconnect_signal).await {
            WaitOutcome::Ready(()) => {}
            WaitOutcome::TimedOut | WaitOutcome::Disconnected => {
                state.lock().await.stream_readers.unregister(reader_id);
                debug!(client = client_address, "stream read gave up");
                return Ok(RespValue::NullArray);
            }
        }

        store_guard = store.lock().await;
    }
}
