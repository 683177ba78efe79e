//! Redis Serialization Protocol (RESP2) values.
//!
//! Requests arrive as arrays of bulk strings and replies are encoded back into
//! their textual wire form. Parsing is incremental: an incomplete frame leaves
//! the buffer untouched so the caller can read more bytes and try again.

use bytes::{Buf, BytesMut};
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Deepest array nesting accepted from a peer. Requests are flat arrays and
/// the deepest reply (XREAD) nests four levels.
const MAX_NESTING_DEPTH: usize = 32;

/// Largest bulk string accepted, matching Redis' default `proto-max-bulk-len`.
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("unknown RESP type prefix '{0}'")]
    UnknownPrefix(char),
    #[error("invalid length")]
    InvalidLength,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("expected CRLF after bulk string")]
    MissingTerminator,
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("arrays nested deeper than {MAX_NESTING_DEPTH} levels")]
    NestingTooDeep,
}

impl RespError {
    pub fn as_string(&self) -> String {
        RespValue::Error(format!("ERR Protocol error: {}", self)).encode()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    /// Null bulk string, the nil reply.
    Null,
    /// Null array, returned by timed out or aborted operations.
    NullArray,
    Array(Vec<RespValue>),
}

impl RespValue {
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(s) => format!("+{}\r\n", s),
            RespValue::Error(e) => format!("-{}\r\n", e),
            RespValue::Integer(i) => format!(":{}\r\n", i),
            RespValue::BulkString(s) => format!("${}\r\n{}\r\n", s.len(), s),
            RespValue::Null => "$-1\r\n".to_string(),
            RespValue::NullArray => "*-1\r\n".to_string(),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len());

                for element in elements {
                    encoded.push_str(&element.encode());
                }

                encoded
            }
        }
    }

    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn array_from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RespValue::Array(
            values
                .into_iter()
                .map(|value| RespValue::BulkString(value.into()))
                .collect(),
        )
    }

    /// Tries to parse one complete value from the front of `buffer`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. On success the parsed
    /// bytes are consumed from the buffer.
    pub fn parse_frame(buffer: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        match parse_value(&buffer[..], 0, 0)? {
            Some((value, consumed)) => {
                buffer.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

fn read_line(input: &[u8], position: usize) -> Result<Option<(&str, usize)>, RespError> {
    let Some(offset) = input
        .get(position..)
        .and_then(|rest| rest.windows(2).position(|window| window == CRLF))
    else {
        return Ok(None);
    };

    let end = position + offset;
    let line = std::str::from_utf8(&input[position..end]).map_err(|_| RespError::InvalidUtf8)?;

    Ok(Some((line, end + CRLF.len())))
}

fn parse_length(line: &str) -> Result<Option<usize>, RespError> {
    let length = line.parse::<i64>().map_err(|_| RespError::InvalidLength)?;

    if length == -1 {
        return Ok(None);
    }

    usize::try_from(length)
        .map(Some)
        .map_err(|_| RespError::InvalidLength)
}

fn parse_value(
    input: &[u8],
    position: usize,
    depth: usize,
) -> Result<Option<(RespValue, usize)>, RespError> {
    let Some(&prefix) = input.get(position) else {
        return Ok(None);
    };

    if !matches!(prefix, b'+' | b'-' | b':' | b'$' | b'*') {
        return Err(RespError::UnknownPrefix(prefix as char));
    }

    let Some((line, next)) = read_line(input, position + 1)? else {
        return Ok(None);
    };

    match prefix {
        b'+' => Ok(Some((RespValue::SimpleString(line.to_string()), next))),
        b'-' => Ok(Some((RespValue::Error(line.to_string()), next))),
        b':' => {
            let integer = line.parse::<i64>().map_err(|_| RespError::InvalidInteger)?;
            Ok(Some((RespValue::Integer(integer), next)))
        }
        b'$' => {
            let Some(length) = parse_length(line)? else {
                return Ok(Some((RespValue::Null, next)));
            };

            if length > MAX_BULK_LENGTH {
                return Err(RespError::InvalidLength);
            }

            let end = next + length;
            if input.len() < end + CRLF.len() {
                return Ok(None);
            }

            if &input[end..end + CRLF.len()] != CRLF {
                return Err(RespError::MissingTerminator);
            }

            let content =
                String::from_utf8(input[next..end].to_vec()).map_err(|_| RespError::InvalidUtf8)?;

            Ok(Some((RespValue::BulkString(content), end + CRLF.len())))
        }
        _ => {
            let Some(length) = parse_length(line)? else {
                return Ok(Some((RespValue::NullArray, next)));
            };

            if length > 0 && depth >= MAX_NESTING_DEPTH {
                return Err(RespError::NestingTooDeep);
            }

            let mut elements = Vec::with_capacity(length.min(64));
            let mut cursor = next;

            for _ in 0..length {
                let Some((element, after)) = parse_value(input, cursor, depth + 1)? else {
                    return Ok(None);
                };

                elements.push(element);
                cursor = after;
            }

            Ok(Some((RespValue::Array(elements), cursor)))
        }
    }
}
