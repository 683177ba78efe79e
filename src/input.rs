//! Reading RESP frames from client connections.

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::resp::{RespError, RespValue};

/// Errors that can occur while reading commands from a network stream.
#[derive(Error, Debug, PartialEq)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("RESP parse error")]
    RespParseError(#[from] RespError),
}

impl CommandReadError {
    pub fn as_string(&self) -> String {
        match self {
            CommandReadError::IoError(msg) => RespValue::Error(format!("ERR {}", msg)).encode(),
            CommandReadError::ConnectionClosed => {
                RespValue::Error("ERR connection closed".to_string()).encode()
            }
            CommandReadError::RespParseError(err) => err.as_string(),
        }
    }
}

/// Reads from `reader` until at least one complete RESP frame is buffered and
/// returns every complete frame, in arrival order.
///
/// Bytes belonging to a trailing partial frame stay in `buffer` for the next
/// call. A malformed frame clears the buffer, since there is no way to find
/// the start of the next frame in it.
pub async fn read_and_parse_resp<R>(
    reader: &mut R,
    buffer: &mut BytesMut,
) -> Result<Vec<RespValue>, CommandReadError>
where
    R: AsyncReadExt + Unpin,
{
    loop {
        let mut frames = Vec::new();

        loop {
            match RespValue::parse_frame(buffer) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(e) => {
                    buffer.clear();
                    return Err(e.into());
                }
            }
        }

        if !frames.is_empty() {
            return Ok(frames);
        }

        let bytes_read = reader
            .read_buf(buffer)
            .await
            .map_err(|e| CommandReadError::IoError(e.to_string()))?;

        if bytes_read == 0 {
            return Err(CommandReadError::ConnectionClosed);
        }
    }
}
