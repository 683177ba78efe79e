use thiserror::Error;

use crate::{
    key_value_store::StoreError, resp::RespValue, state::StateError, stream::StreamError,
};

/// Errors a command can reply with. The `Display` text is the exact error
/// line sent to the client, prefix included.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("ERR Protocol error: expected an array of bulk strings")]
    InvalidCommand,
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(String),
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType(#[from] StoreError),
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR syntax error")]
    SyntaxError,
    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(String),
    #[error("ERR value is out of range, must be positive")]
    InvalidLPopCount,
    #[error("ERR timeout is not a float or out of range")]
    InvalidBLPopTimeout,
    #[error("ERR timeout is not an integer or out of range")]
    InvalidXReadTimeout,
    #[error("ERR timeout is negative")]
    NegativeTimeout,
    #[error("ERR {0}")]
    InvalidStreamId(#[from] StreamError),
    #[error(
        "ERR Unbalanced 'xread' list of streams: for each stream key an ID must be specified."
    )]
    UnbalancedXRead,
    #[error("ERR unsupported INFO section '{0}'")]
    InvalidInfoSection(String),
    #[error("ERR invalid pattern '{0}'")]
    InvalidGlobPattern(String),
    #[error("ERR EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("ERR DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error("ERR {0}")]
    TransactionError(#[from] StateError),
    #[error("ERR WATCH inside MULTI is not allowed")]
    WatchInsideMulti,
}

impl CommandError {
    pub fn wrong_number_of_arguments(command: &str) -> Self {
        CommandError::WrongNumberOfArguments(command.to_lowercase())
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::Error(self.to_string())
    }

    pub fn as_string(&self) -> String {
        self.as_resp().encode()
    }
}
