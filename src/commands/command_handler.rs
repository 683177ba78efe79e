use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{
        blpop::{BlpopArguments, blpop, try_blpop},
        command_error::CommandError,
        del::{DelArguments, del},
        echo::{EchoArguments, echo},
        exists::{ExistsArguments, exists},
        get::{GetArguments, get},
        incr::{IncrArguments, incr},
        info::{InfoArguments, info},
        keys::{KeysArguments, keys},
        llen::{LlenArguments, llen},
        lpop::{LpopArguments, lpop},
        lrange::{LrangeArguments, lrange},
        ping::{PingArguments, ping},
        rpush_and_lpush::{PushArrayOperations, lpush, rpush},
        set::{SetArguments, set},
        transactions::{
            DiscardArguments, ExecArguments, MultiArguments, UnwatchArguments, WatchArguments,
            discard, exec, multi, unwatch, watch,
        },
        type_command::{TypeArguments, type_command},
        xadd::{XaddArguments, xadd},
        xrange::{XrangeArguments, xrange},
        xread::{XreadArguments, xread, xread_blocking},
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

/// Commands buffered by a transaction, together with the keys the client
/// watched and the versions they had at WATCH time.
#[derive(Debug, PartialEq)]
pub struct TransactionBatch {
    pub commands: Vec<CommandHandler>,
    pub watched_keys: Vec<(String, u64)>,
}

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Response(RespValue),
    Batch(TransactionBatch),
}

#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<String>,
}

impl CommandHandler {
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = input else {
            return Err(CommandError::InvalidCommand);
        };

        let mut elements = elements.into_iter();

        let name = match elements.next() {
            Some(RespValue::BulkString(s)) => s.to_uppercase(),
            _ => return Err(CommandError::InvalidCommand),
        };

        let mut arguments: Vec<String> = Vec::new();

        for element in elements {
            let RespValue::BulkString(arg) = element else {
                return Err(CommandError::InvalidCommand);
            };

            arguments.push(arg);
        }

        Ok(Self { name, arguments })
    }

    pub fn validate_command_arguments(&self) -> Option<CommandError> {
        let arguments = self.arguments.as_slice();

        match self.name.as_str() {
            "PING" => PingArguments::parse(arguments).err(),
            "ECHO" => EchoArguments::parse(arguments).err(),
            "GET" => GetArguments::parse(arguments).err(),
            "SET" => SetArguments::parse(arguments).err(),
            "INCR" => IncrArguments::parse(arguments).err(),
            "DEL" => DelArguments::parse(arguments).err(),
            "EXISTS" => ExistsArguments::parse(arguments).err(),
            "KEYS" => KeysArguments::parse(arguments).err(),
            "TYPE" => TypeArguments::parse(arguments).err(),
            "RPUSH" => PushArrayOperations::parse(arguments, false).err(),
            "LPUSH" => PushArrayOperations::parse(arguments, true).err(),
            "LRANGE" => LrangeArguments::parse(arguments).err(),
            "LLEN" => LlenArguments::parse(arguments).err(),
            "LPOP" => LpopArguments::parse(arguments).err(),
            "BLPOP" => BlpopArguments::parse(arguments).err(),
            "XADD" => XaddArguments::parse(arguments).err(),
            "XRANGE" => XrangeArguments::parse(arguments).err(),
            "XREAD" => XreadArguments::parse(arguments).err(),
            "INFO" => InfoArguments::parse(arguments).err(),
            "MULTI" => MultiArguments::parse(arguments).err(),
            "EXEC" => ExecArguments::parse(arguments).err(),
            "DISCARD" => DiscardArguments::parse(arguments).err(),
            "WATCH" => WatchArguments::parse(arguments).err(),
            "UNWATCH" => UnwatchArguments::parse(arguments).err(),
            _ => Some(CommandError::UnknownCommand(self.name.to_lowercase())),
        }
    }

    /// Runs a keyspace command to completion against an already locked store.
    ///
    /// This is the path EXEC uses for buffered commands, so nothing here may
    /// suspend: BLPOP and XREAD BLOCK become single non-blocking attempts.
    /// Transaction control commands other than UNWATCH never reach this point.
    pub(crate) fn execute(&self, store: &mut KeyValueStore) -> Result<RespValue, CommandError> {
        let arguments = self.arguments.as_slice();

        match self.name.as_str() {
            "PING" => ping(arguments),
            "ECHO" => echo(arguments),
            "GET" => get(store, arguments),
            "SET" => set(store, arguments),
            "INCR" => incr(store, arguments),
            "DEL" => del(store, arguments),
            "EXISTS" => exists(store, arguments),
            "KEYS" => keys(store, arguments),
            "TYPE" => type_command(store, arguments),
            "RPUSH" => rpush(store, arguments),
            "LPUSH" => lpush(store, arguments),
            "LRANGE" => lrange(store, arguments),
            "LLEN" => llen(store, arguments),
            "LPOP" => lpop(store, arguments),
            "BLPOP" => try_blpop(store, arguments),
            "XADD" => xadd(store, arguments),
            "XRANGE" => xrange(store, arguments),
            "XREAD" => xread(store, arguments),
            "INFO" => info(arguments),
            "UNWATCH" => UnwatchArguments::parse(arguments).map(|_| RespValue::ok()),
            _ => Err(CommandError::UnknownCommand(self.name.to_lowercase())),
        }
    }

    pub async fn handle_command(
        &self,
        client_address: &str,
        store: Arc<Mutex<KeyValueStore>>,
        state: Arc<Mutex<State>>,
    ) -> Result<CommandResult, CommandError> {
        if let Some(response) = self
            .queue_command_if_in_transaction(client_address, Arc::clone(&state))
            .await?
        {
            return Ok(CommandResult::Response(response));
        }

        let arguments = self.arguments.as_slice();

        match self.name.as_str() {
            "BLPOP" => blpop(client_address, store, state, arguments)
                .await
                .map(CommandResult::Response),
            "XREAD" => xread_blocking(client_address, store, state, arguments)
                .await
                .map(CommandResult::Response),
            "MULTI" => multi(client_address, state, arguments).await,
            "EXEC" => exec(client_address, state, arguments).await,
            "DISCARD" => discard(client_address, state, arguments).await,
            "WATCH" => watch(client_address, store, state, arguments).await,
            "UNWATCH" => unwatch(client_address, state, arguments).await,
            _ => {
                let mut store_guard = store.lock().await;
                let response = self.execute(&mut store_guard)?;

                let mut state_guard = state.lock().await;
                state_guard.serve_ready_keys(&mut store_guard);

                Ok(CommandResult::Response(response))
            }
        }
    }

    /// Buffers the command if the client is inside MULTI. Returns the QUEUED
    /// reply when it was buffered and `None` when it should run now.
    async fn queue_command_if_in_transaction(
        &self,
        client_address: &str,
        state: Arc<Mutex<State>>,
    ) -> Result<Option<RespValue>, CommandError> {
        let transaction_commands = ["MULTI", "EXEC", "DISCARD", "WATCH"];

        if transaction_commands.contains(&self.name.as_str()) {
            return Ok(None);
        }

        let mut state_guard = state.lock().await;

        if !state_guard.is_in_transaction(client_address) {
            return Ok(None);
        }

        if let Some(err) = self.validate_command_arguments() {
            return Err(err);
        }

        state_guard.add_to_transaction(client_address, self.clone())?;

        Ok(Some(RespValue::SimpleString("QUEUED".to_string())))
    }
}
