use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::watch;

use crate::{
    blocking::{BlockedClients, StreamReaders},
    commands::CommandHandler,
    key_value_store::KeyValueStore,
};

#[derive(Error, Debug, PartialEq)]
pub enum StateError {
    #[error("MULTI calls can not be nested")]
    TransactionAlreadyStarted,
    #[error("no transaction in progress")]
    TransactionNotStarted,
}

/// Server state that is not part of the keyspace: clients blocked in BLPOP
/// or XREAD, per-client transaction buffers, per-client watched keys and the
/// disconnect signal of every connected client.
#[derive(Debug, Default)]
pub struct State {
    pub blocked_clients: BlockedClients,
    pub stream_readers: StreamReaders,
    connected_clients: HashMap<String, watch::Receiver<bool>>,
    transactions: HashMap<String, Vec<CommandHandler>>,
    watched_keys: HashMap<String, Vec<(String, u64)>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_transaction(&mut self, client_address: String) -> Result<(), StateError> {
        if self.transactions.contains_key(&client_address) {
            return Err(StateError::TransactionAlreadyStarted);
        }

        self.transactions.insert(client_address, Vec::new());
        Ok(())
    }

    pub fn add_to_transaction(
        &mut self,
        client_address: &str,
        command: CommandHandler,
    ) -> Result<(), StateError> {
        let Some(transaction) = self.transactions.get_mut(client_address) else {
            return Err(StateError::TransactionNotStarted);
        };

        transaction.push(command);
        Ok(())
    }

    pub fn get_transaction(&self, client_address: &str) -> Option<&Vec<CommandHandler>> {
        self.transactions.get(client_address)
    }

    pub fn is_in_transaction(&self, client_address: &str) -> bool {
        self.transactions.contains_key(client_address)
    }

    pub fn remove_transaction(
        &mut self,
        client_address: &str,
    ) -> Result<Vec<CommandHandler>, StateError> {
        self.transactions
            .remove(client_address)
            .ok_or(StateError::TransactionNotStarted)
    }

    /// Records the version `key` had when the client started watching it.
    /// Watching an already watched key keeps the original version.
    pub fn watch(&mut self, client_address: &str, key: &str, version: u64) {
        let watched = self
            .watched_keys
            .entry(client_address.to_string())
            .or_default();

        if !watched.iter().any(|(watched_key, _)| watched_key == key) {
            watched.push((key.to_string(), version));
        }
    }

    pub fn take_watched_keys(&mut self, client_address: &str) -> Vec<(String, u64)> {
        self.watched_keys
            .remove(client_address)
            .unwrap_or_default()
    }

    pub fn unwatch(&mut self, client_address: &str) {
        self.watched_keys.remove(client_address);
    }

    /// Registers a connected client. The connection sends `true` on the
    /// returned sender once it sees the peer go away, which releases any
    /// command of that client still suspended.
    pub fn connect_client(&mut self, client_address: &str) -> watch::Sender<bool> {
        let (sender, receiver) = watch::channel(false);
        self.connected_clients
            .insert(client_address.to_string(), receiver);
        sender
    }

    pub fn disconnect_signal(&self, client_address: &str) -> Option<watch::Receiver<bool>> {
        self.connected_clients.get(client_address).cloned()
    }

    /// Serves blocked clients for every key that received elements or
    /// entries since the last call.
    pub fn serve_ready_keys(&mut self, store: &mut KeyValueStore) {
        for key in store.take_ready_keys() {
            self.blocked_clients.serve(store, &key);
            self.stream_readers.notify(&key);
        }
    }

    /// Drops everything held on behalf of a disconnected client.
    pub fn remove_client(&mut self, client_address: &str) {
        self.transactions.remove(client_address);
        self.watched_keys.remove(client_address);
        self.connected_clients.remove(client_address);
        self.blocked_clients.unregister_client(client_address);
        self.stream_readers.unregister_client(client_address);
    }
}
