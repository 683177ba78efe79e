//! Bookkeeping for clients suspended in BLPOP and XREAD BLOCK.
//!
//! Each blocked BLPOP client is a waiter with a one-shot channel. Every key
//! keeps a FIFO queue of the waiters registered on it. When a list key
//! receives elements, the waiters at the front of its queue get those
//! elements handed over directly while the keyspace lock is still held, so no
//! other client can take them first.
//!
//! Stream readers only need a wake-up: every reader on a stream key is
//! notified after an XADD and re-reads the stream itself.

use std::collections::{HashMap, VecDeque};

use tokio::{
    sync::{oneshot, watch},
    time::Instant,
};
use tracing::debug;

use crate::key_value_store::KeyValueStore;

/// A key and the element popped from it.
pub type PoppedElement = (String, String);

#[derive(Debug)]
struct Waiter {
    client_address: String,
    keys: Vec<String>,
    sender: oneshot::Sender<PoppedElement>,
}

#[derive(Debug, Default)]
pub struct BlockedClients {
    next_waiter_id: u64,
    waiters: HashMap<u64, Waiter>,
    queues: HashMap<String, VecDeque<u64>>,
}

impl BlockedClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a waiter on every key in `keys`, behind all waiters already
    /// registered on them.
    pub fn register(
        &mut self,
        client_address: &str,
        keys: &[String],
    ) -> (u64, oneshot::Receiver<PoppedElement>) {
        let (sender, receiver) = oneshot::channel();

        self.next_waiter_id += 1;
        let waiter_id = self.next_waiter_id;

        for key in keys {
            self.queues
                .entry(key.clone())
                .or_default()
                .push_back(waiter_id);
        }

        self.waiters.insert(
            waiter_id,
            Waiter {
                client_address: client_address.to_string(),
                keys: keys.to_vec(),
                sender,
            },
        );

        (waiter_id, receiver)
    }

    fn remove_waiter(&mut self, waiter_id: u64) -> Option<Waiter> {
        let waiter = self.waiters.remove(&waiter_id)?;

        for key in &waiter.keys {
            if let Some(queue) = self.queues.get_mut(key) {
                queue.retain(|id| *id != waiter_id);

                if queue.is_empty() {
                    self.queues.remove(key);
                }
            }
        }

        Some(waiter)
    }

    /// Removes a waiter from all of its keys. Returns false if it was already
    /// served or removed.
    pub fn unregister(&mut self, waiter_id: u64) -> bool {
        self.remove_waiter(waiter_id).is_some()
    }

    /// Removes every waiter belonging to `client_address`.
    pub fn unregister_client(&mut self, client_address: &str) {
        let waiter_ids = self
            .waiters
            .iter()
            .filter(|(_, waiter)| waiter.client_address == client_address)
            .map(|(id, _)| *id)
            .collect::<Vec<u64>>();

        for waiter_id in waiter_ids {
            self.remove_waiter(waiter_id);
        }
    }

    pub fn waiting_count(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, |queue| queue.len())
    }

    /// Hands elements of the list at `key` to its waiters, oldest first,
    /// until either the list or the queue runs out. Returns how many waiters
    /// were served.
    pub fn serve(&mut self, store: &mut KeyValueStore, key: &str) -> usize {
        let mut served = 0;

        loop {
            let has_elements = matches!(store.get_list(key), Ok(Some(list)) if !list.is_empty());
            if !has_elements {
                break;
            }

            let Some(waiter_id) = self.queues.get_mut(key).and_then(|queue| queue.pop_front())
            else {
                break;
            };

            let Some(waiter) = self.remove_waiter(waiter_id) else {
                continue;
            };

            // The client gave up (timed out or disconnected) after registering.
            if waiter.sender.is_closed() {
                continue;
            }

            let Ok(Some(Some(element))) = store.update_list(key, false, |list| list.pop_front())
            else {
                break;
            };

            match waiter.sender.send((key.to_string(), element)) {
                Ok(()) => {
                    debug!(key, client = %waiter.client_address, "served blocked client");
                    served += 1;
                }
                Err((_, element)) => {
                    let _ = store.update_list(key, true, |list| list.push_front(element));
                }
            }
        }

        if self.queues.get(key).is_some_and(|queue| queue.is_empty()) {
            self.queues.remove(key);
        }

        served
    }
}

#[derive(Debug)]
struct StreamReader {
    client_address: String,
    keys: Vec<String>,
    sender: oneshot::Sender<()>,
}

/// Clients suspended in XREAD BLOCK, indexed by the stream keys they read.
#[derive(Debug, Default)]
pub struct StreamReaders {
    next_reader_id: u64,
    readers: HashMap<u64, StreamReader>,
    by_key: HashMap<String, Vec<u64>>,
}

impl StreamReaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        client_address: &str,
        keys: &[String],
    ) -> (u64, oneshot::Receiver<()>) {
        let (sender, receiver) = oneshot::channel();

        self.next_reader_id += 1;
        let reader_id = self.next_reader_id;

        for key in keys {
            self.by_key.entry(key.clone()).or_default().push(reader_id);
        }

        self.readers.insert(
            reader_id,
            StreamReader {
                client_address: client_address.to_string(),
                keys: keys.to_vec(),
                sender,
            },
        );

        (reader_id, receiver)
    }

    fn remove_reader(&mut self, reader_id: u64) -> Option<StreamReader> {
        let reader = self.readers.remove(&reader_id)?;

        for key in &reader.keys {
            if let Some(ids) = self.by_key.get_mut(key) {
                ids.retain(|id| *id != reader_id);

                if ids.is_empty() {
                    self.by_key.remove(key);
                }
            }
        }

        Some(reader)
    }

    pub fn unregister(&mut self, reader_id: u64) -> bool {
        self.remove_reader(reader_id).is_some()
    }

    pub fn unregister_client(&mut self, client_address: &str) {
        let reader_ids = self
            .readers
            .iter()
            .filter(|(_, reader)| reader.client_address == client_address)
            .map(|(id, _)| *id)
            .collect::<Vec<u64>>();

        for reader_id in reader_ids {
            self.remove_reader(reader_id);
        }
    }

    /// Wakes every reader of the stream at `key`. A woken reader is removed
    /// from all of its keys. Returns how many readers were woken.
    pub fn notify(&mut self, key: &str) -> usize {
        let Some(reader_ids) = self.by_key.remove(key) else {
            return 0;
        };

        let mut woken = 0;

        for reader_id in reader_ids {
            let Some(reader) = self.remove_reader(reader_id) else {
                continue;
            };

            if reader.sender.send(()).is_ok() {
                debug!(key, client = %reader.client_address, "woke stream reader");
                woken += 1;
            }
        }

        woken
    }

    pub fn waiting_count(&self, key: &str) -> usize {
        self.by_key.get(key).map_or(0, |ids| ids.len())
    }
}

/// How a suspended client's wait ended.
#[derive(Debug, PartialEq)]
pub enum WaitOutcome<T> {
    Ready(T),
    TimedOut,
    Disconnected,
}

/// Resolves once `signal` reports the client gone, or its sender is dropped.
/// Without a signal it never resolves.
async fn client_gone(signal: Option<watch::Receiver<bool>>) {
    let Some(mut signal) = signal else {
        return std::future::pending().await;
    };

    loop {
        if *signal.borrow_and_update() {
            return;
        }

        if signal.changed().await.is_err() {
            return;
        }
    }
}

/// Suspends until a value arrives on `receiver`, `deadline` passes or the
/// client disconnects. A disconnect wins over a value that arrived at the
/// same time, so the caller can put that value back.
pub async fn wait_for_handoff<T>(
    receiver: &mut oneshot::Receiver<T>,
    deadline: Option<Instant>,
    disconnect_signal: Option<watch::Receiver<bool>>,
) -> WaitOutcome<T> {
    let expired = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;

        _ = client_gone(disconnect_signal) => WaitOutcome::Disconnected,
        received = receiver => match received {
            Ok(value) => WaitOutcome::Ready(value),
            // The registration was dropped on the client's behalf.
            Err(_) => WaitOutcome::Disconnected,
        },
        _ = expired => WaitOutcome::TimedOut,
    }
}
