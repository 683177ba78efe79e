//! An in-memory, Redis-compatible key-value server.
//!
//! The server supports:
//!
//! - String operations with expiry (GET, SET, INCR, DEL, EXISTS, KEYS)
//! - List operations (LPUSH, RPUSH, LPOP, BLPOP, LRANGE, LLEN)
//! - Stream operations (XADD, XRANGE, XREAD)
//! - Transactions with optimistic locking (MULTI, EXEC, DISCARD, WATCH, UNWATCH)
//! - Server commands (PING, ECHO, INFO, TYPE)
//!
//! Clients speak RESP2 over TCP. Every connection runs in its own Tokio task;
//! they share one [`key_value_store::KeyValueStore`] and one [`state::State`],
//! each behind its own mutex. When both are needed the store is locked first.

pub mod blocking;
pub mod commands;
pub mod connection;
pub mod expiry;
pub mod input;
pub mod key_value_store;
pub mod resp;
pub mod server;
pub mod state;
pub mod stream;
