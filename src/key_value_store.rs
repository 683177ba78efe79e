//! The keyspace: every key maps to one type-tagged value plus an optional
//! expiration deadline.
//!
//! All reads and writes go through [`KeyValueStore`] so that expired keys are
//! never observed, lists never persist empty, and every mutation bumps the
//! key's version for WATCH.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;
use tokio::time::Instant;

use crate::{expiry, stream::Stream};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("key holds the wrong kind of value")]
    WrongType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    String(String),
    Array(VecDeque<String>),
    Stream(Stream),
}

impl DataType {
    /// The name reported by the TYPE command.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::Array(_) => "list",
            DataType::Stream(_) => "stream",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: DataType,
    pub expiration: Option<Instant>,
    version: u64,
}

impl Value {
    pub fn new(data: DataType, expiration: Option<Instant>) -> Self {
        Self {
            data,
            expiration,
            version: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, Value>,
    next_version: u64,
    ready_keys: Vec<String>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn purge_if_expired(&mut self, key: &str) {
        let is_expired = self
            .entries
            .get(key)
            .is_some_and(|value| expiry::is_expired(value.expiration, Instant::now()));

        if is_expired {
            self.entries.remove(key);
        }
    }

    fn live_entry(&mut self, key: &str) -> Option<&mut Value> {
        self.purge_if_expired(key);
        self.entries.get_mut(key)
    }

    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.live_entry(key).map(|value| &*value)
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.live_entry(key).is_some()
    }

    pub fn type_of(&mut self, key: &str) -> Option<&'static str> {
        self.get(key).map(|value| value.data.type_name())
    }

    /// Stores `value` under `key`, replacing whatever was there, including
    /// its type and expiration.
    pub fn set(&mut self, key: String, mut value: Value) {
        value.version = self.bump_version();
        self.entries.insert(key, value);
    }

    pub fn delete(&mut self, key: &str) -> bool {
        if self.live_entry(key).is_none() {
            return false;
        }

        self.entries.remove(key);
        true
    }

    /// All live keys, in no particular order.
    pub fn keys(&mut self) -> Vec<String> {
        self.remove_expired_keys();
        self.entries.keys().cloned().collect()
    }

    /// Version of `key` for WATCH. Every write assigns a fresh version and a
    /// missing key reports 0, so deletion and expiry register as changes too.
    pub fn version(&mut self, key: &str) -> u64 {
        self.live_entry(key).map_or(0, |value| value.version)
    }

    pub fn get_string(&mut self, key: &str) -> Result<Option<&String>, StoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::String(s),
                ..
            }) => Ok(Some(s)),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    pub fn get_list(&mut self, key: &str) -> Result<Option<&VecDeque<String>>, StoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::Array(list),
                ..
            }) => Ok(Some(list)),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    pub fn get_stream(&mut self, key: &str) -> Result<Option<&Stream>, StoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::Stream(stream),
                ..
            }) => Ok(Some(stream)),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Replaces the string at `key` with the result of `update`, keeping the
    /// key's expiration. A missing key is passed as `None` and created without
    /// expiration. When `update` fails nothing is written.
    pub fn update_string<E>(
        &mut self,
        key: &str,
        update: impl FnOnce(Option<&str>) -> Result<String, E>,
    ) -> Result<String, E>
    where
        E: From<StoreError>,
    {
        let (current, expiration) = match self.live_entry(key) {
            None => (None, None),
            Some(Value {
                data: DataType::String(s),
                expiration,
                ..
            }) => (Some(s.as_str()), *expiration),
            Some(_) => return Err(StoreError::WrongType.into()),
        };

        let updated = update(current)?;
        self.set(
            key.to_string(),
            Value::new(DataType::String(updated.clone()), expiration),
        );

        Ok(updated)
    }

    /// Applies `update` to the list at `key`.
    ///
    /// A missing key is created as an empty list when `create` is set and
    /// skipped (`Ok(None)`) otherwise. A list left empty by `update` is
    /// deleted.
    pub fn update_list<T>(
        &mut self,
        key: &str,
        create: bool,
        update: impl FnOnce(&mut VecDeque<String>) -> T,
    ) -> Result<Option<T>, StoreError> {
        if self.live_entry(key).is_none() {
            if !create {
                return Ok(None);
            }

            self.entries.insert(
                key.to_string(),
                Value::new(DataType::Array(VecDeque::new()), None),
            );
        }

        let version = self.bump_version();
        let Some(value) = self.entries.get_mut(key) else {
            return Ok(None);
        };

        let DataType::Array(ref mut list) = value.data else {
            return Err(StoreError::WrongType);
        };

        let result = update(list);
        value.version = version;

        if list.is_empty() {
            self.entries.remove(key);
        }

        Ok(Some(result))
    }

    /// Applies a fallible `update` to the stream at `key`, creating an empty
    /// stream first if needed. A stream created here is dropped again when
    /// `update` fails.
    pub fn update_stream<T, E>(
        &mut self,
        key: &str,
        update: impl FnOnce(&mut Stream) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let created = self.live_entry(key).is_none();

        if created {
            self.entries.insert(
                key.to_string(),
                Value::new(DataType::Stream(Stream::new()), None),
            );
        }

        let version = self.bump_version();
        let Some(value) = self.entries.get_mut(key) else {
            return Err(StoreError::WrongType.into());
        };

        let DataType::Stream(ref mut stream) = value.data else {
            return Err(StoreError::WrongType.into());
        };

        match update(stream) {
            Ok(result) => {
                value.version = version;
                Ok(result)
            }
            Err(e) => {
                if created {
                    self.entries.remove(key);
                }
                Err(e)
            }
        }
    }

    /// Marks a list key as having received new elements so that clients
    /// blocked on it can be served.
    pub fn signal_ready(&mut self, key: &str) {
        if !self.ready_keys.iter().any(|ready| ready == key) {
            self.ready_keys.push(key.to_string());
        }
    }

    pub fn take_ready_keys(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ready_keys)
    }

    /// Removes every key whose deadline has passed. Returns how many were removed.
    pub fn remove_expired_keys(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();

        self.entries
            .retain(|_, value| !expiry::is_expired(value.expiration, now));

        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
