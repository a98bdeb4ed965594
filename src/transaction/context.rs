// ============================================================================
// Transaction Context
// ============================================================================
//
// Host-owned extended-properties bag that lives exactly as long as one
// transaction. The engine stores its per-transaction state here and keeps
// none on itself, so one observer can serve any number of concurrent
// transactions.
//
// ============================================================================

use crate::core::{DirtyRegionError, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Random per-transaction id, used to correlate log lines of one
/// transaction across listeners and hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn random() -> Self {
        TransactionId(Uuid::new_v4())
    }

    /// Adopt an id the host already assigned
    pub fn from_uuid(id: Uuid) -> Self {
        TransactionId(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0.simple())
    }
}

/// Transaction-scoped key/value bag handed to listeners by the host.
///
/// Values are stored type-erased and read back through typed accessors;
/// asking for a key with the wrong type behaves as if the key were absent,
/// except in [`get_or_insert_with`](Self::get_or_insert_with) which reports it.
///
/// # Thread Safety
/// A context belongs to one transaction and is passed by `&mut` to every
/// callback, so notifications for a transaction are applied sequentially.
pub struct TransactionContext {
    id: TransactionId,
    properties: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl TransactionContext {
    /// Called by the host when it begins a transaction
    pub fn new() -> Self {
        Self::with_id(TransactionId::random())
    }

    pub fn with_id(id: TransactionId) -> Self {
        Self {
            id,
            properties: HashMap::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.properties.get(key)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.properties.get_mut(key)?.downcast_mut::<T>()
    }

    /// Store `value` under `key`, returning whether a previous value was replaced
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> bool {
        self.properties.insert(key.into(), Box::new(value)).is_some()
    }

    /// Get the value under `key`, creating it with `init` when absent.
    ///
    /// # Errors
    /// Returns error if `key` already holds a value of another type
    pub fn get_or_insert_with<T, F>(&mut self, key: &str, init: F) -> Result<&mut T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let slot = self
            .properties
            .entry(key.to_string())
            .or_insert_with(|| Box::new(init()));
        slot.downcast_mut::<T>().ok_or_else(|| {
            DirtyRegionError::Config(format!(
                "transaction property '{}' holds a value of another type",
                key
            ))
        })
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.properties.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.properties.keys().collect();
        keys.sort();
        f.debug_struct("TransactionContext")
            .field("id", &self.id)
            .field("properties", &keys)
            .finish()
    }
}
