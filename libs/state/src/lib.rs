//! # Meshmeta State - Scope-Owned Typed State Store
//!
//! ## Purpose
//!
//! A typed key/value container attached to one connection or request scope.
//! Each entry carries a mutability classification and a lifespan, and the
//! store exclusively owns every value it holds: request-lifespan entries die
//! at [`StateStore::end_request`], everything dies when the store is dropped
//! at connection end. Nothing outlives its scope.
//!
//! ## Mutability contract
//!
//! Once a key is set `ReadOnly`, re-setting it fails with
//! [`StateError::AlreadyImmutable`] and mutable borrows fail with
//! [`StateError::NotMutable`]. That is what protects exchanged peer identity
//! from tampering by later processing stages; misuse is a caller bug and
//! fails loudly rather than being silently swallowed.
//!
//! The store is scoped to a single scheduling unit (one connection's worker),
//! so it is a plain `&mut` API with no internal synchronization. The
//! process-wide sharing problem belongs to the cache, not here.

use std::collections::HashMap;

use bytes::Bytes;
use thiserror::Error;
use tracing::trace;

/// State store misuse errors. These indicate contract violations in the
/// embedding system, not bad input data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Key '{key}' is already set read-only and cannot be overwritten")]
    AlreadyImmutable { key: String },

    #[error("Key '{key}' is read-only and cannot be borrowed mutably")]
    NotMutable { key: String },

    #[error("Key '{key}' not found")]
    NotFound { key: String },
}

/// Whether downstream code may overwrite a value after first write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    ReadOnly,
}

/// How long an entry is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeSpan {
    /// Visible within one request only.
    Request,
    /// Visible across every request multiplexed on the connection.
    Connection,
}

/// Tagged-union value type. Deliberately closed: adding a kind is an explicit
/// protocol decision, not an `Any` downcast at a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    /// Shared binary buffer (cloning shares, never copies the bytes).
    Bytes(Bytes),
    Str(String),
    U64(u64),
}

impl StateValue {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            StateValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            StateValue::U64(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Bytes> for StateValue {
    fn from(b: Bytes) -> Self {
        StateValue::Bytes(b)
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::Str(s)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::Str(s.to_string())
    }
}

impl From<u64> for StateValue {
    fn from(v: u64) -> Self {
        StateValue::U64(v)
    }
}

/// One stored entry with its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    value: StateValue,
    mutability: Mutability,
    lifespan: LifeSpan,
}

impl StateEntry {
    pub fn value(&self) -> &StateValue {
        &self.value
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn lifespan(&self) -> LifeSpan {
        self.lifespan
    }
}

/// Typed key/value store owned by one connection or request scope.
#[derive(Debug, Default)]
pub struct StateStore {
    entries: HashMap<String, StateEntry>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value under `key`, transferring ownership to the store.
    ///
    /// Overwriting a `Mutable` entry is allowed and may change its tags
    /// (e.g. write-then-freeze). Overwriting a `ReadOnly` entry fails with
    /// [`StateError::AlreadyImmutable`].
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<StateValue>,
        mutability: Mutability,
        lifespan: LifeSpan,
    ) -> Result<(), StateError> {
        if let Some(existing) = self.entries.get(key) {
            if existing.mutability == Mutability::ReadOnly {
                return Err(StateError::AlreadyImmutable {
                    key: key.to_string(),
                });
            }
        }
        trace!(key, ?mutability, ?lifespan, "state entry set");
        self.entries.insert(
            key.to_string(),
            StateEntry {
                value: value.into(),
                mutability,
                lifespan,
            },
        );
        Ok(())
    }

    /// Read-only access. Absence is a normal condition, not an error.
    pub fn get_read_only(&self, key: &str) -> Option<&StateValue> {
        self.entries.get(key).map(StateEntry::value)
    }

    /// Full entry access (value plus tags).
    pub fn get_entry(&self, key: &str) -> Option<&StateEntry> {
        self.entries.get(key)
    }

    /// Mutable access. Fails with [`StateError::NotFound`] for missing keys
    /// and [`StateError::NotMutable`] for read-only entries.
    pub fn get_mutable(&mut self, key: &str) -> Result<&mut StateValue, StateError> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| StateError::NotFound {
                key: key.to_string(),
            })?;
        if entry.mutability == Mutability::ReadOnly {
            return Err(StateError::NotMutable {
                key: key.to_string(),
            });
        }
        Ok(&mut entry.value)
    }

    /// End the current request: drop every request-lifespan entry.
    /// Connection-lifespan entries survive until the store itself is dropped.
    pub fn end_request(&mut self) {
        self.entries
            .retain(|_, entry| entry.lifespan == LifeSpan::Connection);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
