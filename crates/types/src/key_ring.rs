//! Ordered, cyclic ring of backup signing keys.

use crate::SigningKey;
use thiserror::Error;

/// Errors constructing a [`KeyRing`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyRingError {
    #[error("key ring must contain at least one key")]
    Empty,
}

/// The ordered, cyclic list of candidate signing keys to rotate through.
///
/// Fixed at startup, never mutated. Indexing is circular: advancing past
/// the last entry wraps to the first, so a ring of length one always
/// resolves to the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRing {
    keys: Vec<SigningKey>,
}

impl KeyRing {
    /// Build a ring from an ordered key list. Fails on an empty list.
    pub fn new(keys: Vec<SigningKey>) -> Result<Self, KeyRingError> {
        if keys.is_empty() {
            return Err(KeyRingError::Empty);
        }
        Ok(Self { keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        // Construction rejects empty rings; kept for clippy's sake.
        self.keys.is_empty()
    }

    /// Position of `key` in the ring, if present.
    pub fn position(&self, key: &SigningKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Circular increment of a ring index.
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.keys.len()
    }

    /// Key at `index`, wrapping modulo the ring length.
    pub fn get(&self, index: usize) -> &SigningKey {
        &self.keys[index % self.keys.len()]
    }

    pub fn keys(&self) -> &[SigningKey] {
        &self.keys
    }
}
