//! Witness account and signing key identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many leading characters of a signing key appear in status output.
///
/// Keys are long base58 strings; the prefix is enough to tell ring entries
/// apart in a log line.
const KEY_PREFIX_LEN: usize = 16;

/// Name of the witness account being monitored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessName(String);

impl WitnessName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WitnessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WitnessName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// A block-signing public key in its on-chain string encoding.
///
/// The sentinel never parses key material; it only compares keys for
/// equality and passes them through to the chain client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for status lines and metrics labels.
    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(KEY_PREFIX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SigningKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_truncates_long_keys() {
        let key = SigningKey::new("BTS5TPTziKkLexhVKsQKtSpo4bAv5RnB8oXcG4sMHEwCcTf3r7dqE");
        assert_eq!(key.prefix(), "BTS5TPTziKkLexhV");
    }

    #[test]
    fn prefix_keeps_short_keys_whole() {
        let key = SigningKey::new("BTS1");
        assert_eq!(key.prefix(), "BTS1");
    }

    #[test]
    fn keys_compare_by_encoding() {
        assert_eq!(SigningKey::from("BTS1abc"), SigningKey::new("BTS1abc"));
        assert_ne!(SigningKey::from("BTS1abc"), SigningKey::from("BTS2abc"));
    }
}
