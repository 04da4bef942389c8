//! Opened-set <-> token conversion.
//!
//! Bit `i` of a token is "is the i-th key, in byte-wise sorted order,
//! opened". Sorting is part of the wire format: `str` ordering compares
//! UTF-8 bytes, which is code point order and never locale-aware.

use std::collections::BTreeSet;

use base64::prelude::*;
use tracing::error;

use super::bits::{pack_bools, packed_len, unpack_bools};
use super::format::SaveFormat;
use crate::error::{Result, SaveError};

/// Set of opened fact keys.
pub type OpenedSet = BTreeSet<String>;

/// Sort a key universe the way both ends of the wire do.
pub fn sorted_keys<K: AsRef<str>>(keys: &[K]) -> Vec<&str> {
    let mut sorted: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted
}

#[derive(Debug, Clone, Default)]
pub struct SaveCodec {
    format: SaveFormat,
}

impl SaveCodec {
    pub fn new(format: SaveFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &SaveFormat {
        &self.format
    }

    /// Encode `opened` against `keys`.
    ///
    /// An empty `keys` slice stands for "no save loaded" and yields an
    /// all-false token of the expected length.
    pub fn try_encode<K: AsRef<str>>(&self, keys: &[K], opened: &OpenedSet) -> Result<String> {
        let expected = self.format.expected_key_count;
        if keys.is_empty() {
            return Ok(BASE64_STANDARD.encode(vec![0u8; packed_len(expected)]));
        }
        if keys.len() != expected {
            return Err(SaveError::KeyCount {
                actual: keys.len(),
                expected,
            });
        }
        let bools: Vec<bool> = sorted_keys(keys)
            .into_iter()
            .map(|key| opened.contains(key))
            .collect();
        Ok(BASE64_STANDARD.encode(pack_bools(&bools)))
    }

    /// Decode `encoded` against the current `keys`.
    ///
    /// Tokens longer than the universe are accepted and the extra bits ignored.
    pub fn try_decode<K: AsRef<str>>(&self, keys: &[K], encoded: &str) -> Result<OpenedSet> {
        let bytes = BASE64_STANDARD.decode(encoded)?;
        let unpacked = unpack_bools(&bytes);
        if unpacked.len() < keys.len() {
            return Err(SaveError::InsufficientBits {
                bits: unpacked.len(),
                keys: keys.len(),
            });
        }
        Ok(sorted_keys(keys)
            .into_iter()
            .zip(unpacked)
            .filter(|(_, opened)| *opened)
            .map(|(key, _)| key.to_string())
            .collect())
    }

    /// Like [`try_encode`](Self::try_encode), with a key count mismatch
    /// logged and turned into `None`.
    pub fn encode<K: AsRef<str>>(&self, keys: &[K], opened: &OpenedSet) -> Option<String> {
        match self.try_encode(keys, opened) {
            Ok(token) => Some(token),
            Err(e) => {
                error!(error = %e, "trying to encode save with wrong number of keys");
                None
            }
        }
    }

    /// Like [`try_decode`](Self::try_decode), with a bit deficit logged and
    /// turned into `Ok(None)`. Malformed base64 is still an `Err`.
    pub fn decode<K: AsRef<str>>(
        &self,
        keys: &[K],
        encoded: &str,
    ) -> Result<Option<OpenedSet>> {
        match self.try_decode(keys, encoded) {
            Ok(opened) => Ok(Some(opened)),
            Err(e) if e.is_hard() => Err(e),
            Err(e) => {
                error!(error = %e, "trying to load save with wrong number of keys");
                Ok(None)
            }
        }
    }
}

/// Encode with the default release format.
pub fn encode_save<K: AsRef<str>>(keys: &[K], opened: &OpenedSet) -> Option<String> {
    SaveCodec::default().encode(keys, opened)
}

/// Decode with the default release format.
pub fn decode_save<K: AsRef<str>>(keys: &[K], encoded: &str) -> Result<Option<OpenedSet>> {
    SaveCodec::default().decode(keys, encoded)
}
