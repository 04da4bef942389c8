//! Save format parameters for one game-data release.
//!
//! Both sides of a shared link must agree on these values: the key count
//! decides the bit length, the versions are written into the URL fragment.

use serde::{Deserialize, Serialize};

use super::bits::packed_len;
use crate::error::{Result, SaveError};

/// Number of ship log facts in the game data this tracker targets.
pub const EXPECTED_KEY_COUNT: usize = 374;

/// Game release the key universe was extracted from.
pub const GAME_VERSION: &str = "1.1.15";

/// Version of the token layout written as `ev=` in links.
pub const ENCODING_VERSION: u32 = 1;

/// Largest key count a format may declare.
pub const MAX_KEY_COUNT: usize = u16::MAX as usize;

/// Length in base64 characters of a token for `EXPECTED_KEY_COUNT` keys.
pub const ENCODED_SAVE_LEN: usize = encoded_len(EXPECTED_KEY_COUNT);

/// Standard padded base64 length of a token holding `key_count` bits.
pub const fn encoded_len(key_count: usize) -> usize {
    4 * packed_len(key_count).div_ceil(3)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveFormat {
    pub expected_key_count: usize,
    pub game_version: String,
    pub encoding_version: u32,
}

impl Default for SaveFormat {
    fn default() -> Self {
        Self {
            expected_key_count: EXPECTED_KEY_COUNT,
            game_version: GAME_VERSION.to_string(),
            encoding_version: ENCODING_VERSION,
        }
    }
}

impl SaveFormat {
    /// Format with a different key count, keeping the default versions.
    pub fn with_key_count(expected_key_count: usize) -> Self {
        Self {
            expected_key_count,
            ..Self::default()
        }
    }

    /// Exact token length a link must carry to count as a save.
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.expected_key_count)
    }

    /// Parse a (possibly partial) JSON format object.
    pub fn from_json(json: &str) -> Result<Self> {
        let format: Self = serde_json::from_str(json)?;
        format.validate()?;
        Ok(format)
    }

    /// Reject key counts no release could have.
    pub fn validate(&self) -> Result<()> {
        if self.expected_key_count > MAX_KEY_COUNT {
            return Err(SaveError::FormatKeyCount {
                count: self.expected_key_count,
                max: MAX_KEY_COUNT,
            });
        }
        Ok(())
    }
}
