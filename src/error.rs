use thiserror::Error;

pub type Result<T> = std::result::Result<T, SaveError>;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("wrong number of keys: {actual}, expected {expected}")]
    KeyCount { actual: usize, expected: usize },

    #[error("save holds {bits} bits but {keys} keys are known")]
    InsufficientBits { bits: usize, keys: usize },

    #[error("malformed save token: {0}")]
    Malformed(#[from] base64::DecodeError),

    #[error("save token has {actual} characters, expected {expected}")]
    TokenLength { actual: usize, expected: usize },

    #[error("key count {count} exceeds the supported maximum {max}")]
    FormatKeyCount { count: usize, max: usize },

    #[error("invalid save file: {0}")]
    SaveFile(#[from] serde_json::Error),
}

impl SaveError {
    /// Hard failures come from corrupted input rather than a version mismatch.
    pub fn is_hard(&self) -> bool {
        matches!(self, SaveError::Malformed(_) | SaveError::SaveFile(_))
    }
}
