//! Save module: compact, shareable encoding of which ship log facts a
//! player has opened.
//!
//! A save is one bit per known fact key, keys in byte-wise sorted order,
//! packed MSB-first and written as standard base64.

pub mod bits;
pub mod codec;
pub mod compat;
pub mod facts;
pub mod format;

pub use codec::{OpenedSet, SaveCodec, decode_save, encode_save};
pub use facts::{SaveFile, get_save_opened_facts};
pub use format::{ENCODED_SAVE_LEN, EXPECTED_KEY_COUNT, SaveFormat};
