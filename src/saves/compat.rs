//! Checks that keep saves consistent across updates.
//!
//! A packed save must have exactly the bytes its key count needs with the
//! padding bits clear, a newer save may only open facts, and a new key
//! universe must only append keys after the old ones in sort order for old
//! tokens to keep their meaning.

use tracing::warn;

use super::bits::{PACKED_SIZE, Packed, packed_len};
use super::codec::{OpenedSet, SaveCodec, sorted_keys};
use crate::error::Result;

/// Check that `packed` has the exact byte length for `key_count` keys and
/// that no padding bit past the last key is set.
pub fn is_valid_packed(packed: &[Packed], key_count: usize) -> bool {
    if packed.len() != packed_len(key_count) {
        return false;
    }
    let used = key_count % PACKED_SIZE;
    if used == 0 {
        return true;
    }
    packed
        .last()
        .is_some_and(|last| last & (Packed::MAX >> used) == 0)
}

/// Check that `new` keeps every fact `old` had opened.
///
/// Allowed per bit (old -> new): 0 -> 0, 0 -> 1, 1 -> 1. Bytes missing
/// from `new` count as zero.
pub fn is_allowed_to_override(old: &[Packed], new: &[Packed]) -> bool {
    old.iter()
        .enumerate()
        .all(|(i, &o)| o & !new.get(i).copied().unwrap_or(0) == 0)
}

/// Check that every old key keeps its bit index in the new universe.
pub fn is_append_only<A: AsRef<str>, B: AsRef<str>>(old_keys: &[A], new_keys: &[B]) -> bool {
    let old = sorted_keys(old_keys);
    let new = sorted_keys(new_keys);
    new.len() >= old.len() && old.iter().zip(&new).all(|(o, n)| o == n)
}

/// Decode a token built for `old_keys` and keep the facts still present in
/// `new_keys`. Works for any universe change, interleaved keys included.
pub fn decode_migrating<A: AsRef<str>, B: AsRef<str>>(
    codec: &SaveCodec,
    old_keys: &[A],
    new_keys: &[B],
    encoded: &str,
) -> Result<Option<OpenedSet>> {
    if !is_append_only(old_keys, new_keys) {
        warn!(
            old = old_keys.len(),
            new = new_keys.len(),
            "key universe changed in place, remapping save by key"
        );
    }
    let Some(opened) = codec.decode(old_keys, encoded)? else {
        return Ok(None);
    };
    let current: OpenedSet = new_keys.iter().map(|k| k.as_ref().to_string()).collect();
    Ok(Some(opened.intersection(&current).cloned().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saves::bits::pack_bools;
    use crate::saves::format::{EXPECTED_KEY_COUNT, SaveFormat};

    fn bits(bits: &[u8]) -> Vec<Packed> {
        pack_bools(&bits.iter().map(|&n| n != 0).collect::<Vec<_>>())
    }

    #[test]
    fn override_only_opens_facts() {
        let table: [(&[u8; 8], &[u8; 8], bool); 5] = [
            (&[1, 1, 1, 1, 1, 1, 1, 1], &[1, 1, 1, 1, 1, 1, 1, 1], true),
            (&[0, 1, 1, 1, 1, 1, 1, 1], &[1, 1, 1, 1, 1, 1, 1, 1], true),
            (&[1, 1, 1, 1, 1, 1, 1, 1], &[0, 1, 1, 1, 1, 1, 1, 1], false),
            (&[0, 1, 1, 1, 1, 1, 1, 1], &[0, 1, 1, 1, 1, 1, 1, 1], true),
            (&[0, 0, 0, 0, 0, 0, 0, 0], &[0, 0, 0, 0, 0, 0, 0, 0], true),
        ];
        for (old, new, expected) in table {
            assert_eq!(is_allowed_to_override(&bits(old), &bits(new)), expected);
        }
    }

    #[test]
    fn shorter_new_save_cannot_drop_facts() {
        assert!(!is_allowed_to_override(&[0x00, 0x01], &[0xFF]));
        assert!(is_allowed_to_override(&[0x80, 0x00], &[0x80]));
    }

    #[test]
    fn release_packed_length() {
        let packed = vec![0u8; packed_len(EXPECTED_KEY_COUNT)];
        assert!(is_valid_packed(&packed, EXPECTED_KEY_COUNT));
        assert!(!is_valid_packed(&packed[1..], EXPECTED_KEY_COUNT));
        let mut longer = packed.clone();
        longer.push(0);
        assert!(!is_valid_packed(&longer, EXPECTED_KEY_COUNT));
    }

    #[test]
    fn padding_bits_must_be_clear() {
        // 374 % 8 == 6 keys in the last byte, two padding bits
        let mut packed = vec![0u8; packed_len(EXPECTED_KEY_COUNT)];
        *packed.last_mut().unwrap() = 0b1111_1100;
        assert!(is_valid_packed(&packed, EXPECTED_KEY_COUNT));
        *packed.last_mut().unwrap() = 0b0000_0001;
        assert!(!is_valid_packed(&packed, EXPECTED_KEY_COUNT));
    }

    #[test]
    fn full_last_byte_has_no_padding() {
        assert!(is_valid_packed(&[0xFF], 8));
        assert!(!is_valid_packed(&[0xFF, 0x00], 8));
    }

    #[test]
    fn append_only_detects_interleaving() {
        assert!(is_append_only(&["a", "b"], &["b", "a", "c"]));
        assert!(is_append_only(&["a", "b"], &["a", "b"]));
        assert!(!is_append_only(&["a", "c"], &["a", "b", "c"]));
        assert!(!is_append_only(&["a", "b", "c"], &["a", "b"]));
    }

    #[test]
    fn migrating_decode_survives_interleaved_keys() {
        let old = ["a", "c", "e", "g"];
        let new = ["a", "b", "c", "d", "e", "f", "g"];
        let codec = SaveCodec::new(SaveFormat::with_key_count(old.len()));
        let opened: OpenedSet = ["c", "g"].iter().map(|k| k.to_string()).collect();
        let token = codec.encode(&old, &opened).unwrap();

        // positional decode against the new universe misattributes bits
        let positional = codec.decode(&new, &token).unwrap().unwrap();
        assert_ne!(positional, opened);

        let migrated = decode_migrating(&codec, &old, &new, &token).unwrap().unwrap();
        assert_eq!(migrated, opened);
    }

    #[test]
    fn migrating_decode_drops_removed_keys() {
        let old = ["a", "b", "c"];
        let new = ["a", "c"];
        let codec = SaveCodec::new(SaveFormat::with_key_count(old.len()));
        let opened: OpenedSet = ["a", "b"].iter().map(|k| k.to_string()).collect();
        let token = codec.encode(&old, &opened).unwrap();
        let migrated = decode_migrating(&codec, &old, &new, &token).unwrap().unwrap();
        assert_eq!(migrated.into_iter().collect::<Vec<_>>(), vec!["a"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn adding_facts_is_always_allowed(
                old in proptest::collection::vec(any::<u8>(), 0..48),
                extra in proptest::collection::vec(any::<u8>(), 0..48),
            ) {
                let new: Vec<u8> = old
                    .iter()
                    .enumerate()
                    .map(|(i, o)| o | extra.get(i).copied().unwrap_or(0))
                    .collect();
                prop_assert!(is_allowed_to_override(&old, &new));
            }

            #[test]
            fn encoded_saves_are_valid_packed(mask in proptest::collection::vec(any::<bool>(), 1..100)) {
                let packed = pack_bools(&mask);
                prop_assert!(is_valid_packed(&packed, mask.len()));
            }
        }
    }
}
