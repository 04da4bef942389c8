//! MSB-first bit packing shared by the encoder and decoder.
//!
//! Bool `b` of every group of eight lands on bit `7 - b` of its byte. The
//! last byte is zero-padded, so unpacking always yields a multiple of 8.

pub type Packed = u8;

pub const PACKED_SIZE: usize = Packed::BITS as usize;

/// Number of bytes needed to hold `bits` bools.
pub const fn packed_len(bits: usize) -> usize {
    bits.div_ceil(PACKED_SIZE)
}

/// Pack bools into bytes, first bool of each chunk in the most significant bit.
pub fn pack_bools(bools: &[bool]) -> Vec<Packed> {
    let mut bytes = Vec::with_capacity(packed_len(bools.len()));
    for chunk in bools.chunks(PACKED_SIZE) {
        let mut byte: Packed = 0;
        for (i, b) in chunk.iter().enumerate() {
            if *b {
                byte |= 1 << (PACKED_SIZE - 1 - i);
            }
        }
        bytes.push(byte);
    }
    bytes
}

/// Unpack bytes into exactly `8 * bytes.len()` bools, most significant bit first.
pub fn unpack_bools(bytes: &[Packed]) -> Vec<bool> {
    let mut bools = Vec::with_capacity(bytes.len() * PACKED_SIZE);
    for &byte in bytes {
        for bit in (0..PACKED_SIZE).rev() {
            bools.push((byte >> bit) & 1 == 1);
        }
    }
    bools
}
