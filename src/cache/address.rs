// address.rs
//
// Address decoding and reconstruction shared by every cache level. Masks
// only — block_size and set_count are required to be powers of two
// (enforced by config validation before a Cache is ever built).

/// A decoded address: which tag/set/offset a cache level sees it as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    pub tag: u64,
    pub index: u32,
    pub offset: u32,
}

/// Number of trailing-zero bits in a power-of-two value.
pub fn log2_exact(value: u32) -> u32 {
    debug_assert!(value.is_power_of_two(), "{value} is not a power of two");
    value.trailing_zeros()
}

/// Decode `address` into (tag, index, offset) given `block_size` and
/// `set_count`, both powers of two.
pub fn decode(address: u64, block_size: u32, set_count: u32) -> DecodedAddress {
    let offset_bits = log2_exact(block_size);
    let index_bits = log2_exact(set_count.max(1));

    let offset_mask = (1u64 << offset_bits) - 1;
    let index_mask = if set_count <= 1 { 0 } else { (1u64 << index_bits) - 1 };

    let offset = (address & offset_mask) as u32;
    let index = ((address >> offset_bits) & index_mask) as u32;
    let tag = address >> (offset_bits + index_bits);

    DecodedAddress { tag, index, offset }
}

/// Reconstruct the block-aligned address of (tag, index) for a level with
/// the given offset/index bit widths.
pub fn reconstruct(tag: u64, index: u32, offset_bits: u32, index_bits: u32) -> u64 {
    (tag << (index_bits + offset_bits)) | ((index as u64) << offset_bits)
}
