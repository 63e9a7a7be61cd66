//! Bit-packed block header encoding
//!
//! Every block starts with a single 4-byte header word that multiplexes the
//! block size and two status flags:
//!
//! ```text
//!   bit 0 (a-bit): 1 = block is allocated, 0 = free
//!   bit 1 (p-bit): 1 = the block at the next lower address is allocated
//!   bits 2..:      block size in bytes (always a multiple of 8)
//! ```
//!
//! A free block additionally mirrors its size (status bits cleared) in a
//! footer word occupying its last 4 bytes, which is what makes backward
//! coalescing O(1).
//!
//! Examples, for a 24-byte block:
//!
//! - allocated, predecessor allocated → header `27`
//! - allocated, predecessor free → header `25`
//! - free, predecessor allocated → header `26`, footer `24`
//!
//! The end of the managed region is marked by a header word of exactly
//! [`END_MARK`] (size 0, a-bit set) — a pseudo-block that is never split,
//! merged, or handed out.
//!
//! All packing and unpacking happens here; the rest of the crate only ever
//! sees [`BlockHeader`] values.

/// LSB encodes allocation state in a header word.
pub const ALLOCATED_BIT: u32 = 0b01;
/// Second bit encodes the predecessor's allocation state.
pub const PREV_ALLOCATED_BIT: u32 = 0b10;
/// Both status bits; the remaining bits are the size.
pub const STATUS_MASK: u32 = ALLOCATED_BIT | PREV_ALLOCATED_BIT;

/// Header word that terminates the block chain.
pub const END_MARK: u32 = 1;

/// Largest size the header word can represent: every bit above the status
/// pair. Region bootstrap rejects anything that would not fit.
pub const MAX_BLOCK_SIZE: usize = (u32::MAX & !STATUS_MASK) as usize;

/// Decoded per-block metadata.
///
/// The in-memory representation is one packed `u32`; this struct is the
/// unpacked form used everywhere outside the encode/decode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Total block span in bytes, header included. Always a multiple of 8.
    pub size: usize,
    /// Whether the block is currently handed out to a caller.
    pub allocated: bool,
    /// Whether the block at the next lower address is allocated.
    /// Meaningless for the first block, which is pinned to `true` by the
    /// bootstrap convention.
    pub prev_allocated: bool,
}

impl BlockHeader {
    /// Pack into a header word.
    pub fn encode(self) -> u32 {
        debug_assert!(self.size % 8 == 0, "block size must be a multiple of 8");
        debug_assert!(
            self.size <= MAX_BLOCK_SIZE,
            "block size exceeds the header's capacity"
        );
        let mut word = self.size as u32;
        if self.allocated {
            word |= ALLOCATED_BIT;
        }
        if self.prev_allocated {
            word |= PREV_ALLOCATED_BIT;
        }
        word
    }

    /// Unpack a header word.
    ///
    /// The caller is responsible for not decoding the end mark; decoding it
    /// yields a zero-sized allocated block, which no traversal treats as a
    /// real block.
    pub fn decode(word: u32) -> Self {
        BlockHeader {
            size: (word & !STATUS_MASK) as usize,
            allocated: word & ALLOCATED_BIT != 0,
            prev_allocated: word & PREV_ALLOCATED_BIT != 0,
        }
    }

    /// The footer word for this block: size only, status bits cleared.
    pub fn footer(self) -> u32 {
        (self.size as u32) & !STATUS_MASK
    }
}
