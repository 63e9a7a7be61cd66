//! The allocator core: one fixed region, boundary-tagged blocks
//!
//! This module provides the heap itself:
//!
//! - [`Heap`]: an explicit allocator context owning one contiguous byte
//!   arena; every operation is a method, so independent heaps coexist and
//!   tests need no global state
//! - [`encoding`]: the packed header/footer word format shared by every
//!   component
//! - [`place`]: `allocate` — next-fit search with splitting
//! - [`release`]: `release` — validation and immediate coalescing
//! - [`walk`]: read-only traversal of the block chain
//! - [`report`]: the formatted block table (`dump`)
//! - [`errors`]: the [`HeapError`] taxonomy
//!
//! # Region layout
//!
//! The requested region size is rounded up to a multiple of the page size
//! and backed by one zeroed `Vec<u8>`. Addresses handed out by the heap are
//! byte offsets into that arena, not machine pointers:
//!
//! ```text
//!   offset 0..4      front pad (keeps payloads 8-aligned; doubles as NULL)
//!   offset 4         header of the first block
//!   ...              blocks, each a multiple of 8 bytes
//!   last 4 bytes     end mark (header word == 1)
//! ```
//!
//! Between any two public calls the chain satisfies: blocks tile the region
//! exactly up to the end mark, every size is a multiple of 8, every p-bit
//! matches the predecessor's true state, every free block carries a matching
//! footer, and no two adjacent blocks are both free.

pub mod encoding;
pub mod errors;
mod place;
mod release;
pub mod report;
pub mod walk;

pub use errors::HeapError;
pub use walk::{BlockView, Blocks};

use encoding::{BlockHeader, END_MARK, MAX_BLOCK_SIZE, PREV_ALLOCATED_BIT};

/// A byte offset from the start of the heap region.
///
/// Offset 0 is inside the front pad, so no payload can ever live there;
/// it plays the role of the null pointer.
pub type Address = usize;

/// Size of one header/footer word in bytes.
pub const WORD: usize = 4;

/// Payload alignment; also the granularity of every block size.
pub const ALIGNMENT: usize = 8;

/// Region requests are rounded up to a multiple of this.
pub const PAGE_SIZE: usize = 4096;

/// Smallest representable block: a header plus room for a footer.
/// The `payload + 4` round-to-8 rule in `allocate` guarantees this for any
/// non-zero request, so it is asserted rather than branched on.
pub const MIN_BLOCK: usize = 8;

/// Offset of the first block header (right after the front pad).
const FIRST_BLOCK: Address = WORD;

/// A fixed-size heap managing allocate/release over one owned region.
///
/// Created once via [`Heap::new`]; the region is never grown, shrunk, or
/// returned for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Heap {
    /// The full padded region, including front pad and end mark.
    arena: Vec<u8>,
    /// Bytes managed as blocks: region size minus the 8 reserved bytes.
    usable: usize,
    /// Next-fit cursor: header address of the most recently allocated
    /// block, or `None` before the first allocation.
    cursor: Option<Address>,
}

impl Heap {
    /// Create a heap managing `size_of_region` bytes (rounded up to a
    /// multiple of [`PAGE_SIZE`]).
    ///
    /// The region starts as a single free block followed by the end mark.
    /// The first block's p-bit is pinned to allocated so it is never
    /// mistaken for having a free predecessor.
    pub fn new(size_of_region: usize) -> Result<Self, HeapError> {
        if size_of_region == 0 {
            return Err(HeapError::ZeroRegionSize);
        }

        let pad = (PAGE_SIZE - size_of_region % PAGE_SIZE) % PAGE_SIZE;
        let region_size = size_of_region.checked_add(pad).ok_or(
            HeapError::RegionTooLarge {
                requested: size_of_region,
            },
        )?;

        // 8 bytes reserved: front pad for double-word alignment, end mark.
        // The remainder becomes one block, so it must fit the header's
        // size field.
        let usable = region_size - 2 * WORD;
        if usable > MAX_BLOCK_SIZE {
            return Err(HeapError::RegionTooLarge {
                requested: size_of_region,
            });
        }

        let mut heap = Heap {
            arena: vec![0; region_size],
            usable,
            cursor: None,
        };

        heap.set_word(FIRST_BLOCK + usable, END_MARK);
        heap.write_free_block(FIRST_BLOCK, usable, true);

        Ok(heap)
    }

    /// Total region size in bytes, padding included.
    pub fn region_size(&self) -> usize {
        self.arena.len()
    }

    /// Bytes available for blocks (region size minus the reserved 8).
    pub fn usable_size(&self) -> usize {
        self.usable
    }

    /// Header address of the first block.
    pub(crate) fn first_block(&self) -> Address {
        FIRST_BLOCK
    }

    /// Address of the end mark (one past the last block).
    pub(crate) fn end(&self) -> Address {
        FIRST_BLOCK + self.usable
    }

    /// Read the 4-byte word at `at`.
    fn word(&self, at: Address) -> u32 {
        let bytes: [u8; WORD] = self.arena[at..at + WORD]
            .try_into()
            .expect("word read stays within the arena");
        u32::from_ne_bytes(bytes)
    }

    /// Overwrite the 4-byte word at `at`.
    fn set_word(&mut self, at: Address, value: u32) {
        self.arena[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
    }

    /// Decode the block header at `at`. Must not be the end mark.
    pub(crate) fn header_at(&self, at: Address) -> BlockHeader {
        BlockHeader::decode(self.word(at))
    }

    /// Encode and store `header` at `at`.
    pub(crate) fn set_header(&mut self, at: Address, header: BlockHeader) {
        self.set_word(at, header.encode());
    }

    /// Whether the word at `at` is the end mark.
    pub(crate) fn is_end_mark(&self, at: Address) -> bool {
        self.word(at) == END_MARK
    }

    /// Write a complete free block at `at`: header plus matching footer.
    pub(crate) fn write_free_block(&mut self, at: Address, size: usize, prev_allocated: bool) {
        debug_assert!(size >= MIN_BLOCK && size % ALIGNMENT == 0);
        let header = BlockHeader {
            size,
            allocated: false,
            prev_allocated,
        };
        self.set_header(at, header);
        self.set_word(at + size - WORD, header.footer());
    }

    /// Set or clear the p-bit of the block at `at`. The end mark is left
    /// untouched so its word stays exactly `1`.
    pub(crate) fn set_prev_allocated(&mut self, at: Address, prev_allocated: bool) {
        if self.is_end_mark(at) {
            return;
        }
        let word = self.word(at);
        let updated = if prev_allocated {
            word | PREV_ALLOCATED_BIT
        } else {
            word & !PREV_ALLOCATED_BIT
        };
        self.set_word(at, updated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_region() {
        assert_eq!(Heap::new(0).unwrap_err(), HeapError::ZeroRegionSize);
    }

    #[test]
    fn test_bootstrap_shape() {
        let heap = Heap::new(4096).expect("heap creation failed");
        assert_eq!(heap.region_size(), 4096);
        assert_eq!(heap.usable_size(), 4096 - 8);

        // One free block spanning everything, p-bit pinned to allocated
        let first = heap.header_at(heap.first_block());
        assert_eq!(first.size, 4096 - 8);
        assert!(!first.allocated);
        assert!(first.prev_allocated);

        // Footer mirrors the size, end mark terminates the chain
        assert_eq!(heap.word(heap.end() - WORD) as usize, 4096 - 8);
        assert!(heap.is_end_mark(heap.end()));
    }

    #[test]
    fn test_rejects_region_too_large_for_the_header() {
        // Page rounding would wrap
        assert_eq!(
            Heap::new(usize::MAX).unwrap_err(),
            HeapError::RegionTooLarge {
                requested: usize::MAX
            }
        );

        // Fits in a usize but not in the header's 4-byte size field
        assert_eq!(
            Heap::new(1 << 33).unwrap_err(),
            HeapError::RegionTooLarge { requested: 1 << 33 }
        );
    }

    #[test]
    fn test_region_rounds_up_to_page_size() {
        let heap = Heap::new(100).expect("heap creation failed");
        assert_eq!(heap.region_size(), PAGE_SIZE);

        let heap = Heap::new(PAGE_SIZE + 1).expect("heap creation failed");
        assert_eq!(heap.region_size(), 2 * PAGE_SIZE);
    }

    #[test]
    fn test_end_mark_survives_p_bit_updates() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let end = heap.end();
        heap.set_prev_allocated(end, true);
        heap.set_prev_allocated(end, false);
        assert!(heap.is_end_mark(end));
    }
}
