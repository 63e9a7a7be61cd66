//! Read-only traversal of the block chain
//!
//! [`Heap::blocks`] walks headers from the region start to the end mark,
//! decoding each into a [`BlockView`]. The walker never mutates state and
//! may be invoked between any two heap calls; the TUI, the dump table, and
//! the tests are all built on it.
//!
//! On a corrupted chain the walker stops as soon as a recorded size is no
//! longer consistent with the region bounds, rather than reading past the
//! arena.

use super::{Address, Heap, WORD};

/// One decoded block, as seen by a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockView {
    /// Position in the chain, starting at 0.
    pub index: usize,
    /// Header address.
    pub start: Address,
    /// Total block size in bytes, header included.
    pub size: usize,
    /// a-bit: block is handed out.
    pub allocated: bool,
    /// p-bit: the preceding block is allocated.
    pub prev_allocated: bool,
}

impl BlockView {
    /// Address of the last byte of the block.
    pub fn end(&self) -> Address {
        self.start + self.size - 1
    }
}

/// Iterator over the block chain. See [`Heap::blocks`].
pub struct Blocks<'a> {
    heap: &'a Heap,
    at: Address,
    index: usize,
}

impl Iterator for Blocks<'_> {
    type Item = BlockView;

    fn next(&mut self) -> Option<BlockView> {
        if self.at >= self.heap.end() || self.heap.is_end_mark(self.at) {
            return None;
        }

        let header = self.heap.header_at(self.at);
        // Bail out instead of walking into garbage
        if header.size < WORD || self.at + header.size > self.heap.end() {
            return None;
        }

        let view = BlockView {
            index: self.index,
            start: self.at,
            size: header.size,
            allocated: header.allocated,
            prev_allocated: header.prev_allocated,
        };

        self.at += header.size;
        self.index += 1;
        Some(view)
    }
}

impl Heap {
    /// Walk the chain from the region start to the end mark.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            heap: self,
            at: self.first_block(),
            index: 0,
        }
    }

    /// The footer word of the free block whose header is at `at`, or
    /// `None` if the block is allocated (allocated blocks have no footer —
    /// those bytes belong to the payload).
    pub fn footer_of(&self, at: Address) -> Option<usize> {
        let header = self.header_at(at);
        if header.allocated {
            None
        } else {
            Some(self.word(at + header.size - WORD) as usize)
        }
    }

    /// Bytes currently inside allocated blocks (headers included).
    pub fn used_bytes(&self) -> usize {
        self.blocks().filter(|b| b.allocated).map(|b| b.size).sum()
    }

    /// Bytes currently inside free blocks (headers and footers included).
    pub fn free_bytes(&self) -> usize {
        self.blocks().filter(|b| !b.allocated).map(|b| b.size).sum()
    }
}
