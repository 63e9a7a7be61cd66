//! Placement engine: `allocate`
//!
//! Next-fit placement with splitting. The search resumes at the most
//! recently allocated block (the cursor), wraps at the end mark, and gives
//! up only after coming back around to where it started.

use super::encoding::BlockHeader;
use super::{Address, Heap, HeapError, ALIGNMENT, MIN_BLOCK, WORD};

impl Heap {
    /// Allocate `size` payload bytes.
    ///
    /// Returns the payload address (header address + 4), always a multiple
    /// of 8. On failure nothing is mutated — not even the cursor.
    pub fn allocate(&mut self, size: usize) -> Result<Address, HeapError> {
        if size == 0 {
            return Err(HeapError::ZeroAllocationSize);
        }

        // Header overhead, then round up to the 8-byte granularity. The
        // rounding is what guarantees room for a footer if this block is
        // later freed. A request so large the rounding itself overflows
        // cannot fit in any region.
        let needed = match size.checked_add(WORD + ALIGNMENT - 1) {
            Some(padded) => padded & !(ALIGNMENT - 1),
            None => return Err(HeapError::OutOfMemory { requested: size }),
        };
        debug_assert!(needed >= MIN_BLOCK);

        if needed > self.usable {
            return Err(HeapError::OutOfMemory { requested: size });
        }

        let origin = self.cursor.unwrap_or_else(|| self.first_block());
        let mut at = origin;

        let found = loop {
            let header = self.header_at(at);
            if !header.allocated && header.size >= needed {
                break header;
            }

            at += header.size;
            if self.is_end_mark(at) {
                at = self.first_block();
            }
            if at == origin {
                return Err(HeapError::OutOfMemory { requested: size });
            }
        };

        if found.size > needed {
            // Split: the prefix becomes the allocation, the remainder a new
            // free block. Both sides stay multiples of 8, so the remainder
            // is at least MIN_BLOCK.
            self.write_free_block(at + needed, found.size - needed, true);
            self.set_header(
                at,
                BlockHeader {
                    size: needed,
                    allocated: true,
                    prev_allocated: found.prev_allocated,
                },
            );
        } else {
            self.set_header(
                at,
                BlockHeader {
                    allocated: true,
                    ..found
                },
            );
            self.set_prev_allocated(at + found.size, true);
        }

        self.cursor = Some(at);
        Ok(at + WORD)
    }
}
