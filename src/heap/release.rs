//! Release engine: `release`
//!
//! Validates the pointer, then coalesces immediately with whichever
//! neighbors are free. Both directions go through the same
//! [`Heap::absorb_next`] primitive: forward from the freed block itself,
//! backward by first hopping to the predecessor's header via its footer and
//! absorbing from there. Merges always fold into the lowest address.

use super::{Address, Heap, HeapError, ALIGNMENT, WORD};

impl Heap {
    /// Release the allocation whose payload starts at `ptr`.
    ///
    /// Fails fast, in order, on: the null address, a misaligned address, an
    /// address outside the region, and a block that is not currently
    /// allocated (which covers double frees). A failed call leaves the heap
    /// untouched.
    pub fn release(&mut self, ptr: Address) -> Result<(), HeapError> {
        if ptr == 0 {
            return Err(HeapError::NullPointer);
        }
        if ptr % ALIGNMENT != 0 {
            return Err(HeapError::MisalignedPointer { address: ptr });
        }
        if ptr < self.first_block() + WORD || ptr >= self.end() {
            return Err(HeapError::PointerOutOfBounds { address: ptr });
        }

        let header_addr = ptr - WORD;
        let header = self.header_at(header_addr);
        if !header.allocated {
            return Err(HeapError::BlockNotAllocated { address: ptr });
        }

        // Free the block, absorbing the successor if it is already free.
        let mut start = header_addr;
        let mut size = self.absorb_next(header_addr, header.size);
        self.write_free_block(start, size, header.prev_allocated);

        // If the predecessor is free, fold everything into it. Its size is
        // mirrored in the footer word directly below this header.
        if !header.prev_allocated {
            let prev_size = self.word(header_addr - WORD) as usize;
            let prev_start = header_addr - prev_size;
            let prev = self.header_at(prev_start);

            start = prev_start;
            size = self.absorb_next(prev_start, prev.size);
            self.write_free_block(start, size, prev.prev_allocated);
        }

        self.set_prev_allocated(start + size, false);

        // A merge may have retired the header the next-fit cursor points
        // at; snap it to the surviving block so the search origin is always
        // a live header.
        if let Some(cursor) = self.cursor {
            if cursor > start && cursor < start + size {
                self.cursor = Some(start);
            }
        }

        Ok(())
    }

    /// Combined size of the block at `at` and its successor, if the
    /// successor is a free block; the block's own size otherwise. The end
    /// mark never merges.
    fn absorb_next(&self, at: Address, size: usize) -> usize {
        let next = at + size;
        if self.is_end_mark(next) {
            return size;
        }
        let header = self.header_at(next);
        if header.allocated {
            size
        } else {
            size + header.size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The chain collapsed back to one free block spanning the whole
    /// usable region?
    fn is_pristine(heap: &Heap) -> bool {
        let views: Vec<_> = heap.blocks().collect();
        views.len() == 1 && !views[0].allocated && views[0].size == heap.usable_size()
    }

    #[test]
    fn test_release_with_no_free_neighbors() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");
        let b = heap.allocate(20).expect("allocation failed");
        let _c = heap.allocate(20).expect("allocation failed");

        heap.release(b).expect("release failed");

        let freed = heap.header_at(b - WORD);
        assert!(!freed.allocated);
        assert_eq!(freed.size, 24);
        assert!(freed.prev_allocated);
        assert_eq!(heap.footer_of(b - WORD), Some(24));

        // c now follows a free block
        let c_header = heap.header_at(b - WORD + 24);
        assert!(c_header.allocated);
        assert!(!c_header.prev_allocated);
        let _ = a;
    }

    #[test]
    fn test_release_merges_forward() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");
        heap.release(a).expect("release failed");
        assert!(is_pristine(&heap));
    }

    #[test]
    fn test_release_merges_backward() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");
        let b = heap.allocate(20).expect("allocation failed");
        heap.release(a).expect("release failed");
        heap.release(b).expect("release failed");
        assert!(is_pristine(&heap));
    }

    #[test]
    fn test_release_merges_both_neighbors() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");
        let b = heap.allocate(20).expect("allocation failed");
        let c = heap.allocate(20).expect("allocation failed");
        heap.release(a).expect("release failed");
        heap.release(c).expect("release failed");
        // b's neighbors are both free; freeing it triple-merges
        heap.release(b).expect("release failed");
        assert!(is_pristine(&heap));
    }

    #[test]
    fn test_double_free_is_rejected_and_chain_unchanged() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");
        let _b = heap.allocate(20).expect("allocation failed");
        heap.release(a).expect("release failed");

        let before: Vec<_> = heap.blocks().collect();
        assert_eq!(
            heap.release(a).unwrap_err(),
            HeapError::BlockNotAllocated { address: a }
        );
        let after: Vec<_> = heap.blocks().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_malformed_pointers_are_rejected() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");

        assert_eq!(heap.release(0).unwrap_err(), HeapError::NullPointer);
        assert_eq!(
            heap.release(a + 4).unwrap_err(),
            HeapError::MisalignedPointer { address: a + 4 }
        );
        assert_eq!(
            heap.release(heap.region_size() * 2).unwrap_err(),
            HeapError::PointerOutOfBounds {
                address: heap.region_size() * 2
            }
        );

        // The live allocation is still intact
        assert!(heap.header_at(a - WORD).allocated);
    }

    #[test]
    fn test_cursor_survives_backward_merge_of_latest_block() {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let a = heap.allocate(20).expect("allocation failed");
        let b = heap.allocate(20).expect("allocation failed");

        // b is the cursor; freeing a then b retires b's header into the
        // merged block. The next allocation must still succeed.
        heap.release(a).expect("release failed");
        heap.release(b).expect("release failed");
        let c = heap.allocate(40).expect("allocation failed");
        assert_eq!(c, heap.first_block() + WORD);
    }
}
