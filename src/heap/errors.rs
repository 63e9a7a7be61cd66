//! Error types for the allocator
//!
//! This module defines [`HeapError`], which covers every expected failure of
//! the public heap operations (as opposed to trace-script parse errors or
//! terminal I/O errors).
//!
//! None of these are fatal: the heap is left exactly as it was before the
//! failing call, and the caller is expected to check and handle the result.

use super::Address;
use std::fmt;

/// Expected failures of heap construction, allocation, and release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// A heap was requested with a region size of zero
    ZeroRegionSize,

    /// A heap was requested with a region too large for the 4-byte header
    /// to record block sizes in (or too large to page-round at all)
    RegionTooLarge { requested: usize },

    /// `allocate` was called with a size of zero
    ZeroAllocationSize,

    /// No free block large enough, even after a full next-fit wrap
    OutOfMemory { requested: usize },

    /// `release` was called with the null address
    NullPointer,

    /// `release` was called with an address that is not 8-byte aligned
    MisalignedPointer { address: Address },

    /// `release` was called with an address outside the managed region
    PointerOutOfBounds { address: Address },

    /// `release` was called on a block that is not currently allocated
    /// (double free, or an address that never was a payload)
    BlockNotAllocated { address: Address },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::ZeroRegionSize => {
                write!(f, "Requested region size is not positive")
            }
            HeapError::RegionTooLarge { requested } => {
                write!(
                    f,
                    "Region of {} bytes exceeds the maximum manageable size",
                    requested
                )
            }
            HeapError::ZeroAllocationSize => {
                write!(f, "Allocation size must be positive")
            }
            HeapError::OutOfMemory { requested } => {
                write!(f, "Out of memory: no free block fits {} bytes", requested)
            }
            HeapError::NullPointer => {
                write!(f, "Cannot release a null pointer")
            }
            HeapError::MisalignedPointer { address } => {
                write!(
                    f,
                    "Pointer 0x{:08x} is not aligned to an 8-byte boundary",
                    address
                )
            }
            HeapError::PointerOutOfBounds { address } => {
                write!(f, "Pointer 0x{:08x} is outside the heap region", address)
            }
            HeapError::BlockNotAllocated { address } => {
                write!(
                    f,
                    "Block at 0x{:08x} is not allocated (double free or invalid pointer)",
                    address
                )
            }
        }
    }
}

impl std::error::Error for HeapError {}
