//! # Introduction
//!
//! heaptty is a boundary-tag heap allocator you can watch. The allocator
//! manages one fixed-size region with next-fit placement, block splitting,
//! and immediate coalescing; a trace script drives it through
//! allocate/release calls, and every step is captured so the history can be
//! navigated forward and backward through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Trace script → Parser → Steps → Session (heap ops) → Snapshots → TUI
//! ```
//!
//! 1. [`script`] — parses the trace script and executes it stepwise,
//!    capturing a [`script::Snapshot`] after every command.
//! 2. [`heap`] — the allocator itself: a [`heap::Heap`] context owning one
//!    byte arena carved into boundary-tagged blocks.
//! 3. [`ui`] — ratatui-based TUI; not part of the stable library API.
//!
//! ## The allocator in one paragraph
//!
//! Every block carries a 4-byte header packing its size (a multiple of 8)
//! with an allocated bit and a predecessor-allocated bit; free blocks
//! mirror their size in a footer so the releasing side can walk backward.
//! `allocate` searches from the most recently allocated block (next-fit),
//! splits oversized fits, and returns an 8-aligned payload offset.
//! `release` validates the pointer, then merges with free neighbors
//! immediately, so no two adjacent blocks are ever both free. `dump`
//! renders the whole chain as a table.

pub mod heap;
pub mod script;
pub mod ui;
