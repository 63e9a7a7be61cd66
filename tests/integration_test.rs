// Integration tests for the allocator and the trace-script surface

use heaptty::heap::{Heap, HeapError};
use heaptty::script::{parse_script, Session};

/// Assert the chain invariants that must hold between any two calls:
/// blocks tile the region, sizes are multiples of 8, p-bits track the
/// predecessor, free blocks carry matching footers, and no two adjacent
/// blocks are both free.
fn assert_chain_invariants(heap: &Heap) {
    let views: Vec<_> = heap.blocks().collect();
    assert!(!views.is_empty(), "chain must contain at least one block");

    let mut expected_start = views[0].start;
    let mut prev_allocated = true; // bootstrap convention for the first block

    for view in &views {
        assert_eq!(view.start, expected_start, "blocks must tile the region");
        assert_eq!(view.size % 8, 0, "block size must be a multiple of 8");
        assert_eq!(
            view.prev_allocated, prev_allocated,
            "p-bit must match the predecessor's true state"
        );

        if !view.allocated {
            assert!(
                prev_allocated,
                "two adjacent free blocks at 0x{:08x}",
                view.start
            );
            assert_eq!(
                heap.footer_of(view.start),
                Some(view.size),
                "free block footer must mirror the header size"
            );
        }

        expected_start += view.size;
        prev_allocated = view.allocated;
    }

    assert_eq!(
        expected_start - views[0].start,
        heap.usable_size(),
        "chain must end exactly at the end mark"
    );
}

#[test]
fn test_round_trip_restores_a_single_free_block() {
    for size in [1, 8, 20, 100, 2000] {
        let mut heap = Heap::new(4096).expect("heap creation failed");
        let ptr = heap.allocate(size).expect("allocation failed");
        heap.release(ptr).expect("release failed");

        let views: Vec<_> = heap.blocks().collect();
        assert_eq!(views.len(), 1);
        assert!(!views[0].allocated);
        assert_eq!(views[0].size, heap.usable_size());
        assert_chain_invariants(&heap);
    }
}

#[test]
fn test_invariants_hold_across_a_mixed_workload() {
    let mut heap = Heap::new(8192).expect("heap creation failed");

    let mut live = Vec::new();
    for size in [20, 100, 50, 8, 333, 64, 1000] {
        live.push(heap.allocate(size).expect("allocation failed"));
        assert_chain_invariants(&heap);
    }

    // Free every other allocation, then everything else
    for ptr in live.iter().skip(1).step_by(2) {
        heap.release(*ptr).expect("release failed");
        assert_chain_invariants(&heap);
    }
    for ptr in live.iter().step_by(2) {
        heap.release(*ptr).expect("release failed");
        assert_chain_invariants(&heap);
    }

    let views: Vec<_> = heap.blocks().collect();
    assert_eq!(views.len(), 1, "full teardown must coalesce to one block");
}

#[test]
fn test_next_fit_makes_progress_without_reuse() {
    let mut heap = Heap::new(4096).expect("heap creation failed");

    // Identical requests with no intervening release must all be distinct
    let mut seen = Vec::new();
    while let Ok(ptr) = heap.allocate(100) {
        assert!(!seen.contains(&ptr), "next-fit returned a block twice");
        seen.push(ptr);
    }
    assert!(seen.len() > 1);
}

#[test]
fn test_scenario_one_page_alloc_20() {
    // One page: a 20-byte request becomes a 24-byte used block (20 + 4
    // header, rounded to 8), the rest stays free
    let mut heap = Heap::new(4096).expect("heap creation failed");
    let ptr = heap.allocate(20).expect("allocation failed");
    assert!(ptr != 0);

    let views: Vec<_> = heap.blocks().collect();
    assert_eq!(views.len(), 2);
    assert!(views[0].allocated);
    assert_eq!(views[0].size, 24);
    assert!(!views[1].allocated);
    assert_eq!(views[1].size, heap.usable_size() - 24);

    let table = heap.dump_to_string();
    assert!(table.contains("Total used size = 24"));
}

#[test]
fn test_scenario_two_allocations_released_in_order() {
    let mut heap = Heap::new(4096).expect("heap creation failed");
    let full = heap.usable_size();

    let p100 = heap.allocate(100).expect("allocation failed");
    let p50 = heap.allocate(50).expect("allocation failed");
    heap.release(p100).expect("release failed");
    heap.release(p50).expect("release failed");

    let views: Vec<_> = heap.blocks().collect();
    assert_eq!(views.len(), 1);
    assert!(!views[0].allocated);
    assert_eq!(views[0].size, full);
}

#[test]
fn test_scenario_oversized_request_fails() {
    let mut heap = Heap::new(4096).expect("heap creation failed");
    assert_eq!(
        heap.allocate(5_000_000).unwrap_err(),
        HeapError::OutOfMemory {
            requested: 5_000_000
        }
    );
}

#[test]
fn test_scenario_misaligned_release_fails_without_damage() {
    let mut heap = Heap::new(4096).expect("heap creation failed");
    let ptr = heap.allocate(20).expect("allocation failed");

    let before: Vec<_> = heap.blocks().collect();
    assert_eq!(
        heap.release(ptr + 2).unwrap_err(),
        HeapError::MisalignedPointer { address: ptr + 2 }
    );
    let after: Vec<_> = heap.blocks().collect();
    assert_eq!(before, after);
}

#[test]
fn test_independent_heaps_do_not_interfere() {
    let mut small = Heap::new(4096).expect("heap creation failed");
    let mut large = Heap::new(65536).expect("heap creation failed");

    let a = small.allocate(100).expect("allocation failed");
    let b = large.allocate(30000).expect("allocation failed");

    small.release(a).expect("release failed");
    assert_chain_invariants(&small);
    assert_chain_invariants(&large);
    large.release(b).expect("release failed");
    assert_chain_invariants(&large);
}

// === TRACE SCRIPT INTEGRATION TESTS ===

#[test]
fn test_script_tour() {
    let source = r#"
        init 4096
        a = alloc 20
        b = alloc 100
        c = alloc 50
        free b
        free a
        free c
        dump
    "#;

    let steps = parse_script(source).expect("parse failed");
    let session = Session::run(steps);
    let last = session.last();

    assert!(!last.log.iter().any(|l| l.is_error));

    // Everything released: the dump must show one free block again
    let heap = last.heap.as_ref().expect("heap missing");
    assert_eq!(heap.blocks().count(), 1);
    assert!(last
        .log
        .iter()
        .any(|l| l.text.contains(&format!("Total free size = {}", heap.usable_size()))));
}

#[test]
fn test_script_double_free_is_reported() {
    let source = r#"
        init 4096
        p = alloc 64
        free p !
        free p !
    "#;

    let steps = parse_script(source).expect("parse failed");
    let session = Session::run(steps);

    let errors: Vec<_> = session.last().log.iter().filter(|l| l.is_error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("not allocated"));
}

#[test]
fn test_script_history_scrubbing() {
    let source = r#"
        init 4096
        p = alloc 20
        free p
    "#;

    let steps = parse_script(source).expect("parse failed");
    let mut session = Session::run(steps);

    session.jump_to_end();
    assert!(session.current().pointers.is_empty());

    // One step back: the allocation is live again in that snapshot
    assert!(session.step_backward());
    assert_eq!(session.current().pointers.len(), 1);

    session.rewind_to_start();
    assert!(session.current().heap.is_none());
}
