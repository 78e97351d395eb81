//! Fuzz harness for build-heap traces
//!
//! Replaying the swaps of a build-heap trace must give the same array as
//! running the algorithm, and that array must be a heap.

#![no_main]

use heapviz_core::{BranchingFactor, HeapOrder, is_heap};
use heapviz_trace::{Pass, Trace};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&head, rest)) = data.split_first() else {
        return;
    };
    let Ok(d) = BranchingFactor::new(2 + usize::from(head % 6)) else {
        return;
    };
    let order = if head & 0x80 == 0 {
        HeapOrder::Min
    } else {
        HeapOrder::Max
    };
    let values: Vec<i8> = rest.iter().take(64).map(|&b| b as i8).collect();

    let trace = Trace::new(values, Pass::BuildHeap, d, order);
    let replayed = trace.replay();
    assert_eq!(replayed, trace.final_elements());
    assert!(is_heap(&replayed, d, order));
});
