//! Property tests for heapviz-trace
//!
//! Traces must be replayable: applying their swaps to the starting array
//! yields exactly what the algorithm computed.

use heapviz_core::{BranchingFactor, HeapOrder, is_heap};
use heapviz_trace::{BuildHeap, Pass, SiftDown, Step, Trace};
use proptest::prelude::*;

fn order_strategy() -> impl Strategy<Value = HeapOrder> {
    prop_oneof![Just(HeapOrder::Min), Just(HeapOrder::Max)]
}

proptest! {
    /// Build-heap always produces a valid heap and its swaps replay exactly
    #[test]
    fn prop_build_heap_replays(
        values in proptest::collection::vec(-50i64..50, 0..40),
        d in 2usize..6,
        order in order_strategy(),
    ) {
        let d = BranchingFactor::new(d).unwrap();
        let trace = Trace::new(values.clone(), Pass::BuildHeap, d, order);
        let built = trace.final_elements();
        prop_assert!(is_heap(&built, d, order));
        prop_assert_eq!(trace.replay(), built.clone());

        let mut sorted_in = values.clone();
        let mut sorted_out = built;
        sorted_in.sort();
        sorted_out.sort();
        prop_assert_eq!(sorted_in, sorted_out);
    }

    /// Heapifying a valid heap yields no steps
    #[test]
    fn prop_build_heap_idempotent(
        values in proptest::collection::vec(-50i64..50, 0..40),
        d in 2usize..6,
        order in order_strategy(),
    ) {
        let d = BranchingFactor::new(d).unwrap();
        let heap = BuildHeap::new(values, d, order).finish();
        let again = Trace::new(heap.clone(), Pass::BuildHeap, d, order);
        prop_assert!(again.is_empty());
        prop_assert_eq!(again.final_elements(), heap);
    }

    /// Every swap is preceded by a compare of the same pair
    #[test]
    fn prop_sift_down_compare_precedes_swap(
        values in proptest::collection::vec(-50i64..50, 1..40),
        d in 2usize..6,
        order in order_strategy(),
    ) {
        let d = BranchingFactor::new(d).unwrap();
        let steps: Vec<Step> = SiftDown::new(values, 0, d, order).collect();
        prop_assert_eq!(steps.last(), Some(&Step::Done));
        for pair in steps.windows(2) {
            if let Step::Swap(a, b) = pair[1] {
                prop_assert_eq!(pair[0], Step::Compare(a, b));
            }
        }
    }

    /// Sift-up after an append restores a valid heap
    #[test]
    fn prop_sift_up_restores_heap(
        values in proptest::collection::vec(-50i64..50, 0..40),
        extra in -50i64..50,
        d in 2usize..6,
        order in order_strategy(),
    ) {
        let d = BranchingFactor::new(d).unwrap();
        let mut heap = BuildHeap::new(values, d, order).finish();
        heap.push(extra);
        let from = heap.len() - 1;
        let trace = Trace::new(heap, Pass::SiftUp { from }, d, order);
        let result = trace.final_elements();
        prop_assert!(is_heap(&result, d, order));
        prop_assert_eq!(trace.replay(), result);
    }
}
