//! Property tests for heapviz-core
//!
//! Index arithmetic must agree with the parent/child relation for every
//! branching factor.

use heapviz_core::{
    BranchingFactor, HeapOrder, child_indices, compare, depth_of, height, level_start,
    parent_index,
};
use proptest::prelude::*;

fn hops_to_root(mut i: usize, d: BranchingFactor) -> usize {
    let mut hops = 0;
    while i > 0 {
        i = parent_index(i, d).unwrap();
        hops += 1;
    }
    hops
}

proptest! {
    /// depth_of equals the number of parent hops to the root
    #[test]
    fn prop_depth_matches_parent_hops(d in 2usize..9, i in 0usize..100_000) {
        let d = BranchingFactor::new(d).unwrap();
        prop_assert_eq!(depth_of(i, d), hops_to_root(i, d));
    }

    /// Exact at the first index of every level, where float log rounds badly
    #[test]
    fn prop_depth_exact_at_level_starts(d in 2usize..9, level in 0usize..8) {
        let d = BranchingFactor::new(d).unwrap();
        let start = level_start(level, d);
        prop_assert_eq!(depth_of(start, d), level);
        if start > 0 {
            prop_assert_eq!(depth_of(start - 1, d), level - 1);
        }
    }

    /// Every child's parent is the node it came from
    #[test]
    fn prop_children_point_back_to_parent(d in 2usize..9, i in 0usize..1_000, len in 0usize..5_000) {
        let bf = BranchingFactor::new(d).unwrap();
        let children = child_indices(i, bf, len);
        prop_assert!(children.len() <= d);
        for c in children {
            prop_assert!(c < len);
            prop_assert_eq!(parent_index(c, bf).unwrap(), i);
            prop_assert_eq!(depth_of(c, bf), depth_of(i, bf) + 1);
        }
    }

    /// Height covers the deepest index
    #[test]
    fn prop_height_covers_last_index(d in 2usize..9, len in 1usize..10_000) {
        let d = BranchingFactor::new(d).unwrap();
        prop_assert_eq!(height(len, d), depth_of(len - 1, d) + 1);
    }

    /// compare is total: one of the two directions always holds
    #[test]
    fn prop_compare_total(a in any::<i64>(), b in any::<i64>()) {
        for order in [HeapOrder::Min, HeapOrder::Max] {
            prop_assert!(compare(&a, &b, order) || compare(&b, &a, order));
        }
    }
}
