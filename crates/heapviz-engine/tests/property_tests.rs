//! Property tests for heapviz-engine
//!
//! Random operation sequences starting from an empty heap must leave a valid
//! heap after every completed operation.

use heapviz_core::{BranchingFactor, HeapError, HeapOrder, depth_of};
use heapviz_engine::{Heap, Value, extract_root, group_by_level, heapify, insert};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(Value),
    Extract,
    Heapify,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-100i64..100).prop_map(Op::Insert),
        2 => Just(Op::Extract),
        1 => Just(Op::Heapify),
    ]
}

proptest! {
    /// The heap property holds after every operation, and extraction always
    /// returns the current extreme
    #[test]
    fn prop_invariant_after_each_operation(
        ops in proptest::collection::vec(op_strategy(), 0..60),
        d in 2usize..6,
        max in any::<bool>(),
    ) {
        let order = if max { HeapOrder::Max } else { HeapOrder::Min };
        let mut heap = Heap::new(BranchingFactor::new(d).unwrap(), order);
        let mut model: Vec<Value> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(v) => {
                    let (next, trace) = insert(heap, v);
                    prop_assert_eq!(trace.replay(), next.elements().to_vec());
                    heap = next;
                    model.push(v);
                }
                Op::Extract => match extract_root(heap.clone()) {
                    Ok((value, next, trace)) => {
                        let expected = match order {
                            HeapOrder::Min => model.iter().copied().min(),
                            HeapOrder::Max => model.iter().copied().max(),
                        };
                        prop_assert_eq!(Some(value), expected);
                        let pos = model.iter().position(|&m| m == value).unwrap();
                        model.swap_remove(pos);
                        prop_assert_eq!(trace.replay(), next.elements().to_vec());
                        heap = next;
                    }
                    Err(e) => {
                        prop_assert_eq!(e, HeapError::EmptyHeap);
                        prop_assert!(model.is_empty());
                    }
                },
                Op::Heapify => {
                    let (next, trace) = heapify(heap);
                    prop_assert!(trace.is_empty());
                    heap = next;
                }
            }
            prop_assert!(heap.is_valid());
            prop_assert_eq!(heap.len(), model.len());
        }
    }

    /// Level grouping preserves every element in index order
    #[test]
    fn prop_group_by_level_partitions(
        values in proptest::collection::vec(-100i64..100, 0..50),
        d in 2usize..6,
    ) {
        let d = BranchingFactor::new(d).unwrap();
        let heap = Heap::from_elements(values.clone(), d, HeapOrder::Min);
        let levels = group_by_level(&heap);
        prop_assert_eq!(levels.len(), heap.height());

        let flattened: Vec<Value> = levels
            .iter()
            .flat_map(|l| l.entries.iter().map(|e| e.value))
            .collect();
        prop_assert_eq!(flattened, values);

        for level in &levels {
            for entry in &level.entries {
                prop_assert_eq!(depth_of(entry.index, d), level.level);
                prop_assert_eq!(entry.parent_index.is_none(), entry.index == 0);
            }
        }
    }
}
