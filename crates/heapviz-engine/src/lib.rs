//! The d-ary heap engine.
//!
//! A [`Heap`] is a plain owned value. Every mutating operation takes the heap
//! by value and returns the updated heap together with the [`Trace`] that
//! describes, step by step, how the array got there.
//!
//! ```
//! use heapviz_core::{BranchingFactor, HeapOrder};
//! use heapviz_engine::{Heap, extract_root, insert};
//!
//! let mut heap = Heap::new(BranchingFactor::BINARY, HeapOrder::Min);
//! for value in [5, 3, 8, 1] {
//!     heap = insert(heap, value).0;
//! }
//! assert_eq!(heap.elements(), &[1, 3, 8, 5]);
//!
//! let (min, heap, _trace) = extract_root(heap).unwrap();
//! assert_eq!(min, 1);
//! assert_eq!(heap.root(), Some(3));
//! ```

use heapviz_core::{BranchingFactor, HeapError, HeapOrder, depth_of, first_violation, height};
use heapviz_trace::{Pass, Step};
use serde::{Deserialize, Serialize};

pub use heapviz_core;
pub use heapviz_trace;

/// Element type stored in the heap.
pub type Value = i64;

/// Trace over heap values.
pub type Trace = heapviz_trace::Trace<Value>;

/// A d-ary heap over integers.
///
/// The heap property holds between operations, except right after
/// [`set_branching_factor`] or [`set_order`], which do not reorder anything.
/// `version` increases on every observable change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heap {
    elements: Vec<Value>,
    branching_factor: BranchingFactor,
    order: HeapOrder,
    #[serde(default)]
    version: u64,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(BranchingFactor::default(), HeapOrder::default())
    }
}

impl Heap {
    /// Create an empty heap.
    pub fn new(branching_factor: BranchingFactor, order: HeapOrder) -> Self {
        Self {
            elements: Vec::new(),
            branching_factor,
            order,
            version: 0,
        }
    }

    /// Wrap an arbitrary array. The heap property is not established; call
    /// [`heapify`] for that.
    pub fn from_elements(
        elements: Vec<Value>,
        branching_factor: BranchingFactor,
        order: HeapOrder,
    ) -> Self {
        Self {
            elements,
            branching_factor,
            order,
            version: 0,
        }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn root(&self) -> Option<Value> {
        self.elements.first().copied()
    }

    pub fn branching_factor(&self) -> BranchingFactor {
        self.branching_factor
    }

    pub fn order(&self) -> HeapOrder {
        self.order
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of levels in the tree.
    pub fn height(&self) -> usize {
        height(self.elements.len(), self.branching_factor)
    }

    /// Whether the heap property currently holds.
    pub fn is_valid(&self) -> bool {
        self.violation().is_none()
    }

    /// First `(parent, child)` pair out of order, if any.
    pub fn violation(&self) -> Option<(usize, usize)> {
        first_violation(&self.elements, self.branching_factor, self.order)
    }

    /// Apply one trace step to the live array.
    ///
    /// Only swaps change anything; compares and `Done` leave the version
    /// untouched.
    pub fn apply(&mut self, step: &Step) {
        if step.is_swap() {
            step.apply(&mut self.elements);
            self.touch();
        }
    }

    /// Replace the whole array (e.g. with a trace's starting array).
    pub fn replace_elements(&mut self, elements: Vec<Value>) {
        self.elements = elements;
        self.touch();
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    fn trace(&self, initial: Vec<Value>, pass: Pass) -> Trace {
        Trace::new(initial, pass, self.branching_factor, self.order)
    }
}

/// Append `value` and sift it up.
pub fn insert(mut heap: Heap, value: Value) -> (Heap, Trace) {
    let mut initial = heap.elements.clone();
    initial.push(value);
    let from = initial.len() - 1;
    let trace = heap.trace(initial, Pass::SiftUp { from });
    heap.replace_elements(trace.final_elements());
    (heap, trace)
}

/// Remove and return the root.
///
/// The old root is highlighted, replaced by the last element, the new root
/// is highlighted, and then sifted down. Fails with [`HeapError::EmptyHeap`] on an empty heap.
pub fn extract_root(mut heap: Heap) -> Result<(Value, Heap, Trace), HeapError> {
    let Some(&root) = heap.elements.first() else {
        return Err(HeapError::EmptyHeap);
    };

    let mut initial = heap.elements.clone();
    let pass = match initial.pop() {
        Some(last) if !initial.is_empty() => {
            initial[0] = last;
            Pass::SiftDown { from: 0 }
        }
        _ => Pass::Settled,
    };

    let trace = heap.trace(initial, pass).with_root_highlight();
    heap.replace_elements(trace.final_elements());
    Ok((root, heap, trace))
}

/// Rebuild the heap property over the whole array, bottom-up.
pub fn heapify(mut heap: Heap) -> (Heap, Trace) {
    let trace = heap.trace(heap.elements.clone(), Pass::BuildHeap);
    if !trace.is_empty() {
        heap.replace_elements(trace.final_elements());
    }
    (heap, trace)
}

/// Change `d` for subsequent operations. The array is left as is.
pub fn set_branching_factor(mut heap: Heap, branching_factor: BranchingFactor) -> Heap {
    if heap.branching_factor != branching_factor {
        heap.branching_factor = branching_factor;
        heap.touch();
    }
    heap
}

/// Change the ordering for subsequent operations. The array is left as is.
pub fn set_order(mut heap: Heap, order: HeapOrder) -> Heap {
    if heap.order != order {
        heap.order = order;
        heap.touch();
    }
    heap
}

/// Drop every element, keeping the configuration.
pub fn clear(mut heap: Heap) -> Heap {
    if !heap.elements.is_empty() {
        heap.replace_elements(Vec::new());
    }
    heap
}

/// One element of a level, with its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub index: usize,
    pub value: Value,
    pub parent_index: Option<usize>,
    pub parent_value: Option<Value>,
}

/// All elements at one depth, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub level: usize,
    pub entries: Vec<LevelEntry>,
}

/// Split the array into levels of the tree.
pub fn group_by_level(heap: &Heap) -> Vec<Level> {
    let d = heap.branching_factor;
    let mut levels: Vec<Level> = Vec::with_capacity(heap.height());

    for (index, &value) in heap.elements.iter().enumerate() {
        let depth = depth_of(index, d);
        if levels.len() <= depth {
            levels.push(Level {
                level: depth,
                entries: Vec::new(),
            });
        }
        let parent_index = heapviz_core::parent_index(index, d).ok();
        levels[depth].entries.push(LevelEntry {
            index,
            value,
            parent_index,
            parent_value: parent_index.map(|p| heap.elements[p]),
        });
    }

    levels
}
