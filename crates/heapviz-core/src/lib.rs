//! Index arithmetic and ordering for d-ary heaps.
//!
//! A d-ary heap is stored as a dense array. The node at index `i` has its
//! children at `d*i + 1 ..= d*i + d` and its parent at `(i - 1) / d`. All
//! functions here are pure and allocation free.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Ordering mode for the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeapOrder {
    /// Smallest value at the root.
    #[default]
    Min,
    /// Largest value at the root.
    Max,
}

impl HeapOrder {
    /// Word used in operation messages ("minimum" / "maximum").
    pub fn extreme_name(&self) -> &'static str {
        match self {
            HeapOrder::Min => "minimum",
            HeapOrder::Max => "maximum",
        }
    }
}

impl fmt::Display for HeapOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapOrder::Min => write!(f, "min"),
            HeapOrder::Max => write!(f, "max"),
        }
    }
}

impl FromStr for HeapOrder {
    type Err = HeapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(HeapOrder::Min),
            "max" => Ok(HeapOrder::Max),
            other => Err(HeapError::Domain(format!("unknown heap order `{other}`"))),
        }
    }
}

/// Errors raised by heap operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// Extraction attempted on an empty heap.
    EmptyHeap,
    /// Invalid configuration or index query (e.g. `d < 2`, parent of root).
    Domain(String),
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::EmptyHeap => write!(f, "Heap is empty"),
            HeapError::Domain(msg) => write!(f, "Domain error: {msg}"),
        }
    }
}

impl std::error::Error for HeapError {}

/// A validated branching factor (`d >= 2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct BranchingFactor(usize);

impl BranchingFactor {
    /// Smallest meaningful branching factor.
    pub const MIN: usize = 2;

    /// The binary heap.
    pub const BINARY: BranchingFactor = BranchingFactor(2);

    pub fn new(d: usize) -> Result<Self, HeapError> {
        if d < Self::MIN {
            return Err(HeapError::Domain(format!(
                "branching factor must be at least {}, got {d}",
                Self::MIN
            )));
        }
        Ok(Self(d))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BranchingFactor {
    fn default() -> Self {
        Self::BINARY
    }
}

impl TryFrom<usize> for BranchingFactor {
    type Error = HeapError;

    fn try_from(d: usize) -> Result<Self, Self::Error> {
        Self::new(d)
    }
}

impl From<BranchingFactor> for usize {
    fn from(d: BranchingFactor) -> Self {
        d.0
    }
}

impl fmt::Display for BranchingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parent of `i`. The root has no parent.
pub fn parent_index(i: usize, d: BranchingFactor) -> Result<usize, HeapError> {
    if i == 0 {
        return Err(HeapError::Domain("the root has no parent".to_string()));
    }
    Ok((i - 1) / d.get())
}

/// Children of `i` that exist in an array of length `len`. Empty for a leaf.
pub fn child_indices(i: usize, d: BranchingFactor, len: usize) -> Range<usize> {
    let d = d.get();
    let first = i.saturating_mul(d).saturating_add(1);
    let end = first.saturating_add(d).min(len);
    first.min(end)..end
}

/// Level (0-based) containing index `i`.
///
/// Equal to `floor(log_d((d - 1) * i + 1))`, evaluated with integers: level
/// `k` spans `(d^k - 1)/(d - 1) .. (d^(k+1) - 1)/(d - 1)`.
pub fn depth_of(i: usize, d: BranchingFactor) -> usize {
    let d = d.get();
    let mut depth = 0;
    let mut level_start = 0usize;
    let mut level_width = 1usize;
    loop {
        let next_start = level_start.saturating_add(level_width);
        if i < next_start || next_start == usize::MAX {
            return depth;
        }
        depth += 1;
        level_start = next_start;
        level_width = level_width.saturating_mul(d);
    }
}

/// First index of `level`.
pub fn level_start(level: usize, d: BranchingFactor) -> usize {
    let d = d.get();
    let mut start = 0usize;
    let mut width = 1usize;
    for _ in 0..level {
        start = start.saturating_add(width);
        width = width.saturating_mul(d);
    }
    start
}

/// Number of levels in a heap of `len` elements (0 when empty).
pub fn height(len: usize, d: BranchingFactor) -> usize {
    match len {
        0 => 0,
        n => depth_of(n - 1, d) + 1,
    }
}

/// Index of the last node that has at least one child.
pub fn last_non_leaf(len: usize, d: BranchingFactor) -> Option<usize> {
    if len < 2 {
        return None;
    }
    Some((len - 2) / d.get())
}

/// True iff `a` may sit above `b` (`a <= b` for min, `a >= b` for max).
pub fn compare<T: Ord>(a: &T, b: &T, order: HeapOrder) -> bool {
    match order {
        HeapOrder::Min => a <= b,
        HeapOrder::Max => a >= b,
    }
}

/// True iff `a` must move above `b` (strict form of [`compare`]).
pub fn outranks<T: Ord>(a: &T, b: &T, order: HeapOrder) -> bool {
    !compare(b, a, order)
}

/// First `(parent, child)` pair breaking the heap property, if any.
pub fn first_violation<T: Ord>(
    elements: &[T],
    d: BranchingFactor,
    order: HeapOrder,
) -> Option<(usize, usize)> {
    let last = last_non_leaf(elements.len(), d)?;
    (0..=last).find_map(|i| {
        child_indices(i, d, elements.len())
            .find(|&c| !compare(&elements[i], &elements[c], order))
            .map(|c| (i, c))
    })
}

/// Check the heap property over the whole array.
pub fn is_heap<T: Ord>(elements: &[T], d: BranchingFactor, order: HeapOrder) -> bool {
    first_violation(elements, d, order).is_none()
}
