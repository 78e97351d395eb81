//! Animatable heap algorithms.
//!
//! Sift-up, sift-down and build-heap are exposed as iterators over [`Step`]
//! values instead of atomic loops. Each iterator owns a working copy of the
//! array and applies a swap to it at the moment it yields the matching
//! [`Step::Swap`], so a consumer can pull one step, render, wait, and pull the
//! next. The iterators never sleep; pacing belongs to the caller.

use heapviz_core::{BranchingFactor, HeapOrder, child_indices, compare, last_non_leaf, outranks};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One observable unit of an algorithm's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "step", content = "indices", rename_all = "lowercase")]
pub enum Step {
    /// The elements at the two indices are being compared.
    Compare(usize, usize),
    /// The elements at the two indices are exchanged.
    Swap(usize, usize),
    /// The current pass stopped.
    Done,
}

impl Step {
    /// Apply this step to an array. Only swaps mutate.
    pub fn apply<T>(&self, elements: &mut [T]) {
        if let Step::Swap(a, b) = *self {
            elements.swap(a, b);
        }
    }

    /// Indices this step touches, if any.
    pub fn indices(&self) -> Option<(usize, usize)> {
        match *self {
            Step::Compare(a, b) | Step::Swap(a, b) => Some((a, b)),
            Step::Done => None,
        }
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, Step::Swap(..))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Compare(a, b) => write!(f, "compare {a} {b}"),
            Step::Swap(a, b) => write!(f, "swap {a} {b}"),
            Step::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Inspect,
    Swap(usize),
    Stop,
    Finished,
}

/// Sift-up from a starting index.
///
/// Yields `Compare(current, parent)` for every comparison, `Swap` when the
/// element strictly outranks its parent, and a final `Done`.
#[derive(Debug, Clone)]
pub struct SiftUp<T> {
    elements: Vec<T>,
    d: BranchingFactor,
    order: HeapOrder,
    current: usize,
    phase: Phase,
}

impl<T: Ord> SiftUp<T> {
    pub fn new(elements: Vec<T>, start: usize, d: BranchingFactor, order: HeapOrder) -> Self {
        let phase = if start < elements.len() {
            Phase::Inspect
        } else {
            Phase::Stop
        };
        Self {
            elements,
            d,
            order,
            current: start,
            phase,
        }
    }

    /// Working array as of the last yielded step.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Drain the remaining steps and return the final array.
    pub fn finish(mut self) -> Vec<T> {
        while self.next().is_some() {}
        self.elements
    }
}

impl<T: Ord> Iterator for SiftUp<T> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        match self.phase {
            Phase::Finished => None,
            Phase::Stop => {
                self.phase = Phase::Finished;
                Some(Step::Done)
            }
            Phase::Swap(parent) => {
                let child = self.current;
                self.elements.swap(child, parent);
                self.current = parent;
                self.phase = Phase::Inspect;
                Some(Step::Swap(child, parent))
            }
            Phase::Inspect => {
                if self.current == 0 {
                    self.phase = Phase::Finished;
                    return Some(Step::Done);
                }
                let parent = (self.current - 1) / self.d.get();
                self.phase = if outranks(
                    &self.elements[self.current],
                    &self.elements[parent],
                    self.order,
                ) {
                    Phase::Swap(parent)
                } else {
                    Phase::Stop
                };
                Some(Step::Compare(self.current, parent))
            }
        }
    }
}

/// Child of `index` that ranks highest under `order`.
///
/// Children are scanned left to right and the best is replaced only on strict
/// improvement, so the leftmost child wins ties.
pub fn best_child<T: Ord>(
    elements: &[T],
    index: usize,
    d: BranchingFactor,
    order: HeapOrder,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for child in child_indices(index, d, elements.len()) {
        match best {
            Some(b) if !outranks(&elements[child], &elements[b], order) => {}
            _ => best = Some(child),
        }
    }
    best
}

/// Sift-down from a starting index.
///
/// When a child must move up, yields `Compare(current, child)` and then
/// `Swap(current, child)`. A pass that stops yields `Done` unless it runs
/// inside a build-heap.
#[derive(Debug, Clone)]
pub struct SiftDown<T> {
    elements: Vec<T>,
    d: BranchingFactor,
    order: HeapOrder,
    current: usize,
    phase: Phase,
    emit_done: bool,
}

impl<T: Ord> SiftDown<T> {
    pub fn new(elements: Vec<T>, start: usize, d: BranchingFactor, order: HeapOrder) -> Self {
        Self {
            elements,
            d,
            order,
            current: start,
            phase: Phase::Inspect,
            emit_done: true,
        }
    }

    fn silent(elements: Vec<T>, d: BranchingFactor, order: HeapOrder) -> Self {
        Self {
            elements,
            d,
            order,
            current: 0,
            phase: Phase::Finished,
            emit_done: false,
        }
    }

    fn restart_at(&mut self, index: usize) {
        self.current = index;
        self.phase = Phase::Inspect;
    }

    /// Working array as of the last yielded step.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Drain the remaining steps and return the final array.
    pub fn finish(mut self) -> Vec<T> {
        while self.next().is_some() {}
        self.elements
    }

    fn stop(&mut self) -> Option<Step> {
        self.phase = Phase::Finished;
        self.emit_done.then_some(Step::Done)
    }
}

impl<T: Ord> Iterator for SiftDown<T> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        match self.phase {
            Phase::Finished => None,
            Phase::Stop => self.stop(),
            Phase::Swap(child) => {
                let parent = self.current;
                self.elements.swap(parent, child);
                self.current = child;
                self.phase = Phase::Inspect;
                Some(Step::Swap(parent, child))
            }
            Phase::Inspect => {
                let Some(best) = best_child(&self.elements, self.current, self.d, self.order)
                else {
                    return self.stop();
                };
                if compare(&self.elements[self.current], &self.elements[best], self.order) {
                    return self.stop();
                }
                self.phase = Phase::Swap(best);
                Some(Step::Compare(self.current, best))
            }
        }
    }
}

/// Bottom-up heap construction.
///
/// Runs sift-down from the last non-leaf index down to the root, in strictly
/// decreasing index order. Inner passes do not emit `Done`, so a valid heap
/// yields no steps at all.
#[derive(Debug, Clone)]
pub struct BuildHeap<T> {
    pass: SiftDown<T>,
    next_index: Option<usize>,
}

impl<T: Ord> BuildHeap<T> {
    pub fn new(elements: Vec<T>, d: BranchingFactor, order: HeapOrder) -> Self {
        Self {
            next_index: last_non_leaf(elements.len(), d),
            pass: SiftDown::silent(elements, d, order),
        }
    }

    /// Working array as of the last yielded step.
    pub fn elements(&self) -> &[T] {
        self.pass.elements()
    }

    /// Drain the remaining steps and return the final array.
    pub fn finish(mut self) -> Vec<T> {
        while self.next().is_some() {}
        self.pass.elements
    }
}

impl<T: Ord> Iterator for BuildHeap<T> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            if let Some(step) = self.pass.next() {
                return Some(step);
            }
            let index = self.next_index?;
            self.next_index = index.checked_sub(1);
            self.pass.restart_at(index);
        }
    }
}

/// Which algorithm a [`Trace`] replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pass", rename_all = "snake_case")]
pub enum Pass {
    SiftUp { from: usize },
    SiftDown { from: usize },
    BuildHeap,
    /// Nothing left to sift (e.g. the last element was extracted).
    Settled,
}

/// A restartable record of one operation.
///
/// `initial` is the array the steps apply to. For an extraction that is the
/// array after the root was overwritten by the last element and the last slot
/// removed. A trace is bound to that array and is meaningless against an
/// array mutated in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace<T> {
    initial: Vec<T>,
    pass: Pass,
    highlight_root: bool,
    d: BranchingFactor,
    order: HeapOrder,
}

impl<T: Ord + Clone> Trace<T> {
    pub fn new(initial: Vec<T>, pass: Pass, d: BranchingFactor, order: HeapOrder) -> Self {
        Self {
            initial,
            pass,
            highlight_root: false,
            d,
            order,
        }
    }

    /// Prefix the steps with `Compare(0, 0)` on the root. Unless the pass is
    /// [`Pass::Settled`], a second `Compare(0, 0)` follows for the element
    /// that took the root's place.
    pub fn with_root_highlight(mut self) -> Self {
        self.highlight_root = true;
        self
    }

    pub fn initial(&self) -> &[T] {
        &self.initial
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    pub fn branching_factor(&self) -> BranchingFactor {
        self.d
    }

    pub fn order(&self) -> HeapOrder {
        self.order
    }

    /// A fresh lazy iterator over the steps, starting from the beginning.
    pub fn steps(&self) -> Steps<T> {
        let elements = self.initial.clone();
        let algorithm = match self.pass {
            Pass::SiftUp { from } => Algorithm::Up(SiftUp::new(elements, from, self.d, self.order)),
            Pass::SiftDown { from } => {
                Algorithm::Down(SiftDown::new(elements, from, self.d, self.order))
            }
            Pass::BuildHeap => Algorithm::Build(BuildHeap::new(elements, self.d, self.order)),
            Pass::Settled => Algorithm::Settled {
                elements,
                done_pending: true,
            },
        };
        let prelude = match (self.highlight_root, self.pass) {
            (false, _) => 0,
            (true, Pass::Settled) => 1,
            (true, _) => 2,
        };
        Steps {
            prelude,
            algorithm,
        }
    }

    /// All steps, collected.
    pub fn to_vec(&self) -> Vec<Step> {
        self.steps().collect()
    }

    /// Final array, as produced by running the algorithm to completion.
    pub fn final_elements(&self) -> Vec<T> {
        self.steps().finish()
    }

    /// Final array, rebuilt by applying only the swap steps to `initial`.
    pub fn replay(&self) -> Vec<T> {
        let mut elements = self.initial.clone();
        for step in self.steps() {
            step.apply(&mut elements);
        }
        elements
    }

    pub fn is_empty(&self) -> bool {
        self.steps().next().is_none()
    }

    pub fn swap_count(&self) -> usize {
        self.steps().filter(Step::is_swap).count()
    }
}

#[derive(Debug, Clone)]
enum Algorithm<T> {
    Up(SiftUp<T>),
    Down(SiftDown<T>),
    Build(BuildHeap<T>),
    Settled { elements: Vec<T>, done_pending: bool },
}

/// Lazy step sequence of a [`Trace`].
#[derive(Debug, Clone)]
pub struct Steps<T> {
    /// Root highlights still to yield.
    prelude: u8,
    algorithm: Algorithm<T>,
}

impl<T: Ord> Steps<T> {
    /// Working array as of the last yielded step.
    pub fn elements(&self) -> &[T] {
        match &self.algorithm {
            Algorithm::Up(it) => it.elements(),
            Algorithm::Down(it) => it.elements(),
            Algorithm::Build(it) => it.elements(),
            Algorithm::Settled { elements, .. } => elements.as_slice(),
        }
    }

    /// Drain the remaining steps and return the final array.
    pub fn finish(self) -> Vec<T> {
        match self.algorithm {
            Algorithm::Up(it) => it.finish(),
            Algorithm::Down(it) => it.finish(),
            Algorithm::Build(it) => it.finish(),
            Algorithm::Settled { elements, .. } => elements,
        }
    }
}

impl<T: Ord> Iterator for Steps<T> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.prelude > 0 {
            self.prelude -= 1;
            return Some(Step::Compare(0, 0));
        }
        match &mut self.algorithm {
            Algorithm::Up(it) => it.next(),
            Algorithm::Down(it) => it.next(),
            Algorithm::Build(it) => it.next(),
            Algorithm::Settled { done_pending, .. } => {
                std::mem::take(done_pending).then_some(Step::Done)
            }
        }
    }
}
