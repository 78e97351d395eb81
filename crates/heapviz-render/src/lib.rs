//! Text views of a heap for the heapviz CLI.
//!
//! Every view is a pure function of the heap and the highlighted indices,
//! so callers can re-render whenever the heap's version moves. The DOT
//! output follows the visualizer's layout: one circle per element, purple
//! fill for highlighted nodes, and a `rank=same` group for each level.

use heapviz_engine::{Heap, group_by_level};
use heapviz_logging::{LoggingConfig, OperationLog};
use heapviz_trace::Step;
use itertools::Itertools;

const HIGHLIGHT_FILL: &str = "#7c3aed";
const NODE_FILL: &str = "#e2e8f0";

/// Placeholder shown for an empty heap.
pub const EMPTY: &str = "(empty)";

fn mark(value: i64, highlighted: bool) -> String {
    if highlighted {
        format!("[{value}]")
    } else {
        value.to_string()
    }
}

/// The backing array on one line. Highlighted cells are bracketed.
pub fn render_array(heap: &Heap, highlights: &[usize]) -> String {
    if heap.is_empty() {
        return EMPTY.to_string();
    }
    heap.elements()
        .iter()
        .enumerate()
        .map(|(i, &v)| mark(v, highlights.contains(&i)))
        .join(" ")
}

/// One line per tree level. Each entry shows its index and value and, below
/// the root, its parent's index and value. Highlighted entries carry a `*`.
pub fn render_levels(heap: &Heap, highlights: &[usize]) -> String {
    if heap.is_empty() {
        return EMPTY.to_string();
    }
    group_by_level(heap)
        .iter()
        .map(|level| {
            let entries = level
                .entries
                .iter()
                .map(|entry| {
                    let star = if highlights.contains(&entry.index) { "*" } else { "" };
                    match (entry.parent_index, entry.parent_value) {
                        (Some(pi), Some(pv)) => {
                            format!("[{}] {}{star} (parent [{pi}] {pv})", entry.index, entry.value)
                        }
                        _ => format!("[{}] {}{star}", entry.index, entry.value),
                    }
                })
                .join(" | ");
            format!("Level {}: {entries}", level.level)
        })
        .join("\n")
}

/// Summary panel: node count, root, height and configuration.
pub fn render_info(heap: &Heap) -> String {
    let root = heap
        .root()
        .map_or_else(|| "-".to_string(), |r| r.to_string());
    format!(
        "Total nodes: {}\nRoot value: {root} ({}-heap)\nHeight: {}\nBranching factor: {}",
        heap.len(),
        heap.order(),
        heap.height(),
        heap.branching_factor()
    )
}

/// The operation log, newest first, filtered and formatted per `config`.
pub fn render_log(log: &OperationLog, config: &LoggingConfig) -> String {
    let lines = log
        .entries()
        .filter(|entry| config.accepts(entry))
        .map(|entry| entry.format(config))
        .join("\n");
    if lines.is_empty() {
        "(no operations yet)".to_string()
    } else {
        lines
    }
}

/// A step next to the array it produced.
pub fn render_step(step: &Step, heap: &Heap, highlights: &[usize]) -> String {
    format!("{:<12} {}", step.to_string(), render_array(heap, highlights))
}

/// Graphviz source of the tree. Empty for an empty heap.
pub fn render_dot(heap: &Heap, highlights: &[usize]) -> String {
    if heap.is_empty() {
        return String::new();
    }

    let mut dot = String::from("digraph D_ary_Heap {\n");
    dot.push_str("  graph [rankdir=TB, splines=true, nodesep=0.6, ranksep=0.8];\n");
    dot.push_str(
        "  node [shape=circle, style=filled, fontname=\"Arial\", fixedsize=true, width=0.8];\n",
    );
    dot.push_str("  edge [arrowhead=none];\n\n");

    for (i, value) in heap.elements().iter().enumerate() {
        let (fill, font) = if highlights.contains(&i) {
            (HIGHLIGHT_FILL, "white")
        } else {
            (NODE_FILL, "black")
        };
        dot.push_str(&format!(
            "  node{i} [label=\"{value}\", fillcolor=\"{fill}\", fontcolor=\"{font}\"];\n"
        ));
    }
    dot.push('\n');

    let levels = group_by_level(heap);
    for entry in levels.iter().flat_map(|l| &l.entries) {
        if let Some(parent) = entry.parent_index {
            dot.push_str(&format!("  node{parent} -> node{};\n", entry.index));
        }
    }

    for level in levels.iter().filter(|l| l.entries.len() > 1) {
        let nodes = level
            .entries
            .iter()
            .map(|e| format!("node{}", e.index))
            .join("; ");
        dot.push_str(&format!("  {{ rank=same; {nodes}; }}\n"));
    }

    dot.push_str("}\n");
    dot
}
