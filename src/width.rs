use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::TreeArena;
use crate::heat::HotSet;

pub const MIN_WIDTH: f64 = 1.0;
pub const MAX_WIDTH: f64 = 100.0;

/// Derives branch widths from hot-leaf counts after a colourize run.
///
/// Counts, per node, how many of its external descendant leaves ended up hot
/// (a leaf counts itself), then assigns each node with a non-zero count a
/// width: the raw count, or, with rescaling, the count scaled against the
/// run's maximum and clamped to [1, 100].
#[derive(Debug, Default, Clone, Copy)]
pub struct WidthAnnotator {
    rescale: bool,
}

impl WidthAnnotator {
    pub fn new() -> Self {
        Self { rescale: false }
    }

    pub fn rescaled() -> Self {
        Self { rescale: true }
    }

    /// Annotates widths and returns the number of nodes that received one.
    #[instrument(level = "debug", skip(self, tree, hot))]
    pub fn annotate(&self, tree: &mut TreeArena, hot: &HotSet) -> usize {
        let counts = count_hot_leaves(tree, hot);
        let max_count = counts.values().copied().max().unwrap_or(0);

        let nodes: Vec<Index> = tree.iter().map(|(idx, _)| idx).collect();
        let mut altered = 0;
        for idx in nodes {
            let count = counts.get(&idx).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            let width = if self.rescale {
                (count as f64 / max_count as f64 * MAX_WIDTH).clamp(MIN_WIDTH, MAX_WIDTH)
            } else {
                count as f64
            };
            tree.set_width(idx, width);
            altered += 1;
        }
        debug!(altered, max_count, "width annotation done");
        altered
    }
}

/// Hot external descendant leaves per node, accumulated bottom-up.
fn count_hot_leaves(tree: &TreeArena, hot: &HotSet) -> HashMap<Index, u32> {
    let mut counts = HashMap::new();
    for (idx, node) in tree.iter_postorder() {
        let count = if node.is_leaf() {
            u32::from(hot.contains(idx))
        } else {
            node.children
                .iter()
                .map(|child| counts.get(child).copied().unwrap_or(0))
                .sum()
        };
        counts.insert(idx, count);
    }
    counts
}
