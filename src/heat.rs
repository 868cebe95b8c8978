use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::gradient::{Range, Rgb};

/// One accepted heat observation for a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatRecord {
    /// Arena index of the leaf this record belongs to
    pub node: Index,
    /// Caller-supplied heat value
    pub value: f64,
    /// Explicit colour from the source row, overrides the gradient
    pub colour: Option<Rgb>,
}

/// Per-run heat state: the leaf and aggregated partitions plus the running
/// value range.
///
/// The two partitions are disjoint, a node lives in at most one of them, and
/// an aggregated entry is write-once for the remainder of the run. A store is
/// built fresh for every tree and discarded afterwards.
#[derive(Debug, Default)]
pub struct HeatStore {
    leaf: HashMap<Index, HeatRecord>,
    aggregated: HashMap<Index, f64>,
    range: Range,
}

impl HeatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a leaf record and folds its value into the range.
    ///
    /// Returns false without touching anything when the node already has an
    /// entry in either partition (the leaf partition is populate-once).
    #[instrument(level = "trace", skip(self))]
    pub fn insert_leaf(&mut self, record: HeatRecord) -> bool {
        if self.leaf.contains_key(&record.node) || self.aggregated.contains_key(&record.node) {
            trace!(node = ?record.node, "duplicate leaf record ignored");
            return false;
        }
        self.range.update(record.value);
        self.leaf.insert(record.node, record);
        true
    }

    /// Caches an aggregated value and folds it into the range.
    ///
    /// Returns false when the node is already resolved; an existing entry is
    /// never overwritten.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_aggregated(&mut self, node: Index, value: f64) -> bool {
        if self.aggregated.contains_key(&node) || self.leaf.contains_key(&node) {
            return false;
        }
        self.range.update(value);
        self.aggregated.insert(node, value);
        true
    }

    pub fn leaf_record(&self, node: Index) -> Option<&HeatRecord> {
        self.leaf.get(&node)
    }

    pub fn leaf_value(&self, node: Index) -> Option<f64> {
        self.leaf.get(&node).map(|record| record.value)
    }

    pub fn aggregated_value(&self, node: Index) -> Option<f64> {
        self.aggregated.get(&node).copied()
    }

    /// Resolved heat from either partition.
    pub fn heat(&self, node: Index) -> Option<f64> {
        self.leaf_value(node).or_else(|| self.aggregated_value(node))
    }

    pub fn has_leaf(&self, node: Index) -> bool {
        self.leaf.contains_key(&node)
    }

    pub fn has_aggregated(&self, node: Index) -> bool {
        self.aggregated.contains_key(&node)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf.len()
    }

    pub fn aggregated_count(&self) -> usize {
        self.aggregated.len()
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Read-only view of every node that ended up with a resolved heat value.
    pub fn hot_set(&self) -> HotSet {
        HotSet(
            self.leaf
                .keys()
                .chain(self.aggregated.keys())
                .copied()
                .collect(),
        )
    }
}

/// Node indices that resolved to a heat value during a run.
#[derive(Debug, Clone, Default)]
pub struct HotSet(HashSet<Index>);

impl HotSet {
    pub fn contains(&self, node: Index) -> bool {
        self.0.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
