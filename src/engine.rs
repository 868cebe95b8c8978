use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::arena::TreeArena;
use crate::errors::{HeatError, HeatResult};
use crate::gradient::Gradient;
use crate::heat::HeatStore;
use crate::policy::{Moderation, SelectionPolicy};

/// Propagates leaf heat up through internal nodes and writes colours.
///
/// The engine walks every hot leaf's chain to the root. Internal nodes are
/// aggregated lazily the first time a chain reaches them; the cached value is
/// memoized in the store and never recomputed, so revisits through shared
/// ancestors cost O(1). One engine processes one tree; build a new engine and
/// store for the next.
///
/// Colours are written with the range known at the moment a value resolves.
/// With the built-in moderations every aggregate lands inside the range the
/// leaf pass established, so the finished tree is consistent, but the
/// sequencing is observable and deliberately kept.
#[derive(Debug)]
pub struct AggregationEngine {
    gradient: Gradient,
    policy: SelectionPolicy,
    moderation: Moderation,
}

impl AggregationEngine {
    pub fn new(gradient: Gradient, policy: SelectionPolicy, moderation: Moderation) -> Self {
        Self {
            gradient,
            policy,
            moderation,
        }
    }

    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// Colours the tree from the store's leaf partition.
    ///
    /// Visits hot leaves in forward order and resolves their ancestor chains.
    /// Returns the number of colour annotations written. An empty leaf
    /// partition colours nothing.
    #[instrument(level = "debug", skip(self, tree, store))]
    pub fn colourize(&self, tree: &mut TreeArena, store: &mut HeatStore) -> usize {
        let hot_leaves: Vec<Index> = tree
            .leaves()
            .into_iter()
            .filter(|&leaf| store.has_leaf(leaf))
            .collect();
        debug!(hot_leaves = hot_leaves.len(), "starting colourize pass");

        let mut coloured = 0;
        for leaf in hot_leaves {
            self.resolve_and_colour(tree, store, leaf, &mut coloured);
        }
        debug!(coloured, aggregated = store.aggregated_count(), "colourize pass done");
        coloured
    }

    fn resolve_and_colour(
        &self,
        tree: &mut TreeArena,
        store: &mut HeatStore,
        node: Index,
        coloured: &mut usize,
    ) {
        if tree.is_leaf(node) {
            let Some(record) = store.leaf_record(node).copied() else {
                return;
            };
            // An explicit row colour wins over the gradient
            let colour = record
                .colour
                .or_else(|| self.gradient.map(record.value, store.range()));
            if let Some(colour) = colour {
                tree.set_colour(node, colour);
                *coloured += 1;
            }
        } else if !store.has_aggregated(node) {
            if let Err(err) = self.try_aggregate(tree, store, node, coloured) {
                // Non-fatal: the node may resolve on a later leaf's chain
                trace!(?node, %err, "aggregation deferred");
            }
        }

        if let Some(parent) = tree.parent(node) {
            self.resolve_and_colour(tree, store, parent, coloured);
        }
    }

    fn try_aggregate(
        &self,
        tree: &mut TreeArena,
        store: &mut HeatStore,
        node: Index,
        coloured: &mut usize,
    ) -> HeatResult<f64> {
        let candidates = self.policy.select(tree, node);
        if candidates.is_empty() {
            return Err(HeatError::EmptySelection(node));
        }

        let mut values = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            values.push(self.resolve_heat(tree, store, *candidate, coloured)?);
        }

        let value = self.moderation.reduce(&values)?;
        store.insert_aggregated(node, value);
        if let Some(colour) = self.gradient.map(value, store.range()) {
            tree.set_colour(node, colour);
            *coloured += 1;
        }
        Ok(value)
    }

    /// Heat of a node, aggregating unresolved internal nodes on the way.
    fn resolve_heat(
        &self,
        tree: &mut TreeArena,
        store: &mut HeatStore,
        node: Index,
        coloured: &mut usize,
    ) -> HeatResult<f64> {
        if tree.is_leaf(node) {
            store.leaf_value(node).ok_or(HeatError::MissingHeat(node))
        } else if let Some(value) = store.aggregated_value(node) {
            Ok(value)
        } else {
            self.try_aggregate(tree, store, node, coloured)
        }
    }
}
