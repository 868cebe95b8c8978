use generational_arena::Index;
use tracing::instrument;

use crate::arena::TreeArena;
use crate::errors::{HeatError, HeatResult};

/// Which descendants feed the aggregation of an internal node.
///
/// Policies are pure: they never mutate the tree and always return the same
/// candidates for the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Never select anything for internal nodes; propagation is disabled and
    /// only leaves are ever coloured.
    LeavesOnly,
    /// The node's immediate children.
    DirectChildren,
    /// Every external (leaf) descendant of the node.
    AllExternalDescendants,
}

impl SelectionPolicy {
    #[instrument(level = "trace", skip(tree))]
    pub fn select(&self, tree: &TreeArena, node: Index) -> Vec<Index> {
        match self {
            SelectionPolicy::LeavesOnly => Vec::new(),
            SelectionPolicy::DirectChildren => tree.children(node),
            SelectionPolicy::AllExternalDescendants => tree.external_descendants(node),
        }
    }
}

/// Reduces the selected descendants' heat values to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moderation {
    Average,
    Maximum,
    Minimum,
}

impl Moderation {
    /// Errors on an empty slice instead of defaulting to 0 or NaN.
    pub fn reduce(&self, values: &[f64]) -> HeatResult<f64> {
        if values.is_empty() {
            return Err(HeatError::EmptyModeration);
        }
        Ok(match self {
            Moderation::Average => values.iter().sum::<f64>() / values.len() as f64,
            Moderation::Maximum => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Moderation::Minimum => values.iter().copied().fold(f64::INFINITY, f64::min),
        })
    }
}
