use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::gradient::Rgb;

/// Data payload for tree nodes.
///
/// Leaves carry the taxon name used for heat-table lookups; any branch may
/// carry a support/confidence value read in from the source tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Taxon name for leaves, clade label for internal nodes
    pub name: Option<String>,
    /// Branch support value, if the source tree provided one
    pub confidence: Option<f64>,
}

impl NodeData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "*"),
        }
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Taxonomic data for this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
    /// Rendering annotation: branch colour
    pub colour: Option<Rgb>,
    /// Rendering annotation: branch width
    pub width: Option<f64>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based phylogenetic tree.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Parent/child links are non-owning indices into the arena, so there is no
/// cyclic ownership despite the parent back-references.
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
            colour: None,
            width: None,
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|node| node.parent)
    }

    pub fn children(&self, idx: Index) -> Vec<Index> {
        self.get_node(idx)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn is_leaf(&self, idx: Index) -> bool {
        self.get_node(idx).is_some_and(TreeNode::is_leaf)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Pre-order traversal over all nodes, children left to right.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    /// All leaf indices in forward (pre-order) order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Finds the first leaf whose name matches `name` exactly.
    #[instrument(level = "trace", skip(self))]
    pub fn find_leaf(&self, name: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.is_leaf() && node.data.name.as_deref() == Some(name))
            .map(|(idx, _)| idx)
    }

    /// Collects the external (leaf) descendants of a node.
    ///
    /// A leaf is its own sole external descendant.
    #[instrument(level = "trace", skip(self))]
    pub fn external_descendants(&self, node_idx: Index) -> Vec<Index> {
        let mut leaves = Vec::new();
        self.collect_leaves(node_idx, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, node_idx: Index, leaves: &mut Vec<Index>) {
        if let Some(node) = self.get_node(node_idx) {
            if node.is_leaf() {
                leaves.push(node_idx);
            } else {
                for &child in &node.children {
                    self.collect_leaves(child, leaves);
                }
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    pub fn set_colour(&mut self, idx: Index, colour: Rgb) {
        if let Some(node) = self.get_node_mut(idx) {
            node.colour = Some(colour);
        }
    }

    pub fn set_width(&mut self, idx: Index, width: f64) {
        if let Some(node) = self.get_node_mut(idx) {
            node.width = Some(width);
        }
    }

    pub fn colour(&self, idx: Index) -> Option<Rgb> {
        self.get_node(idx).and_then(|node| node.colour)
    }

    pub fn width(&self, idx: Index) -> Option<f64> {
        self.get_node(idx).and_then(|node| node.width)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clade_tree() -> (TreeArena, Vec<Index>) {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::default(), None);
        let ab = tree.insert_node(NodeData::default(), Some(root));
        let cd = tree.insert_node(NodeData::default(), Some(root));
        let a = tree.insert_node(NodeData::named("A"), Some(ab));
        let b = tree.insert_node(NodeData::named("B"), Some(ab));
        let c = tree.insert_node(NodeData::named("C"), Some(cd));
        let d = tree.insert_node(NodeData::named("D"), Some(cd));
        (tree, vec![root, ab, cd, a, b, c, d])
    }

    #[test]
    fn leaves_come_back_in_forward_order() {
        let (tree, idx) = two_clade_tree();
        assert_eq!(tree.leaves(), vec![idx[3], idx[4], idx[5], idx[6]]);
    }

    #[test]
    fn find_leaf_matches_exact_name_only() {
        let (tree, idx) = two_clade_tree();
        assert_eq!(tree.find_leaf("C"), Some(idx[5]));
        assert_eq!(tree.find_leaf("Z"), None);
    }

    #[test]
    fn external_descendants_of_leaf_is_itself() {
        let (tree, idx) = two_clade_tree();
        assert_eq!(tree.external_descendants(idx[3]), vec![idx[3]]);
        assert_eq!(tree.external_descendants(idx[1]), vec![idx[3], idx[4]]);
        assert_eq!(tree.external_descendants(idx[0]).len(), 4);
    }

    #[test]
    fn postorder_visits_children_before_parents() {
        let (tree, idx) = two_clade_tree();
        let order: Vec<Index> = tree.iter_postorder().map(|(i, _)| i).collect();
        assert_eq!(order, vec![idx[3], idx[4], idx[1], idx[5], idx[6], idx[2], idx[0]]);
    }

    #[test]
    fn depth_counts_levels() {
        let (tree, _) = two_clade_tree();
        assert_eq!(tree.depth(), 3);
        assert_eq!(TreeArena::new().depth(), 0);
    }
}
