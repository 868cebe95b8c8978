/*
Workaround for error: https://doc.rust-lang.org/error_codes/E0116.html
Cannot define inherent `impl` for a type outside of the crate where the type is defined

define a trait that has the desired associated functions/types/constants and implement the trait for the type in question
 */
use generational_arena::Index;
use termtree::Tree;

use crate::arena::TreeArena;

pub trait ToTreeString {
    fn to_tree_string(&self) -> Tree<String>;
}

impl ToTreeString for TreeArena {
    fn to_tree_string(&self) -> Tree<String> {
        if let Some(root_idx) = self.root() {
            let mut tree = Tree::new(node_label(self, root_idx));

            fn build_tree(arena: &TreeArena, node_idx: Index, parent_tree: &mut Tree<String>) {
                if let Some(node) = arena.get_node(node_idx) {
                    for &child_idx in &node.children {
                        let mut child_tree = Tree::new(node_label(arena, child_idx));
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }

            build_tree(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}

/// Node label with whatever annotations are present, e.g. `A #FF0000 w=4`.
fn node_label(arena: &TreeArena, node_idx: Index) -> String {
    let Some(node) = arena.get_node(node_idx) else {
        return "?".to_string();
    };
    let mut label = node.data.to_string();
    if let Some(colour) = node.colour {
        label.push_str(&format!(" {}", colour));
    }
    if let Some(width) = node.width {
        label.push_str(&format!(" w={:.0}", width));
    }
    label
}
