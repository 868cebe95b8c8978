//! End-to-end tests for the one-shot façade

use generational_arena::Index;
use phyloheat::{
    Gradient, HeatMap, HeatRow, Moderation, NodeData, Rgb, RunReport, SelectionPolicy,
    ToTreeString, TreeArena,
};

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

fn heatmap() -> HeatMap {
    HeatMap::new(
        Gradient::new(Rgb::new(0, 0, 255), Rgb::new(255, 0, 0)),
        SelectionPolicy::DirectChildren,
        Moderation::Average,
        false,
    )
}

#[test]
fn given_rows_with_one_bad_value_when_running_then_the_report_tallies_all_passes() {
    // Arrange
    let (mut tree, idx) = two_clade_tree();
    let rows = vec![
        HeatRow::new("A", "0.0"),
        HeatRow::new("B", "10.0"),
        HeatRow::new("C", "oops"),
        HeatRow::new("D", "30.0"),
    ];

    // Act
    let report = heatmap().run(&mut tree, rows);

    // Assert: A, B, D accepted; (AB) aggregates; (CD) and the root cannot
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.coloured, 4); // A, B, D and (AB)
    assert_eq!(report.widened, 6); // every node except C
    assert!(tree.colour(idx[1]).is_some());
    assert!(tree.colour(idx[0]).is_none());
    assert_eq!(tree.width(idx[0]), Some(3.0));
}

#[test]
fn given_a_clean_table_when_running_then_every_node_is_decorated() {
    // Arrange
    let (mut tree, idx) = two_clade_tree();
    let rows = vec![
        HeatRow::new("A", "0.0"),
        HeatRow::new("B", "10.0"),
        HeatRow::new("C", "20.0"),
        HeatRow::new("D", "30.0"),
    ];

    // Act
    let report = heatmap().run(&mut tree, rows);

    // Assert
    assert_eq!(
        report,
        RunReport {
            accepted: 4,
            rejected: 0,
            coloured: 7,
            widened: 7,
        }
    );
    assert!(tree.iter().all(|(_, node)| node.colour.is_some()));
    assert_eq!(tree.width(idx[0]), Some(4.0));
}

#[test]
fn given_branch_confidence_when_running_then_the_tree_is_decorated_from_the_tree_itself() {
    // Arrange
    let mut tree = TreeArena::new();
    let root = tree.insert_node(NodeData::default(), None);
    let a = tree.insert_node(NodeData::named("A").with_confidence(0.9), Some(root));
    let b = tree.insert_node(NodeData::named("B").with_confidence(0.3), Some(root));
    let c = tree.insert_node(NodeData::named("C"), Some(root));

    // Act
    let report = heatmap().run_confidence(&mut tree);

    // Assert
    assert_eq!(report.accepted, 2);
    assert_eq!(report.rejected, 1);
    assert!(tree.colour(a).is_some());
    assert!(tree.colour(b).is_some());
    assert!(tree.colour(c).is_none());
    // The root's selection includes the dataless leaf C, so it stays uncoloured
    assert!(tree.colour(root).is_none());
}

#[test]
fn given_a_decorated_tree_when_rendering_then_annotations_appear_in_the_listing() {
    // Arrange
    let (mut tree, _) = two_clade_tree();
    let rows = vec![
        HeatRow::new("A", "0.0"),
        HeatRow::new("B", "10.0"),
        HeatRow::new("C", "20.0"),
        HeatRow::new("D", "30.0"),
    ];
    heatmap().run(&mut tree, rows);

    // Act
    let listing = tree.to_tree_string().to_string();

    // Assert
    assert!(listing.contains("A #"));
    assert!(listing.contains("w=1"));
    assert!(listing.contains("w=4"));
}
