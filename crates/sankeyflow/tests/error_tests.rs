//! Error attribution tests
//!
//! Each failure mode of the pipeline must surface as its own error variant,
//! tagged with the stage that raised it.

use sankeyflow::pipeline::{EdgeSet, LayoutEngine, NodeEdgeBuilder, NodeSet, TableMerger};
use sankeyflow::{
    Component, Edge, Node, NodeKey, PipelineContext, SankeyError, Snapshot, SnapshotRow,
};

fn party_snapshot(label: &str, rows: &[(&str, Option<&str>)]) -> Snapshot {
    rows.iter().fold(
        Snapshot::new(label, "Name", vec!["Party".to_string()]),
        |snapshot, (name, party)| {
            let row = match party {
                Some(party) => SnapshotRow::new(*name).with_value("Party", *party),
                None => SnapshotRow::new(*name).with_null("Party"),
            };
            snapshot.with_row(row)
        },
    )
}

#[test]
fn test_empty_source_is_exhausted() {
    let ctx = PipelineContext::detached();
    let err = TableMerger::new()
        .merge(Vec::<sankeyflow::Result<Snapshot>>::new(), &ctx)
        .unwrap_err();

    assert!(matches!(err, SankeyError::SourceExhausted { .. }));
    assert_eq!(err.component(), Some(Component::TableMerger));
}

#[test]
fn test_conflicting_duplicate_entity_collides() {
    let ctx = PipelineContext::detached();
    let snapshot = party_snapshot("2010", &[("A", Some("X")), ("A", Some("Y"))]);
    let err = TableMerger::new()
        .merge(vec![Ok(snapshot)], &ctx)
        .unwrap_err();

    match err {
        SankeyError::MergeKeyCollision { label, key, .. } => {
            assert_eq!(label, "2010");
            assert_eq!(key, "A");
        }
        other => panic!("Expected MergeKeyCollision, got {other:?}"),
    }
}

#[test]
fn test_duplicate_label_collides() {
    let ctx = PipelineContext::detached();
    let snapshots = vec![
        Ok(party_snapshot("2010", &[("A", Some("X"))])),
        Ok(party_snapshot("2010", &[("B", Some("Y"))])),
    ];
    let err = TableMerger::new().merge(snapshots, &ctx).unwrap_err();
    assert!(matches!(err, SankeyError::MergeKeyCollision { .. }));
}

#[test]
fn test_all_null_column_is_empty() {
    let ctx = PipelineContext::detached();
    let snapshots = vec![
        Ok(party_snapshot("2010", &[("A", Some("X"))])),
        Ok(party_snapshot("2014", &[("A", None)])),
    ];
    let merged = TableMerger::new().merge(snapshots, &ctx).unwrap();
    let err = NodeEdgeBuilder::new()
        .build_nodes(&merged.table, &merged.plot_columns, &ctx)
        .unwrap_err();

    match err {
        SankeyError::EmptyColumn { component, label } => {
            assert_eq!(component, Component::NodeEdgeBuilder);
            assert_eq!(label, "2014");
        }
        other => panic!("Expected EmptyColumn, got {other:?}"),
    }
}

#[test]
fn test_display_label_collision_is_ambiguous() {
    // "a_b" in snapshot "c" and "a" in snapshot "b_c" both render as "a_b_c".
    let nodes = vec![
        Node::new(NodeKey::new("a_b", "c"), 1),
        Node::new(NodeKey::new("a", "b_c"), 1),
    ];
    let err = NodeSet::from_nodes(nodes).unwrap_err();
    assert!(matches!(err, SankeyError::CompositeKeyAmbiguity { .. }));
}

#[test]
fn test_dangling_edge_fails_before_layout() {
    let ctx = PipelineContext::detached();
    let nodes = NodeSet::from_nodes(vec![
        Node::new(NodeKey::new("X", "2010"), 1),
        Node::new(NodeKey::new("Y", "2014"), 1),
    ])
    .unwrap();
    let edges = EdgeSet::new(vec![Edge::new(
        NodeKey::new("X", "2010"),
        NodeKey::new("Z", "2014"),
        1,
    )]);

    let err = LayoutEngine::new()
        .layout(&nodes, &edges, &ctx)
        .unwrap_err();
    match err {
        SankeyError::DanglingEdge {
            component,
            label,
            key,
        } => {
            assert_eq!(component, Component::LayoutEngine);
            assert_eq!(label, "2014");
            assert_eq!(key, "Z_2014");
        }
        other => panic!("Expected DanglingEdge, got {other:?}"),
    }
}

#[test]
fn test_zero_count_node_is_rejected() {
    let err = NodeSet::from_nodes(vec![Node::new(NodeKey::new("X", "2010"), 0)]).unwrap_err();
    assert!(matches!(err, SankeyError::InvariantViolation { .. }));
    assert_eq!(err.component(), Some(Component::NodeEdgeBuilder));
}

#[test]
fn test_edges_between_non_adjacent_snapshots_are_rejected() {
    let ctx = PipelineContext::detached();
    let nodes = NodeSet::from_nodes(vec![
        Node::new(NodeKey::new("X", "2010"), 1),
        Node::new(NodeKey::new("Y", "2010"), 1),
        Node::new(NodeKey::new("X", "2014"), 1),
        Node::new(NodeKey::new("X", "2018"), 1),
    ])
    .unwrap();

    let same_column = Edge::new(NodeKey::new("X", "2010"), NodeKey::new("Y", "2010"), 1);
    let backward = Edge::new(NodeKey::new("X", "2018"), NodeKey::new("X", "2010"), 1);

    for edge in [same_column, backward] {
        let err = LayoutEngine::new()
            .layout(&nodes, &EdgeSet::new(vec![edge]), &ctx)
            .unwrap_err();
        assert!(matches!(err, SankeyError::InvariantViolation { .. }));
        assert_eq!(err.component(), Some(Component::LayoutEngine));
    }
}

#[test]
fn test_error_messages_name_component() {
    let err = SankeyError::dangling_edge("2014", "Z_2014");
    assert!(err.to_string().starts_with("[layout-engine]"));

    let err = SankeyError::source_error("2010", "missing column 'Party'");
    assert!(err.to_string().contains("[snapshot-source]"));
    assert_eq!(err.component(), Some(Component::Source));
}
