//! End-to-end tests of the snapshot-to-Sankey pipeline
//!
//! Uses the two-election scenario: entity A moves from Party_X (2010) to
//! Party_Y (2014) while entity B stays with Party_X.

use std::fs;

use sankeyflow::pipeline::Pipeline;
use sankeyflow::{
    build_bundle, render_config, Color, NodeKey, PipelineContext, Snapshot, SnapshotRow,
    VecSnapshotSource,
};

fn two_elections() -> Vec<Snapshot> {
    let party = vec!["Party".to_string()];
    vec![
        Snapshot::new("2014", "Name", party.clone())
            .with_row(SnapshotRow::new("A").with_value("Party", "Party_Y"))
            .with_row(SnapshotRow::new("B").with_value("Party", "Party_X")),
        Snapshot::new("2010", "Name", party)
            .with_row(SnapshotRow::new("A").with_value("Party", "Party_X"))
            .with_row(SnapshotRow::new("B").with_value("Party", "Party_X")),
    ]
}

#[test]
fn test_scenario_nodes_and_edges() {
    let ctx = PipelineContext::new("scenario");
    let output = Pipeline::new("Parliament")
        .build_bundle(Box::new(VecSnapshotSource::new(two_elections())), &ctx)
        .unwrap();

    assert_eq!(output.merge.labels, vec!["2010", "2014"]);

    let counts: Vec<(String, usize)> = output
        .nodes
        .nodes()
        .iter()
        .map(|n| (n.key.display_label(), n.count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("Party_X_2010".to_string(), 2),
            ("Party_X_2014".to_string(), 1),
            ("Party_Y_2014".to_string(), 1),
        ]
    );

    let edges: Vec<String> = output.edges.edges().iter().map(|e| e.to_string()).collect();
    assert_eq!(
        edges,
        vec![
            "Party_X_2010 -> Party_X_2014 (1)",
            "Party_X_2010 -> Party_Y_2014 (1)",
        ]
    );
    assert_eq!(output.edges.total_between("2010", "2014"), 2);
}

#[test]
fn test_scenario_layout() {
    let bundle = build_bundle(two_elections(), "Parliament").unwrap();

    let placed: Vec<(&str, f64, f64)> = bundle
        .nodes
        .iter()
        .map(|n| (n.label.as_str(), n.x, n.y))
        .collect();
    assert_eq!(
        placed,
        vec![
            ("Party_X_2010", 0.0, 1.0),
            ("Party_X_2014", 0.5, 1.0),
            ("Party_Y_2014", 0.5, 0.5),
        ]
    );

    assert_eq!(bundle.nodes[0].color, Color::new("#1f77b4"));
    assert_eq!(bundle.nodes[1].color, Color::new("#ff7f0e"));
    // Links take the color of their source column.
    assert!(bundle.links.iter().all(|l| l.color == Color::new("#1f77b4")));
    assert!(bundle.links.iter().all(|l| l.source == 0));
}

#[test]
fn test_entity_absent_from_one_snapshot() {
    let party = vec!["Party".to_string()];
    let snapshots = vec![
        Snapshot::new("2010", "Name", party.clone())
            .with_row(SnapshotRow::new("A").with_value("Party", "X"))
            .with_row(SnapshotRow::new("C").with_value("Party", "X")),
        Snapshot::new("2014", "Name", party)
            .with_row(SnapshotRow::new("A").with_value("Party", "X"))
            .with_row(SnapshotRow::new("D").with_value("Party", "Y")),
    ];
    let ctx = PipelineContext::detached();
    let output = Pipeline::new("Turnover")
        .build_bundle(Box::new(VecSnapshotSource::new(snapshots)), &ctx)
        .unwrap();

    assert_eq!(output.merge.table.entity_count(), 3);
    let x_2010 = output.nodes.get(&NodeKey::new("X", "2010")).unwrap();
    assert_eq!(x_2010.count, 2);
    assert_eq!(output.edges.len(), 1);
    assert_eq!(output.edges.edges()[0].count, 1);
}

#[test]
fn test_render_config_from_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("2010.csv"),
        "Name;Party;Region\nA;Party_X;North\nB;Party_X;South\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("2014.csv"),
        "Name;Party;Region\nA;Party_Y;North\nB;Party_X;South\n",
    )
    .unwrap();
    let config = format!(
        r#"plot_name: Parliament
source:
  type: csv
  config:
    entity_column: Name
    plot_attribute: Party
    delimiter: ";"
    snapshots:
      - {{ label: 2010, path: 2010.csv }}
      - {{ label: 2014, path: 2014.csv }}
target:
  type: json
  config:
    target_path: {}
"#,
        dir.path().join("out").display()
    );
    let config_path = dir.path().join("plot.yml");
    fs::write(&config_path, config).unwrap();

    let path = render_config(&config_path).unwrap();
    assert_eq!(path, dir.path().join("out").join("Parliament.json"));

    let bundle: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(bundle["title"], "Parliament");
    assert_eq!(bundle["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(bundle["links"].as_array().unwrap().len(), 2);
    assert_eq!(bundle["nodes"][0]["label"], "Party_X_2010");
}
