//! Node and edge derivation from the merged table
//!
//! Nodes are distinct non-null plot values per snapshot; edges count the
//! entities moving between values of adjacent snapshots. Both collections
//! come out in canonical order (label, then value), independent of the row
//! order the snapshots arrived in.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, span, trace, Level};

use super::merger::MergedTable;
use crate::core::{
    Component, Edge, MergedColumn, Node, NodeKey, PipelineContext, Result, SankeyError,
};

/// Nodes in canonical order plus the labels they are grouped under
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeSet {
    labels: Vec<String>,
    nodes: Vec<Node>,
    index: HashMap<NodeKey, usize>,
}

impl NodeSet {
    /// Build a node set over the declared labels
    ///
    /// Labels used by nodes are always declared. Nodes are put into canonical
    /// order. Nodes with a zero count are rejected, as are two nodes whose
    /// display labels coincide (including exact duplicates), since renderers
    /// could not tell them apart.
    pub fn new(mut labels: Vec<String>, mut nodes: Vec<Node>) -> Result<Self> {
        labels.extend(nodes.iter().map(|n| n.key.label.clone()));
        labels.sort();
        labels.dedup();
        nodes.sort_by(|a, b| a.key.cmp(&b.key));

        let mut rendered: HashMap<String, &NodeKey> = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            if node.count == 0 {
                return Err(SankeyError::invariant_violation(
                    Component::NodeEdgeBuilder,
                    &node.key.label,
                    node.key.to_string(),
                    "node has a count of zero",
                ));
            }

            let display = node.key.display_label();
            if let Some(existing) = rendered.get(&display) {
                return Err(SankeyError::CompositeKeyAmbiguity {
                    component: Component::NodeEdgeBuilder,
                    label: node.key.label.clone(),
                    value: node.key.value.clone(),
                    rendered: display,
                    existing_label: existing.label.clone(),
                    existing_value: existing.value.clone(),
                });
            }
            rendered.insert(display, &node.key);
        }

        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.key.clone(), i))
            .collect();

        Ok(Self {
            labels,
            nodes,
            index,
        })
    }

    /// Build a node set whose labels are exactly those its nodes use
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self> {
        Self::new(Vec::new(), nodes)
    }

    /// Labels in ascending order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of a node in canonical order
    pub fn index_of(&self, key: &NodeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.index_of(key).map(|i| &self.nodes[i])
    }

    /// Sum of node counts under one label
    pub fn total_for_label(&self, label: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.key.label == label)
            .map(|n| n.count)
            .sum()
    }
}

/// Edges in canonical order (source key, then target key)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    pub fn new(mut edges: Vec<Edge>) -> Self {
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        Self { edges }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of edge counts flowing from `source_label` into `target_label`
    pub fn total_between(&self, source_label: &str, target_label: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.source.label == source_label && e.target.label == target_label)
            .map(|e| e.count)
            .sum()
    }
}

/// Derives nodes and edges from a merged table
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeEdgeBuilder;

impl NodeEdgeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// One node per distinct non-null value per snapshot label
    pub fn build_nodes(
        &self,
        table: &MergedTable,
        plot_columns: &[MergedColumn],
        ctx: &PipelineContext,
    ) -> Result<NodeSet> {
        let nodes_span = span!(
            parent: ctx.span(),
            Level::INFO,
            "build_nodes",
            entities = table.entity_count(),
            columns = plot_columns.len()
        );
        let _enter = nodes_span.enter();

        trace!("Starting node derivation");

        let mut nodes = Vec::new();
        for column in plot_columns {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for (_, record) in table.records() {
                if let Some(value) = record.get(column) {
                    *counts.entry(value).or_insert(0) += 1;
                }
            }

            if counts.is_empty() {
                return Err(SankeyError::empty_column(Component::NodeEdgeBuilder, &column.label));
            }

            debug!(label = %column.label, distinct = counts.len(), "Derived column nodes");
            nodes.extend(
                counts
                    .into_iter()
                    .map(|(value, count)| Node::new(NodeKey::new(value, &column.label), count)),
            );
        }

        let labels = plot_columns.iter().map(|c| c.label.clone()).collect();
        let node_set = NodeSet::new(labels, nodes)?;

        info!(nodes = node_set.len(), "Node derivation completed");
        Ok(node_set)
    }

    /// One edge per (source value, target value) pair of adjacent snapshots
    ///
    /// Entities null in either snapshot of a pair contribute nothing.
    pub fn build_edges(
        &self,
        table: &MergedTable,
        plot_columns: &[MergedColumn],
        entity_column: &str,
        ctx: &PipelineContext,
    ) -> Result<EdgeSet> {
        let edges_span = span!(
            parent: ctx.span(),
            Level::INFO,
            "build_edges",
            entities = table.entity_count(),
            columns = plot_columns.len()
        );
        let _enter = edges_span.enter();

        if entity_column != table.entity_column() {
            return Err(SankeyError::MergeKeyCollision {
                component: Component::NodeEdgeBuilder,
                label: String::new(),
                key: entity_column.to_string(),
                reason: format!(
                    "table is keyed by '{}', not '{}'",
                    table.entity_column(),
                    entity_column
                ),
            });
        }

        let mut ordered: Vec<&MergedColumn> = plot_columns.iter().collect();
        ordered.sort_by(|a, b| a.label.cmp(&b.label));

        let mut counts: BTreeMap<(NodeKey, NodeKey), usize> = BTreeMap::new();
        for pair in ordered.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let mut moved = 0usize;
            for (_, record) in table.records() {
                if let (Some(source), Some(target)) = (record.get(from), record.get(to)) {
                    let key = (
                        NodeKey::new(source, &from.label),
                        NodeKey::new(target, &to.label),
                    );
                    *counts.entry(key).or_insert(0) += 1;
                    moved += 1;
                }
            }
            debug!(from = %from.label, to = %to.label, entities = moved, "Derived transitions");
        }

        let edges: Vec<Edge> = counts
            .into_iter()
            .map(|((source, target), count)| Edge::new(source, target, count))
            .collect();
        let edge_set = EdgeSet::new(edges);

        info!(edges = edge_set.len(), "Edge derivation completed");
        Ok(edge_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Snapshot, SnapshotRow};
    use crate::pipeline::merger::{MergeOutput, TableMerger};

    fn snapshot(label: &str, rows: &[(&str, &str)]) -> Snapshot {
        rows.iter().fold(
            Snapshot::new(label, "Name", vec!["Party".to_string()]),
            |snapshot, (entity, party)| {
                snapshot.with_row(SnapshotRow::new(*entity).with_value("Party", *party))
            },
        )
    }

    fn merged(snapshots: Vec<Snapshot>) -> MergeOutput {
        TableMerger::new()
            .merge(snapshots.into_iter().map(Ok), &PipelineContext::detached())
            .unwrap()
    }

    #[test]
    fn test_two_snapshot_scenario() {
        let output = merged(vec![
            snapshot("2010", &[("A", "Party_X"), ("B", "Party_X")]),
            snapshot("2014", &[("A", "Party_Y"), ("B", "Party_X")]),
        ]);
        let builder = NodeEdgeBuilder::new();
        let ctx = PipelineContext::detached();

        let nodes = builder
            .build_nodes(&output.table, &output.plot_columns, &ctx)
            .unwrap();
        assert_eq!(nodes.len(), 3);
        let count = |v: &str, l: &str| nodes.get(&NodeKey::new(v, l)).unwrap().count;
        assert_eq!(count("Party_X", "2010"), 2);
        assert_eq!(count("Party_Y", "2014"), 1);
        assert_eq!(count("Party_X", "2014"), 1);

        let edges = builder
            .build_edges(&output.table, &output.plot_columns, "Name", &ctx)
            .unwrap();
        assert_eq!(edges.len(), 2);
        let rendered: Vec<String> = edges.edges().iter().map(|e| e.to_string()).collect();
        assert!(rendered.contains(&"Party_X_2010 -> Party_Y_2014 (1)".to_string()));
        assert!(rendered.contains(&"Party_X_2010 -> Party_X_2014 (1)".to_string()));
    }

    #[test]
    fn test_canonical_node_order() {
        let output = merged(vec![
            snapshot("2014", &[("A", "b"), ("B", "a")]),
            snapshot("2010", &[("A", "z"), ("B", "c")]),
        ]);
        let ctx = PipelineContext::detached();
        let nodes = NodeEdgeBuilder::new()
            .build_nodes(&output.table, &output.plot_columns, &ctx)
            .unwrap();

        let keys: Vec<String> = nodes.nodes().iter().map(|n| n.key.to_string()).collect();
        assert_eq!(keys, vec!["c_2010", "z_2010", "a_2014", "b_2014"]);
        assert_eq!(nodes.labels(), &["2010".to_string(), "2014".to_string()]);
    }

    #[test]
    fn test_absent_entities_contribute_no_edge() {
        let output = merged(vec![
            snapshot("2010", &[("A", "X"), ("B", "X")]),
            snapshot("2014", &[("A", "X"), ("C", "Y")]),
        ]);
        let edges = NodeEdgeBuilder::new()
            .build_edges(
                &output.table,
                &output.plot_columns,
                "Name",
                &PipelineContext::detached(),
            )
            .unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.total_between("2010", "2014"), 1);
    }

    #[test]
    fn test_edges_only_between_adjacent_labels() {
        let output = merged(vec![
            snapshot("2010", &[("A", "X")]),
            snapshot("2014", &[("A", "Y")]),
            snapshot("2018", &[("A", "Z")]),
        ]);
        let edges = NodeEdgeBuilder::new()
            .build_edges(
                &output.table,
                &output.plot_columns,
                "Name",
                &PipelineContext::detached(),
            )
            .unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.total_between("2010", "2018"), 0);
    }

    #[test]
    fn test_empty_column_rejected() {
        let empty = Snapshot::new("2014", "Name", vec!["Party".to_string()])
            .with_row(SnapshotRow::new("A").with_null("Party"));
        let output = merged(vec![snapshot("2010", &[("A", "X")]), empty]);
        let result = NodeEdgeBuilder::new().build_nodes(
            &output.table,
            &output.plot_columns,
            &PipelineContext::detached(),
        );
        match result {
            Err(SankeyError::EmptyColumn { label, .. }) => assert_eq!(label, "2014"),
            other => panic!("Expected EmptyColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_display_label_ambiguity_rejected() {
        let nodes = vec![
            Node::new(NodeKey::new("a_b", "c"), 1),
            Node::new(NodeKey::new("a", "b_c"), 1),
        ];
        let result = NodeSet::from_nodes(nodes);
        assert!(matches!(result, Err(SankeyError::CompositeKeyAmbiguity { .. })));
    }

    #[test]
    fn test_zero_count_node_rejected() {
        let nodes = vec![
            Node::new(NodeKey::new("X", "2010"), 2),
            Node::new(NodeKey::new("Y", "2010"), 0),
        ];
        match NodeSet::from_nodes(nodes) {
            Err(SankeyError::InvariantViolation {
                component,
                label,
                key,
                ..
            }) => {
                assert_eq!(component, Component::NodeEdgeBuilder);
                assert_eq!(label, "2010");
                assert_eq!(key, "Y_2010");
            }
            other => panic!("Expected InvariantViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_separator_in_value_is_fine_without_collision() {
        let output = merged(vec![snapshot("2010", &[("A", "New_Democracy")])]);
        let ctx = PipelineContext::detached();
        let nodes = NodeEdgeBuilder::new()
            .build_nodes(&output.table, &output.plot_columns, &ctx)
            .unwrap();
        assert_eq!(nodes.nodes()[0].key.value, "New_Democracy");
        assert_eq!(nodes.nodes()[0].key.label, "2010");
    }

    #[test]
    fn test_wrong_entity_column_rejected() {
        let output = merged(vec![snapshot("2010", &[("A", "X")])]);
        let result = NodeEdgeBuilder::new().build_edges(
            &output.table,
            &output.plot_columns,
            "Member",
            &PipelineContext::detached(),
        );
        assert!(matches!(
            result,
            Err(SankeyError::MergeKeyCollision {
                component: Component::NodeEdgeBuilder,
                ..
            })
        ));
    }
}
