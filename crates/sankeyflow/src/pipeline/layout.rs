//! Sankey layout engine
//!
//! Columns are snapshot labels spaced evenly left to right in ascending
//! order. Inside a column nodes are stacked by count: the smallest count
//! sits at `y = 1.0` and each following node is `1/M` lower, so the largest
//! counts end up at the smallest y. Every column gets one palette color and
//! edges take the color of the column they leave from.

use std::collections::HashMap;

use tracing::{debug, info, span, trace, Level};

use super::builder::{EdgeSet, NodeSet};
use super::palette::Palette;
use crate::core::{
    Component, EdgePlacement, LayoutAssignment, NodePlacement, PipelineContext, Result,
    SankeyError,
};

/// Coordinates are rounded to this many decimal digits
pub const COORDINATE_DIGITS: i32 = 3;

fn round_coordinate(v: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_DIGITS);
    (v * scale).round() / scale
}

/// Deterministic position and color assignment
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    palette: Palette,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self { palette }
    }

    /// Resolve every edge endpoint to its canonical node index
    ///
    /// Fails on the first endpoint missing from the node set, then on the
    /// first edge that carries no entities or does not lead from a snapshot
    /// to the one right after it.
    pub fn resolve_edges(&self, nodes: &NodeSet, edges: &EdgeSet) -> Result<Vec<(usize, usize)>> {
        let next_label: HashMap<&str, &str> = nodes
            .labels()
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();

        edges
            .edges()
            .iter()
            .map(|edge| {
                let source = nodes.index_of(&edge.source).ok_or_else(|| {
                    SankeyError::dangling_edge(&edge.source.label, edge.source.to_string())
                })?;
                let target = nodes.index_of(&edge.target).ok_or_else(|| {
                    SankeyError::dangling_edge(&edge.target.label, edge.target.to_string())
                })?;

                if edge.count == 0 {
                    return Err(SankeyError::invariant_violation(
                        Component::LayoutEngine,
                        &edge.source.label,
                        format!("{} -> {}", edge.source, edge.target),
                        "edge has a count of zero",
                    ));
                }
                let expected = next_label.get(edge.source.label.as_str()).copied();
                if expected != Some(edge.target.label.as_str()) {
                    return Err(SankeyError::invariant_violation(
                        Component::LayoutEngine,
                        &edge.source.label,
                        format!("{} -> {}", edge.source, edge.target),
                        format!(
                            "edge must lead to the snapshot after '{}', not '{}'",
                            edge.source.label, edge.target.label
                        ),
                    ));
                }

                Ok((source, target))
            })
            .collect()
    }

    /// Compute positions and colors for every node and edge
    pub fn layout(
        &self,
        nodes: &NodeSet,
        edges: &EdgeSet,
        ctx: &PipelineContext,
    ) -> Result<LayoutAssignment> {
        let layout_span = span!(
            parent: ctx.span(),
            Level::INFO,
            "layout_sankey",
            node_count = nodes.len(),
            edge_count = edges.len()
        );
        let _enter = layout_span.enter();

        trace!("Starting Sankey layout");

        let endpoints = self.resolve_edges(nodes, edges)?;

        let labels = nodes.labels();
        if labels.is_empty() {
            return Ok(LayoutAssignment::default());
        }

        let mut columns: HashMap<&str, Vec<usize>> =
            labels.iter().map(|l| (l.as_str(), Vec::new())).collect();
        for (index, node) in nodes.nodes().iter().enumerate() {
            columns
                .entry(node.key.label.as_str())
                .or_default()
                .push(index);
        }
        if let Some(label) = labels.iter().find(|l| columns[l.as_str()].is_empty()) {
            return Err(SankeyError::empty_column(Component::LayoutEngine, label));
        }

        let column_count = labels.len();
        let colors = self.palette.sized(column_count);
        debug!(columns = column_count, "Sized column palette");

        let mut placements: Vec<Option<NodePlacement>> = vec![None; nodes.len()];
        let mut column_rank: HashMap<&str, usize> = HashMap::with_capacity(column_count);

        for (rank, label) in labels.iter().enumerate() {
            column_rank.insert(label.as_str(), rank);
            let x = round_coordinate(rank as f64 / column_count as f64);

            let mut members = columns[label.as_str()].clone();
            members.sort_by_key(|&index| (nodes.nodes()[index].count, index));

            let rows = members.len();
            for (slot, index) in members.into_iter().enumerate() {
                let y = round_coordinate(1.0 - slot as f64 / rows as f64);
                placements[index] = Some(NodePlacement {
                    x,
                    y,
                    color: colors[rank].clone(),
                });
            }
            trace!(label = %label, x, rows, "Placed column");
        }

        // Every node belongs to exactly one column, so every slot is filled.
        let node_placements: Vec<NodePlacement> = placements.into_iter().flatten().collect();

        let edge_placements = endpoints
            .into_iter()
            .map(|(source, target)| {
                let label = nodes.nodes()[source].key.label.as_str();
                EdgePlacement {
                    source,
                    target,
                    color: colors[column_rank[label]].clone(),
                }
            })
            .collect();

        info!(
            columns = column_count,
            nodes = node_placements.len(),
            "Sankey layout completed"
        );

        Ok(LayoutAssignment {
            nodes: node_placements,
            edges: edge_placements,
        })
    }

    pub fn name(&self) -> &'static str {
        "sankey-columns"
    }
}
