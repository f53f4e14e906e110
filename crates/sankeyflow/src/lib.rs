//! Sankeyflow - Turn tabular snapshots into Sankey flow diagrams
//!
//! A library that merges a series of snapshot tables (e.g. successive
//! parliament rosters) on a common entity key, derives nodes (one per
//! attribute value per snapshot) and edges (entities moving between values
//! of adjacent snapshots), and lays them out as a Sankey diagram.
//!
//! # Quick Start
//!
//! ```rust
//! use sankeyflow::{build_bundle, Snapshot, SnapshotRow};
//!
//! let party = vec!["Party".to_string()];
//! let snapshots = vec![
//!     Snapshot::new("2010", "Name", party.clone())
//!         .with_row(SnapshotRow::new("A").with_value("Party", "Party_X"))
//!         .with_row(SnapshotRow::new("B").with_value("Party", "Party_X")),
//!     Snapshot::new("2014", "Name", party)
//!         .with_row(SnapshotRow::new("A").with_value("Party", "Party_Y"))
//!         .with_row(SnapshotRow::new("B").with_value("Party", "Party_X")),
//! ];
//!
//! let bundle = build_bundle(snapshots, "Parliament").unwrap();
//! assert_eq!(bundle.node_count(), 3);
//! assert_eq!(bundle.link_count(), 2);
//! ```
//!
//! # Advanced Usage
//!
//! For more control, run the stages yourself:
//!
//! ```rust
//! use sankeyflow::prelude::*;
//!
//! let snapshots = vec![Snapshot::new("2010", "Name", vec!["Party".to_string()])
//!     .with_row(SnapshotRow::new("A").with_value("Party", "X"))];
//! let ctx = PipelineContext::new("example");
//!
//! let merged = TableMerger::new().merge(snapshots.into_iter().map(Ok), &ctx).unwrap();
//! let builder = NodeEdgeBuilder::new();
//! let nodes = builder.build_nodes(&merged.table, &merged.plot_columns, &ctx).unwrap();
//! let edges = builder
//!     .build_edges(&merged.table, &merged.plot_columns, &merged.entity_column, &ctx)
//!     .unwrap();
//! let layout = LayoutEngine::new().layout(&nodes, &edges, &ctx).unwrap();
//! assert_eq!(layout.nodes[0].x, 0.0);
//! ```

pub mod config;
pub mod core;
pub mod pipeline;
pub mod plugins;

pub use core::*;

use std::path::{Path, PathBuf};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Configuration, ConfiguredRenderer};
    pub use crate::core::{
        Color, DiagramRenderer, Edge, LayoutAssignment, Node, NodeKey, PipelineContext,
        SankeyBundle, SankeyError, Snapshot, SnapshotRow, SnapshotSource, VecSnapshotSource,
    };
    pub use crate::pipeline::{
        EdgeSet, LayoutEngine, NodeEdgeBuilder, NodeSet, Palette, Pipeline, TableMerger,
    };
    pub use crate::plugins::{CsvSnapshotSource, JsonRenderer, PlotlyRenderer};
}

/// Build the renderer bundle for in-memory snapshots
///
/// Uses the default plot attribute (first attribute column) and palette.
pub fn build_bundle(snapshots: Vec<Snapshot>, title: &str) -> anyhow::Result<SankeyBundle> {
    let ctx = PipelineContext::new(title);
    let output = pipeline::Pipeline::new(title)
        .build_bundle(Box::new(VecSnapshotSource::new(snapshots)), &ctx)?;
    Ok(output.bundle)
}

/// Run the pipeline described by a configuration file
///
/// Returns the path of the written artifact.
pub fn render_config(path: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
    let config = config::Configuration::load(path)?;
    let ctx = PipelineContext::new(config.plot_name());
    let pipeline = config.build_pipeline()?;
    let renderer = config.build_renderer();
    Ok(pipeline.run(config.build_source(), &renderer, &ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_bundle_empty_fails() {
        let result = build_bundle(Vec::new(), "Empty");
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("no snapshots"));
    }

    #[test]
    fn test_build_bundle_single_snapshot() {
        let snapshots = vec![Snapshot::new("2010", "Name", vec!["Party".to_string()])
            .with_row(SnapshotRow::new("A").with_value("Party", "X"))
            .with_row(SnapshotRow::new("B").with_value("Party", "Y"))];
        let bundle = build_bundle(snapshots, "Single").unwrap();
        assert_eq!(bundle.node_count(), 2);
        assert_eq!(bundle.link_count(), 0);
        assert!(bundle.nodes.iter().all(|n| n.x == 0.0));
    }
}
