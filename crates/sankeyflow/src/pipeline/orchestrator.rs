//! Pipeline orchestrator
//!
//! Runs the stages strictly in sequence:
//! SnapshotSource → TableMerger → NodeEdgeBuilder → LayoutEngine → DiagramRenderer

use tracing::{debug, info, span, Level};

use super::builder::{EdgeSet, NodeEdgeBuilder, NodeSet};
use super::layout::LayoutEngine;
use super::merger::{MergeOutput, TableMerger};
use crate::core::{
    DiagramRenderer, LayoutAssignment, PipelineContext, Result, SankeyBundle, SnapshotSource,
};

/// Everything the pipeline produced up to (not including) rendering
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub merge: MergeOutput,
    pub nodes: NodeSet,
    pub edges: EdgeSet,
    pub layout: LayoutAssignment,
    pub bundle: SankeyBundle,
}

/// Coordinates the pipeline stages for one diagram
#[derive(Debug, Clone)]
pub struct Pipeline {
    title: String,
    merger: TableMerger,
    builder: NodeEdgeBuilder,
    layout: LayoutEngine,
}

impl Pipeline {
    /// Create a pipeline with default stages and the given diagram title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            merger: TableMerger::new(),
            builder: NodeEdgeBuilder::new(),
            layout: LayoutEngine::new(),
        }
    }

    pub fn with_merger(mut self, merger: TableMerger) -> Self {
        self.merger = merger;
        self
    }

    pub fn with_layout_engine(mut self, layout: LayoutEngine) -> Self {
        self.layout = layout;
        self
    }

    /// Run every stage except rendering
    pub fn build_bundle(
        &self,
        source: Box<dyn SnapshotSource>,
        ctx: &PipelineContext,
    ) -> Result<PipelineOutput> {
        let run_span = span!(
            parent: ctx.span(),
            Level::INFO,
            "build_bundle",
            source = source.name()
        );
        let _enter = run_span.enter();

        info!(
            title = %self.title,
            layout = self.layout.name(),
            "Starting Sankey pipeline"
        );

        let merge = self.merger.merge(source.snapshots(), ctx)?;
        let nodes = self
            .builder
            .build_nodes(&merge.table, &merge.plot_columns, ctx)?;
        let edges = self.builder.build_edges(
            &merge.table,
            &merge.plot_columns,
            &merge.entity_column,
            ctx,
        )?;
        let layout = self.layout.layout(&nodes, &edges, ctx)?;
        let bundle = SankeyBundle::assemble(&self.title, nodes.nodes(), edges.edges(), &layout)?;

        debug!(
            nodes = bundle.node_count(),
            links = bundle.link_count(),
            "Bundle assembled"
        );

        Ok(PipelineOutput {
            merge,
            nodes,
            edges,
            layout,
            bundle,
        })
    }

    /// Run the full pipeline and hand the bundle to `renderer`
    pub fn run<R: DiagramRenderer>(
        &self,
        source: Box<dyn SnapshotSource>,
        renderer: &R,
        ctx: &PipelineContext,
    ) -> Result<R::Output> {
        let output = self.build_bundle(source, ctx)?;

        let render_span = span!(
            parent: ctx.span(),
            Level::INFO,
            "render",
            renderer = renderer.name()
        );
        let _enter = render_span.enter();

        let rendered = renderer.render(&output.bundle)?;
        info!(format = renderer.format(), "Sankey pipeline completed");
        Ok(rendered)
    }
}
