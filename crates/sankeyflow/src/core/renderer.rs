//! Core renderer trait and the bundle it consumes
//!
//! The pipeline's obligation ends at producing a [`SankeyBundle`]; turning it
//! into an artifact (HTML, JSON, ...) belongs to a [`DiagramRenderer`].

use serde::Serialize;

use super::{Color, Edge, LayoutAssignment, Node, Result, SankeyError};

/// A node as a renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleNode {
    pub label: String,
    pub count: usize,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

/// An edge as a renderer sees it, with endpoints as node indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleLink {
    pub source: usize,
    pub target: usize,
    pub count: usize,
    pub color: Color,
}

/// Everything a renderer needs to draw one Sankey diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyBundle {
    pub title: String,
    pub nodes: Vec<BundleNode>,
    pub links: Vec<BundleLink>,
}

impl SankeyBundle {
    /// Zip nodes, edges and their layout into a bundle
    ///
    /// `nodes`/`edges` must be in the same canonical order the layout was
    /// computed over; a length mismatch is a render error.
    pub fn assemble(
        title: impl Into<String>,
        nodes: &[Node],
        edges: &[Edge],
        layout: &LayoutAssignment,
    ) -> Result<Self> {
        if nodes.len() != layout.nodes.len() || edges.len() != layout.edges.len() {
            return Err(SankeyError::render_error(format!(
                "layout covers {} nodes / {} edges but the model has {} / {}",
                layout.nodes.len(),
                layout.edges.len(),
                nodes.len(),
                edges.len()
            )));
        }

        let nodes = nodes
            .iter()
            .zip(&layout.nodes)
            .map(|(node, placement)| BundleNode {
                label: node.key.display_label(),
                count: node.count,
                x: placement.x,
                y: placement.y,
                color: placement.color.clone(),
            })
            .collect();

        let links = edges
            .iter()
            .zip(&layout.edges)
            .map(|(edge, placement)| BundleLink {
                source: placement.source,
                target: placement.target,
                count: edge.count,
                color: placement.color.clone(),
            })
            .collect();

        Ok(Self {
            title: title.into(),
            nodes,
            links,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

/// Core trait for diagram renderers
///
/// Each renderer turns the same bundle into a different artifact.
pub trait DiagramRenderer {
    /// The output type of this renderer
    type Output;

    /// Render the bundle into the output format
    fn render(&self, bundle: &SankeyBundle) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
