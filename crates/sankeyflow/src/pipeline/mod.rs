//! The data-reshaping and layout pipeline
//!
//! Each stage borrows the previous stage's output and returns a fresh
//! structure; nothing is shared or mutated across stages.

mod builder;
mod layout;
mod merger;
mod orchestrator;
mod palette;

pub use builder::{EdgeSet, NodeEdgeBuilder, NodeSet};
pub use layout::{LayoutEngine, COORDINATE_DIGITS};
pub use merger::{MergeOutput, MergedRecord, MergedTable, TableMerger};
pub use orchestrator::{Pipeline, PipelineOutput};
pub use palette::{Palette, CATEGORICAL};
