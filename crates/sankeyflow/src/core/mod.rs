//! Core abstractions for the snapshot-to-Sankey pipeline
//!
//! This module defines the shared data model, the error taxonomy, the
//! diagnostic context and the trait seams towards external collaborators
//! (snapshot sources and diagram renderers).

mod context;
mod error;
pub mod logging;
mod renderer;
mod source;
mod types;

pub use context::*;
pub use error::*;
pub use logging::*;
pub use renderer::*;
pub use source::*;
pub use types::*;
