//! Concrete snapshot sources and diagram renderers
//!
//! Each plugin implements one of the core seams: [`SnapshotSource`] for
//! producers, [`DiagramRenderer`] for consumers.
//!
//! [`SnapshotSource`]: crate::core::SnapshotSource
//! [`DiagramRenderer`]: crate::core::DiagramRenderer

pub mod csv_source;
pub mod json;
pub mod plotly;

pub use csv_source::{CsvSnapshotFile, CsvSnapshotSource};
pub use json::JsonRenderer;
pub use plotly::{PlotlyRenderer, PlotlyScript, DEFAULT_PLOTLY_JS};

use std::path::{Path, PathBuf};

use crate::core::{Result, SankeyError};

/// `{target_path}/{plot_name}.{extension}`, creating `target_path` if needed
pub(crate) fn output_file(target_path: &Path, plot_name: &str, extension: &str) -> Result<PathBuf> {
    if plot_name.is_empty() {
        return Err(SankeyError::render_error("plot name is empty"));
    }
    std::fs::create_dir_all(target_path)?;
    Ok(target_path.join(format!("{}.{}", plot_name, extension)))
}
