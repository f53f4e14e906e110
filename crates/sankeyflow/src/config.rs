//! YAML run configuration
//!
//! A configuration names the plot, picks a snapshot source type and a target
//! (renderer) type, and carries the options of each:
//!
//! ```yaml
//! plot_name: Parliament 2010-2014
//! source:
//!   type: csv
//!   config:
//!     entity_column: Name
//!     plot_attribute: Party
//!     snapshots:
//!       - { label: 2010, path: data/2010.csv }
//!       - { label: 2014, path: data/2014.csv }
//! target:
//!   type: plotly
//!   config:
//!     target_path: out
//! ```
//!
//! Relative snapshot paths resolve against the directory of the config file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::core::{DiagramRenderer, Result, SankeyBundle, SankeyError, SnapshotSource};
use crate::pipeline::{LayoutEngine, Palette, Pipeline, TableMerger};
use crate::plugins::{CsvSnapshotFile, CsvSnapshotSource, JsonRenderer, PlotlyRenderer};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    pub plot_name: String,
    pub source: SourceConfig,
    pub target: TargetConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Snapshot source selection
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum SourceConfig {
    Csv(CsvSourceConfig),
}

/// Options of the CSV snapshot source
#[derive(Debug, Clone, Deserialize)]
pub struct CsvSourceConfig {
    pub entity_column: String,

    /// Attribute columns to keep; every non-entity column when omitted
    #[serde(default)]
    pub attribute_columns: Option<Vec<String>>,

    /// Attribute whose values become nodes; the first attribute column when omitted
    #[serde(default)]
    pub plot_attribute: Option<String>,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    pub snapshots: Vec<SnapshotFileConfig>,
}

fn default_delimiter() -> char {
    ','
}

/// One snapshot file entry
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFileConfig {
    /// Years are usually written unquoted, so numbers are accepted too
    #[serde(deserialize_with = "scalar_string")]
    pub label: String,
    pub path: PathBuf,
}

fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
    })
}

/// Renderer selection
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum TargetConfig {
    Plotly(PlotlyTargetConfig),
    Json(JsonTargetConfig),
}

/// Options of the Plotly HTML target
#[derive(Debug, Clone, Deserialize)]
pub struct PlotlyTargetConfig {
    pub target_path: PathBuf,

    /// plotly.js script URL; a pinned CDN build when omitted
    #[serde(default)]
    pub plotly_js: Option<String>,

    /// Local plotly.js file embedded into the page so it renders offline
    #[serde(default)]
    pub plotly_js_file: Option<PathBuf>,

    /// Column colors as `#rrggbb`; the ten-color categorical cycle when omitted
    #[serde(default)]
    pub palette: Option<Vec<String>>,
}

/// Options of the JSON bundle target
#[derive(Debug, Clone, Deserialize)]
pub struct JsonTargetConfig {
    pub target_path: PathBuf,

    #[serde(default)]
    pub palette: Option<Vec<String>>,
}

impl Configuration {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SankeyError::config_error(format!(
                "failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config: Configuration = serde_yaml::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;

        debug!(path = %path.display(), plot_name = %config.plot_name, "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate a configuration from a YAML string
    ///
    /// Relative paths resolve against the current directory.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Configuration = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check option values that the YAML schema alone cannot express
    pub fn validate(&self) -> Result<()> {
        let plot_name = self.plot_name.trim();
        if plot_name.is_empty() {
            return Err(SankeyError::config_error("plot_name must not be empty"));
        }
        if plot_name.contains(['/', '\\']) {
            return Err(SankeyError::config_error(format!(
                "plot_name '{}' must not contain path separators",
                self.plot_name
            )));
        }

        match &self.source {
            SourceConfig::Csv(csv) => {
                if csv.entity_column.trim().is_empty() {
                    return Err(SankeyError::config_error("entity_column must not be empty"));
                }
                if !csv.delimiter.is_ascii() {
                    return Err(SankeyError::config_error(format!(
                        "delimiter '{}' is not a single ASCII character",
                        csv.delimiter
                    )));
                }
                if csv.snapshots.is_empty() {
                    return Err(SankeyError::config_error(
                        "source lists no snapshots; nothing to merge",
                    ));
                }
                let mut labels = HashSet::new();
                for snapshot in &csv.snapshots {
                    if !labels.insert(snapshot.label.as_str()) {
                        return Err(SankeyError::config_error(format!(
                            "snapshot label '{}' is listed more than once",
                            snapshot.label
                        )));
                    }
                }
                if let (Some(attribute), Some(columns)) =
                    (&csv.plot_attribute, &csv.attribute_columns)
                {
                    if !columns.contains(attribute) {
                        return Err(SankeyError::config_error(format!(
                            "plot_attribute '{}' is not among attribute_columns",
                            attribute
                        )));
                    }
                }
            }
        }

        if self.target_path().as_os_str().is_empty() {
            return Err(SankeyError::config_error("target_path must not be empty"));
        }
        if let TargetConfig::Plotly(PlotlyTargetConfig {
            plotly_js: Some(_),
            plotly_js_file: Some(_),
            ..
        }) = &self.target
        {
            return Err(SankeyError::config_error(
                "plotly_js and plotly_js_file are mutually exclusive",
            ));
        }
        if let Some(colors) = self.palette_colors() {
            Palette::new(colors.iter().cloned())?;
        }

        Ok(())
    }

    pub fn plot_name(&self) -> &str {
        self.plot_name.trim()
    }

    pub fn source_type(&self) -> &'static str {
        match self.source {
            SourceConfig::Csv(_) => "csv",
        }
    }

    pub fn target_type(&self) -> &'static str {
        match self.target {
            TargetConfig::Plotly(_) => "plotly",
            TargetConfig::Json(_) => "json",
        }
    }

    /// Directory the rendered artifact is written to
    pub fn target_path(&self) -> &Path {
        match &self.target {
            TargetConfig::Plotly(plotly) => &plotly.target_path,
            TargetConfig::Json(json) => &json.target_path,
        }
    }

    fn palette_colors(&self) -> Option<&Vec<String>> {
        match &self.target {
            TargetConfig::Plotly(plotly) => plotly.palette.as_ref(),
            TargetConfig::Json(json) => json.palette.as_ref(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Snapshot source described by the `source` section
    pub fn build_source(&self) -> Box<dyn SnapshotSource> {
        match &self.source {
            SourceConfig::Csv(csv) => {
                let files = csv
                    .snapshots
                    .iter()
                    .map(|s| CsvSnapshotFile::new(&s.label, self.resolve(&s.path)))
                    .collect();
                let mut source = CsvSnapshotSource::new(&csv.entity_column, files)
                    .with_delimiter(csv.delimiter as u8);
                if let Some(columns) = &csv.attribute_columns {
                    source = source.with_attribute_columns(columns.clone());
                }
                Box::new(source)
            }
        }
    }

    /// Pipeline with the configured title, plot attribute and palette
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let merger = match &self.source {
            SourceConfig::Csv(CsvSourceConfig {
                plot_attribute: Some(attribute),
                ..
            }) => TableMerger::new().with_plot_attribute(attribute),
            SourceConfig::Csv(_) => TableMerger::new(),
        };

        let palette = match self.palette_colors() {
            Some(colors) => Palette::new(colors.iter().cloned())?,
            None => Palette::default(),
        };

        Ok(Pipeline::new(self.plot_name())
            .with_merger(merger)
            .with_layout_engine(LayoutEngine::with_palette(palette)))
    }

    /// Renderer described by the `target` section
    pub fn build_renderer(&self) -> ConfiguredRenderer {
        match &self.target {
            TargetConfig::Plotly(plotly) => {
                let mut renderer = PlotlyRenderer::new(&plotly.target_path, self.plot_name());
                if let Some(url) = &plotly.plotly_js {
                    renderer = renderer.with_plotly_js(url);
                }
                if let Some(file) = &plotly.plotly_js_file {
                    renderer = renderer.with_inline_plotly_js(self.resolve(file));
                }
                ConfiguredRenderer::Plotly(renderer)
            }
            TargetConfig::Json(json) => {
                ConfiguredRenderer::Json(JsonRenderer::new(&json.target_path, self.plot_name()))
            }
        }
    }
}

/// Whichever renderer the configuration selected
#[derive(Debug, Clone)]
pub enum ConfiguredRenderer {
    Plotly(PlotlyRenderer),
    Json(JsonRenderer),
}

impl DiagramRenderer for ConfiguredRenderer {
    type Output = PathBuf;

    fn render(&self, bundle: &SankeyBundle) -> Result<PathBuf> {
        match self {
            ConfiguredRenderer::Plotly(r) => r.render(bundle),
            ConfiguredRenderer::Json(r) => r.render(bundle),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfiguredRenderer::Plotly(r) => r.name(),
            ConfiguredRenderer::Json(r) => r.name(),
        }
    }

    fn format(&self) -> &'static str {
        match self {
            ConfiguredRenderer::Plotly(r) => r.format(),
            ConfiguredRenderer::Json(r) => r.format(),
        }
    }
}
