//! JSON bundle renderer
//!
//! Writes the bundle unchanged to `{target_path}/{plot_name}.json` for
//! consumers that draw the diagram themselves.

use std::path::PathBuf;

use tracing::info;

use super::output_file;
use crate::core::{DiagramRenderer, Result, SankeyBundle};

#[derive(Debug, Clone)]
pub struct JsonRenderer {
    target_path: PathBuf,
    plot_name: String,
}

impl JsonRenderer {
    pub fn new(target_path: impl Into<PathBuf>, plot_name: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            plot_name: plot_name.into(),
        }
    }
}

impl DiagramRenderer for JsonRenderer {
    type Output = PathBuf;

    fn render(&self, bundle: &SankeyBundle) -> Result<PathBuf> {
        let content = serde_json::to_string_pretty(bundle)?;
        let path = output_file(&self.target_path, &self.plot_name, "json")?;
        info!(path = %path.display(), "Saving diagram bundle");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BundleNode, Color};
    use tempfile::tempdir;

    #[test]
    fn test_writes_bundle() {
        let dir = tempdir().unwrap();
        let bundle = SankeyBundle {
            title: "Flow".to_string(),
            nodes: vec![BundleNode {
                label: "X_2010".to_string(),
                count: 1,
                x: 0.0,
                y: 1.0,
                color: Color::new("#1f77b4"),
            }],
            links: Vec::new(),
        };

        let renderer = JsonRenderer::new(dir.path(), "flow");
        let path = renderer.render(&bundle).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["title"], "Flow");
        assert_eq!(value["nodes"][0]["label"], "X_2010");
        assert_eq!(value["nodes"][0]["color"], "#1f77b4");
        assert!(value["links"].as_array().unwrap().is_empty());
    }
}
