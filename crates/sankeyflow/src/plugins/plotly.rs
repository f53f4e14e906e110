//! Plotly HTML renderer
//!
//! Builds a Plotly `sankey` figure from the bundle and writes it as a
//! standalone HTML page to `{target_path}/{plot_name}.html`.
//!
//! The page loads plotly.js from a CDN unless a local copy is given with
//! [`PlotlyRenderer::with_inline_plotly_js`], in which case the library is
//! embedded and the page works offline.

use std::path::PathBuf;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::output_file;
use crate::core::{DiagramRenderer, Result, SankeyBundle, SankeyError};

/// Script URL used when none is configured
pub const DEFAULT_PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Where the page gets plotly.js from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotlyScript {
    /// `<script src="...">` pointing at a URL
    Url(String),
    /// Contents of a local file embedded in the page
    Inline(PathBuf),
}

/// Renders a bundle into an interactive HTML page
#[derive(Debug, Clone)]
pub struct PlotlyRenderer {
    target_path: PathBuf,
    plot_name: String,
    script: PlotlyScript,
}

impl PlotlyRenderer {
    pub fn new(target_path: impl Into<PathBuf>, plot_name: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            plot_name: plot_name.into(),
            script: PlotlyScript::Url(DEFAULT_PLOTLY_JS.to_string()),
        }
    }

    /// Load plotly.js from another URL
    pub fn with_plotly_js(mut self, url: impl Into<String>) -> Self {
        self.script = PlotlyScript::Url(url.into());
        self
    }

    /// Embed a local plotly.js file instead of linking to it
    pub fn with_inline_plotly_js(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = PlotlyScript::Inline(path.into());
        self
    }

    pub fn script(&self) -> &PlotlyScript {
        &self.script
    }

    /// The Plotly figure (`data` + `layout`) for a bundle
    pub fn figure(bundle: &SankeyBundle) -> Value {
        let labels: Vec<&str> = bundle.nodes.iter().map(|n| n.label.as_str()).collect();
        let node_colors: Vec<&str> = bundle.nodes.iter().map(|n| n.color.as_str()).collect();
        let xs: Vec<f64> = bundle.nodes.iter().map(|n| n.x).collect();
        let ys: Vec<f64> = bundle.nodes.iter().map(|n| n.y).collect();

        let sources: Vec<usize> = bundle.links.iter().map(|l| l.source).collect();
        let targets: Vec<usize> = bundle.links.iter().map(|l| l.target).collect();
        let values: Vec<usize> = bundle.links.iter().map(|l| l.count).collect();
        let link_colors: Vec<&str> = bundle.links.iter().map(|l| l.color.as_str()).collect();

        json!({
            "data": [{
                "type": "sankey",
                "arrangement": "freeform",
                "node": {
                    "hoverinfo": "all",
                    "pad": 15,
                    "thickness": 20,
                    "line": { "color": "black", "width": 0.5 },
                    "label": labels,
                    "color": node_colors,
                    "x": xs,
                    "y": ys,
                },
                "link": {
                    "source": sources,
                    "target": targets,
                    "value": values,
                    "label": values,
                    "color": link_colors,
                },
            }],
            "layout": {
                "title": { "text": bundle.title },
                "font": { "size": 10 },
            },
        })
    }

    /// The complete HTML page for a bundle
    pub fn html(&self, bundle: &SankeyBundle) -> Result<String> {
        let figure = serde_json::to_string(&Self::figure(bundle))?;
        // Keep the payload from closing the surrounding <script> element.
        let figure = figure.replace("</", "<\\/");
        let script = self.script_element()?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
{script}
</head>
<body>
<div id="sankey" style="width:100%;height:100vh;"></div>
<script>
var figure = {figure};
Plotly.newPlot("sankey", figure.data, figure.layout, {{"responsive": true}});
</script>
</body>
</html>
"#,
            title = encode_text(&bundle.title),
            script = script,
            figure = figure,
        ))
    }

    fn script_element(&self) -> Result<String> {
        match &self.script {
            PlotlyScript::Url(url) => Ok(format!(
                r#"<script src="{}"></script>"#,
                encode_double_quoted_attribute(url)
            )),
            PlotlyScript::Inline(path) => {
                let library = std::fs::read_to_string(path).map_err(|e| {
                    SankeyError::render_error(format!(
                        "failed to read plotly.js from '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                debug!(path = %path.display(), bytes = library.len(), "Embedding plotly.js");
                Ok(format!(
                    "<script>\n{}\n</script>",
                    library.replace("</script", "<\\/script")
                ))
            }
        }
    }
}

impl DiagramRenderer for PlotlyRenderer {
    type Output = PathBuf;

    fn render(&self, bundle: &SankeyBundle) -> Result<PathBuf> {
        let page = self.html(bundle)?;
        debug!(bytes = page.len(), "Built Plotly page");

        let path = output_file(&self.target_path, &self.plot_name, "html")?;
        info!(path = %path.display(), "Plotting and saving diagram");
        std::fs::write(&path, page)?;
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "plotly"
    }

    fn format(&self) -> &'static str {
        "html"
    }
}
