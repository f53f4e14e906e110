//! Logging infrastructure for the Sankey pipeline
//!
//! Structured logging uses the `tracing` crate. The subscriber is installed
//! once per process by [`init_logging`]; the pipeline stages themselves never
//! touch global state and instead attach their spans to the run span carried
//! by [`PipelineContext`](crate::core::PipelineContext).
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `SANKEYFLOW_LOG_LEVEL`: Set log level (trace|debug|info|warn|error)
//! - `SANKEYFLOW_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Alternative way to set log level (tracing-subscriber standard)
//!
//! # Log File
//!
//! When a log file path is given, every event is also appended to that file
//! without ANSI colors. The file rotates at midnight; rotated files carry a
//! date suffix next to the configured name.
//!
//! # Filtering Logs
//!
//! ```bash
//! # Show only layout logs at trace level
//! RUST_LOG="info,sankeyflow::pipeline::layout=trace" sankeyflow render -c plot.yml
//! ```

use std::path::Path;
use std::str::FromStr;

use tracing::Subscriber;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Build the plain-text layer that mirrors events into a daily rotated file
fn file_layer<S>(
    log_file: Option<&Path>,
) -> Result<Option<Box<dyn Layer<S> + Send + Sync>>, Box<dyn std::error::Error>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let Some(path) = log_file else {
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| format!("Log path '{}' has no file name", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&directory)?;

    let appender = rolling::daily(directory, file_name);
    let layer = fmt::Layer::default()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_writer(appender);

    Ok(Some(layer.boxed()))
}

/// Initialize the tracing subscriber with the given log level, format and file
///
/// # Arguments
///
/// * `level` - Optional log level string (trace|debug|info|warn|error|off).
///            If None, uses `SANKEYFLOW_LOG_LEVEL` or `RUST_LOG`, or defaults to `info`.
/// * `format` - Optional log format (compact|pretty|json).
///             If None, uses `SANKEYFLOW_LOG_FORMAT`, or defaults to `compact`.
/// * `log_file` - Optional path of a log file that receives a copy of every event.
///
/// # Returns
///
/// Returns an error if the format is unknown, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = level
        .map(|s| s.to_string())
        .or_else(|| std::env::var("SANKEYFLOW_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    let log_format = format
        .map(|s| s.to_string())
        .or_else(|| std::env::var("SANKEYFLOW_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());

    let filter = if log_level == "off" {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let format =
        LogFormat::from_str(&log_format).map_err(|e| format!("Invalid log format: {}", e))?;

    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_target(false)
                        .with_level(true)
                        .with_file(false)
                        .with_line_number(false)
                        .with_span_events(FmtSpan::NONE),
                )
                .with(file_layer(log_file)?)
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .with(file_layer(log_file)?)
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .json(),
                )
                .with(file_layer(log_file)?)
                .try_init()?;
        }
    }

    Ok(())
}

/// Initialize logging with default settings (info level, compact format, no file)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("COMPACT").unwrap(), LogFormat::Compact);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_format_variants() {
        let variants = LogFormat::variants();
        assert!(variants.contains(&"compact"));
        assert!(variants.contains(&"pretty"));
        assert!(variants.contains(&"json"));
    }

    #[test]
    fn test_file_layer_rejects_bare_root() {
        let result = file_layer::<Registry>(Some(Path::new("/")));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_layer_none_without_path() {
        let result = file_layer::<Registry>(None).unwrap();
        assert!(result.is_none());
    }
}
