//! Command-line interface for the sankeyflow utility
//!
//! Reads a YAML run configuration and renders, inspects or validates it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sankeyflow::config::Configuration;
use sankeyflow::core::logging::init_logging;
use sankeyflow::pipeline::PipelineOutput;
use sankeyflow::{DiagramRenderer, PipelineContext, SankeyBundle};

/// Sankeyflow - Build Sankey diagrams from tabular snapshots
#[derive(Parser)]
#[command(name = "sankeyflow")]
#[command(about = "Create a Sankey diagram by providing a configuration file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug log messages (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Also write logs to this file, rotated daily
    #[arg(short = 'l', long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline and write the diagram
    Render {
        /// The configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print nodes, edges and their layout without rendering
    Inspect {
        /// The configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a configuration file
    Validate {
        /// The configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Machine-readable summary printed by `inspect --json`
#[derive(Serialize)]
struct InspectReport<'a> {
    snapshots: &'a [String],
    entity_column: &'a str,
    entities: usize,
    bundle: &'a SankeyBundle,
}

/// Main CLI application
#[derive(Default)]
pub struct SankeyflowApp;

impl SankeyflowApp {
    pub fn new() -> Self {
        Self
    }

    /// Pick the log level: environment first, then --debug, then --log-level
    fn log_level(cli: &Cli) -> String {
        std::env::var("SANKEYFLOW_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| {
                if cli.debug {
                    LogLevel::Debug.as_str().to_string()
                } else {
                    cli.log_level.as_str().to_string()
                }
            })
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        let log_level = Self::log_level(&cli);
        let log_format = std::env::var("SANKEYFLOW_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        let log_file = cli.log_file.as_deref();
        if let Err(e) = init_logging(Some(&log_level), Some(&log_format), log_file) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Sankeyflow v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render { config } => self.render_command(config, cli.verbose),
            Commands::Inspect { config, json } => {
                self.inspect_command(config, json, &mut io::stdout().lock())
            }
            Commands::Validate { config } => self.validate_command(config),
        }
    }

    fn load_config(&self, path: &Path) -> Result<Configuration> {
        Configuration::load(path)
            .with_context(|| format!("Invalid configuration '{}'", path.display()))
    }

    /// Handle the render command
    fn render_command(&self, config_path: PathBuf, verbose: bool) -> Result<()> {
        let config = self.load_config(&config_path)?;
        tracing::info!(
            source = config.source_type(),
            target = config.target_type(),
            "Using configured source and target"
        );

        let ctx = PipelineContext::new(config.plot_name());
        let pipeline = config.build_pipeline()?;
        let renderer = config.build_renderer();
        let path = pipeline.run(config.build_source(), &renderer, &ctx)?;

        if verbose {
            eprintln!("Rendered {} diagram", renderer.format());
        }
        println!("{}", path.display());
        Ok(())
    }

    fn build(&self, config: &Configuration) -> Result<PipelineOutput> {
        let ctx = PipelineContext::new(config.plot_name());
        let pipeline = config.build_pipeline()?;
        Ok(pipeline.build_bundle(config.build_source(), &ctx)?)
    }

    /// Handle the inspect command
    fn inspect_command(
        &self,
        config_path: PathBuf,
        json: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let config = self.load_config(&config_path)?;
        let output = self.build(&config)?;
        self.write_inspection(&output, json, out)
    }

    fn write_inspection(
        &self,
        output: &PipelineOutput,
        json: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let bundle = &output.bundle;

        if json {
            let report = InspectReport {
                snapshots: &output.merge.labels,
                entity_column: &output.merge.entity_column,
                entities: output.merge.table.entity_count(),
                bundle,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            return Ok(());
        }

        writeln!(out, "{}", bundle.title)?;
        writeln!(
            out,
            "Snapshots: {} ({} entities keyed by '{}')",
            output.merge.labels.join(", "),
            output.merge.table.entity_count(),
            output.merge.entity_column
        )?;
        writeln!(out)?;
        writeln!(out, "Nodes:")?;
        for node in &bundle.nodes {
            writeln!(
                out,
                "  {:<30} count={:<6} x={:<6} y={:<6} {}",
                node.label, node.count, node.x, node.y, node.color
            )?;
        }
        writeln!(out)?;
        writeln!(out, "Edges:")?;
        for link in &bundle.links {
            writeln!(
                out,
                "  {} -> {}  count={} {}",
                bundle.nodes[link.source].label,
                bundle.nodes[link.target].label,
                link.count,
                link.color
            )?;
        }
        Ok(())
    }

    /// Handle the validate command
    fn validate_command(&self, config_path: PathBuf) -> Result<()> {
        let config = self.load_config(&config_path)?;
        println!(
            "✓ Valid configuration '{}' ({} source → {} target, writing to {})",
            config.plot_name(),
            config.source_type(),
            config.target_type(),
            config.target_path().display()
        );
        Ok(())
    }
}
