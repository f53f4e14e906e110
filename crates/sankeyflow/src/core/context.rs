//! Diagnostic context handed to every pipeline stage
//!
//! Stages open their spans with `parent: ctx.span()` so a run's events stay
//! grouped under one root span regardless of what is current on the thread.

use tracing::{span, Level, Span};

/// Per-run diagnostic context
#[derive(Debug, Clone)]
pub struct PipelineContext {
    run: String,
    span: Span,
}

impl PipelineContext {
    /// Create a context whose root span is named after the run (usually the plot name)
    pub fn new(run: impl Into<String>) -> Self {
        let run = run.into();
        let span = span!(Level::INFO, "sankey_run", run = %run);
        Self { run, span }
    }

    /// Context for code that has no run of its own, such as unit tests
    pub fn detached() -> Self {
        Self {
            run: String::from("detached"),
            span: Span::none(),
        }
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::detached()
    }
}
