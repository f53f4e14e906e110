//! Core error types for the snapshot-to-Sankey pipeline
//!
//! Every variant is fatal to a pipeline run. Model errors carry the
//! component that raised them, the snapshot label involved (when there is
//! one) and the offending key so the caller can log a fully attributed
//! message.

use std::fmt;

use thiserror::Error;

/// Pipeline stage that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Source,
    TableMerger,
    NodeEdgeBuilder,
    LayoutEngine,
    Renderer,
    Configuration,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Source => write!(f, "snapshot-source"),
            Component::TableMerger => write!(f, "table-merger"),
            Component::NodeEdgeBuilder => write!(f, "node-edge-builder"),
            Component::LayoutEngine => write!(f, "layout-engine"),
            Component::Renderer => write!(f, "renderer"),
            Component::Configuration => write!(f, "configuration"),
        }
    }
}

/// Core error types for the Sankey pipeline
#[derive(Error, Debug)]
pub enum SankeyError {
    #[error("[{component}] snapshot source yielded no snapshots; nothing to merge")]
    SourceExhausted { component: Component },

    #[error("[{component}] merge key collision in snapshot '{label}' on key '{key}': {reason}")]
    MergeKeyCollision {
        component: Component,
        label: String,
        key: String,
        reason: String,
    },

    #[error(
        "[{component}] composite key ambiguity in snapshot '{label}': value '{value}' renders \
         as '{rendered}', which is already used by value '{existing_value}' of snapshot \
         '{existing_label}'"
    )]
    CompositeKeyAmbiguity {
        component: Component,
        label: String,
        value: String,
        rendered: String,
        existing_label: String,
        existing_value: String,
    },

    #[error(
        "[{component}] edge references node '{key}' (snapshot '{label}') which is not in the \
         node set"
    )]
    DanglingEdge {
        component: Component,
        label: String,
        key: String,
    },

    #[error("[{component}] '{key}' in snapshot '{label}' is not a valid diagram element: {reason}")]
    InvariantViolation {
        component: Component,
        label: String,
        key: String,
        reason: String,
    },

    #[error("[{component}] snapshot column '{label}' has no values; cannot size the color palette")]
    EmptyColumn { component: Component, label: String },

    #[error("[{component}] source error in snapshot '{label}': {message}")]
    Source {
        component: Component,
        label: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("YAML error: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}

impl SankeyError {
    /// Create a merge key collision raised by the table merger
    pub fn merge_key_collision(
        label: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MergeKeyCollision {
            component: Component::TableMerger,
            label: label.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a dangling edge error raised by the layout engine
    pub fn dangling_edge(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DanglingEdge {
            component: Component::LayoutEngine,
            label: label.into(),
            key: key.into(),
        }
    }

    /// Create an invariant violation for a node or edge that cannot be drawn
    pub fn invariant_violation(
        component: Component,
        label: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvariantViolation {
            component,
            label: label.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an empty column error for the given component
    pub fn empty_column(component: Component, label: impl Into<String>) -> Self {
        Self::EmptyColumn {
            component,
            label: label.into(),
        }
    }

    /// Create a source error
    pub fn source_error(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            component: Component::Source,
            label: label.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// The component that raised this error, if it is a pipeline model error
    pub fn component(&self) -> Option<Component> {
        match self {
            Self::SourceExhausted { component }
            | Self::MergeKeyCollision { component, .. }
            | Self::CompositeKeyAmbiguity { component, .. }
            | Self::DanglingEdge { component, .. }
            | Self::InvariantViolation { component, .. }
            | Self::EmptyColumn { component, .. }
            | Self::Source { component, .. } => Some(*component),
            Self::Config { .. } | Self::Yaml { .. } => Some(Component::Configuration),
            Self::Render { .. } => Some(Component::Renderer),
            Self::Io { .. } | Self::Json { .. } => None,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T, E = SankeyError> = std::result::Result<T, E>;
