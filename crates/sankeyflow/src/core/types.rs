//! Core type definitions for the snapshot-to-Sankey pipeline
//!
//! This module contains the data model shared by every stage: raw
//! snapshots, merged column identities, node and edge keys.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of a snapshot table
///
/// `values` maps attribute column names to cell values; `None` is a null cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub entity: String,
    pub values: BTreeMap<String, Option<String>>,
}

impl SnapshotRow {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder: set an attribute value (empty strings are stored as null)
    pub fn with_value(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = if value.is_empty() { None } else { Some(value) };
        self.values.insert(attribute.into(), value);
        self
    }

    /// Builder: set an attribute to null
    pub fn with_null(mut self, attribute: impl Into<String>) -> Self {
        self.values.insert(attribute.into(), None);
        self
    }

    /// Get a non-null attribute value
    pub fn value(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).and_then(|v| v.as_deref())
    }
}

/// One time-stamped table of entities and their categorical attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sortable label, e.g. a year
    pub label: String,
    /// Name of the entity-identifier column
    pub entity_column: String,
    /// Names of the categorical attribute columns, in table order
    pub attribute_columns: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    pub fn new(
        label: impl Into<String>,
        entity_column: impl Into<String>,
        attribute_columns: Vec<String>,
    ) -> Self {
        Self {
            label: label.into(),
            entity_column: entity_column.into(),
            attribute_columns,
            rows: Vec::new(),
        }
    }

    /// Builder: append a row
    pub fn with_row(mut self, row: SnapshotRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn push_row(&mut self, row: SnapshotRow) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Identity of a column in the merged wide table: one per (attribute, snapshot)
///
/// Ordered by label first so that iterating a column map walks snapshots in
/// column order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MergedColumn {
    pub label: String,
    pub attribute: String,
}

impl MergedColumn {
    pub fn new(attribute: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for MergedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.attribute, self.label)
    }
}

/// Composite node identity: an attribute value within one snapshot
///
/// Ordered by label, then value. That ordering is the canonical node order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub label: String,
    pub value: String,
}

impl NodeKey {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Label shown by renderers, e.g. `Party_X_2010`
    pub fn display_label(&self) -> String {
        format!("{}_{}", self.value, self.label)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.value, self.label)
    }
}

/// A (value, snapshot) pair with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeKey,
    pub count: usize,
}

impl Node {
    pub fn new(key: NodeKey, count: usize) -> Self {
        Self { key, count }
    }

    pub fn label(&self) -> &str {
        &self.key.label
    }
}

/// A flow of entities between nodes of adjacent snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeKey,
    pub target: NodeKey,
    pub count: usize,
}

impl Edge {
    pub fn new(source: NodeKey, target: NodeKey, count: usize) -> Self {
        Self {
            source,
            target,
            count,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.count)
    }
}

/// Hex color string such as `#1f77b4`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position and color of a node, parallel to the canonical node order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePlacement {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

/// Resolved endpoints and color of an edge, parallel to the canonical edge order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgePlacement {
    pub source: usize,
    pub target: usize,
    pub color: Color,
}

/// Layout output: coordinates and colors for every node and edge
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutAssignment {
    pub nodes: Vec<NodePlacement>,
    pub edges: Vec<EdgePlacement>,
}
