//! Table merger
//!
//! Folds a lazy snapshot sequence into one wide table keyed by entity id,
//! with one column per (attribute, snapshot label) pair. Each snapshot is
//! outer-joined into the running table, so an entity seen in any snapshot
//! gets exactly one record and reads as null wherever it was absent.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, span, trace, Level};

use crate::core::{Component, MergedColumn, PipelineContext, Result, SankeyError, Snapshot};

/// One merged row: an entity and its values across all snapshots
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergedRecord {
    values: BTreeMap<MergedColumn, Option<String>>,
}

impl MergedRecord {
    /// Non-null value of a column; absent columns read as null
    pub fn get(&self, column: &MergedColumn) -> Option<&str> {
        self.values.get(column).and_then(|v| v.as_deref())
    }

    pub fn is_present(&self, column: &MergedColumn) -> bool {
        self.get(column).is_some()
    }
}

/// Wide table with one record per entity id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTable {
    entity_column: String,
    labels: Vec<String>,
    columns: BTreeSet<MergedColumn>,
    records: BTreeMap<String, MergedRecord>,
}

impl MergedTable {
    fn new(entity_column: String) -> Self {
        Self {
            entity_column,
            labels: Vec::new(),
            columns: BTreeSet::new(),
            records: BTreeMap::new(),
        }
    }

    pub fn entity_column(&self) -> &str {
        &self.entity_column
    }

    /// Snapshot labels in ascending order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn has_column(&self, column: &MergedColumn) -> bool {
        self.columns.contains(column)
    }

    pub fn entity_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, entity: &str) -> Option<&MergedRecord> {
        self.records.get(entity)
    }

    /// Records in entity-id order
    pub fn records(&self) -> impl Iterator<Item = (&str, &MergedRecord)> {
        self.records
            .iter()
            .map(|(id, record)| (id.as_str(), record))
    }

    /// Number of entities with a non-null value in `column`
    pub fn non_null_count(&self, column: &MergedColumn) -> usize {
        self.records
            .values()
            .filter(|record| record.is_present(column))
            .count()
    }
}

/// Result of a merge: the table plus what later stages need to walk it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutput {
    pub table: MergedTable,
    /// Snapshot labels in ascending order
    pub labels: Vec<String>,
    pub entity_column: String,
    /// The plot attribute's column for every label, in label order
    pub plot_columns: Vec<MergedColumn>,
}

/// Merges snapshots into a [`MergedTable`]
#[derive(Debug, Clone, Default)]
pub struct TableMerger {
    plot_attribute: Option<String>,
}

impl TableMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the attribute whose values become diagram nodes
    ///
    /// Without this the first attribute column of the first snapshot is used.
    pub fn with_plot_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.plot_attribute = Some(attribute.into());
        self
    }

    /// Consume the snapshot sequence and outer-join every snapshot on entity id
    pub fn merge<I>(&self, snapshots: I, ctx: &PipelineContext) -> Result<MergeOutput>
    where
        I: IntoIterator<Item = Result<Snapshot>>,
    {
        let merge_span = span!(parent: ctx.span(), Level::INFO, "merge_snapshots");
        let _enter = merge_span.enter();

        trace!("Starting snapshot merge");

        let mut table: Option<MergedTable> = None;
        let mut plot_attribute = self.plot_attribute.clone();
        let mut seen_labels: HashSet<String> = HashSet::new();

        for snapshot in snapshots {
            let snapshot = snapshot?;
            debug!(
                label = %snapshot.label,
                rows = snapshot.row_count(),
                "Merging snapshot"
            );

            let table =
                table.get_or_insert_with(|| MergedTable::new(snapshot.entity_column.clone()));

            if !seen_labels.insert(snapshot.label.clone()) {
                return Err(SankeyError::merge_key_collision(
                    &snapshot.label,
                    &snapshot.label,
                    "snapshot label appears more than once",
                ));
            }

            if snapshot.entity_column != table.entity_column {
                return Err(SankeyError::merge_key_collision(
                    &snapshot.label,
                    &snapshot.entity_column,
                    format!(
                        "entity column differs from '{}' used by earlier snapshots",
                        table.entity_column
                    ),
                ));
            }

            let attribute = match &plot_attribute {
                Some(attribute) => attribute.clone(),
                None => {
                    let first = snapshot.attribute_columns.first().cloned().ok_or_else(|| {
                        SankeyError::merge_key_collision(
                            &snapshot.label,
                            &snapshot.entity_column,
                            "snapshot has no attribute columns",
                        )
                    })?;
                    debug!(plot_attribute = %first, "Using first attribute column for nodes");
                    plot_attribute = Some(first.clone());
                    first
                }
            };

            if !snapshot.attribute_columns.contains(&attribute) {
                return Err(SankeyError::merge_key_collision(
                    &snapshot.label,
                    &attribute,
                    "snapshot lacks the plot attribute column",
                ));
            }

            Self::join_snapshot(table, snapshot)?;
        }

        let Some(mut table) = table else {
            return Err(SankeyError::SourceExhausted {
                component: Component::TableMerger,
            });
        };
        // Set by the first snapshot at the latest.
        let attribute = plot_attribute.unwrap_or_default();

        let mut labels: Vec<String> = seen_labels.into_iter().collect();
        labels.sort();
        table.labels = labels.clone();

        let plot_columns = labels
            .iter()
            .map(|label| MergedColumn::new(&attribute, label))
            .collect();

        info!(
            snapshots = labels.len(),
            entities = table.entity_count(),
            columns = table.columns.len(),
            "Snapshot merge completed"
        );

        Ok(MergeOutput {
            entity_column: table.entity_column.clone(),
            labels,
            plot_columns,
            table,
        })
    }

    /// Outer-join one snapshot's rows into the running table
    fn join_snapshot(table: &mut MergedTable, snapshot: Snapshot) -> Result<()> {
        let Snapshot {
            label,
            attribute_columns,
            rows,
            ..
        } = snapshot;

        let columns: Vec<MergedColumn> = attribute_columns
            .iter()
            .map(|attribute| MergedColumn::new(attribute, &label))
            .collect();

        let mut joined: BTreeMap<String, Vec<(MergedColumn, Option<String>)>> = BTreeMap::new();
        for row in rows {
            let values: Vec<(MergedColumn, Option<String>)> = attribute_columns
                .iter()
                .zip(&columns)
                .map(|(attribute, column)| {
                    (column.clone(), row.values.get(attribute).cloned().flatten())
                })
                .collect();

            match joined.get(&row.entity) {
                Some(existing) if *existing == values => {
                    debug!(label = %label, entity = %row.entity, "Collapsing duplicate row");
                }
                Some(_) => {
                    return Err(SankeyError::merge_key_collision(
                        &label,
                        &row.entity,
                        "entity appears twice with conflicting values",
                    ));
                }
                None => {
                    joined.insert(row.entity, values);
                }
            }
        }

        table.columns.extend(columns);
        for (entity, values) in joined {
            let record = table.records.entry(entity).or_default();
            record.values.extend(values);
        }

        Ok(())
    }
}
