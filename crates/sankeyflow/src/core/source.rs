//! Snapshot source seam
//!
//! A source produces a lazy, single-pass sequence of snapshots. Pulling the
//! next item may block on I/O; the pipeline treats it as an opaque pull.
//! Restartability, retries and timeouts are the source's business.

use super::{Result, Snapshot};

/// Lazy sequence of snapshots, consumed exactly once
pub type SnapshotStream = Box<dyn Iterator<Item = Result<Snapshot>>>;

/// Core trait for snapshot producers
///
/// `snapshots` takes `self` by value: once the stream is handed out the
/// source is gone, so a second pass is impossible by construction.
pub trait SnapshotSource {
    /// Turn this source into its lazy snapshot stream
    fn snapshots(self: Box<Self>) -> SnapshotStream;

    /// Get the name of this source type
    fn name(&self) -> &'static str;
}

/// In-memory source over already materialized snapshots
#[derive(Debug, Clone, Default)]
pub struct VecSnapshotSource {
    snapshots: Vec<Snapshot>,
}

impl VecSnapshotSource {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self { snapshots }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotSource for VecSnapshotSource {
    fn snapshots(self: Box<Self>) -> SnapshotStream {
        Box::new(self.snapshots.into_iter().map(Ok))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_yields_in_order() {
        let source = VecSnapshotSource::new(vec![
            Snapshot::new("2014", "Name", vec!["Party".to_string()]),
            Snapshot::new("2010", "Name", vec!["Party".to_string()]),
        ]);
        assert_eq!(source.len(), 2);
        assert_eq!(source.name(), "memory");

        let labels: Vec<String> = Box::new(source)
            .snapshots()
            .map(|s| s.unwrap().label)
            .collect();
        assert_eq!(labels, vec!["2014", "2010"]);
    }
}
