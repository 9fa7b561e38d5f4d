//! Capture and Catalog - Catalog Builder output
//!
//! A `Catalog` is the timestamp-indexed set of accepted captures for one
//! source, built once per source and immutable afterwards.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::PathBuf;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::SourceId;

/// One accepted photograph from a source.
///
/// `mean_brightness` is consumed by the exposure filter during catalog
/// construction and is not retained here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// Source this capture belongs to
    pub source: SourceId,

    /// Ordinal of the source in configuration order (0 = reference)
    pub source_index: usize,

    /// Sequence number extracted from the filename
    pub sequence: u64,

    /// Embedded capture timestamp, truncated to whole seconds
    pub timestamp: NaiveDateTime,

    /// Path to the image file on disk
    pub file: PathBuf,
}

/// Timestamp-indexed set of accepted captures for one source.
///
/// Invariant: at most one capture per exact timestamp. A later file with the
/// same timestamp overwrites the earlier entry; this is accepted behavior,
/// not an error. Iteration order is ascending timestamp order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    source: SourceId,
    source_index: usize,
    entries: BTreeMap<NaiveDateTime, Capture>,
    /// Timestamp of the first capture accepted in file sequence order.
    /// This is the calibration anchor, which is distinct from the earliest
    /// timestamp when a source's clock produced out-of-order captures.
    first_by_sequence: Option<NaiveDateTime>,
}

impl Catalog {
    /// Create an empty catalog for a source.
    pub fn new(source: SourceId, source_index: usize) -> Self {
        Self {
            source,
            source_index,
            entries: BTreeMap::new(),
            first_by_sequence: None,
        }
    }

    /// Source this catalog belongs to.
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Ordinal of the source in configuration order.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Insert a capture, returning the entry it displaced (if any).
    ///
    /// Captures must be inserted in file sequence order; the first insert
    /// fixes the calibration anchor.
    pub fn insert(&mut self, capture: Capture) -> Option<Capture> {
        if self.first_by_sequence.is_none() {
            self.first_by_sequence = Some(capture.timestamp);
        }
        self.entries.insert(capture.timestamp, capture)
    }

    /// The earliest capture by original file sequence order.
    ///
    /// Returns `None` for an empty catalog, which is fatal for calibration.
    pub fn first_capture(&self) -> Option<&Capture> {
        self.first_by_sequence
            .and_then(|ts| self.entries.get(&ts))
    }

    /// All captures whose timestamp lies strictly within `width` of
    /// `target`, in ascending timestamp order.
    ///
    /// A zero width means exact equality; for a wider window a capture
    /// sitting exactly at the edge is outside it. `target` is expressed in
    /// this source's own clock; callers translate reference times through
    /// the source's offset before querying.
    pub fn candidates_within(
        &self,
        target: NaiveDateTime,
        width: TimeDelta,
    ) -> impl Iterator<Item = &Capture> {
        let range = if width <= TimeDelta::zero() {
            (Bound::Included(target), Bound::Included(target))
        } else {
            (Bound::Excluded(target - width), Bound::Excluded(target + width))
        };
        self.entries.range(range).map(|(_, capture)| capture)
    }

    /// Iterate captures in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = &Capture> {
        self.entries.values()
    }

    /// Number of captures in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog holds no captures.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Capture;
    type IntoIter = btree_map::Values<'a, NaiveDateTime, Capture>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
