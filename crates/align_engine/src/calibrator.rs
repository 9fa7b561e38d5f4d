//! Per-source clock offset calibration.
//!
//! All cameras are assumed to have begun their capture sequence at
//! effectively the same real-world instant; each source's first accepted
//! frame (by file sequence order) anchors its clock against the reference.

use chrono::TimeDelta;
use contracts::{AlignError, Catalog};
use tracing::{info, instrument};

/// Per-source clock corrections, index-aligned with the catalog list.
///
/// `offset[i]` = reference first-capture timestamp − source i first-capture
/// timestamp, so a source whose clock runs behind the reference gets a
/// positive offset. Index 0 is the zero duration by definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: Vec<TimeDelta>,
}

impl OffsetTable {
    /// Build a table from already-known offsets, index-aligned with the
    /// catalog list.
    pub fn new(offsets: Vec<TimeDelta>) -> Self {
        Self { offsets }
    }

    /// Offset for the source at `index`.
    pub fn get(&self, index: usize) -> TimeDelta {
        self.offsets[index]
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Iterate offsets in source index order.
    pub fn iter(&self) -> impl Iterator<Item = TimeDelta> + '_ {
        self.offsets.iter().copied()
    }
}

/// Derive every source's clock offset against the reference (index 0).
///
/// Fails fatally on the first source without a calibration anchor; there
/// is no meaningful partial alignment without every source's reference
/// point. Deterministic: identical catalogs yield identical offsets.
#[instrument(name = "calibrate_offsets", skip(catalogs), fields(sources = catalogs.len()))]
pub fn calibrate(catalogs: &[Catalog]) -> Result<OffsetTable, AlignError> {
    let reference = catalogs
        .first()
        .ok_or_else(|| AlignError::Other("no sources to calibrate".to_string()))?;

    let reference_first = reference
        .first_capture()
        .ok_or_else(|| AlignError::empty_catalog(reference.source().as_str()))?;

    let mut offsets = Vec::with_capacity(catalogs.len());
    for catalog in catalogs {
        let first = catalog
            .first_capture()
            .ok_or_else(|| AlignError::empty_catalog(catalog.source().as_str()))?;

        let offset = reference_first.timestamp - first.timestamp;
        info!(
            source_id = %catalog.source(),
            first_capture = %first.timestamp,
            offset_s = offset.num_seconds(),
            "clock offset calibrated"
        );
        metrics::gauge!(
            "still_syncer_clock_offset_s",
            "source_id" => catalog.source().to_string()
        )
        .set(offset.num_seconds() as f64);

        offsets.push(offset);
    }

    Ok(OffsetTable { offsets })
}
