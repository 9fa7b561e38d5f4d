//! Batch - Align Engine output
//!
//! One time-aligned group: a reference capture plus its matched peers from
//! the other sources, ready for the sequence encoder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Capture, SourceId};

/// One aligned group of captures.
///
/// Holds non-owning references into the catalogs; catalogs must remain alive
/// for the lifetime of all downstream batch processing. Immutable once the
/// assembler emits it, consumed exactly once by the sequence encoder.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    /// Position in reference-capture timestamp order, used for output naming
    pub index: usize,

    /// The capture from the reference source (source index 0)
    pub reference: &'a Capture,

    /// Matched peer captures, at most one per non-reference source,
    /// ordered by ascending source index
    pub matched: Vec<&'a Capture>,

    /// Per-batch match diagnostics
    pub meta: BatchMeta,
}

impl<'a> Batch<'a> {
    /// All frames of the batch in encoding order: the reference capture
    /// followed by the matched captures in ascending source index order.
    pub fn frames(&self) -> impl Iterator<Item = &'a Capture> + '_ {
        std::iter::once(self.reference).chain(self.matched.iter().copied())
    }

    /// Number of sources that contributed a capture (reference included).
    pub fn contributing_sources(&self) -> usize {
        1 + self.matched.len()
    }

    /// Whether every configured source contributed a capture.
    pub fn is_fully_matched(&self, source_total: usize) -> bool {
        self.contributing_sources() == source_total
    }
}

/// Match diagnostics for one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchMeta {
    /// Reference source ID
    pub reference_source: SourceId,

    /// Sources with no candidate at the widest tolerance
    pub unmatched_sources: Vec<SourceId>,

    /// Sources where several candidates shared the winning tolerance width
    pub ambiguous_sources: Vec<SourceId>,

    /// Tolerance width (whole seconds) that produced each source's match
    pub tolerance_used_s: HashMap<SourceId, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn capture(source: &str, index: usize, second: u32) -> Capture {
        Capture {
            source: source.into(),
            source_index: index,
            sequence: u64::from(second),
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(10, 0, second)
                .unwrap(),
            file: PathBuf::from(format!("{source}_{second}.jpg")),
        }
    }

    #[test]
    fn test_frames_order_reference_first() {
        let reference = capture("cam1", 0, 0);
        let a = capture("cam2", 1, 1);
        let b = capture("cam3", 2, 2);

        let batch = Batch {
            index: 0,
            reference: &reference,
            matched: vec![&a, &b],
            meta: BatchMeta::default(),
        };

        let order: Vec<_> = batch.frames().map(|c| c.source_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(batch.contributing_sources(), 3);
        assert!(batch.is_fully_matched(3));
        assert!(!batch.is_fully_matched(4));
    }

    #[test]
    fn test_meta_serde_round_trip() {
        let mut meta = BatchMeta {
            reference_source: "cam1".into(),
            unmatched_sources: vec!["cam3".into()],
            ambiguous_sources: vec![],
            tolerance_used_s: HashMap::new(),
        };
        meta.tolerance_used_s.insert("cam2".into(), 2);

        let json = serde_json::to_string(&meta).unwrap();
        let back: BatchMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reference_source, "cam1");
        assert_eq!(back.unmatched_sources, vec![SourceId::from("cam3")]);
        assert_eq!(back.tolerance_used_s.get("cam2"), Some(&2));
    }
}
