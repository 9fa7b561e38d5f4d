//! Batch assembly in reference-capture order.

use contracts::{Batch, BatchMeta, Catalog};
use tracing::info;

use crate::matcher::TemporalMatcher;

/// Package every reference capture with its matched peers into an ordered
/// batch list.
///
/// No filtering happens here: a batch whose `matched` list is empty is
/// still emitted, and it is the sequence encoder's call whether an
/// under-populated batch is worth encoding. Batch order is the reference
/// catalog's iteration order (ascending timestamp), so emission stays
/// deterministic regardless of how the matching work is scheduled.
pub fn assemble<'a>(
    reference_catalog: &'a Catalog,
    matcher: &TemporalMatcher<'a>,
    source_total: usize,
) -> Vec<Batch<'a>> {
    let mut batches = Vec::with_capacity(reference_catalog.len());

    for (index, reference) in reference_catalog.iter().enumerate() {
        let outcome = matcher.match_reference(reference);

        let batch = Batch {
            index,
            reference,
            matched: outcome.matched,
            meta: BatchMeta {
                reference_source: reference_catalog.source().clone(),
                unmatched_sources: outcome.unmatched_sources,
                ambiguous_sources: outcome.ambiguous_sources,
                tolerance_used_s: outcome.tolerance_used_s,
            },
        };

        info!(
            batch = batch.index,
            reference = %batch.reference.timestamp,
            contributing = batch.contributing_sources(),
            total = source_total,
            "batch assembled"
        );
        metrics::histogram!("still_syncer_batch_contributing_sources")
            .record(batch.contributing_sources() as f64);

        batches.push(batch);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrator::calibrate;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use contracts::Capture;
    use std::path::PathBuf;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn catalog(source: &str, index: usize, stamps: &[NaiveDateTime]) -> Catalog {
        let mut catalog = Catalog::new(source.into(), index);
        for (seq, &timestamp) in stamps.iter().enumerate() {
            catalog.insert(Capture {
                source: source.into(),
                source_index: index,
                sequence: seq as u64 + 1,
                timestamp,
                file: PathBuf::from(format!("{source}_{:04}.jpg", seq + 1)),
            });
        }
        catalog
    }

    fn steps() -> Vec<TimeDelta> {
        vec![
            TimeDelta::zero(),
            TimeDelta::seconds(1),
            TimeDelta::seconds(2),
            TimeDelta::seconds(3),
        ]
    }

    #[test]
    fn test_batch_order_is_reference_timestamp_order() {
        let catalogs = vec![
            catalog(
                "cam1",
                0,
                &[ts(10, 0, 6), ts(10, 0, 0), ts(10, 0, 3)], // inserted out of order
            ),
            catalog("cam2", 1, &[ts(10, 0, 0), ts(10, 0, 3), ts(10, 0, 6)]),
        ];
        let offsets = calibrate(&catalogs).unwrap();
        let matcher = TemporalMatcher::new(&catalogs, offsets, steps());

        let batches = assemble(&catalogs[0], &matcher, catalogs.len());

        assert_eq!(batches.len(), 3);
        for window in batches.windows(2) {
            assert!(window[0].reference.timestamp <= window[1].reference.timestamp);
        }
        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.index, i);
        }
    }

    #[test]
    fn test_empty_match_batch_is_still_emitted() {
        let catalogs = vec![
            catalog("cam1", 0, &[ts(10, 0, 0), ts(10, 0, 30)]),
            catalog("cam2", 1, &[ts(10, 0, 0)]),
        ];
        let offsets = calibrate(&catalogs).unwrap();
        let matcher = TemporalMatcher::new(&catalogs, offsets, steps());

        let batches = assemble(&catalogs[0], &matcher, catalogs.len());

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].contributing_sources(), 2);
        // Second reference capture found no peer, batch emitted regardless
        assert_eq!(batches[1].contributing_sources(), 1);
        assert!(batches[1].matched.is_empty());
        assert_eq!(batches[1].meta.unmatched_sources.len(), 1);
    }
}
