//! Tolerance-based nearest matching across sources.
//!
//! For every reference capture the matcher walks the other sources in
//! ascending index order and searches each source's catalog with an
//! escalating tolerance window. The narrowest window is evaluated first and
//! only widened while it yields no candidate at all; once any width yields
//! one or more candidates the matcher stops widening and takes the first
//! candidate in catalog iteration order. Naive closest-in-time selection
//! would silently change results.
//!
//! Window semantics: the zero step requires timestamp equality; a step of
//! w seconds is an open interval, so a candidate exactly w away stays
//! outside it.

use std::collections::HashMap;

use chrono::TimeDelta;
use contracts::{Capture, Catalog, SourceId};
use tracing::{instrument, warn};

use crate::calibrator::OffsetTable;

/// Outcome of matching one reference capture against all other sources.
#[derive(Debug, Clone, Default)]
pub struct MatchSet<'a> {
    /// Chosen captures, at most one per non-reference source,
    /// in ascending source index order
    pub matched: Vec<&'a Capture>,

    /// Sources with no candidate at the widest tolerance
    pub unmatched_sources: Vec<SourceId>,

    /// Sources where several candidates shared the winning width
    pub ambiguous_sources: Vec<SourceId>,

    /// Winning tolerance width (whole seconds) per matched source
    pub tolerance_used_s: HashMap<SourceId, i64>,
}

/// Matches reference captures against the other sources' catalogs.
pub struct TemporalMatcher<'a> {
    catalogs: &'a [Catalog],
    offsets: OffsetTable,
    tolerance_steps: Vec<TimeDelta>,
}

impl<'a> TemporalMatcher<'a> {
    /// Create a matcher over fully-built catalogs and calibrated offsets.
    ///
    /// `catalogs[0]` is the reference source; `offsets` is index-aligned
    /// with `catalogs`.
    pub fn new(
        catalogs: &'a [Catalog],
        offsets: OffsetTable,
        tolerance_steps: Vec<TimeDelta>,
    ) -> Self {
        Self {
            catalogs,
            offsets,
            tolerance_steps,
        }
    }

    /// Find the best corresponding capture in every non-reference source.
    ///
    /// Pure reads over immutable catalogs; safe to call concurrently for
    /// different reference captures.
    #[instrument(
        name = "match_reference",
        level = "debug",
        skip(self, reference),
        fields(reference = %reference.timestamp)
    )]
    pub fn match_reference(&self, reference: &Capture) -> MatchSet<'a> {
        let mut set = MatchSet::default();

        for catalog in &self.catalogs[1..] {
            let source = catalog.source().clone();
            // Translate the reference instant into this source's clock:
            // normalized source time = timestamp + offset, so the window
            // center in raw source time is reference − offset.
            let target = reference.timestamp - self.offsets.get(catalog.source_index());

            match self.search(catalog, target) {
                Some((capture, width, candidate_total)) => {
                    if candidate_total > 1 {
                        let candidates: Vec<String> = catalog
                            .candidates_within(target, width)
                            .map(|c| c.file.display().to_string())
                            .collect();
                        warn!(
                            reference = %reference.file.display(),
                            source_id = %source,
                            width_s = width.num_seconds(),
                            candidates = ?candidates,
                            "ambiguous match, taking first candidate"
                        );
                        self.count_match(&source, "ambiguous");
                        set.ambiguous_sources.push(source.clone());
                    } else {
                        self.count_match(&source, "matched");
                    }
                    set.tolerance_used_s
                        .insert(source, width.num_seconds());
                    set.matched.push(capture);
                }
                None => {
                    warn!(
                        reference = %reference.file.display(),
                        source_id = %source,
                        widest_s = self
                            .tolerance_steps
                            .last()
                            .map(|t| t.num_seconds())
                            .unwrap_or(0),
                        "no match found"
                    );
                    self.count_match(&source, "unmatched");
                    set.unmatched_sources.push(source);
                }
            }
        }

        set
    }

    /// Walk the tolerance steps, narrowest first, and stop at the first
    /// width that yields any candidate. Returns the first candidate in
    /// catalog iteration order, the winning width, and the candidate count.
    fn search(
        &self,
        catalog: &'a Catalog,
        target: chrono::NaiveDateTime,
    ) -> Option<(&'a Capture, TimeDelta, usize)> {
        for &width in &self.tolerance_steps {
            let mut candidates = catalog.candidates_within(target, width);
            if let Some(first) = candidates.next() {
                return Some((first, width, 1 + candidates.count()));
            }
        }
        None
    }

    fn count_match(&self, source: &SourceId, status: &'static str) {
        metrics::counter!(
            "still_syncer_matches_total",
            "source_id" => source.to_string(),
            "status" => status
        )
        .increment(1);
    }
}
