//! Catalog construction over a scanned source.

use std::path::Path;

use contracts::{AlignError, Capture, Catalog, SourceId};
use tracing::{debug, info, instrument, warn};

use crate::probe::CaptureProbe;
use crate::scanner::scan_source;

/// Per-source build counters, reported after every catalog build.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogStats {
    /// Captures that made it into the catalog
    pub accepted: u64,

    /// Frames discarded by the underexposure filter
    pub skipped_underexposed: u64,

    /// Frames whose decode or timestamp extraction failed
    pub skipped_unreadable: u64,

    /// Accepted frames displaced by a later frame with the same timestamp
    pub overwritten_duplicates: u64,
}

impl CatalogStats {
    /// Total frames that were dropped for any reason.
    pub fn skipped(&self) -> u64 {
        self.skipped_underexposed + self.skipped_unreadable
    }
}

/// Builds one immutable `Catalog` per source folder.
pub struct CatalogBuilder<P> {
    probe: P,
    underexposure_threshold: u32,
}

impl<P: CaptureProbe> CatalogBuilder<P> {
    /// Create a builder with the given probe and underexposure threshold
    /// (channel-sum scale, fully black ≈ 0).
    pub fn new(probe: P, underexposure_threshold: u32) -> Self {
        Self {
            probe,
            underexposure_threshold,
        }
    }

    /// Build the catalog for one source.
    ///
    /// Walks the folder's files in sequence order; underexposed and
    /// unreadable frames are skipped with a diagnostic and never abort the
    /// source. An empty result is not an error here; it becomes fatal at
    /// calibration, where the missing anchor is detected.
    #[instrument(
        name = "catalog_build",
        skip(self, folder),
        fields(source_id = %source, folder = %folder.display())
    )]
    pub fn build(
        &self,
        source: SourceId,
        source_index: usize,
        folder: &Path,
    ) -> Result<(Catalog, CatalogStats), AlignError> {
        let files = scan_source(&source, folder)?;

        let mut catalog = Catalog::new(source.clone(), source_index);
        let mut stats = CatalogStats::default();

        for file in files {
            let brightness = match self.probe.brightness(&file.path) {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        source_id = %source,
                        file = %file.path.display(),
                        error = %e,
                        "skipping unreadable frame"
                    );
                    self.count_skip(&source, "unreadable");
                    stats.skipped_unreadable += 1;
                    continue;
                }
            };

            if brightness < self.underexposure_threshold {
                warn!(
                    source_id = %source,
                    file = %file.path.display(),
                    brightness,
                    threshold = self.underexposure_threshold,
                    "skipping underexposed frame"
                );
                self.count_skip(&source, "underexposed");
                stats.skipped_underexposed += 1;
                continue;
            }

            let timestamp = match self.probe.timestamp(&file.path) {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        source_id = %source,
                        file = %file.path.display(),
                        error = %e,
                        "skipping frame without capture timestamp"
                    );
                    self.count_skip(&source, "unreadable");
                    stats.skipped_unreadable += 1;
                    continue;
                }
            };

            let displaced = catalog.insert(Capture {
                source: source.clone(),
                source_index,
                sequence: file.sequence,
                timestamp,
                file: file.path,
            });

            if let Some(old) = displaced {
                debug!(
                    source_id = %source,
                    timestamp = %timestamp,
                    displaced = %old.file.display(),
                    "duplicate timestamp, later frame wins"
                );
                stats.overwritten_duplicates += 1;
                // Displaced entry was already counted as accepted
                stats.accepted -= 1;
            }
            stats.accepted += 1;
        }

        metrics::counter!(
            "still_syncer_captures_accepted_total",
            "source_id" => source.to_string()
        )
        .increment(stats.accepted);

        info!(
            source_id = %source,
            accepted = stats.accepted,
            skipped_underexposed = stats.skipped_underexposed,
            skipped_unreadable = stats.skipped_unreadable,
            overwritten = stats.overwritten_duplicates,
            "catalog built"
        );

        Ok((catalog, stats))
    }

    fn count_skip(&self, source: &SourceId, reason: &'static str) {
        metrics::counter!(
            "still_syncer_frames_skipped_total",
            "source_id" => source.to_string(),
            "reason" => reason
        )
        .increment(1);
    }
}
