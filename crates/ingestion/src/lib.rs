//! # Ingestion
//!
//! Capture Catalog Builder: turns one camera source folder into a
//! timestamp-indexed `Catalog`.
//!
//! Responsibilities:
//! - Scan the source folder and order files by the sequence number embedded
//!   in their filenames (acquisition order, not file metadata)
//! - Filter out underexposed frames by a single-pixel brightness probe
//! - Extract the embedded capture timestamp for every surviving frame
//! - Report every skipped frame without aborting the source
//!
//! Per-frame probing goes through the [`CaptureProbe`] trait so catalog
//! construction is testable without camera files; [`ImageProbe`] is the
//! production implementation (image decode + EXIF).

mod builder;
mod image_probe;
mod mock;
mod probe;
mod scanner;

pub use builder::{CatalogBuilder, CatalogStats};
pub use image_probe::{mean_brightness, ImageProbe};
pub use mock::{MockProbe, MockSample};
pub use probe::{CaptureProbe, ProbeError};
pub use scanner::{scan_source, SequencedFile};
