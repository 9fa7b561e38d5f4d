//! Source folder scanning and sequence ordering.
//!
//! The file system's embedded sequence numbers (IMG_0042, DSC01234, ...)
//! are the ground truth for acquisition order; file metadata is never
//! consulted.

use std::path::{Path, PathBuf};

use contracts::AlignError;
use tracing::warn;

/// Extensions accepted as camera frames (case-insensitive).
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

/// One candidate file with its filename-embedded sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedFile {
    /// Sequence number parsed from the filename
    pub sequence: u64,

    /// Full path to the file
    pub path: PathBuf,
}

/// Scan a source folder and return its image files in sequence order.
///
/// Image files without a digit run in their stem are reported and dropped
/// (recoverable). A missing or unreadable folder is fatal for the run.
pub fn scan_source(source_id: &str, folder: &Path) -> Result<Vec<SequencedFile>, AlignError> {
    if !folder.is_dir() {
        return Err(AlignError::source_missing(source_id, folder));
    }

    let entries = std::fs::read_dir(folder)
        .map_err(|e| AlignError::source_unreadable(source_id, folder, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| AlignError::source_unreadable(source_id, folder, e.to_string()))?;
        let path = entry.path();

        if !is_image_file(&path) {
            continue;
        }

        match sequence_number(&path) {
            Some(sequence) => files.push(SequencedFile { sequence, path }),
            None => {
                warn!(
                    source_id = %source_id,
                    file = %path.display(),
                    "skipping file without sequence number in name"
                );
                metrics::counter!(
                    "still_syncer_frames_skipped_total",
                    "source_id" => source_id.to_string(),
                    "reason" => "unsequenced"
                )
                .increment(1);
            }
        }
    }

    // Filename as tie-break keeps the order total when cameras restart
    // their counters mid-session
    files.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });

    Ok(files)
}

fn is_image_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|&known| known == ext)
        })
        .unwrap_or(false)
}

/// Sequence number = the last run of ASCII digits in the file stem.
///
/// "IMG_0042" → 42, "DSC01234" → 1234, "frame-7-final2" → 2.
fn sequence_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;

    let mut last_run: Option<&str> = None;
    let mut run_start = None;
    for (i, c) in stem.char_indices() {
        if c.is_ascii_digit() {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            last_run = Some(&stem[start..i]);
        }
    }
    if let Some(start) = run_start {
        last_run = Some(&stem[start..]);
    }

    last_run?.parse().ok()
}
