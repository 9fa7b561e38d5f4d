//! Resume manifest keyed by a config content hash.
//!
//! Replaces the implicit "batches folder exists, skip work" checkpointing:
//! completed batches are recorded explicitly, and a manifest written for a
//! different configuration is ignored wholesale. Directory presence never
//! decides correctness.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::EncodeError;

/// Manifest file name inside the output folder.
pub const MANIFEST_FILE: &str = "manifest.json";

/// SHA-256 hex digest of the canonical blueprint serialization.
pub fn config_digest(canonical_config: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_config.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Record of completed batches for one configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Digest of the configuration the completed set belongs to
    pub config_digest: String,

    /// Indices of batches whose GIF has been fully written
    pub completed: BTreeSet<usize>,
}

impl RunManifest {
    /// Fresh manifest for a configuration digest.
    pub fn new(config_digest: String) -> Self {
        Self {
            config_digest,
            completed: BTreeSet::new(),
        }
    }

    /// Load the manifest for this digest from `out_dir`, or start fresh.
    ///
    /// A missing, unreadable, or stale-digest manifest yields a fresh one;
    /// resuming is an optimization, never a correctness dependency.
    pub fn load_or_new(out_dir: &Path, config_digest: &str) -> Self {
        let path = out_dir.join(MANIFEST_FILE);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::new(config_digest.to_string()),
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(manifest) if manifest.config_digest == config_digest => {
                info!(
                    path = %path.display(),
                    completed = manifest.completed.len(),
                    "resume manifest loaded"
                );
                manifest
            }
            Ok(_) => {
                warn!(
                    path = %path.display(),
                    "manifest belongs to a different configuration, starting fresh"
                );
                Self::new(config_digest.to_string())
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable manifest, starting fresh"
                );
                Self::new(config_digest.to_string())
            }
        }
    }

    /// Whether a batch has already been encoded under this configuration.
    pub fn is_completed(&self, batch_index: usize) -> bool {
        self.completed.contains(&batch_index)
    }

    /// Mark a batch as encoded.
    pub fn record(&mut self, batch_index: usize) {
        self.completed.insert(batch_index);
    }

    /// Persist the manifest into `out_dir`.
    pub fn save(&self, out_dir: &Path) -> Result<(), EncodeError> {
        let path = out_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EncodeError::manifest(&path, e.to_string()))?;
        fs::write(&path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable() {
        let a = config_digest("root = \"/data\"");
        let b = config_digest("root = \"/data\"");
        let c = config_digest("root = \"/other\"");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let digest = config_digest("config-v1");

        let mut manifest = RunManifest::new(digest.clone());
        manifest.record(0);
        manifest.record(2);
        manifest.save(dir.path()).unwrap();

        let loaded = RunManifest::load_or_new(dir.path(), &digest);
        assert!(loaded.is_completed(0));
        assert!(!loaded.is_completed(1));
        assert!(loaded.is_completed(2));
    }

    #[test]
    fn test_stale_digest_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();

        let mut manifest = RunManifest::new(config_digest("old-config"));
        manifest.record(0);
        manifest.save(dir.path()).unwrap();

        let loaded = RunManifest::load_or_new(dir.path(), &config_digest("new-config"));
        assert!(!loaded.is_completed(0));
        assert!(loaded.completed.is_empty());
    }

    #[test]
    fn test_missing_manifest_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = RunManifest::load_or_new(dir.path(), "digest");
        assert!(loaded.completed.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "not json {{").unwrap();

        let loaded = RunManifest::load_or_new(dir.path(), "digest");
        assert!(loaded.completed.is_empty());
    }
}
