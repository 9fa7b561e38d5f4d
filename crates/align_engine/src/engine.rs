//! Engine facade: calibrate → match → assemble.

use chrono::TimeDelta;
use contracts::{AlignConfig, AlignError, Batch, Catalog};
use tracing::instrument;

use crate::assembler::assemble;
use crate::calibrator::calibrate;
use crate::matcher::TemporalMatcher;

/// Multi-source temporal alignment engine.
///
/// Consumes fully-built, immutable catalogs and produces the ordered batch
/// list. All state is read-only after construction; the engine can be
/// reused across catalog sets.
#[derive(Debug, Clone)]
pub struct AlignEngine {
    tolerance_steps: Vec<TimeDelta>,
}

impl AlignEngine {
    /// Create an engine from the blueprint's align section.
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            tolerance_steps: config.tolerance_steps(),
        }
    }

    /// Create an engine with explicit tolerance steps (narrowest first).
    pub fn with_tolerance_steps(tolerance_steps: Vec<TimeDelta>) -> Self {
        Self { tolerance_steps }
    }

    /// Align all catalogs against the reference (index 0) and return the
    /// ordered batch list.
    ///
    /// Fails fatally when any catalog lacks a calibration anchor; per-batch
    /// match gaps surface in each batch's metadata instead.
    #[instrument(name = "align", skip(self, catalogs), fields(sources = catalogs.len()))]
    pub fn align<'a>(&self, catalogs: &'a [Catalog]) -> Result<Vec<Batch<'a>>, AlignError> {
        let offsets = calibrate(catalogs)?;
        let matcher = TemporalMatcher::new(catalogs, offsets, self.tolerance_steps.clone());
        Ok(assemble(&catalogs[0], &matcher, catalogs.len()))
    }
}

impl Default for AlignEngine {
    fn default() -> Self {
        Self::new(&AlignConfig::default())
    }
}
