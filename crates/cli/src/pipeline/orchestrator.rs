//! Pipeline orchestrator - coordinates all components.
//!
//! Catalog building fans out per source (image reads are I/O bound); the
//! alignment and encoding stages run over the finished, immutable catalogs,
//! so batch order stays deterministic regardless of task scheduling.

use std::time::Instant;

use align_engine::AlignEngine;
use anyhow::{Context, Result};
use contracts::{Catalog, SessionBlueprint, SourceId};
use gif_encoder::{config_digest, EncoderConfig, RunManifest, SequenceEncoder};
use ingestion::{CatalogBuilder, CatalogStats, ImageProbe};
use observability::{record_batch_metrics, record_catalog_metrics, AlignMetricsAggregator};
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The session blueprint configuration
    pub blueprint: SessionBlueprint,

    /// Maximum number of batches to encode (None = unlimited)
    pub max_batches: Option<u64>,

    /// Skip batches recorded as completed for this configuration
    pub resume: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Stage 1: build catalogs, one blocking task per source
        let catalogs = Self::build_catalogs(blueprint).await?;

        let mut captures_accepted = 0u64;
        let mut captures_skipped = 0u64;
        for (catalog, stats) in &catalogs {
            record_catalog_metrics(catalog.source(), stats.accepted, stats.skipped());
            captures_accepted += stats.accepted;
            captures_skipped += stats.skipped();
        }
        let catalogs: Vec<Catalog> = catalogs.into_iter().map(|(catalog, _)| catalog).collect();

        // Stage 2: calibrate + match + assemble over immutable catalogs
        let engine = AlignEngine::new(&blueprint.align);
        let batches = engine.align(&catalogs).context("Alignment failed")?;
        info!(batches = batches.len(), "alignment complete");

        // Stage 3: encode batch by batch in reference order
        let out_dir = blueprint.output_path();
        let canonical = config_loader::ConfigLoader::to_toml(blueprint)
            .context("Failed to canonicalize configuration for the resume manifest")?;
        let digest = config_digest(&canonical);
        let mut manifest = if self.config.resume {
            RunManifest::load_or_new(&out_dir, &digest)
        } else {
            RunManifest::new(digest)
        };

        let mut aggregator = AlignMetricsAggregator::new();
        let mut encoder = SequenceEncoder::new(EncoderConfig::from_output(&blueprint.output));
        let mut batches_encoded = 0u64;
        let mut batches_skipped_resume = 0u64;

        for batch in &batches {
            if let Some(max) = self.config.max_batches {
                if batch.index as u64 >= max {
                    debug!(max_batches = max, "batch limit reached");
                    break;
                }
            }

            record_batch_metrics(&batch.meta, batch.index);
            aggregator.update(&batch.meta, batch.contributing_sources(), catalogs.len());

            if manifest.is_completed(batch.index) {
                debug!(batch = batch.index, "already encoded, skipping");
                batches_skipped_resume += 1;
                continue;
            }

            encoder
                .encode_batch(batch, &out_dir)
                .with_context(|| format!("Failed to encode batch {}", batch.index))?;

            // Persist after every batch so an interrupted run can resume
            manifest.record(batch.index);
            manifest.save(&out_dir).context("Failed to save manifest")?;

            batches_encoded += 1;
        }

        Ok(PipelineStats {
            batches_assembled: batches.len() as u64,
            batches_encoded,
            batches_skipped_resume,
            captures_accepted,
            captures_skipped,
            active_sources: catalogs.len(),
            duration: start_time.elapsed(),
            align_metrics: aggregator,
        })
    }

    /// Build every source's catalog concurrently, reassembled in source
    /// index order.
    async fn build_catalogs(
        blueprint: &SessionBlueprint,
    ) -> Result<Vec<(Catalog, CatalogStats)>> {
        let mut join_set = JoinSet::new();

        for (index, source) in blueprint.sources.iter().enumerate() {
            let source_id: SourceId = source.id.as_str().into();
            let folder = blueprint.source_path(source);
            let threshold = blueprint.align.underexposure_threshold;

            join_set.spawn_blocking(move || {
                let builder = CatalogBuilder::new(ImageProbe::new(), threshold);
                builder
                    .build(source_id, index, &folder)
                    .map(|built| (index, built))
            });
        }

        let mut slots: Vec<Option<(Catalog, CatalogStats)>> =
            (0..blueprint.sources.len()).map(|_| None).collect();

        while let Some(joined) = join_set.join_next().await {
            let (index, built) = joined
                .context("Catalog build task panicked")?
                .context("Catalog build failed")?;
            slots[index] = Some(built);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.with_context(|| format!("No catalog produced for source {index}"))
            })
            .collect()
    }
}
