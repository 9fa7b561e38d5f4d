//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::AlignMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total batches assembled by the align engine
    pub batches_assembled: u64,

    /// Batches actually encoded this run
    pub batches_encoded: u64,

    /// Batches skipped because the resume manifest already had them
    pub batches_skipped_resume: u64,

    /// Captures accepted across all catalogs
    pub captures_accepted: u64,

    /// Frames skipped during catalog construction (underexposed/unreadable)
    pub captures_skipped: u64,

    /// Number of sources that produced a catalog
    pub active_sources: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Align engine metrics aggregator
    pub align_metrics: AlignMetricsAggregator,
}

impl PipelineStats {
    /// Batches encoded per second
    pub fn encode_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.batches_encoded as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Skipped frames as a percentage of everything scanned
    pub fn skip_rate(&self) -> f64 {
        let total = self.captures_accepted + self.captures_skipped;
        if total > 0 {
            (self.captures_skipped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Batches assembled: {}", self.batches_assembled);
        println!("   ├─ Batches encoded: {}", self.batches_encoded);
        if self.batches_skipped_resume > 0 {
            println!(
                "   ├─ Batches skipped (resume): {}",
                self.batches_skipped_resume
            );
        }
        println!("   ├─ Captures accepted: {}", self.captures_accepted);
        println!(
            "   ├─ Frames skipped: {} ({:.2}%)",
            self.captures_skipped,
            self.skip_rate()
        );
        println!("   ├─ Encode rate: {:.2}/s", self.encode_rate());
        println!("   └─ Active sources: {}", self.active_sources);

        let summary = self.align_metrics.summary();

        println!("\n📈 Align Engine Metrics");
        println!(
            "   ├─ Fully matched batches: {} ({:.2}%)",
            summary.fully_matched, summary.fully_matched_rate
        );
        println!(
            "   ├─ Batches with unmatched sources: {}",
            summary.batches_with_unmatched
        );
        println!(
            "   ├─ Batches with ambiguous matches: {}",
            summary.batches_with_ambiguity
        );
        println!(
            "   ├─ Contributing sources: {}",
            summary.contributing_sources
        );
        println!("   └─ Tolerance used (s): {}", summary.tolerance_used_s);

        if !summary.source_unmatched_counts.is_empty() {
            println!("\n⚠️  Unmatched Source Counts");
            for (source, count) in &summary.source_unmatched_counts {
                println!("   ├─ {}: {}", source, count);
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rate() {
        let stats = PipelineStats {
            batches_encoded: 10,
            duration: Duration::from_secs(5),
            ..Default::default()
        };
        assert!((stats.encode_rate() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_skip_rate() {
        let stats = PipelineStats {
            captures_accepted: 90,
            captures_skipped: 10,
            ..Default::default()
        };
        assert!((stats.skip_rate() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_rates_with_zero_activity() {
        let stats = PipelineStats::default();
        assert_eq!(stats.encode_rate(), 0.0);
        assert_eq!(stats.skip_rate(), 0.0);
    }
}
