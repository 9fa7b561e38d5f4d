//! Align Engine 指标收集模块
//!
//! 基于 BatchMeta 收集和统计对齐阶段的运行指标。

use contracts::BatchMeta;
use metrics::{counter, gauge, histogram};

/// 从 BatchMeta 记录指标
///
/// 每组装一个 Batch 时调用此函数来记录指标。
pub fn record_batch_metrics(meta: &BatchMeta, batch_index: usize) {
    // 批次计数器
    counter!("still_syncer_batches_total").increment(1);

    // 批次序号 (用于检测跳批)
    gauge!("still_syncer_last_batch_index").set(batch_index as f64);

    // 未匹配源
    let unmatched = meta.unmatched_sources.len();
    if unmatched > 0 {
        counter!("still_syncer_batches_with_unmatched_total").increment(1);
        for source_id in &meta.unmatched_sources {
            counter!(
                "still_syncer_source_unmatched_total",
                "source_id" => source_id.to_string()
            )
            .increment(1);
        }
    }

    // 多候选歧义
    for source_id in &meta.ambiguous_sources {
        counter!(
            "still_syncer_ambiguous_matches_total",
            "source_id" => source_id.to_string()
        )
        .increment(1);
    }

    // 实际命中的容差宽度
    for (source_id, width_s) in &meta.tolerance_used_s {
        histogram!(
            "still_syncer_tolerance_used_s",
            "source_id" => source_id.to_string()
        )
        .record(*width_s as f64);
    }
}

/// 记录目录构建结果
pub fn record_catalog_metrics(source_id: &str, accepted: u64, skipped: u64) {
    gauge!(
        "still_syncer_catalog_size",
        "source_id" => source_id.to_string()
    )
    .set(accepted as f64);

    if skipped > 0 {
        counter!(
            "still_syncer_catalog_skipped_total",
            "source_id" => source_id.to_string()
        )
        .increment(skipped);
    }
}

/// 对齐指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct AlignMetricsAggregator {
    /// 总批次数
    pub total_batches: u64,

    /// 所有源齐全的批次数
    pub fully_matched: u64,

    /// 存在未匹配源的批次数
    pub batches_with_unmatched: u64,

    /// 存在歧义匹配的批次数
    pub batches_with_ambiguity: u64,

    /// 每批次贡献源数量统计
    pub contribution_stats: RunningStats,

    /// 命中容差宽度统计（秒）
    pub tolerance_stats: RunningStats,

    /// 各源未匹配次数
    pub unmatched_counts: std::collections::HashMap<String, u64>,

    /// 各源歧义匹配次数
    pub ambiguous_counts: std::collections::HashMap<String, u64>,
}

impl AlignMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &BatchMeta, contributing: usize, source_total: usize) {
        self.total_batches += 1;

        if contributing == source_total {
            self.fully_matched += 1;
        }

        if !meta.unmatched_sources.is_empty() {
            self.batches_with_unmatched += 1;
            for source_id in &meta.unmatched_sources {
                *self
                    .unmatched_counts
                    .entry(source_id.to_string())
                    .or_insert(0) += 1;
            }
        }

        if !meta.ambiguous_sources.is_empty() {
            self.batches_with_ambiguity += 1;
            for source_id in &meta.ambiguous_sources {
                *self
                    .ambiguous_counts
                    .entry(source_id.to_string())
                    .or_insert(0) += 1;
            }
        }

        self.contribution_stats.push(contributing as f64);

        for width_s in meta.tolerance_used_s.values() {
            self.tolerance_stats.push(*width_s as f64);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_batches: self.total_batches,
            fully_matched: self.fully_matched,
            batches_with_unmatched: self.batches_with_unmatched,
            batches_with_ambiguity: self.batches_with_ambiguity,
            fully_matched_rate: if self.total_batches > 0 {
                self.fully_matched as f64 / self.total_batches as f64 * 100.0
            } else {
                0.0
            },
            contributing_sources: StatsSummary::from(&self.contribution_stats),
            tolerance_used_s: StatsSummary::from(&self.tolerance_stats),
            source_unmatched_counts: self.unmatched_counts.clone(),
            source_ambiguous_counts: self.ambiguous_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_batches: u64,
    pub fully_matched: u64,
    pub batches_with_unmatched: u64,
    pub batches_with_ambiguity: u64,
    pub fully_matched_rate: f64,
    pub contributing_sources: StatsSummary,
    pub tolerance_used_s: StatsSummary,
    pub source_unmatched_counts: std::collections::HashMap<String, u64>,
    pub source_ambiguous_counts: std::collections::HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Align Metrics Summary ===")?;
        writeln!(f, "Total batches: {}", self.total_batches)?;
        writeln!(
            f,
            "Fully matched: {} ({:.2}%)",
            self.fully_matched, self.fully_matched_rate
        )?;
        writeln!(
            f,
            "Batches with unmatched sources: {}",
            self.batches_with_unmatched
        )?;
        writeln!(
            f,
            "Batches with ambiguous matches: {}",
            self.batches_with_ambiguity
        )?;
        writeln!(f, "Contributing sources: {}", self.contributing_sources)?;
        writeln!(f, "Tolerance used (s): {}", self.tolerance_used_s)?;

        if !self.source_unmatched_counts.is_empty() {
            writeln!(f, "Unmatched counts:")?;
            for (source, count) in &self.source_unmatched_counts {
                writeln!(f, "  {}: {}", source, count)?;
            }
        }

        if !self.source_ambiguous_counts.is_empty() {
            writeln!(f, "Ambiguous match counts:")?;
            for (source, count) in &self.source_ambiguous_counts {
                writeln!(f, "  {}: {}", source, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
