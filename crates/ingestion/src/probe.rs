//! 帧探测 trait
//!
//! 目录构建器通过此 trait 读取单帧的亮度与时间戳，
//! 将文件解码与目录构建逻辑解耦，便于无相机文件的测试。

use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Per-frame probe failure.
///
/// Always recoverable: the builder skips the frame, reports it, and
/// continues with the rest of the source.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Image decode failed
    #[error("image decode failed: {message}")]
    Decode { message: String },

    /// Embedded metadata could not be read
    #[error("metadata read failed: {message}")]
    Metadata { message: String },

    /// Metadata present but carries no capture timestamp
    #[error("no capture timestamp in metadata")]
    MissingTimestamp,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 帧探测 trait
///
/// 为每种帧来源实现此 trait，负责：
/// 1. 计算单帧的亮度摘要（欠曝过滤用）
/// 2. 提取内嵌的拍摄时间戳（整秒精度）
///
/// 亮度与时间戳分开探测：欠曝帧在读取时间戳之前就被丢弃，
/// 因此一张欠曝且元数据损坏的帧计为欠曝跳过。
pub trait CaptureProbe: Send + Sync {
    /// Brightness summary of the frame: channel sum of the image
    /// down-sampled to a single representative pixel (fully black ≈ 0).
    fn brightness(&self, file: &Path) -> Result<u32, ProbeError>;

    /// Embedded capture timestamp, truncated to whole seconds.
    fn timestamp(&self, file: &Path) -> Result<NaiveDateTime, ProbeError>;
}
