//! # Align Engine
//!
//! 多相机静态照片时间对齐引擎。
//!
//! 负责：
//! - 以首帧为锚点的时钟偏移标定
//! - 容差逐级放宽的跨源最近匹配
//! - 按参考帧时间序组装批次
//!
//! ## 使用示例
//!
//! ```ignore
//! use align_engine::AlignEngine;
//! use contracts::AlignConfig;
//!
//! let engine = AlignEngine::new(&AlignConfig::default());
//!
//! // catalogs[0] is the reference source
//! let batches = engine.align(&catalogs)?;
//! for batch in &batches {
//!     // Hand off to the sequence encoder
//! }
//! ```

mod assembler;
mod calibrator;
mod engine;
mod matcher;

pub use assembler::assemble;
pub use calibrator::{calibrate, OffsetTable};
pub use engine::AlignEngine;
pub use matcher::{MatchSet, TemporalMatcher};

// Re-export contracts types
pub use contracts::{AlignConfig, Batch, BatchMeta, Capture, Catalog};
