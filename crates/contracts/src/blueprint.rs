//! SessionBlueprint - Config Loader 输出
//!
//! 描述完整的会话配置：素材根目录、相机源列表、对齐参数、输出参数。

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的会话配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 会话设置
    pub session: SessionConfig,

    /// 相机源列表（第一个为参考源）
    pub sources: Vec<SourceConfig>,

    /// 对齐参数
    #[serde(default)]
    pub align: AlignConfig,

    /// 输出参数
    #[serde(default)]
    pub output: OutputConfig,
}

impl SessionBlueprint {
    /// Resolve a source's folder against the session root.
    pub fn source_path(&self, source: &SourceConfig) -> PathBuf {
        self.session.root.join(&source.folder)
    }

    /// Resolve the output folder against the session root.
    pub fn output_path(&self) -> PathBuf {
        self.session.root.join(&self.output.folder)
    }

    /// The reference source (first in configuration order).
    pub fn reference_source(&self) -> Option<&SourceConfig> {
        self.sources.first()
    }
}

/// 会话设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 素材根目录，各相机源目录与输出目录均相对于此路径
    pub root: PathBuf,
}

/// 相机源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 唯一标识符
    pub id: String,

    /// 相对于会话根目录的文件夹名
    pub folder: String,
}

/// 对齐参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignConfig {
    /// 欠曝过滤阈值（单像素降采样后的通道和，全黑 ≈ 0）
    #[serde(default = "default_underexposure_threshold")]
    pub underexposure_threshold: u32,

    /// 容差递增序列（秒），从最窄窗口开始逐级放宽。
    /// 0 表示时间戳完全相等；w > 0 表示严格小于 w 的开区间窗口
    #[serde(default = "default_tolerance_steps")]
    pub tolerance_steps_s: Vec<u32>,
}

impl AlignConfig {
    /// Tolerance steps as durations, narrowest first.
    pub fn tolerance_steps(&self) -> Vec<TimeDelta> {
        self.tolerance_steps_s
            .iter()
            .map(|&s| TimeDelta::seconds(i64::from(s)))
            .collect()
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            underexposure_threshold: default_underexposure_threshold(),
            tolerance_steps_s: default_tolerance_steps(),
        }
    }
}

fn default_underexposure_threshold() -> u32 {
    30
}

fn default_tolerance_steps() -> Vec<u32> {
    vec![0, 1, 2, 3]
}

/// 输出参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出文件夹名（相对于会话根目录）
    #[serde(default = "default_output_folder")]
    pub folder: String,

    /// 单帧显示时长（毫秒）
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,

    /// 输出宽度（缺省时取每批首帧尺寸）
    #[serde(default)]
    pub width: Option<u32>,

    /// 输出高度（缺省时取每批首帧尺寸）
    #[serde(default)]
    pub height: Option<u32>,

    /// 调色板量化质量 (1-100)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// 是否将每批源文件复制到 batches/ 子目录
    #[serde(default)]
    pub copy_frames: bool,
}

impl OutputConfig {
    /// GIF frame delay in centiseconds (GIF time base).
    pub fn frame_delay_cs(&self) -> u16 {
        ((self.frame_delay_ms / 10).max(1)).min(u64::from(u16::MAX)) as u16
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: default_output_folder(),
            frame_delay_ms: default_frame_delay_ms(),
            width: None,
            height: None,
            quality: default_quality(),
            copy_frames: false,
        }
    }
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_frame_delay_ms() -> u64 {
    200
}

fn default_quality() -> u8 {
    80
}

/// Convenience for tests and examples: a blueprint with default tunables.
pub fn minimal_blueprint(root: impl AsRef<Path>, sources: &[(&str, &str)]) -> SessionBlueprint {
    SessionBlueprint {
        version: ConfigVersion::default(),
        session: SessionConfig {
            root: root.as_ref().to_path_buf(),
        },
        sources: sources
            .iter()
            .map(|(id, folder)| SourceConfig {
                id: (*id).to_string(),
                folder: (*folder).to_string(),
            })
            .collect(),
        align: AlignConfig::default(),
        output: OutputConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let align = AlignConfig::default();
        assert_eq!(align.underexposure_threshold, 30);
        assert_eq!(align.tolerance_steps_s, vec![0, 1, 2, 3]);

        let output = OutputConfig::default();
        assert_eq!(output.folder, "output");
        assert_eq!(output.frame_delay_ms, 200);
        assert_eq!(output.quality, 80);
        assert!(!output.copy_frames);
    }

    #[test]
    fn test_tolerance_steps_as_durations() {
        let align = AlignConfig::default();
        let steps = align.tolerance_steps();
        assert_eq!(steps[0], TimeDelta::zero());
        assert_eq!(steps[3], TimeDelta::seconds(3));
    }

    #[test]
    fn test_frame_delay_centiseconds() {
        let output = OutputConfig {
            frame_delay_ms: 200,
            ..Default::default()
        };
        assert_eq!(output.frame_delay_cs(), 20);

        // Sub-centisecond delays clamp up to the GIF minimum
        let output = OutputConfig {
            frame_delay_ms: 3,
            ..Default::default()
        };
        assert_eq!(output.frame_delay_cs(), 1);
    }

    #[test]
    fn test_path_resolution() {
        let bp = minimal_blueprint("/data/shoot", &[("cam1", "1"), ("cam2", "2")]);
        assert_eq!(
            bp.source_path(&bp.sources[0]),
            PathBuf::from("/data/shoot/1")
        );
        assert_eq!(bp.output_path(), PathBuf::from("/data/shoot/output"));
        assert_eq!(bp.reference_source().unwrap().id, "cam1");
    }
}
