//! 配置校验模块
//!
//! 校验规则：
//! - 至少两个相机源（单源无从对齐）
//! - source id 唯一，folder 非空
//! - 容差序列非空、严格递增、从 0 开始
//! - frame_delay_ms > 0，quality 在 1-100
//! - width/height 要么都给定要么都缺省

use std::collections::HashSet;

use contracts::{AlignError, SessionBlueprint};

/// 校验 SessionBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), AlignError> {
    validate_sources(blueprint)?;
    validate_align(blueprint)?;
    validate_output(blueprint)?;
    Ok(())
}

/// 校验相机源列表
fn validate_sources(blueprint: &SessionBlueprint) -> Result<(), AlignError> {
    if blueprint.sources.len() < 2 {
        return Err(AlignError::config_validation(
            "sources",
            format!(
                "at least 2 sources required for alignment, got {}",
                blueprint.sources.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    for source in &blueprint.sources {
        if source.id.is_empty() {
            return Err(AlignError::config_validation(
                "sources[].id",
                "source id cannot be empty",
            ));
        }
        if !seen.insert(&source.id) {
            return Err(AlignError::config_validation(
                format!("sources[id={}]", source.id),
                "duplicate source id",
            ));
        }
        if source.folder.is_empty() {
            return Err(AlignError::config_validation(
                format!("sources[id={}].folder", source.id),
                "folder cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验对齐参数
fn validate_align(blueprint: &SessionBlueprint) -> Result<(), AlignError> {
    let steps = &blueprint.align.tolerance_steps_s;

    if steps.is_empty() {
        return Err(AlignError::config_validation(
            "align.tolerance_steps_s",
            "tolerance sequence cannot be empty",
        ));
    }

    if steps[0] != 0 {
        return Err(AlignError::config_validation(
            "align.tolerance_steps_s",
            format!("tolerance sequence must start at 0, got {}", steps[0]),
        ));
    }

    for window in steps.windows(2) {
        if window[1] <= window[0] {
            return Err(AlignError::config_validation(
                "align.tolerance_steps_s",
                format!(
                    "tolerance sequence must be strictly ascending, got {} after {}",
                    window[1], window[0]
                ),
            ));
        }
    }

    Ok(())
}

/// 校验输出参数
fn validate_output(blueprint: &SessionBlueprint) -> Result<(), AlignError> {
    let output = &blueprint.output;

    if output.folder.is_empty() {
        return Err(AlignError::config_validation(
            "output.folder",
            "output folder cannot be empty",
        ));
    }

    if output.frame_delay_ms == 0 {
        return Err(AlignError::config_validation(
            "output.frame_delay_ms",
            "frame delay must be > 0",
        ));
    }

    if output.quality == 0 || output.quality > 100 {
        return Err(AlignError::config_validation(
            "output.quality",
            format!("quality must be in 1..=100, got {}", output.quality),
        ));
    }

    if output.width.is_some() != output.height.is_some() {
        return Err(AlignError::config_validation(
            "output.width / output.height",
            "width and height must be given together",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::minimal_blueprint;

    #[test]
    fn test_valid_minimal() {
        let bp = minimal_blueprint("/data", &[("cam1", "1"), ("cam2", "2")]);
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_single_source_rejected() {
        let bp = minimal_blueprint("/data", &[("cam1", "1")]);
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, AlignError::ConfigValidation { .. }));
    }

    #[test]
    fn test_duplicate_source_id_rejected() {
        let bp = minimal_blueprint("/data", &[("cam1", "1"), ("cam1", "2")]);
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_tolerance_must_start_at_zero() {
        let mut bp = minimal_blueprint("/data", &[("cam1", "1"), ("cam2", "2")]);
        bp.align.tolerance_steps_s = vec![1, 2, 3];
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_tolerance_must_ascend() {
        let mut bp = minimal_blueprint("/data", &[("cam1", "1"), ("cam2", "2")]);
        bp.align.tolerance_steps_s = vec![0, 2, 2];
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_zero_frame_delay_rejected() {
        let mut bp = minimal_blueprint("/data", &[("cam1", "1"), ("cam2", "2")]);
        bp.output.frame_delay_ms = 0;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_width_without_height_rejected() {
        let mut bp = minimal_blueprint("/data", &[("cam1", "1"), ("cam2", "2")]);
        bp.output.width = Some(640);
        assert!(validate(&bp).is_err());

        bp.output.height = Some(480);
        assert!(validate(&bp).is_ok());
    }
}
