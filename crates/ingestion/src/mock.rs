//! Mock 帧探测
//!
//! 用于无相机文件的测试：按文件名查表返回亮度与时间戳。

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::probe::{CaptureProbe, ProbeError};

/// Canned probe result for one file name.
#[derive(Debug, Clone)]
pub struct MockSample {
    /// Brightness channel sum
    pub brightness: u32,

    /// Capture timestamp; `None` simulates a frame whose metadata carries
    /// no usable timestamp
    pub timestamp: Option<NaiveDateTime>,
}

/// Probe that serves canned samples keyed by file name.
///
/// Files the probe does not know about fail to decode, which exercises the
/// builder's unreadable-frame path.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    samples: HashMap<String, MockSample>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a well-exposed frame with a timestamp.
    pub fn with_frame(
        mut self,
        file_name: &str,
        brightness: u32,
        timestamp: NaiveDateTime,
    ) -> Self {
        self.samples.insert(
            file_name.to_string(),
            MockSample {
                brightness,
                timestamp: Some(timestamp),
            },
        );
        self
    }

    /// Register a frame whose metadata has no timestamp.
    pub fn with_untimed_frame(mut self, file_name: &str, brightness: u32) -> Self {
        self.samples.insert(
            file_name.to_string(),
            MockSample {
                brightness,
                timestamp: None,
            },
        );
        self
    }

    fn sample(&self, file: &Path) -> Result<&MockSample, ProbeError> {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.samples.get(name).ok_or_else(|| ProbeError::Decode {
            message: format!("no mock sample registered for '{name}'"),
        })
    }
}

impl CaptureProbe for MockProbe {
    fn brightness(&self, file: &Path) -> Result<u32, ProbeError> {
        Ok(self.sample(file)?.brightness)
    }

    fn timestamp(&self, file: &Path) -> Result<NaiveDateTime, ProbeError> {
        self.sample(file)?
            .timestamp
            .ok_or(ProbeError::MissingTimestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn ts(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, second)
            .unwrap()
    }

    #[test]
    fn test_registered_frame() {
        let probe = MockProbe::new().with_frame("IMG_0001.JPG", 120, ts(0));
        let path = PathBuf::from("/shoot/1/IMG_0001.JPG");

        assert_eq!(probe.brightness(&path).unwrap(), 120);
        assert_eq!(probe.timestamp(&path).unwrap(), ts(0));
    }

    #[test]
    fn test_unregistered_frame_fails_decode() {
        let probe = MockProbe::new();
        let path = PathBuf::from("IMG_0002.JPG");
        assert!(matches!(
            probe.brightness(&path),
            Err(ProbeError::Decode { .. })
        ));
    }

    #[test]
    fn test_untimed_frame() {
        let probe = MockProbe::new().with_untimed_frame("IMG_0003.JPG", 90);
        let path = PathBuf::from("IMG_0003.JPG");

        assert_eq!(probe.brightness(&path).unwrap(), 90);
        assert!(matches!(
            probe.timestamp(&path),
            Err(ProbeError::MissingTimestamp)
        ));
    }
}
