//! Production probe: image decode + EXIF timestamp extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use image::imageops::FilterType;
use image::DynamicImage;

use crate::probe::{CaptureProbe, ProbeError};

/// Probe backed by the actual image files on disk.
///
/// Brightness decodes the full image and collapses it to one pixel; the
/// timestamp read only parses the EXIF container, so the two probes do not
/// share a decode pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProbe;

impl ImageProbe {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureProbe for ImageProbe {
    fn brightness(&self, file: &Path) -> Result<u32, ProbeError> {
        let img = image::open(file).map_err(|e| ProbeError::Decode {
            message: e.to_string(),
        })?;
        Ok(mean_brightness(&img))
    }

    fn timestamp(&self, file: &Path) -> Result<NaiveDateTime, ProbeError> {
        let handle = File::open(file)?;
        let mut reader = BufReader::new(handle);

        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| ProbeError::Metadata {
                message: e.to_string(),
            })?;

        // DateTimeOriginal is the shutter time; DateTime is the file
        // modification stamp some cameras write instead.
        let field = exif
            .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
            .or_else(|| exif.get_field(exif::Tag::DateTime, exif::In::PRIMARY))
            .ok_or(ProbeError::MissingTimestamp)?;

        let ascii = match &field.value {
            exif::Value::Ascii(values) if !values.is_empty() => &values[0],
            _ => return Err(ProbeError::MissingTimestamp),
        };

        let dt = exif::DateTime::from_ascii(ascii).map_err(|e| ProbeError::Metadata {
            message: format!("malformed datetime field: {e}"),
        })?;

        NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))
            .and_then(|date| {
                date.and_hms_opt(
                    u32::from(dt.hour),
                    u32::from(dt.minute),
                    u32::from(dt.second),
                )
            })
            .ok_or_else(|| ProbeError::Metadata {
                message: format!(
                    "datetime field out of range: {}-{}-{} {}:{}:{}",
                    dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
                ),
            })
    }
}

/// Brightness summary: down-sample to a single representative pixel and sum
/// its channels. Fully black ≈ 0, fully white = 765.
pub fn mean_brightness(img: &DynamicImage) -> u32 {
    let pixel = img
        .resize_exact(1, 1, FilterType::Triangle)
        .to_rgb8()
        .get_pixel(0, 0)
        .0;
    pixel.iter().map(|&channel| u32::from(channel)).sum()
}
