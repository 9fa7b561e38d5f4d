//! Batch frame loading and resizing.

use std::path::Path;

use image::imageops::FilterType;

use crate::error::EncodeError;

/// A batch's frames decoded to raw RGB at a common size.
#[derive(Debug, Clone)]
pub struct LoadedFrames {
    /// Common frame width
    pub width: u32,

    /// Common frame height
    pub height: u32,

    /// One raw RGB buffer per frame, batch order
    pub frames: Vec<Vec<u8>>,
}

/// Decode every frame and bring it to a common size.
///
/// With no configured size the first frame's dimensions win; every other
/// frame is resized to match. GIF frames share one canvas, so mixed camera
/// resolutions must collapse to a single size here.
pub fn load_frames(
    paths: &[&Path],
    size: Option<(u32, u32)>,
) -> Result<LoadedFrames, EncodeError> {
    let mut target = size;
    let mut frames = Vec::with_capacity(paths.len());

    for path in paths {
        let img = image::open(path)
            .map_err(|e| EncodeError::frame_decode(*path, e.to_string()))?;

        let (width, height) = *target.get_or_insert((img.width(), img.height()));

        let rgb = if img.width() == width && img.height() == height {
            img.to_rgb8()
        } else {
            img.resize_exact(width, height, FilterType::Triangle).to_rgb8()
        };
        frames.push(rgb.into_raw());
    }

    let (width, height) = target.unwrap_or((0, 0));
    Ok(LoadedFrames {
        width,
        height,
        frames,
    })
}
