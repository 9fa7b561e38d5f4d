//! Looping GIF assembly per batch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use contracts::{Batch, OutputConfig};
use gif::{Encoder, Frame, Repeat};
use tracing::{debug, info, instrument};

use crate::error::EncodeError;
use crate::frames::load_frames;

/// Encoder tunables, lifted from the blueprint's output section.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Per-frame display duration in centiseconds (GIF time base)
    pub frame_delay_cs: u16,

    /// Output dimensions; `None` takes each batch's first frame size
    pub size: Option<(u32, u32)>,

    /// Palette quantization quality (1-100)
    pub quality: u8,

    /// Copy each batch's source files into batches/ subdirectories
    pub copy_frames: bool,
}

impl EncoderConfig {
    /// Build from the blueprint output section.
    pub fn from_output(output: &OutputConfig) -> Self {
        Self {
            frame_delay_cs: output.frame_delay_cs(),
            size: output.width.zip(output.height),
            quality: output.quality,
            copy_frames: output.copy_frames,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::from_output(&OutputConfig::default())
    }
}

/// Encodes ordered batches into looping animated GIFs.
///
/// Each batch becomes one file named by its index; the animation plays the
/// frames forward then the same frames in reverse, repeating forever.
pub struct SequenceEncoder {
    config: EncoderConfig,
    created_dirs: HashSet<PathBuf>,
}

impl SequenceEncoder {
    /// Create a new encoder.
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            created_dirs: HashSet::new(),
        }
    }

    /// Encode one batch into `out_dir`, returning the written file path.
    ///
    /// Consumes the batch's frames in order: reference first, then matched
    /// captures by ascending source index.
    #[instrument(
        name = "encode_batch",
        skip(self, batch, out_dir),
        fields(batch = batch.index, frames = batch.contributing_sources())
    )]
    pub fn encode_batch(&mut self, batch: &Batch, out_dir: &Path) -> Result<PathBuf, EncodeError> {
        self.ensure_dir(out_dir)?;

        let paths: Vec<&Path> = batch.frames().map(|c| c.file.as_path()).collect();
        let loaded = load_frames(&paths, self.config.size)?;

        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(
                &mut buffer,
                loaded.width as u16,
                loaded.height as u16,
                &[],
            )
            .map_err(|e| EncodeError::gif(e.to_string()))?;
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| EncodeError::gif(e.to_string()))?;

            let speed = self.quality_to_speed();
            // Forward pass, then the same frames in reverse for the loop
            for rgb in loaded.frames.iter().chain(loaded.frames.iter().rev()) {
                let mut frame = Frame::from_rgb_speed(
                    loaded.width as u16,
                    loaded.height as u16,
                    rgb,
                    speed,
                );
                frame.delay = self.config.frame_delay_cs;
                encoder
                    .write_frame(&frame)
                    .map_err(|e| EncodeError::gif(e.to_string()))?;
            }
        }

        let path = out_dir.join(format!("{:04}.gif", batch.index));
        fs::write(&path, &buffer)?;

        if self.config.copy_frames {
            self.copy_batch_frames(batch, out_dir)?;
        }

        metrics::counter!("still_syncer_batches_encoded_total").increment(1);
        info!(
            batch = batch.index,
            path = %path.display(),
            bytes = buffer.len(),
            "batch encoded"
        );

        Ok(path)
    }

    /// Copy the batch's source files into `out_dir/batches/NNNN/`,
    /// position-prefixed so the frame order survives the copy.
    fn copy_batch_frames(&mut self, batch: &Batch, out_dir: &Path) -> Result<(), EncodeError> {
        let batch_dir = out_dir.join("batches").join(format!("{:04}", batch.index));
        self.ensure_dir(&batch_dir)?;

        for (position, capture) in batch.frames().enumerate() {
            let name = capture
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("frame_{position}"));
            let dest = batch_dir.join(format!("{position}_{name}"));
            fs::copy(&capture.file, &dest)?;
            debug!(
                batch = batch.index,
                src = %capture.file.display(),
                dest = %dest.display(),
                "frame copied"
            );
        }

        Ok(())
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<(), EncodeError> {
        if !self.created_dirs.contains(dir) {
            fs::create_dir_all(dir)?;
            self.created_dirs.insert(dir.to_path_buf());
        }
        Ok(())
    }

    /// Convert quality (1-100) to GIF encoder speed (1-30).
    fn quality_to_speed(&self) -> i32 {
        // Higher quality = lower speed (more processing)
        let normalized = i32::from(100 - self.config.quality);
        (normalized * 29 / 100 + 1).clamp(1, 30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::{BatchMeta, Capture};
    use image::{Rgb, RgbImage};

    fn write_png(path: &Path, color: [u8; 3]) {
        RgbImage::from_pixel(6, 4, Rgb(color)).save(path).unwrap();
    }

    fn capture(source: &str, index: usize, file: PathBuf) -> Capture {
        Capture {
            source: source.into(),
            source_index: index,
            sequence: 1,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            file,
        }
    }

    fn decode_frame_count(path: &Path) -> usize {
        let mut decoder = gif::DecodeOptions::new()
            .read_info(std::fs::File::open(path).unwrap())
            .unwrap();
        let mut count = 0;
        while decoder.read_next_frame().unwrap().is_some() {
            count += 1;
        }
        count
    }

    #[test]
    fn test_encode_palindrome_loop() {
        let dir = tempfile::tempdir().unwrap();
        let ref_path = dir.path().join("ref.png");
        let peer_path = dir.path().join("peer.png");
        write_png(&ref_path, [200, 40, 40]);
        write_png(&peer_path, [40, 200, 40]);

        let reference = capture("cam1", 0, ref_path);
        let peer = capture("cam2", 1, peer_path);
        let batch = Batch {
            index: 0,
            reference: &reference,
            matched: vec![&peer],
            meta: BatchMeta::default(),
        };

        let out_dir = dir.path().join("output");
        let mut encoder = SequenceEncoder::new(EncoderConfig::default());
        let path = encoder.encode_batch(&batch, &out_dir).unwrap();

        assert_eq!(path.file_name().unwrap(), "0000.gif");
        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[..6], b"GIF89a");

        // Two frames forward, the same two in reverse
        assert_eq!(decode_frame_count(&path), 4);
    }

    #[test]
    fn test_encode_single_frame_batch() {
        let dir = tempfile::tempdir().unwrap();
        let ref_path = dir.path().join("ref.png");
        write_png(&ref_path, [10, 80, 160]);

        let reference = capture("cam1", 0, ref_path);
        let batch = Batch {
            index: 3,
            reference: &reference,
            matched: vec![],
            meta: BatchMeta::default(),
        };

        let out_dir = dir.path().join("output");
        let mut encoder = SequenceEncoder::new(EncoderConfig::default());
        let path = encoder.encode_batch(&batch, &out_dir).unwrap();

        assert_eq!(path.file_name().unwrap(), "0003.gif");
        assert_eq!(decode_frame_count(&path), 2);
    }

    #[test]
    fn test_copy_frames_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let ref_path = dir.path().join("IMG_0001.png");
        let peer_path = dir.path().join("IMG_0002.png");
        write_png(&ref_path, [0, 0, 0]);
        write_png(&peer_path, [255, 255, 255]);

        let reference = capture("cam1", 0, ref_path);
        let peer = capture("cam2", 1, peer_path);
        let batch = Batch {
            index: 0,
            reference: &reference,
            matched: vec![&peer],
            meta: BatchMeta::default(),
        };

        let out_dir = dir.path().join("output");
        let config = EncoderConfig {
            copy_frames: true,
            ..Default::default()
        };
        let mut encoder = SequenceEncoder::new(config);
        encoder.encode_batch(&batch, &out_dir).unwrap();

        let batch_dir = out_dir.join("batches").join("0000");
        assert!(batch_dir.join("0_IMG_0001.png").is_file());
        assert!(batch_dir.join("1_IMG_0002.png").is_file());
    }

    #[test]
    fn test_missing_reference_frame_fails() {
        let dir = tempfile::tempdir().unwrap();
        let reference = capture("cam1", 0, dir.path().join("missing.png"));
        let batch = Batch {
            index: 0,
            reference: &reference,
            matched: vec![],
            meta: BatchMeta::default(),
        };

        let mut encoder = SequenceEncoder::new(EncoderConfig::default());
        let result = encoder.encode_batch(&batch, &dir.path().join("output"));
        assert!(matches!(result, Err(EncodeError::FrameDecode { .. })));
    }
}
