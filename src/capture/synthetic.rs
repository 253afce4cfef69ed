//! Hardware-free frame source producing moving test patterns

use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::capture::frame::{
    FrameBundle, FrameMetadata, MetadataAttribute, PixelFormat, StreamKind, VideoFrame,
};
use crate::capture::FrameSource;
use crate::{CaptureConfig, Result};

/// Deterministic color gradient + depth ramp, paced to the configured rate
pub struct SyntheticSource {
    config: CaptureConfig,
    color_sequence: u64,
    depth_sequence: u64,
    started: Instant,
    next_deadline: Option<Instant>,
}

impl SyntheticSource {
    #[instrument(skip(config), fields(width = config.width, height = config.height, fps = config.fps))]
    pub fn new(config: CaptureConfig) -> Self {
        debug!("Synthetic source ready");
        Self {
            config,
            color_sequence: 0,
            depth_sequence: 0,
            started: Instant::now(),
            next_deadline: None,
        }
    }

    fn frame_interval(&self) -> Option<Duration> {
        (self.config.fps > 0).then(|| Duration::from_secs(1) / self.config.fps)
    }

    fn pace(&mut self) {
        let Some(interval) = self.frame_interval() else {
            return;
        };
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.next_deadline = Some(deadline.max(now) + interval);
    }

    fn common_metadata(&self, sequence: u64) -> FrameMetadata {
        let elapsed_us = self.started.elapsed().as_micros() as i64;
        FrameMetadata::new()
            .with(MetadataAttribute::FrameCounter, sequence as i64)
            .with(MetadataAttribute::FrameTimestamp, elapsed_us)
            .with(MetadataAttribute::SensorTimestamp, elapsed_us)
            .with(MetadataAttribute::TimeOfArrival, elapsed_us / 1000)
            .with(MetadataAttribute::ActualFps, self.config.fps as i64)
    }

    fn color_frame(&mut self) -> VideoFrame {
        self.color_sequence += 1;
        let (width, height) = (self.config.width, self.config.height);
        let format = self.config.color_format;
        let base = (self.color_sequence % 256) as u8;

        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let r = base.wrapping_add((x % 256) as u8);
                let g = base.wrapping_add((y % 256) as u8);
                let b = base.wrapping_add(((x + y) % 256) as u8);
                match format {
                    PixelFormat::Bgr8 => data.extend_from_slice(&[b, g, r]),
                    _ => data.extend_from_slice(&[r, g, b]),
                }
            }
        }

        let metadata = self
            .common_metadata(self.color_sequence)
            .with(MetadataAttribute::ActualExposure, 166)
            .with(MetadataAttribute::GainLevel, 64)
            .with(MetadataAttribute::AutoExposure, 1)
            .with(MetadataAttribute::WhiteBalance, 4600);

        VideoFrame::packed(StreamKind::Color, data, width, height, format, self.color_sequence)
            .with_metadata(metadata)
    }

    fn depth_frame(&mut self) -> VideoFrame {
        self.depth_sequence += 1;
        let (width, height) = (self.config.width, self.config.height);
        let shift = (self.depth_sequence * 8) as u32;

        let mut data = Vec::with_capacity((width * height * 2) as usize);
        for y in 0..height {
            for x in 0..width {
                // Leave a border without data, like the sensor's invalid band
                let depth = if x < width / 16 {
                    0u16
                } else {
                    (300 + ((x + y + shift) % 4000)) as u16
                };
                data.extend_from_slice(&depth.to_le_bytes());
            }
        }

        let metadata = self
            .common_metadata(self.depth_sequence)
            .with(MetadataAttribute::FrameLaserPower, 150)
            .with(MetadataAttribute::FrameLaserPowerMode, 1)
            .with(MetadataAttribute::FrameEmitterMode, 1);

        VideoFrame::packed(
            StreamKind::Depth,
            data,
            width,
            height,
            PixelFormat::Z16,
            self.depth_sequence,
        )
        .with_metadata(metadata)
    }
}

impl FrameSource for SyntheticSource {
    fn wait_for_frames(&mut self) -> Result<FrameBundle> {
        self.pace();
        Ok(FrameBundle::new(
            Some(self.color_frame()),
            Some(self.depth_frame()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CaptureConfig {
        CaptureConfig {
            width: 32,
            height: 24,
            fps: 0,
            ..CaptureConfig::default()
        }
    }

    #[test]
    fn bundles_carry_both_streams_with_increasing_counters() {
        let mut source = SyntheticSource::new(config());
        let first = source.wait_for_frames().unwrap();
        let second = source.wait_for_frames().unwrap();

        let (c1, c2) = (first.color.unwrap(), second.color.unwrap());
        let d2 = second.depth.unwrap();
        assert_eq!(c1.frame_number, 1);
        assert_eq!(c2.frame_number, 2);
        assert_eq!(d2.frame_number, 2);
        assert!(c2.is_valid());
        assert!(d2.is_valid());
        assert_eq!(d2.format, PixelFormat::Z16);
        assert_eq!(c2.metadata.get(MetadataAttribute::FrameCounter), Some(2));
    }

    #[test]
    fn bgr_output_swaps_channels() {
        let mut rgb_source = SyntheticSource::new(CaptureConfig {
            color_format: PixelFormat::Rgb8,
            ..config()
        });
        let mut bgr_source = SyntheticSource::new(CaptureConfig {
            color_format: PixelFormat::Bgr8,
            ..config()
        });
        let rgb = rgb_source.wait_for_frames().unwrap().color.unwrap();
        let bgr = bgr_source.wait_for_frames().unwrap().color.unwrap();

        let (rgb_px, bgr_px) = (&rgb.data[3..6], &bgr.data[3..6]);
        assert_eq!(rgb_px[0], bgr_px[2]);
        assert_eq!(rgb_px[2], bgr_px[0]);
    }
}
