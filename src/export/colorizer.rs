//! Depth to color ramp for visual inspection

use serde::{Deserialize, Serialize};

use crate::capture::frame::{PixelFormat, StreamKind, VideoFrame};
use crate::{ColorizerConfig, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    Jet,
    Classic,
    WhiteToBlack,
    BlackToWhite,
    Hue,
}

impl ColorScheme {
    /// Control points, evenly spaced over [0, 1]
    fn control_points(self) -> &'static [[f32; 3]] {
        match self {
            ColorScheme::Jet => &[
                [0.0, 0.0, 255.0],
                [0.0, 255.0, 255.0],
                [255.0, 255.0, 0.0],
                [255.0, 0.0, 0.0],
                [50.0, 0.0, 0.0],
            ],
            ColorScheme::Classic => &[
                [30.0, 77.0, 203.0],
                [25.0, 60.0, 192.0],
                [45.0, 117.0, 220.0],
                [204.0, 108.0, 191.0],
                [196.0, 57.0, 178.0],
                [198.0, 33.0, 24.0],
            ],
            ColorScheme::WhiteToBlack => &[[255.0, 255.0, 255.0], [0.0, 0.0, 0.0]],
            ColorScheme::BlackToWhite => &[[0.0, 0.0, 0.0], [255.0, 255.0, 255.0]],
            ColorScheme::Hue => &[
                [255.0, 0.0, 0.0],
                [255.0, 255.0, 0.0],
                [0.0, 255.0, 0.0],
                [0.0, 255.0, 255.0],
                [0.0, 0.0, 255.0],
                [255.0, 0.0, 255.0],
                [255.0, 0.0, 0.0],
            ],
        }
    }

    /// Color for a normalized value in [0, 1]
    pub fn color_at(self, value: f32) -> [u8; 3] {
        let points = self.control_points();
        let value = value.clamp(0.0, 1.0);
        let scaled = value * (points.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(points.len() - 2);
        let t = scaled - lower as f32;
        let (a, b) = (points[lower], points[lower + 1]);
        [
            (a[0] + (b[0] - a[0]) * t).round() as u8,
            (a[1] + (b[1] - a[1]) * t).round() as u8,
            (a[2] + (b[2] - a[2]) * t).round() as u8,
        ]
    }
}

/// Maps Z16 frames to RGB8
#[derive(Debug, Clone)]
pub struct Colorizer {
    config: ColorizerConfig,
}

impl Colorizer {
    pub fn new(config: ColorizerConfig) -> Self {
        Self { config }
    }

    pub fn colorize(&self, depth: &VideoFrame) -> Result<VideoFrame> {
        if depth.format != PixelFormat::Z16 {
            return Err(Error::invalid_frame(
                depth.stream,
                format!("cannot colorize {:?} data", depth.format),
            ));
        }
        depth
            .validate()
            .map_err(|reason| Error::invalid_frame(StreamKind::Depth, reason))?;

        let values = depth.depth_values().unwrap_or_default();
        let normalize = self.normalizer(&values);

        let mut rgb = Vec::with_capacity(values.len() * 3);
        for &d in &values {
            if d == 0 {
                rgb.extend_from_slice(&[0, 0, 0]);
            } else {
                rgb.extend_from_slice(&self.config.scheme.color_at(normalize(d)));
            }
        }

        let mut frame = VideoFrame::packed(
            StreamKind::Depth,
            rgb,
            depth.width,
            depth.height,
            PixelFormat::Rgb8,
            depth.frame_number,
        );
        frame.metadata = depth.metadata.clone();
        frame.timestamp = depth.timestamp;
        Ok(frame)
    }

    fn normalizer(&self, values: &[u16]) -> Box<dyn Fn(u16) -> f32> {
        if self.config.histogram_equalization {
            // Cumulative histogram over valid (non-zero) depth
            let mut cumulative = vec![0u32; 0x10000];
            for &d in values.iter().filter(|d| **d != 0) {
                cumulative[d as usize] += 1;
            }
            for i in 1..cumulative.len() {
                let previous = cumulative[i - 1];
                cumulative[i] += previous;
            }
            let total = cumulative[0xFFFF].max(1) as f32;
            Box::new(move |d| cumulative[d as usize] as f32 / total)
        } else {
            let units = self.config.depth_units;
            let min = self.config.min_distance;
            let span = (self.config.max_distance - min).max(f32::EPSILON);
            Box::new(move |d| ((d as f32 * units - min) / span).clamp(0.0, 1.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_frame(values: &[u16], width: u32) -> VideoFrame {
        let data: Vec<u8> = values.iter().flat_map(|d| d.to_le_bytes()).collect();
        let height = values.len() as u32 / width;
        VideoFrame::packed(StreamKind::Depth, data, width, height, PixelFormat::Z16, 9)
    }

    #[test]
    fn jet_endpoints() {
        assert_eq!(ColorScheme::Jet.color_at(0.0), [0, 0, 255]);
        assert_eq!(ColorScheme::Jet.color_at(1.0), [50, 0, 0]);
        assert_eq!(ColorScheme::Jet.color_at(0.25), [0, 255, 255]);
    }

    #[test]
    fn zero_depth_is_black() {
        let colorizer = Colorizer::new(ColorizerConfig::default());
        let out = colorizer.colorize(&depth_frame(&[0, 1000, 2000, 0], 2)).unwrap();
        assert_eq!(&out.data[0..3], &[0, 0, 0]);
        assert_eq!(&out.data[9..12], &[0, 0, 0]);
        assert_ne!(&out.data[3..6], &[0, 0, 0]);
    }

    #[test]
    fn output_keeps_dimensions_and_counter() {
        let colorizer = Colorizer::new(ColorizerConfig::default());
        let out = colorizer.colorize(&depth_frame(&[500; 12], 4)).unwrap();
        assert_eq!((out.width, out.height), (4, 3));
        assert_eq!(out.format, PixelFormat::Rgb8);
        assert_eq!(out.frame_number, 9);
        assert_eq!(out.data.len(), 4 * 3 * 3);
    }

    #[test]
    fn linear_range_clamps() {
        let colorizer = Colorizer::new(ColorizerConfig {
            scheme: ColorScheme::BlackToWhite,
            histogram_equalization: false,
            min_distance: 1.0,
            max_distance: 2.0,
            depth_units: 0.001,
        });
        let out = colorizer
            .colorize(&depth_frame(&[500, 1500, 2500, 1000], 4))
            .unwrap();
        assert_eq!(&out.data[0..3], &[0, 0, 0]);
        assert_eq!(&out.data[3..6], &[128, 128, 128]);
        assert_eq!(&out.data[6..9], &[255, 255, 255]);
        assert_eq!(&out.data[9..12], &[0, 0, 0]);
    }

    #[test]
    fn equalized_farthest_value_hits_ramp_end() {
        let colorizer = Colorizer::new(ColorizerConfig {
            scheme: ColorScheme::BlackToWhite,
            ..ColorizerConfig::default()
        });
        let out = colorizer.colorize(&depth_frame(&[100, 200, 300, 400], 4)).unwrap();
        assert_eq!(&out.data[9..12], &[255, 255, 255]);
        assert!(out.data[0] < out.data[3]);
    }

    #[test]
    fn rejects_color_frames() {
        let colorizer = Colorizer::new(ColorizerConfig::default());
        let frame = VideoFrame::packed(StreamKind::Color, vec![0; 12], 2, 2, PixelFormat::Rgb8, 1);
        assert!(colorizer.colorize(&frame).is_err());
    }
}
