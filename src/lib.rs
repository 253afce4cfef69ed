pub mod capture;
pub mod display;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod utils;

use std::path::PathBuf;

use capture::frame::PixelFormat;
use export::colorizer::ColorScheme;
use serde::{Deserialize, Serialize};

pub use capture::{FrameBundle, VideoFrame};
pub use error::{Error, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub display: DisplayConfig,
    pub snapshot: SnapshotConfig,
    pub colorizer: ColorizerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Synthetic,
    #[serde(rename = "realsense")]
    RealSense,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: SourceKind,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub color_format: PixelFormat,
    pub warmup_frames: u32, // Let auto exposure settle
    pub max_frames: u64,    // 0 = run until closed
    pub serial: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewKind {
    Headless,
    Sdl2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub preview: PreviewKind,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub rates_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMode {
    Gui,
    Stdin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthEncoding {
    /// Depth buffer written byte-for-byte as 8-bit gray + alpha
    RawBytes,
    /// Single channel 16-bit PNG
    Gray16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub output_dir: PathBuf,
    pub trigger: TriggerMode,
    pub legacy_names: bool, // snap-depth-color<n>.png without the hyphen
    pub depth_encoding: DepthEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorizerConfig {
    pub scheme: ColorScheme,
    pub histogram_equalization: bool,
    pub min_distance: f32, // meters
    pub max_distance: f32, // meters
    pub depth_units: f32,  // meters per depth unit
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: if cfg!(feature = "realsense") {
                SourceKind::RealSense
            } else {
                SourceKind::Synthetic
            },
            width: 640,
            height: 480,
            fps: 30,
            color_format: PixelFormat::Bgr8,
            warmup_frames: 30,
            max_frames: 0,
            serial: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview: if cfg!(feature = "sdl-preview") {
                PreviewKind::Sdl2
            } else {
                PreviewKind::Headless
            },
            width: 1280,
            height: 720,
            title: "RealSense Capture Example".into(),
            rates_interval_secs: 1,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            trigger: if cfg!(feature = "sdl-preview") {
                TriggerMode::Gui
            } else {
                TriggerMode::Stdin
            },
            legacy_names: false,
            depth_encoding: DepthEncoding::RawBytes,
        }
    }
}

impl Default for ColorizerConfig {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::Jet,
            histogram_equalization: true,
            min_distance: 0.0,
            max_distance: 6.0,
            depth_units: 0.001,
        }
    }
}
