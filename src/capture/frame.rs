use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Frame data with zero-copy semantics
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub stream: StreamKind,

    /// Immutable pixel data, rows `stride` bytes apart
    pub data: Bytes,

    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,

    /// Per-stream counter, independent between color and depth
    pub frame_number: u64,

    pub metadata: FrameMetadata,

    /// Capture timestamp for rate tracking
    pub timestamp: Instant,
}

/// Synchronized color + depth frames for one point in time
#[derive(Debug, Clone, Default)]
pub struct FrameBundle {
    pub color: Option<VideoFrame>,
    pub depth: Option<VideoFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamKind {
    Color,
    Depth,
}

/// Pixel formats we support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PixelFormat {
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Y8,
    Z16,
}

impl StreamKind {
    pub fn name(self) -> &'static str {
        match self {
            StreamKind::Color => "Color",
            StreamKind::Depth => "Depth",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Y8 => 1,
            PixelFormat::Z16 => 2,
        }
    }
}

impl VideoFrame {
    /// Frame with tightly packed rows
    pub fn packed(
        stream: StreamKind,
        data: impl Into<Bytes>,
        width: u32,
        height: u32,
        format: PixelFormat,
        frame_number: u64,
    ) -> Self {
        Self {
            stream,
            data: data.into(),
            width,
            height,
            stride: width * format.bytes_per_pixel(),
            format,
            frame_number,
            metadata: FrameMetadata::default(),
            timestamp: Instant::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: FrameMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.bytes_per_pixel()
    }

    fn row_bytes(&self) -> usize {
        (self.width * self.bytes_per_pixel()) as usize
    }

    /// Reason the frame cannot be read, if any
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("empty frame {}x{}", self.width, self.height));
        }
        let row = self.row_bytes();
        let stride = self.stride as usize;
        if stride < row {
            return Err(format!("stride {} shorter than row of {} bytes", stride, row));
        }
        let needed = stride * (self.height as usize - 1) + row;
        if self.data.len() < needed {
            return Err(format!(
                "buffer holds {} bytes, {}x{} needs {}",
                self.data.len(),
                self.width,
                self.height,
                needed
            ));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// One row of pixels without stride padding
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride as usize;
        self.data.get(start..start + self.row_bytes())
    }

    /// Pixel data with stride padding removed
    pub fn packed_data(&self) -> Vec<u8> {
        if self.stride as usize == self.row_bytes() {
            let len = self.row_bytes() * self.height as usize;
            return self.data[..len.min(self.data.len())].to_vec();
        }
        let mut out = Vec::with_capacity(self.row_bytes() * self.height as usize);
        for y in 0..self.height {
            if let Some(row) = self.row(y) {
                out.extend_from_slice(row);
            }
        }
        out
    }

    /// Depth values of a Z16 frame (little-endian on the wire)
    pub fn depth_values(&self) -> Option<Vec<u16>> {
        if self.format != PixelFormat::Z16 {
            return None;
        }
        Some(
            self.packed_data()
                .chunks_exact(2)
                .map(|px| u16::from_le_bytes([px[0], px[1]]))
                .collect(),
        )
    }
}

impl FrameBundle {
    pub fn new(color: Option<VideoFrame>, depth: Option<VideoFrame>) -> Self {
        Self { color, depth }
    }

    pub fn frames(&self) -> impl Iterator<Item = &VideoFrame> {
        self.color.iter().chain(self.depth.iter())
    }
}

macro_rules! metadata_attributes {
    ($($variant:ident => $name:literal,)*) => {
        /// Known per-frame metadata kinds, in the SDK's enumeration order
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum MetadataAttribute {
            $($variant,)*
        }

        impl MetadataAttribute {
            pub const ALL: &'static [MetadataAttribute] = &[$(MetadataAttribute::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(MetadataAttribute::$variant => $name,)*
                }
            }
        }
    };
}

metadata_attributes! {
    FrameCounter => "Frame Counter",
    FrameTimestamp => "Frame Timestamp",
    SensorTimestamp => "Sensor Timestamp",
    ActualExposure => "Actual Exposure",
    GainLevel => "Gain Level",
    AutoExposure => "Auto Exposure",
    WhiteBalance => "White Balance",
    TimeOfArrival => "Time Of Arrival",
    Temperature => "Temperature",
    BackendTimestamp => "Backend Timestamp",
    ActualFps => "Actual Fps",
    FrameLaserPower => "Frame Laser Power",
    FrameLaserPowerMode => "Frame Laser Power Mode",
    ExposurePriority => "Exposure Priority",
    ExposureRoiLeft => "Exposure Roi Left",
    ExposureRoiRight => "Exposure Roi Right",
    ExposureRoiTop => "Exposure Roi Top",
    ExposureRoiBottom => "Exposure Roi Bottom",
    Brightness => "Brightness",
    Contrast => "Contrast",
    Saturation => "Saturation",
    Sharpness => "Sharpness",
    AutoWhiteBalanceTemperature => "Auto White Balance Temperature",
    BacklightCompensation => "Backlight Compensation",
    Hue => "Hue",
    Gamma => "Gamma",
    ManualWhiteBalance => "Manual White Balance",
    PowerLineFrequency => "Power Line Frequency",
    LowLightCompensation => "Low Light Compensation",
    FrameEmitterMode => "Frame Emitter Mode",
    FrameLedPower => "Frame Led Power",
    RawFrameSize => "Raw Frame Size",
}

impl fmt::Display for MetadataAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sparse metadata: only the attributes the device reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameMetadata {
    values: BTreeMap<MetadataAttribute, i64>,
}

impl FrameMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attribute: MetadataAttribute, value: i64) {
        self.values.insert(attribute, value);
    }

    pub fn with(mut self, attribute: MetadataAttribute, value: i64) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn supports(&self, attribute: MetadataAttribute) -> bool {
        self.values.contains_key(&attribute)
    }

    pub fn get(&self, attribute: MetadataAttribute) -> Option<i64> {
        self.values.get(&attribute).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Supported attributes in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (MetadataAttribute, i64)> + '_ {
        MetadataAttribute::ALL
            .iter()
            .filter_map(move |attr| self.get(*attr).map(|value| (*attr, value)))
    }
}
