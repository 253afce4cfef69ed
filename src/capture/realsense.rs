//! Intel RealSense capture through librealsense2

use std::convert::TryFrom;
use std::ffi::CString;
use std::time::Instant;

use bytes::Bytes;
use realsense_rust::config::Config as Rs2Config;
use realsense_rust::context::Context;
use realsense_rust::frame::{ColorFrame, DepthFrame, FrameEx, ImageFrame};
use realsense_rust::kind::{Rs2Format, Rs2FrameMetadata, Rs2StreamKind};
use realsense_rust::pipeline::{ActivePipeline, InactivePipeline};
use tracing::{info, instrument, warn};

use crate::capture::frame::{
    FrameBundle, FrameMetadata, MetadataAttribute, PixelFormat, StreamKind, VideoFrame,
};
use crate::capture::FrameSource;
use crate::{CaptureConfig, Error, Result};

/// Color + depth pipeline on a RealSense device
pub struct RealSenseSource {
    pipeline: ActivePipeline,
    config: CaptureConfig,
    _context: Context,
}

impl RealSenseSource {
    #[instrument(skip(config), fields(width = config.width, height = config.height, fps = config.fps))]
    pub fn new(config: CaptureConfig) -> Result<Self> {
        info!("Initializing RealSense pipeline");

        let context = Context::new().map_err(|e| Error::sdk("rs2_create_context", "", e))?;
        let pipeline = InactivePipeline::try_from(&context)
            .map_err(|e| Error::sdk("rs2_create_pipeline", "ctx", e))?;

        let color_format = match config.color_format {
            PixelFormat::Bgr8 => Rs2Format::Bgr8,
            PixelFormat::Rgb8 => Rs2Format::Rgb8,
            other => {
                return Err(Error::invalid_frame(
                    StreamKind::Color,
                    format!("unsupported color format {:?}", other),
                ))
            }
        };

        let (width, height, fps) = (
            config.width as usize,
            config.height as usize,
            config.fps as usize,
        );

        let mut rs_config = Rs2Config::new();
        if let Some(serial) = &config.serial {
            let serial_c = CString::new(serial.as_str())
                .map_err(|e| Error::sdk("rs2_config_enable_device", serial.as_str(), e))?;
            rs_config
                .enable_device_from_serial(&serial_c)
                .map_err(|e| Error::sdk("rs2_config_enable_device", serial.as_str(), e))?;
        }
        rs_config
            .enable_stream(Rs2StreamKind::Color, None, width, height, color_format, fps)
            .map_err(|e| {
                Error::sdk(
                    "rs2_config_enable_stream",
                    format!("COLOR, {}, {}, {:?}, {}", width, height, color_format, fps),
                    e,
                )
            })?
            .enable_stream(Rs2StreamKind::Depth, None, width, height, Rs2Format::Z16, fps)
            .map_err(|e| {
                Error::sdk(
                    "rs2_config_enable_stream",
                    format!("DEPTH, {}, {}, Z16, {}", width, height, fps),
                    e,
                )
            })?;

        let pipeline = pipeline
            .start(Some(rs_config))
            .map_err(|e| Error::sdk("rs2_pipeline_start_with_config", "pipe, config", e))?;

        info!("RealSense pipeline started");
        Ok(Self {
            pipeline,
            config,
            _context: context,
        })
    }
}

impl FrameSource for RealSenseSource {
    fn wait_for_frames(&mut self) -> Result<FrameBundle> {
        let frames = self
            .pipeline
            .wait(None)
            .map_err(|e| Error::sdk("rs2_pipeline_wait_for_frames", "pipe", e))?;

        let color = frames
            .frames_of_type::<ColorFrame>()
            .pop()
            .map(|frame| convert(&frame, StreamKind::Color, self.config.color_format));
        let depth = frames
            .frames_of_type::<DepthFrame>()
            .pop()
            .map(|frame| convert(&frame, StreamKind::Depth, PixelFormat::Z16));

        if color.is_none() || depth.is_none() {
            warn!(
                color = color.is_some(),
                depth = depth.is_some(),
                "Incomplete frameset"
            );
        }

        Ok(FrameBundle::new(color, depth))
    }
}

fn convert<K>(frame: &ImageFrame<K>, stream: StreamKind, format: PixelFormat) -> VideoFrame
where
    ImageFrame<K>: FrameEx,
{
    let size = frame.get_data_size();
    // The SDK owns the buffer only for the frame's lifetime, so copy it out
    let data = unsafe {
        let ptr = frame.get_data() as *const std::os::raw::c_void as *const u8;
        Bytes::copy_from_slice(std::slice::from_raw_parts(ptr, size))
    };

    let mut metadata = FrameMetadata::new();
    for attribute in MetadataAttribute::ALL {
        let kind = sdk_metadata(*attribute);
        if frame.supports_metadata(kind) {
            if let Some(value) = frame.metadata(kind) {
                metadata.insert(*attribute, value as i64);
            }
        }
    }

    VideoFrame {
        stream,
        data,
        width: frame.width() as u32,
        height: frame.height() as u32,
        stride: frame.stride() as u32,
        format,
        frame_number: frame.frame_number(),
        metadata,
        timestamp: Instant::now(),
    }
}

fn sdk_metadata(attribute: MetadataAttribute) -> Rs2FrameMetadata {
    use MetadataAttribute as M;
    match attribute {
        M::FrameCounter => Rs2FrameMetadata::FrameCounter,
        M::FrameTimestamp => Rs2FrameMetadata::FrameTimestamp,
        M::SensorTimestamp => Rs2FrameMetadata::SensorTimestamp,
        M::ActualExposure => Rs2FrameMetadata::ActualExposure,
        M::GainLevel => Rs2FrameMetadata::GainLevel,
        M::AutoExposure => Rs2FrameMetadata::AutoExposure,
        M::WhiteBalance => Rs2FrameMetadata::WhiteBalance,
        M::TimeOfArrival => Rs2FrameMetadata::TimeOfArrival,
        M::Temperature => Rs2FrameMetadata::Temperature,
        M::BackendTimestamp => Rs2FrameMetadata::BackendTimestamp,
        M::ActualFps => Rs2FrameMetadata::ActualFps,
        M::FrameLaserPower => Rs2FrameMetadata::FrameLaserPower,
        M::FrameLaserPowerMode => Rs2FrameMetadata::FrameLaserPowerMode,
        M::ExposurePriority => Rs2FrameMetadata::ExposurePriority,
        M::ExposureRoiLeft => Rs2FrameMetadata::ExposureRoiLeft,
        M::ExposureRoiRight => Rs2FrameMetadata::ExposureRoiRight,
        M::ExposureRoiTop => Rs2FrameMetadata::ExposureRoiTop,
        M::ExposureRoiBottom => Rs2FrameMetadata::ExposureRoiBottom,
        M::Brightness => Rs2FrameMetadata::Brightness,
        M::Contrast => Rs2FrameMetadata::Contrast,
        M::Saturation => Rs2FrameMetadata::Saturation,
        M::Sharpness => Rs2FrameMetadata::Sharpness,
        M::AutoWhiteBalanceTemperature => Rs2FrameMetadata::AutoWhiteBalanceTemperature,
        M::BacklightCompensation => Rs2FrameMetadata::BacklightCompensation,
        M::Hue => Rs2FrameMetadata::Hue,
        M::Gamma => Rs2FrameMetadata::Gamma,
        M::ManualWhiteBalance => Rs2FrameMetadata::ManualWhiteBalance,
        M::PowerLineFrequency => Rs2FrameMetadata::PowerLineFrequency,
        M::LowLightCompensation => Rs2FrameMetadata::LowLightCompensation,
        M::FrameEmitterMode => Rs2FrameMetadata::FrameEmitterMode,
        M::FrameLedPower => Rs2FrameMetadata::FrameLedPower,
        M::RawFrameSize => Rs2FrameMetadata::RawFrameSize,
    }
}
