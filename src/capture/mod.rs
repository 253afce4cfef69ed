pub mod frame;
#[cfg(feature = "realsense")]
pub mod realsense;
pub mod synthetic;

pub use frame::{FrameBundle, FrameMetadata, MetadataAttribute, PixelFormat, StreamKind, VideoFrame};
#[cfg(feature = "realsense")]
pub use realsense::RealSenseSource;
pub use synthetic::SyntheticSource;

use tracing::info;

use crate::{CaptureConfig, Error, Result, SourceKind};

/// Anything that delivers synchronized color + depth bundles
pub trait FrameSource {
    /// Block until the next bundle is ready
    fn wait_for_frames(&mut self) -> Result<FrameBundle>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn wait_for_frames(&mut self) -> Result<FrameBundle> {
        (**self).wait_for_frames()
    }
}

/// Open the source selected in the configuration
pub fn open_source(config: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
    if !matches!(config.color_format, PixelFormat::Bgr8 | PixelFormat::Rgb8) {
        return Err(Error::invalid_frame(
            StreamKind::Color,
            format!("unsupported color format {:?}", config.color_format),
        ));
    }

    match config.source {
        SourceKind::Synthetic => {
            info!("Using synthetic frame source");
            Ok(Box::new(SyntheticSource::new(config.clone())))
        }
        #[cfg(feature = "realsense")]
        SourceKind::RealSense => Ok(Box::new(RealSenseSource::new(config.clone())?)),
        #[cfg(not(feature = "realsense"))]
        SourceKind::RealSense => Err(Error::sdk(
            "open_source",
            "source:realsense",
            "built without the `realsense` feature",
        )),
    }
}
