#[cfg(feature = "sdl-preview")]
pub mod display;
pub mod headless;

#[cfg(feature = "sdl-preview")]
pub use display::Sdl2Display;
pub use headless::HeadlessPreview;

use crate::capture::frame::{FrameBundle, VideoFrame};
use crate::pipeline::trigger::SnapshotTrigger;
use crate::Result;

/// Live preview surface driven once per main loop iteration
pub trait PreviewRenderer {
    /// Handle pending input; returns false once the surface is closed
    fn poll_events(&mut self, trigger: &SnapshotTrigger) -> Result<bool>;

    /// Whether `show` should receive a colorized depth frame
    fn wants_colorized_depth(&self) -> bool {
        false
    }

    fn show(&mut self, bundle: &FrameBundle, colorized_depth: Option<&VideoFrame>) -> Result<()>;
}

impl<R: PreviewRenderer + ?Sized> PreviewRenderer for Box<R> {
    fn poll_events(&mut self, trigger: &SnapshotTrigger) -> Result<bool> {
        (**self).poll_events(trigger)
    }

    fn wants_colorized_depth(&self) -> bool {
        (**self).wants_colorized_depth()
    }

    fn show(&mut self, bundle: &FrameBundle, colorized_depth: Option<&VideoFrame>) -> Result<()> {
        (**self).show(bundle, colorized_depth)
    }
}
