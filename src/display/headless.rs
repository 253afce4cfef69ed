use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, trace};

use crate::capture::frame::{FrameBundle, VideoFrame};
use crate::display::PreviewRenderer;
use crate::pipeline::trigger::SnapshotTrigger;
use crate::Result;

/// Windowless preview; "closes" on Ctrl-C
pub struct HeadlessPreview {
    running: Arc<AtomicBool>,
}

impl HeadlessPreview {
    /// Install the Ctrl-C handler; only one may exist per process
    pub fn with_ctrlc() -> Result<Self> {
        let preview = Self::new();
        let running = preview.running.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received, shutting down");
            running.store(false, Ordering::SeqCst);
        })?;
        Ok(preview)
    }

    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for closing the preview from elsewhere
    pub fn close_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

impl Default for HeadlessPreview {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewRenderer for HeadlessPreview {
    fn poll_events(&mut self, _trigger: &SnapshotTrigger) -> Result<bool> {
        Ok(self.running.load(Ordering::SeqCst))
    }

    fn show(&mut self, bundle: &FrameBundle, _colorized_depth: Option<&VideoFrame>) -> Result<()> {
        for frame in bundle.frames() {
            trace!(stream = %frame.stream, frame = frame.frame_number, "frame");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_when_handle_cleared() {
        let mut preview = HeadlessPreview::new();
        let trigger = SnapshotTrigger::new();
        assert!(preview.poll_events(&trigger).unwrap());
        preview.close_handle().store(false, Ordering::SeqCst);
        assert!(!preview.poll_events(&trigger).unwrap());
    }
}
