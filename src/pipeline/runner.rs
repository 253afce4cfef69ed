//! Main loop: warmup, then render every bundle and export on demand

use tracing::{debug, info, instrument};

use crate::capture::frame::VideoFrame;
use crate::capture::FrameSource;
use crate::display::PreviewRenderer;
use crate::export::{Colorizer, SnapshotExporter};
use crate::pipeline::rates::RatesPrinter;
use crate::pipeline::trigger::SnapshotTrigger;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Warmup { remaining: u32 },
    Streaming,
    Shutdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_discarded: u64,
    pub frames_rendered: u64,
    pub snapshots: u64,
}

pub struct SnapshotApp<S, R> {
    source: S,
    renderer: R,
    exporter: SnapshotExporter,
    colorizer: Colorizer,
    trigger: SnapshotTrigger,
    rates: RatesPrinter,
    warmup_frames: u32,
    max_frames: u64,
    state: LoopState,
}

impl<S: FrameSource, R: PreviewRenderer> SnapshotApp<S, R> {
    pub fn new(
        source: S,
        renderer: R,
        exporter: SnapshotExporter,
        colorizer: Colorizer,
        trigger: SnapshotTrigger,
    ) -> Self {
        Self {
            source,
            renderer,
            exporter,
            colorizer,
            trigger,
            rates: RatesPrinter::new(0),
            warmup_frames: 30,
            max_frames: 0,
            state: LoopState::Warmup { remaining: 30 },
        }
    }

    pub fn warmup_frames(mut self, count: u32) -> Self {
        self.warmup_frames = count;
        self.state = LoopState::Warmup { remaining: count };
        self
    }

    /// Stop after this many rendered bundles; 0 = until closed
    pub fn max_frames(mut self, count: u64) -> Self {
        self.max_frames = count;
        self
    }

    pub fn rates(mut self, rates: RatesPrinter) -> Self {
        self.rates = rates;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run until the preview closes; any error ends the loop
    #[instrument(skip(self), fields(warmup = self.warmup_frames))]
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let result = self.run_loop(&mut summary);
        self.state = LoopState::Shutdown;
        info!(
            rendered = summary.frames_rendered,
            snapshots = summary.snapshots,
            "Main loop finished"
        );
        result.map(|()| summary)
    }

    fn run_loop(&mut self, summary: &mut RunSummary) -> Result<()> {
        loop {
            match self.state {
                LoopState::Warmup { remaining: 0 } => {
                    debug!("Warmup complete");
                    self.state = LoopState::Streaming;
                }
                LoopState::Warmup { remaining } => {
                    self.source.wait_for_frames()?;
                    summary.frames_discarded += 1;
                    self.state = LoopState::Warmup {
                        remaining: remaining - 1,
                    };
                }
                LoopState::Streaming => {
                    if !self.renderer.poll_events(&self.trigger)? {
                        self.state = LoopState::Shutdown;
                        continue;
                    }
                    self.stream_once(summary)?;
                    if self.max_frames > 0 && summary.frames_rendered >= self.max_frames {
                        info!("Frame limit of {} reached", self.max_frames);
                        self.state = LoopState::Shutdown;
                    }
                }
                LoopState::Shutdown => return Ok(()),
            }
        }
    }

    fn stream_once(&mut self, summary: &mut RunSummary) -> Result<()> {
        let bundle = self.source.wait_for_frames()?;
        self.rates.record(&bundle);

        let colorized: Option<VideoFrame> = match &bundle.depth {
            Some(depth) if self.renderer.wants_colorized_depth() && depth.is_valid() => {
                Some(self.colorizer.colorize(depth)?)
            }
            _ => None,
        };

        self.renderer.show(&bundle, colorized.as_ref())?;
        summary.frames_rendered += 1;

        if self.trigger.take() {
            self.exporter.export(&bundle, colorized.as_ref())?;
            summary.snapshots += 1;
        }
        Ok(())
    }
}
