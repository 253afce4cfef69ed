use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::info;

use crate::capture::frame::{FrameBundle, StreamKind};

/// Periodic per-stream frame rate report
pub struct RatesPrinter {
    interval: Option<Duration>,
    window_start: Instant,
    counts: BTreeMap<StreamKind, u64>,
}

impl RatesPrinter {
    /// `interval_secs == 0` disables reporting
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            window_start: Instant::now(),
            counts: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, bundle: &FrameBundle) -> Option<Vec<(StreamKind, f64)>> {
        self.record_at(bundle, Instant::now())
    }

    /// Count the bundle; returns the rates when a window closes
    pub fn record_at(
        &mut self,
        bundle: &FrameBundle,
        now: Instant,
    ) -> Option<Vec<(StreamKind, f64)>> {
        let interval = self.interval?;
        for frame in bundle.frames() {
            *self.counts.entry(frame.stream).or_default() += 1;
        }

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < interval {
            return None;
        }

        let secs = elapsed.as_secs_f64();
        let rates: Vec<_> = self
            .counts
            .iter()
            .map(|(stream, count)| (*stream, *count as f64 / secs))
            .collect();
        for (stream, fps) in &rates {
            info!(stream = %stream, fps = %format!("{:.1}", fps), "Stream rate");
            metrics::gauge!("depthsnap_stream_fps", "stream" => stream.name()).set(*fps);
        }

        self.counts.clear();
        self.window_start = now;
        Some(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{PixelFormat, VideoFrame};

    fn bundle(depth: bool) -> FrameBundle {
        let color = VideoFrame::packed(StreamKind::Color, vec![0; 3], 1, 1, PixelFormat::Rgb8, 1);
        let depth = depth.then(|| {
            VideoFrame::packed(StreamKind::Depth, vec![0; 2], 1, 1, PixelFormat::Z16, 1)
        });
        FrameBundle::new(Some(color), depth)
    }

    #[test]
    fn reports_per_stream_after_interval() {
        let mut rates = RatesPrinter::new(1);
        let start = rates.window_start;

        for i in 0..9 {
            let at = start + Duration::from_millis(100 * i);
            assert!(rates.record_at(&bundle(i % 3 != 0), at).is_none());
        }
        let report = rates
            .record_at(&bundle(true), start + Duration::from_secs(2))
            .unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report[0], (StreamKind::Color, 5.0));
        assert_eq!(report[1], (StreamKind::Depth, 3.5));
    }

    #[test]
    fn disabled_never_reports() {
        let mut rates = RatesPrinter::new(0);
        let later = Instant::now() + Duration::from_secs(10);
        assert!(rates.record_at(&bundle(true), later).is_none());
    }
}
