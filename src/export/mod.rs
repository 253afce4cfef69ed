//! Snapshot export: PNG images plus metadata CSV for one frame bundle

pub mod colorizer;
pub mod encoder;
pub mod metadata;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::capture::frame::{FrameBundle, VideoFrame};
use crate::{DepthEncoding, Error, Result, SnapshotConfig};

pub use colorizer::{ColorScheme, Colorizer};

/// File names of one snapshot, derived from frame counters
#[derive(Debug, Clone)]
pub struct SnapshotNames {
    dir: PathBuf,
    legacy: bool,
}

impl SnapshotNames {
    pub fn new(dir: impl Into<PathBuf>, legacy: bool) -> Self {
        Self {
            dir: dir.into(),
            legacy,
        }
    }

    pub fn color_image(&self, n: u64) -> PathBuf {
        self.dir.join(format!("snap-color-{}.png", n))
    }

    pub fn color_metadata(&self, n: u64) -> PathBuf {
        self.dir.join(format!("snap-color-{}-metadata.csv", n))
    }

    pub fn depth_image(&self, n: u64) -> PathBuf {
        self.dir.join(format!("snap-depth-{}.png", n))
    }

    pub fn colorized_depth_image(&self, n: u64) -> PathBuf {
        if self.legacy {
            self.dir.join(format!("snap-depth-color{}.png", n))
        } else {
            self.dir.join(format!("snap-depth-color-{}.png", n))
        }
    }

    pub fn depth_metadata(&self, n: u64) -> PathBuf {
        self.dir.join(format!("snap-depth-{}-metadata.csv", n))
    }
}

/// Writes the artifacts of a triggered snapshot
pub struct SnapshotExporter {
    output_dir: PathBuf,
    names: SnapshotNames,
    depth_encoding: DepthEncoding,
    colorizer: Colorizer,
}

/// Tracks attempted artifacts so one failure doesn't stop the rest
#[derive(Default)]
struct Attempts {
    written: Vec<PathBuf>,
    failures: Vec<Error>,
}

impl Attempts {
    fn record(&mut self, path: PathBuf, result: Result<()>) {
        match result {
            Ok(()) => {
                info!("Saved {}", path.display());
                metrics::counter!("depthsnap_artifacts_written_total").increment(1);
                self.written.push(path);
            }
            Err(e) => {
                warn!("Failed to save {}: {}", path.display(), e);
                self.failures.push(e);
            }
        }
    }
}

impl SnapshotExporter {
    pub fn new(config: &SnapshotConfig, colorizer: Colorizer) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            names: SnapshotNames::new(&config.output_dir, config.legacy_names),
            depth_encoding: config.depth_encoding,
            colorizer,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn names(&self) -> &SnapshotNames {
        &self.names
    }

    /// Export every present sub-frame of `bundle`
    ///
    /// `colorized_depth` is reused when it was already computed for the
    /// bundle's depth frame. Returns the written paths, or the first failure
    /// once all artifacts have been attempted.
    #[instrument(skip_all, fields(dir = %self.output_dir.display()))]
    pub fn export(
        &self,
        bundle: &FrameBundle,
        colorized_depth: Option<&VideoFrame>,
    ) -> Result<Vec<PathBuf>> {
        let started = Instant::now();

        // An existing directory and a failed creation look the same here;
        // the file writes below report the real problem.
        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            warn!("Could not create {}: {}", self.output_dir.display(), e);
        }

        let mut attempts = Attempts::default();

        match &bundle.color {
            Some(color) if color.is_valid() => self.export_color(color, &mut attempts),
            Some(color) => warn!(
                frame = color.frame_number,
                "Skipping invalid color frame: {}",
                color.validate().err().unwrap_or_default()
            ),
            None => warn!("No color frame in bundle"),
        }

        match &bundle.depth {
            Some(depth) if depth.is_valid() => {
                self.export_depth(depth, colorized_depth, &mut attempts)
            }
            Some(depth) => warn!(
                frame = depth.frame_number,
                "Skipping invalid depth frame: {}",
                depth.validate().err().unwrap_or_default()
            ),
            None => warn!("No depth frame in bundle"),
        }

        metrics::counter!("depthsnap_snapshots_total").increment(1);
        metrics::histogram!("depthsnap_export_time_us")
            .record(started.elapsed().as_micros() as f64);

        let total = attempts.written.len() + attempts.failures.len();
        let failed = attempts.failures.len();
        match attempts.failures.into_iter().next() {
            Some(first) => Err(Error::Snapshot {
                failed,
                total,
                source: Box::new(first),
            }),
            None => Ok(attempts.written),
        }
    }

    fn export_color(&self, color: &VideoFrame, attempts: &mut Attempts) {
        let n = color.frame_number;

        let path = self.names.color_image(n);
        let result = encoder::write_png(color, &path, self.depth_encoding);
        attempts.record(path, result);

        let path = self.names.color_metadata(n);
        let result = metadata::metadata_to_csv(color, &path);
        attempts.record(path, result);
    }

    fn export_depth(
        &self,
        depth: &VideoFrame,
        colorized: Option<&VideoFrame>,
        attempts: &mut Attempts,
    ) {
        let n = depth.frame_number;

        let path = self.names.depth_image(n);
        let result = encoder::write_png(depth, &path, self.depth_encoding);
        attempts.record(path, result);

        let path = self.names.colorized_depth_image(n);
        let result = match colorized.filter(|c| c.frame_number == n) {
            Some(frame) => encoder::write_png(frame, &path, self.depth_encoding),
            None => self
                .colorizer
                .colorize(depth)
                .and_then(|frame| encoder::write_png(&frame, &path, self.depth_encoding)),
        };
        attempts.record(path, result);

        let path = self.names.depth_metadata(n);
        let result = metadata::metadata_to_csv(depth, &path);
        attempts.record(path, result);
    }
}
