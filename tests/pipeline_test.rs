use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use depthsnap::capture::{FrameBundle, FrameSource, PixelFormat, StreamKind, VideoFrame};
use depthsnap::display::PreviewRenderer;
use depthsnap::export::{Colorizer, SnapshotExporter};
use depthsnap::pipeline::{LoopState, SnapshotApp, SnapshotTrigger};
use depthsnap::{ColorizerConfig, Error, Result, SnapshotConfig};

/// Counts bundles; numbers frames from 1
struct CountingSource {
    pulled: Rc<RefCell<u64>>,
    fail_at: Option<u64>,
}

impl FrameSource for CountingSource {
    fn wait_for_frames(&mut self) -> Result<FrameBundle> {
        let n = {
            let mut pulled = self.pulled.borrow_mut();
            *pulled += 1;
            *pulled
        };
        if self.fail_at == Some(n) {
            return Err(Error::sdk("rs2_pipeline_wait_for_frames", "pipe", "Frame didn't arrive"));
        }
        let color = VideoFrame::packed(StreamKind::Color, vec![n as u8; 4 * 2 * 3], 4, 2, PixelFormat::Rgb8, n);
        let depth = VideoFrame::packed(StreamKind::Depth, vec![1u8; 4 * 2 * 2], 4, 2, PixelFormat::Z16, n);
        Ok(FrameBundle::new(Some(color), Some(depth)))
    }
}

/// Requests snapshots on chosen iterations and closes after `close_after` renders
struct ScriptedRenderer {
    polls: u64,
    rendered: Vec<u64>,
    snap_on_poll: Vec<u64>,
    close_after: u64,
    colorized: bool,
}

impl ScriptedRenderer {
    fn new(close_after: u64, snap_on_poll: Vec<u64>) -> Self {
        Self {
            polls: 0,
            rendered: Vec::new(),
            snap_on_poll,
            close_after,
            colorized: false,
        }
    }
}

impl PreviewRenderer for ScriptedRenderer {
    fn poll_events(&mut self, trigger: &SnapshotTrigger) -> Result<bool> {
        self.polls += 1;
        if self.rendered.len() as u64 >= self.close_after {
            return Ok(false);
        }
        if self.snap_on_poll.contains(&self.polls) {
            trigger.request();
        }
        Ok(true)
    }

    fn wants_colorized_depth(&self) -> bool {
        self.colorized
    }

    fn show(&mut self, bundle: &FrameBundle, colorized_depth: Option<&VideoFrame>) -> Result<()> {
        if self.colorized {
            assert!(colorized_depth.is_some());
        }
        self.rendered.push(bundle.color.as_ref().map(|c| c.frame_number).unwrap_or(0));
        Ok(())
    }
}

fn exporter(dir: &std::path::Path) -> SnapshotExporter {
    let config = SnapshotConfig {
        output_dir: dir.to_path_buf(),
        ..SnapshotConfig::default()
    };
    SnapshotExporter::new(&config, Colorizer::new(ColorizerConfig::default()))
}

fn png_counters(dir: &std::path::Path) -> Vec<u64> {
    let mut counters: Vec<u64> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| {
                    let name = e.ok()?.file_name().to_string_lossy().into_owned();
                    name.strip_prefix("snap-color-")?
                        .strip_suffix(".png")?
                        .parse()
                        .ok()
                })
                .collect()
        })
        .unwrap_or_default();
    counters.sort();
    counters
}

#[test]
fn warmup_discards_thirty_bundles_before_export() {
    let dir = tempfile::tempdir().unwrap();
    let pulled = Rc::new(RefCell::new(0));
    let trigger = SnapshotTrigger::new();
    // Pending before the loop starts: must wait out the warmup
    trigger.request();

    let source = CountingSource { pulled: pulled.clone(), fail_at: None };
    let mut app = SnapshotApp::new(
        source,
        ScriptedRenderer::new(3, vec![]),
        exporter(dir.path()),
        Colorizer::new(ColorizerConfig::default()),
        trigger,
    )
    .warmup_frames(30);

    let summary = app.run().unwrap();

    assert_eq!(summary.frames_discarded, 30);
    assert_eq!(summary.frames_rendered, 3);
    assert_eq!(summary.snapshots, 1);
    assert_eq!(app.renderer().rendered, vec![31, 32, 33]);
    assert_eq!(png_counters(dir.path()), vec![31]);
    assert_eq!(*pulled.borrow(), 33);
    assert_eq!(app.state(), LoopState::Shutdown);
}

#[test]
fn one_trigger_exports_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = CountingSource { pulled: Rc::new(RefCell::new(0)), fail_at: None };
    let mut app = SnapshotApp::new(
        source,
        ScriptedRenderer::new(5, vec![2]),
        exporter(dir.path()),
        Colorizer::new(ColorizerConfig::default()),
        SnapshotTrigger::new(),
    )
    .warmup_frames(0);

    let summary = app.run().unwrap();

    assert_eq!(summary.snapshots, 1);
    assert_eq!(png_counters(dir.path()), vec![2]);
}

#[test]
fn separate_triggers_export_separately() {
    let dir = tempfile::tempdir().unwrap();
    let source = CountingSource { pulled: Rc::new(RefCell::new(0)), fail_at: None };
    let mut renderer = ScriptedRenderer::new(6, vec![1, 4]);
    renderer.colorized = true;
    let mut app = SnapshotApp::new(
        source,
        renderer,
        exporter(dir.path()),
        Colorizer::new(ColorizerConfig::default()),
        SnapshotTrigger::new(),
    )
    .warmup_frames(2);

    let summary = app.run().unwrap();

    assert_eq!(summary.snapshots, 2);
    assert_eq!(png_counters(dir.path()), vec![3, 6]);
}

#[test]
fn max_frames_stops_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let source = CountingSource { pulled: Rc::new(RefCell::new(0)), fail_at: None };
    let mut app = SnapshotApp::new(
        source,
        ScriptedRenderer::new(u64::MAX, vec![]),
        exporter(dir.path()),
        Colorizer::new(ColorizerConfig::default()),
        SnapshotTrigger::new(),
    )
    .warmup_frames(1)
    .max_frames(4);

    let summary = app.run().unwrap();

    assert_eq!(summary.frames_rendered, 4);
    assert_eq!(summary.frames_discarded, 1);
}

#[test]
fn source_error_shuts_down_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = CountingSource { pulled: Rc::new(RefCell::new(0)), fail_at: Some(4) };
    let mut app = SnapshotApp::new(
        source,
        ScriptedRenderer::new(10, vec![]),
        exporter(dir.path()),
        Colorizer::new(ColorizerConfig::default()),
        SnapshotTrigger::new(),
    )
    .warmup_frames(2);

    let err = app.run().unwrap_err();

    assert!(matches!(err, Error::Sdk { .. }));
    assert!(err.to_string().contains("rs2_pipeline_wait_for_frames(pipe)"));
    assert_eq!(app.state(), LoopState::Shutdown);
}

#[test]
fn export_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"x").unwrap();
    let source = CountingSource { pulled: Rc::new(RefCell::new(0)), fail_at: None };
    let mut app = SnapshotApp::new(
        source,
        ScriptedRenderer::new(10, vec![1]),
        exporter(&blocker.join("out")),
        Colorizer::new(ColorizerConfig::default()),
        SnapshotTrigger::new(),
    )
    .warmup_frames(0);

    let err = app.run().unwrap_err();

    assert!(matches!(err, Error::Snapshot { failed: 5, .. }));
    assert_eq!(app.renderer().rendered, vec![1]);
}
