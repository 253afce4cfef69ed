//! depthsnap: live color + depth preview with on-demand snapshots

use std::process::ExitCode;

use color_eyre::Result;
use tracing::{info, warn};

use depthsnap::capture;
use depthsnap::display::{HeadlessPreview, PreviewRenderer};
use depthsnap::export::{Colorizer, SnapshotExporter};
use depthsnap::pipeline::{spawn_stdin_listener, RatesPrinter, SnapshotApp, SnapshotTrigger};
use depthsnap::{utils, Config, PreviewKind, TriggerMode};

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    utils::init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    info!("depthsnap launching...");

    let config = utils::load_config()?;

    let trigger = SnapshotTrigger::new();
    let renderer = open_renderer(&config)?;

    match config.snapshot.trigger {
        TriggerMode::Stdin => {
            // Detached: process exit tears the listener down
            let _listener = spawn_stdin_listener(trigger.clone())?;
        }
        TriggerMode::Gui if config.display.preview == PreviewKind::Headless => {
            warn!("GUI trigger selected without a preview window; snapshots cannot be requested");
        }
        TriggerMode::Gui => info!("Click Snap (or press S) to save a snapshot"),
    }

    let source = capture::open_source(&config.capture)?;
    let colorizer = Colorizer::new(config.colorizer.clone());
    let exporter = SnapshotExporter::new(&config.snapshot, colorizer.clone());
    info!("Snapshots go to {}", exporter.output_dir().display());

    let mut app = SnapshotApp::new(source, renderer, exporter, colorizer, trigger)
        .warmup_frames(config.capture.warmup_frames)
        .max_frames(config.capture.max_frames)
        .rates(RatesPrinter::new(config.display.rates_interval_secs));

    let summary = app.run()?;
    info!(
        "depthsnap shutting down ({} frames, {} snapshots)",
        summary.frames_rendered, summary.snapshots
    );
    Ok(())
}

fn open_renderer(config: &Config) -> Result<Box<dyn PreviewRenderer>> {
    match config.display.preview {
        PreviewKind::Headless => Ok(Box::new(HeadlessPreview::with_ctrlc()?)),
        #[cfg(feature = "sdl-preview")]
        PreviewKind::Sdl2 => Ok(Box::new(depthsnap::display::Sdl2Display::new(
            &config.display,
        )?)),
        #[cfg(not(feature = "sdl-preview"))]
        PreviewKind::Sdl2 => {
            warn!("Built without the `sdl-preview` feature, falling back to headless preview");
            Ok(Box::new(HeadlessPreview::with_ctrlc()?))
        }
    }
}
