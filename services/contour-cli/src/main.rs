//! Contour CLI
//!
//! Renders a YAML scene to PNG, optionally placing labels from mouse and
//! keyboard events read as JSON lines on stdin.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use contour_cli::{events, Scene};
use contour_engine::{ContourSet, LabelOptions, LabelSession};

/// Contour renderer
#[derive(Parser, Debug)]
#[command(name = "contour-cli")]
#[command(about = "Render contour lines, filled bands and labels from a scene file")]
struct Args {
    /// Scene file (YAML)
    config: PathBuf,

    /// Output PNG path
    #[arg(short, long, default_value = "contours.png", env = "CONTOUR_OUTPUT")]
    output: PathBuf,

    /// Canvas width override
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height override
    #[arg(long)]
    height: Option<u32>,

    /// Place labels from input events on stdin
    #[arg(long)]
    interactive: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "CONTOUR_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: Args) -> Result<()> {
    let mut scene = Scene::load(&args.config)?;
    if let Some(width) = args.width {
        scene.output.width = width;
    }
    if let Some(height) = args.height {
        scene.output.height = height;
    }

    let mut set = scene.build_contours()?;

    if args.interactive {
        label_interactively(&scene, &mut set, &args.output)?;
    } else if let Some(labels) = scene.labels.clone() {
        let placed = set.clabel(labels)?.len();
        info!(labels = placed, "Placed labels");
    }

    write_png(&scene, &set, &args.output)?;
    Ok(())
}

/// Configure labels without placing any, then place them from stdin events,
/// rewriting the output after every change.
fn label_interactively(scene: &Scene, set: &mut ContourSet, output: &Path) -> Result<()> {
    let options = LabelOptions {
        manual: Some(Vec::new()),
        ..scene.labels.clone().unwrap_or_default()
    };
    let inline = options.inline;
    let inline_spacing = options.inline_spacing;
    set.clabel(options)?;

    let rx = events::spawn_stdin_reader();
    let placed = LabelSession::new(set, inline, inline_spacing)
        .on_change(|set| {
            if let Err(e) = write_png(scene, set, output) {
                warn!(error = %e, "Failed to redraw");
            }
        })
        .run(rx.iter())?;

    info!(labels = placed, "Interactive labeling finished");
    Ok(())
}

fn write_png(scene: &Scene, set: &ContourSet, output: &Path) -> Result<()> {
    let png = scene.render(set)?;
    fs::write(output, &png).with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        path = %output.display(),
        bytes = png.len(),
        width = scene.output.width,
        height = scene.output.height,
        "Wrote image"
    );
    Ok(())
}
