mod renderer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atlas_core::layout::{SegmentLayout, group_phases};
use atlas_core::svg::render_svg;
use atlas_core::views::timeline::render_timeline;
use atlas_core::{Atlas, SelectionCoordinator, TimelineConfig, load_atlas};
use atlas_protocol::Viewport;
use clap::Parser;
use log::info;

/// Height of the exported SVG track (px).
const SVG_TRACK_HEIGHT: f64 = 56.0;

#[derive(Debug, Parser)]
#[command(name = "atlas-timeline", version, about = "Browse a workflow atlas export in the terminal")]
struct Args {
    /// Atlas JSON export (methods + gallery items).
    atlas: PathBuf,

    /// Timeline config JSON, overriding the one embedded in the atlas.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the timeline track as SVG to this path instead of browsing.
    #[arg(long, value_name = "PATH")]
    svg: Option<PathBuf>,

    /// Track width used for --svg (px).
    #[arg(long, default_value_t = 960.0)]
    width: f64,

    /// Use the dark palette for --svg.
    #[arg(long)]
    dark: bool,

    /// Log to this file. Without it the browser stays silent, since the
    /// terminal is in raw mode.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let data = std::fs::read(&args.atlas)
        .with_context(|| format!("reading {}", args.atlas.display()))?;
    let mut atlas = load_atlas(&data).with_context(|| format!("loading {}", args.atlas.display()))?;
    if let Some(path) = &args.config {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        atlas.config = TimelineConfig::from_json(&bytes)
            .with_context(|| format!("loading config {}", path.display()))?;
    }
    info!(
        "{}: {} segments, {} cards",
        args.atlas.display(),
        atlas.timeline.segments().len(),
        atlas.timeline.items().len()
    );

    match &args.svg {
        Some(path) => export_svg(atlas, path, args.width, args.dark),
        None => renderer::run_tui(atlas),
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else if args.svg.is_some() {
        // Not interactive: stderr is safe (respects RUST_LOG if set).
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
        )
        .format_timestamp_millis()
        .init();
    }
    Ok(())
}

fn export_svg(atlas: Atlas, path: &Path, width: f64, dark: bool) -> Result<()> {
    let Atlas { config, timeline } = atlas;
    let layout = SegmentLayout::compute(timeline.segments(), width, &config);
    let groups = group_phases(timeline.segments(), &layout.widths(), layout.gap);
    // Highlight follows the first card, as it would on page load.
    let geometry = atlas_core::GeometryRegistry::for_timeline(&timeline, &config, width);
    let coordinator = SelectionCoordinator::new(timeline, geometry, config);

    let svg_width = width.max(layout.total_width());
    let commands = render_timeline(
        coordinator.timeline(),
        &layout,
        &groups,
        coordinator.state(),
        &Viewport::new(svg_width, SVG_TRACK_HEIGHT),
    );
    let svg = render_svg(&commands, svg_width, SVG_TRACK_HEIGHT, dark);
    std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
