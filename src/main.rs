use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use mdpane::config::{self, Config};
use mdpane::input;
use mdpane::renderer::MarkdownRenderer;
use mdpane::viewport::Viewport;
use mdpane::vscroll::{RenderedView, VirtualScrollRenderer};
use mdpane::watch::DocumentWatcher;

#[derive(Parser)]
#[command(name = "mdpane", about = "Virtual-scrolling Markdown preview renderer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input Markdown file (use `-` for stdin)
    #[arg(global = true)]
    input: Option<PathBuf>,

    /// Log output file path (enables logging when specified)
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the viewport-relevant part of a document to an HTML fragment
    Render {
        /// Output HTML file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Force a full render regardless of document size
        #[arg(long)]
        full: bool,

        /// Print render statistics to stderr
        #[arg(long)]
        stats: bool,
    },
    /// Re-render the viewport into the output file on every input change
    Watch {
        /// Output HTML file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Print render statistics to stderr after each render
        #[arg(long)]
        stats: bool,
    },
}

#[derive(Args, Clone, Copy)]
struct GeometryArgs {
    /// Vertical scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll_y: f64,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 800.0)]
    view_width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    view_height: f64,

    /// Line height in pixels (overrides the configured estimate)
    #[arg(long)]
    line_height: Option<f64>,

    /// Buffer lines rendered above/below the visible window
    #[arg(long)]
    buffer_lines: Option<usize>,

    /// Line-count threshold below which documents render in full
    #[arg(long)]
    min_lines: Option<usize>,
}

const FULL_GEOMETRY: GeometryArgs = GeometryArgs {
    scroll_y: 0.0,
    view_width: 800.0,
    view_height: 600.0,
    line_height: None,
    buffer_lines: None,
    min_lines: None,
};

fn main() {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        let file = std::fs::File::create(log_path).expect("failed to open log file");
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else {
        env_logger::init();
    }

    // Load config file and merge CLI overrides
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let geometry = match &cli.command {
        Some(Command::Render { geometry, .. }) | Some(Command::Watch { geometry, .. }) => *geometry,
        None => FULL_GEOMETRY,
    };
    cfg.merge_cli(geometry.buffer_lines, geometry.min_lines, geometry.line_height);
    let config = cfg.resolve();

    let result = match cli.command {
        Some(Command::Render {
            output,
            full,
            stats,
            ..
        }) => cmd_render(cli.input.as_deref(), &config, geometry, output, full, stats),
        Some(Command::Watch { output, stats, .. }) => match cli.input {
            Some(ref input) => cmd_watch(input, &config, geometry, &output, stats),
            None => Err(anyhow::anyhow!("watch mode requires an input file")),
        },
        None => cmd_render(cli.input.as_deref(), &config, geometry, None, true, false),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Read the input document (supports `-` / piped stdin).
fn read_document(input: Option<&Path>) -> Result<String> {
    if input::is_stdin_input(input) {
        return input::read_stdin_to_string().context("failed to read stdin");
    }
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => anyhow::bail!("input file required (or pipe via stdin)"),
    }
}

/// Build the viewport for CLI rendering: geometry flags plus a document
/// height derived from the line count (there is no real widget to measure).
fn viewport_for(geometry: &GeometryArgs, config: &Config, total_lines: usize) -> Viewport {
    let line_height = config.scroll.estimated_line_height;
    Viewport {
        scroll_x: 0.0,
        scroll_y: geometry.scroll_y,
        width: geometry.view_width,
        height: geometry.view_height,
        document_width: geometry.view_width,
        document_height: total_lines as f64 * line_height,
        line_height,
    }
}

/// Wrap the rendered fragment so standalone output keeps its position
/// within the document: the offset becomes a top margin.
fn wrap_fragment(view: &RenderedView) -> String {
    format!(
        "<div class=\"mdpane-fragment\" style=\"margin-top: {:.1}px\">\n{}</div>\n",
        view.offset_px, view.html
    )
}

fn write_fragment(output: Option<&Path>, fragment: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, fragment)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{fragment}");
            Ok(())
        }
    }
}

fn print_stats(
    vs: &VirtualScrollRenderer<MarkdownRenderer>,
    config: &Config,
    view: &RenderedView,
) {
    let stats = vs.statistics(&config.scroll);
    eprintln!(
        "rendered {}/{} lines ({:.2}%), mode={:?}, offset={:.1}px",
        stats.rendered_lines, stats.total_lines, stats.render_ratio, view.mode, view.offset_px
    );
}

fn cmd_render(
    input: Option<&Path>,
    config: &Config,
    geometry: GeometryArgs,
    output: Option<PathBuf>,
    full: bool,
    stats: bool,
) -> Result<()> {
    let pipeline_start = Instant::now();

    let markdown = read_document(input)?;
    if markdown.trim().is_empty() {
        anyhow::bail!("input is empty or contains only whitespace");
    }

    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    if full {
        vs.enable(false);
    }

    let viewport = viewport_for(&geometry, config, markdown.split('\n').count());
    let view = vs.render_viewport(&markdown, &viewport, &config.scroll);
    write_fragment(output.as_deref(), &wrap_fragment(&view))?;

    if stats {
        print_stats(&vs, config, &view);
    }
    info!(
        "cmd_render: total pipeline completed in {:.1}ms",
        pipeline_start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn cmd_watch(
    input: &Path,
    config: &Config,
    geometry: GeometryArgs,
    output: &Path,
    stats: bool,
) -> Result<()> {
    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    let watcher = DocumentWatcher::new(input)?;

    // Initial render, then re-render on every change
    let mut pass = 0u64;
    loop {
        let markdown = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let viewport = viewport_for(&geometry, config, markdown.split('\n').count());
        let view = vs.render_viewport(&markdown, &viewport, &config.scroll);
        write_fragment(Some(output), &wrap_fragment(&view))?;

        eprintln!(
            "[{}] rendered {} -> {}",
            pass,
            input.display(),
            output.display()
        );
        if stats {
            print_stats(&vs, config, &view);
        }
        pass += 1;

        while !watcher.wait_changed(config.watch_interval) {}
        info!("watch: {} changed, re-rendering", input.display());
    }
}
