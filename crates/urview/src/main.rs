//! urview - render URProgram files.

use clap::Parser;
use commands::render::{OutputFormat, RenderArgs};
use config::UrviewConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Render URProgram (.urp) files as a line-numbered listing, a draw.io
/// diagram or JSON.
#[derive(Debug, Parser)]
#[command(name = "urview", version, about)]
struct Cli {
    #[command(flatten)]
    render: RenderArgs,

    /// Log resolution details to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().unwrap_or_default();
    let config = UrviewConfig::load(&cwd);
    debug!(?config, "configuration");

    let format = cli
        .render
        .format
        .or(config.output.format)
        .unwrap_or(OutputFormat::Text);
    let mut options = config.normalize_options();
    if let Some(max_depth) = cli.render.max_depth {
        options.max_depth = max_depth;
    }

    if let Err(err) = commands::render::run(cli.render, format, &options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
