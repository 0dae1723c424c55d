//! glowpad - play colour envelopes from the terminal
//!
//! Run with: cargo run -- [--config glowpad.toml]

mod app;
mod driver;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use glowpad::ControllerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::Glowpad;

#[derive(Parser)]
#[command(name = "glowpad")]
#[command(about = "Keyboard pads driving colour envelopes on single and arrayed targets")]
struct Cli {
    /// Controller configuration (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How many of the targets are arrays (taken from the end of the pad grid)
    #[arg(long, default_value = "2")]
    arrays: usize,

    /// Children per array target
    #[arg(long, default_value = "12")]
    children: usize,

    /// Log file; the terminal belongs to the UI. Filter with RUST_LOG.
    #[arg(long, default_value = "glowpad.log")]
    log: PathBuf,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log = File::create(&cli.log)
        .wrap_err_with(|| format!("failed to create log file {}", cli.log.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let config = match &cli.config {
        Some(path) => ControllerConfig::load(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    info!(
        min_note = config.min_note,
        max_note = config.max_note,
        "starting glowpad"
    );

    Glowpad::new(config).arrays(cli.arrays, cli.children).run()
}
