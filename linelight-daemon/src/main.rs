//! linelight daemon
//!
//! Polls the CTA Train Tracker positions feed for one line and renders a
//! per-station occupancy color to the indicator strip once per cycle.
//! The poller thread owns the network; the board task owns the engine
//! state and the render sink; a channel joins them.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use clap::Parser;
use log::info;

mod config;
mod feed;
mod strip;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "linelight", about = "CTA train position indicator strip")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "linelight.json")]
    config: PathBuf,
    /// Override the feed base URL (e.g. a local mock server)
    #[arg(long)]
    url: Option<String>,
    /// Write the effective config to the config path and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load_or_default(&args.config);
    if let Some(url) = args.url {
        config.api.base_url = url;
    }

    if args.write_config {
        config.save(&args.config)?;
        return Ok(());
    }

    let topology = config.topology()?;
    info!(
        "Starting linelight: {} stations, polling {} every {}ms",
        topology.len(),
        config.api.base_url,
        config.api.poll_interval_ms
    );

    let (batch_tx, batch_rx) = mpsc::channel();
    let api = config.api.clone();
    let poller = thread::spawn(move || feed::poller_task(&api, &batch_tx));

    // The board task runs on the main thread and exits when the poller
    // hangs up
    let mut terminal = strip::TerminalStrip::new();
    strip::board_task(
        &topology,
        &config.classifier,
        &config.display,
        &batch_rx,
        &mut terminal,
    );

    poller.join().ok();
    Ok(())
}
