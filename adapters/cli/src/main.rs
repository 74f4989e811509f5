#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless hostage rescue round.

mod config;
mod presenter;
mod probe;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use hostage_rescue_core::Command;
use hostage_rescue_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Overrides, Settings},
    presenter::TracingPresenter,
    session::Session,
};

/// Command-line arguments accepted by the hostage rescue binary.
#[derive(Debug, Parser)]
#[command(name = "hostage-rescue", about = "Simulate a hostage rescue round headlessly")]
struct Args {
    /// Path to a TOML settings file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed shared by terrain generation and spawning.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of fixed ticks to simulate.
    #[arg(long)]
    ticks: Option<u64>,
    /// Map width in columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of map layers.
    #[arg(long)]
    layers: Option<u32>,
    /// Shoot the lowest-numbered walking enemy every N ticks.
    #[arg(long, value_name = "N")]
    shoot_every: Option<u32>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed: self.seed,
            ticks: self.ticks,
            columns: self.columns,
            layers: self.layers,
            shoot_every: self.shoot_every,
        }
    }
}

/// Entry point for the hostage rescue command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?.with_overrides(args.overrides())?;

    let mut session = Session::new(&settings, TracingPresenter::new())?;
    session.start()?;
    let summary = session.run(settings.session.ticks);
    info!(
        tick_index = query::tick_index(session.world()),
        "simulation stopped"
    );
    session.submit(Command::Quit);

    let presenter = session.presenter();
    println!("seed: {}", summary.seed);
    println!("ticks: {}", summary.ticks);
    println!("phase: {:?}", summary.round.phase);
    println!(
        "bullets: {} (display {})",
        summary.round.bullets_remaining,
        presenter
            .ammo()
            .map_or_else(|| "untouched".to_owned(), |ammo| ammo.to_string())
    );
    println!("hostages remaining: {}", summary.round.hostages_remaining);
    println!("hostages saved: {}", summary.saved);
    println!("memorials: {}", summary.memorials);
    println!("visuals: {}", presenter.visuals());
    if let Some(cause) = presenter.game_over() {
        println!("{}", cause.message());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
