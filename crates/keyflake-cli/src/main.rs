#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, Config};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.log_json)?;
    tracing::debug!(
        machine_id = config.minter.machine_id,
        epoch_ms = config.minter.epoch_ms,
        generator = ?config.generator,
        "configuration loaded"
    );

    let mut stdout = std::io::stdout().lock();
    commands::run(&config, &mut stdout)
}
