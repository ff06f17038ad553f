#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use clap::Parser;
use config::{AppConfig, CliArgs};
use idgen::{BatchCoordinator, Id, resolve_hardware_address, sort_by_creation_time};
use std::io::{self, BufWriter, Write};
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let hardware_address = resolve_hardware_address()?;
    let coordinator = BatchCoordinator::new(config.pool);
    let mut ids = coordinator.generate(hardware_address, config.count)?;

    if config.sort {
        sort_by_creation_time(&mut ids);
    }

    write_ids(&mut BufWriter::new(io::stdout().lock()), &ids, config.timestamps)?;

    tracing::info!("Generated {} ids", ids.len());
    Ok(())
}

fn log_startup_info(config: &AppConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Generating ids with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Generating {} ids with {} workers",
            config.count,
            config.pool.num_workers
        );
    }
}

fn write_ids(out: &mut impl Write, ids: &[Id], timestamps: bool) -> io::Result<()> {
    for id in ids {
        if timestamps {
            writeln!(out, "{id} {}", id.timestamp())?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    out.flush()
}
