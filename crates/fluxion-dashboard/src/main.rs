// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! FluxION Dashboard - entry point
//!
//! Reads the boot role from the active entry point and runs either the application duty cycle
//! or the installer.

use clap::Parser;
use fluxion_dashboard::config::load_config;
use fluxion_dashboard::reporter::LogReporter;
use fluxion_dashboard::schedule::UpdateSchedule;
use fluxion_dashboard::{
    BootState, HostDevice, Installer, RootLayout, Updater, resolve_boot_state,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fluxion-dashboard")]
#[command(about = "FluxION dashboard firmware with self-update", long_about = None)]
struct Cli {
    /// Firmware root directory
    #[arg(short, long, default_value = "/flash")]
    root: PathBuf,

    /// Updater configuration file (created with defaults if missing)
    #[arg(short, long, default_value = "/sd/updater.json")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fluxion_dashboard=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let layout = RootLayout::new(&cli.root);
    let mut device = HostDevice;

    let state = resolve_boot_state(&layout, &mut device);
    info!("Booting into {state:?} from {}", cli.root.display());

    match state {
        BootState::Application => run_application(&cli, layout, &mut device).await?,
        BootState::Installer => {
            let state = Installer::new(layout).run(&mut device);
            info!("Installer finished in {state:?}");
        }
        BootState::StagedSwap | BootState::LowPowerFallback => {
            warn!("Nothing to run in {state:?}");
        }
    }

    Ok(())
}

async fn run_application(
    cli: &Cli,
    layout: RootLayout,
    device: &mut HostDevice,
) -> anyhow::Result<()> {
    let config = load_config(&cli.config)?;
    info!(
        "Loaded config: automatic_updates={}, update_hour={}",
        config.automatic_updates, config.update_hour
    );

    let updater = Updater::new(&config, layout)?;
    let mut schedule = UpdateSchedule::new(config.update_hour);
    let mut reporter = LogReporter;
    let mut tick = tokio::time::interval(Duration::from_secs(config.tick_interval_secs));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = tick.tick() => {
                if !config.automatic_updates {
                    continue;
                }
                if !schedule.observe(chrono::Local::now().naive_local()) {
                    continue;
                }

                match updater.run_cycle(device, &mut reporter).await {
                    Ok(state) => info!("Update cycle finished in {state:?}"),
                    Err(e) => warn!("Update cycle failed ({:?}): {e}", e.kind()),
                }
            }
        }
    }

    Ok(())
}
