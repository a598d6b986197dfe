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

//! Builds a firmware release archive and prints the digest to publish with it

use anyhow::{Context, Result};
use clap::Parser;
use fluxion_dashboard::package::package_firmware;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fluxion-firmware-pack")]
#[command(about = "Package a firmware tree as firmware_<tag>.tar.gz", long_about = None)]
struct Cli {
    /// Release tag, e.g. v1.2.0
    version: String,

    /// Firmware source tree
    #[arg(short, long, default_value = "src")]
    source: PathBuf,

    /// Directory receiving the archive
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fluxion_dashboard=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let packaged = package_firmware(&cli.source, &cli.version, &cli.output)
        .with_context(|| format!("Failed to package {}", cli.source.display()))?;

    println!("{}", packaged.archive.display());
    println!("{}", packaged.digest);
    Ok(())
}
