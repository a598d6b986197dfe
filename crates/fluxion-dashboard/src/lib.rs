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

//! FluxION Dashboard - firmware self-update
//!
//! The application role checks the release feed once a day, downloads and verifies the firmware
//! archive, then swaps entry points and restarts. The installer role runs on the next boot, wipes
//! the root, unpacks the archive and restarts into the new application, or suspends the device
//! when anything goes wrong.

pub mod boot;
pub mod config;
pub mod device;
pub mod downloader;
pub mod error;
pub mod events;
pub mod installer;
pub mod layout;
pub mod package;
pub mod release_checker;
pub mod reporter;
pub mod schedule;
pub mod session;
pub mod stage;
pub mod updater;
pub mod verifier;
pub mod version;

pub use boot::{BootRole, BootState, read_boot_role, resolve_boot_state};
pub use config::UpdaterConfig;
pub use device::{Device, HostDevice};
pub use error::{ErrorKind, InstallError, UpdateError};
pub use installer::Installer;
pub use layout::RootLayout;
pub use release_checker::{CheckOutcome, ReleaseMetadata};
pub use session::UpdateSession;
pub use updater::Updater;
