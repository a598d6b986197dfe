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

//! Hardware seam: restart and low-power suspend

/// The two terminal actions of a boot stage.
///
/// On hardware neither call returns; test doubles record the call and return.
pub trait Device {
    /// Reset the board; the next boot reads the entry point afresh
    fn restart(&mut self);

    /// Enter low-power suspend with no wake source; only an external reset recovers
    fn suspend(&mut self);
}

/// Device backed by the host process: restart re-executes the binary, suspend parks it.
#[derive(Debug, Default)]
pub struct HostDevice;

#[cfg(unix)]
impl Device for HostDevice {
    fn restart(&mut self) {
        use std::os::unix::process::CommandExt;

        tracing::info!("Restarting");
        let exe = match std::env::current_exe() {
            Ok(exe) => exe,
            Err(e) => {
                tracing::error!("Cannot resolve own executable: {e}");
                std::process::exit(1);
            }
        };
        let err = std::process::Command::new(exe)
            .args(std::env::args_os().skip(1))
            .exec();
        tracing::error!("Restart failed: {err}");
        std::process::exit(1);
    }

    fn suspend(&mut self) {
        tracing::warn!("Entering low-power suspend, external reset required");
        loop {
            nix::unistd::pause();
        }
    }
}
