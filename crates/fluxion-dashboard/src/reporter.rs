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

//! Display seam for the update screens

/// What the dashboard shows while an update runs. Drawing itself lives in the display driver.
pub trait UpdateReporter {
    /// Switch to the update screen
    fn update_screen(&mut self, current: &str, latest: &str);

    /// Progress line under the version pair
    fn update_action(&mut self, action: &str);

    /// Error screen with code and four text lines
    fn error_screen(&mut self, code: &str, lines: &[String]);
}

/// Reporter for headless builds: everything goes to the log
#[derive(Debug, Default)]
pub struct LogReporter;

impl UpdateReporter for LogReporter {
    fn update_screen(&mut self, current: &str, latest: &str) {
        tracing::info!("Updating {current} -> {latest}");
    }

    fn update_action(&mut self, action: &str) {
        tracing::info!("{action}");
    }

    fn error_screen(&mut self, code: &str, lines: &[String]) {
        tracing::error!("[{code}] {}", lines.join(" "));
    }
}
