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

//! Configuration module for the updater

use crate::error::{Result, UpdateError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/smolinde/iot-dashboard/releases/latest";

fn default_true() -> bool {
    true
}

fn default_release_url() -> String {
    DEFAULT_RELEASE_URL.to_string()
}

fn default_5() -> u64 {
    5
}

fn default_3() -> u32 {
    3
}

fn default_60() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Enable the daily update check
    #[serde(default = "default_true")]
    pub automatic_updates: bool,

    /// Latest-release endpoint of the release feed
    #[serde(default = "default_release_url")]
    pub release_url: String,

    /// Connect and per-read socket timeout for every network call (seconds)
    #[serde(default = "default_5")]
    pub request_timeout_secs: u64,

    /// Local hour at which the daily update check runs
    #[serde(default = "default_3")]
    pub update_hour: u32,

    /// Duty cycle tick of the application loop (seconds)
    #[serde(default = "default_60")]
    pub tick_interval_secs: u64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            automatic_updates: true,
            release_url: default_release_url(),
            request_timeout_secs: 5,
            update_hour: 3,
            tick_interval_secs: 60,
        }
    }
}

impl UpdaterConfig {
    fn validate(&self) -> Result<()> {
        if self.update_hour > 23 {
            return Err(UpdateError::Config(format!(
                "update_hour must be 0-23, got {}",
                self.update_hour
            )));
        }
        if self.request_timeout_secs == 0 || self.tick_interval_secs == 0 {
            return Err(UpdateError::Config(
                "timeouts and intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<UpdaterConfig> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| UpdateError::Config(format!("Failed to parse config: {e}")))?
    } else {
        // Create with defaults
        let config = UpdaterConfig::default();
        save_config(path, &config)?;
        config
    };
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &UpdaterConfig) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(config)?;

    // Atomic write
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}
