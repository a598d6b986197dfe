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

//! Boot role and boot-stage state machine

use crate::device::Device;
use crate::error::Result;
use crate::layout::{ACTIVE_ENTRY, RootLayout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which logical program the active entry point starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootRole {
    Application,
    Installer,
}

/// Content of an entry-point file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryManifest {
    pub role: BootRole,
}

impl EntryManifest {
    pub fn new(role: BootRole) -> Self {
        Self { role }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Read once at process start: the role declared by the active entry point
pub fn read_boot_role(layout: &RootLayout) -> Result<BootRole> {
    Ok(EntryManifest::read(&layout.path(ACTIVE_ENTRY))?.role)
}

/// State this boot starts in. A manifest that cannot be read suspends the device and yields
/// [`BootState::LowPowerFallback`]; no role is guessed.
pub fn resolve_boot_state(layout: &RootLayout, device: &mut dyn Device) -> BootState {
    match read_boot_role(layout) {
        Ok(role) => BootState::from_role(role),
        Err(e) => {
            tracing::error!("Cannot read active entry point: {e}");
            device.suspend();
            BootState::LowPowerFallback
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Application,
    /// Entry points swapped, restart pending
    StagedSwap,
    Installer,
    /// Terminal; no automatic exit
    LowPowerFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootEvent {
    UpdateVerified,
    Restart,
    InstallSucceeded,
    InstallFailed,
}

impl BootState {
    pub fn from_role(role: BootRole) -> Self {
        match role {
            BootRole::Application => Self::Application,
            BootRole::Installer => Self::Installer,
        }
    }

    /// Next state, or `None` when the event is not valid in this state
    pub fn next(self, event: BootEvent) -> Option<Self> {
        match (self, event) {
            (Self::Application, BootEvent::UpdateVerified) => Some(Self::StagedSwap),
            (Self::StagedSwap, BootEvent::Restart) => Some(Self::Installer),
            (Self::Installer, BootEvent::InstallSucceeded) => Some(Self::Application),
            (Self::Installer, BootEvent::InstallFailed) => Some(Self::LowPowerFallback),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::LowPowerFallback)
    }
}
