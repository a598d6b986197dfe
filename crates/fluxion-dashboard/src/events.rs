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

//! Structured update events

use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub enum UpdateEvent {
    UpdateAvailable {
        from_version: String,
        to_version: String,
    },
    DownloadFailed {
        to_version: String,
        error: String,
    },
    IntegrityFailed {
        to_version: String,
        error: String,
    },
    StageSwapped {
        from_version: String,
        to_version: String,
    },
    InstallCompleted {
        archive: String,
    },
    InstallFailed {
        error: String,
    },
}

/// Log an update event as a JSON line.
///
/// Errors are returned for the caller to ignore; reporting never blocks the update flow.
pub fn report_event(event: &UpdateEvent) -> Result<()> {
    let event_json = serde_json::to_string(event)?;
    tracing::info!("Update event: {event_json}");
    Ok(())
}
