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

//! Stage swap: hand the next boot to the installer

use crate::device::Device;
use crate::error::{Result, UpdateError};
use crate::layout::{ACTIVE_ENTRY, BACKUP_ENTRY, INSTALLER_ENTRY, RootLayout};
use crate::session::UpdateSession;
use std::fs;
use std::io;
use std::path::Path;

/// Swap entry points and restart into the installer.
///
/// The session is consumed: the restart discards every in-memory piece of the attempt.
pub fn promote(layout: &RootLayout, session: UpdateSession, device: &mut dyn Device) -> Result<()> {
    if !session.is_verified() {
        return Err(UpdateError::Sequence("promote requires a verified archive"));
    }

    swap_entry_points(layout)?;
    tracing::info!(
        "Entry points swapped for {}, restarting into installer",
        session.release().tag
    );
    device.restart();
    Ok(())
}

/// active → backup, installer → active
pub fn swap_entry_points(layout: &RootLayout) -> Result<()> {
    swap_with(layout, |from, to| fs::rename(from, to))
}

fn swap_with(
    layout: &RootLayout,
    rename: impl Fn(&Path, &Path) -> io::Result<()>,
) -> Result<()> {
    let active = layout.path(ACTIVE_ENTRY);
    let installer = layout.path(INSTALLER_ENTRY);
    let backup = layout.path(BACKUP_ENTRY);

    if !installer.is_file() {
        return Err(UpdateError::StageSwap(format!(
            "installer entry point {} missing",
            installer.display()
        )));
    }

    rename(&active, &backup)
        .map_err(|e| UpdateError::StageSwap(format!("Failed to back up active entry: {e}")))?;

    if let Err(e) = rename(&installer, &active) {
        if let Err(revert) = rename(&backup, &active) {
            tracing::error!("Failed to restore active entry point: {revert}");
        }
        return Err(UpdateError::StageSwap(format!(
            "Failed to activate installer: {e}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot::{BootRole, EntryManifest, read_boot_role};
    use crate::device::testing::RecordingDevice;
    use crate::release_checker::ReleaseMetadata;
    use tempfile::TempDir;

    fn prepared_root() -> (TempDir, RootLayout) {
        let temp = TempDir::new().unwrap();
        let layout = RootLayout::new(temp.path());
        EntryManifest::new(BootRole::Application)
            .write(&layout.path(ACTIVE_ENTRY))
            .unwrap();
        EntryManifest::new(BootRole::Installer)
            .write(&layout.path(INSTALLER_ENTRY))
            .unwrap();
        (temp, layout)
    }

    fn session() -> UpdateSession {
        UpdateSession::new(
            "v1.0.0".to_string(),
            ReleaseMetadata {
                tag: "v1.1.0".to_string(),
                asset_name: "firmware_v1.1.0.tar.gz".to_string(),
                download_url: "http://localhost/unused".to_string(),
                expected_digest: "0".repeat(64),
            },
        )
    }

    #[test]
    fn test_swap_activates_installer() {
        let (_temp, layout) = prepared_root();
        swap_entry_points(&layout).unwrap();

        assert_eq!(read_boot_role(&layout).unwrap(), BootRole::Installer);
        assert!(!layout.path(INSTALLER_ENTRY).exists());
        assert_eq!(
            EntryManifest::read(&layout.path(BACKUP_ENTRY)).unwrap().role,
            BootRole::Application
        );
    }

    #[test]
    fn test_missing_installer_leaves_application_active() {
        let (_temp, layout) = prepared_root();
        fs::remove_file(layout.path(INSTALLER_ENTRY)).unwrap();

        assert!(matches!(
            swap_entry_points(&layout),
            Err(UpdateError::StageSwap(_))
        ));
        assert_eq!(read_boot_role(&layout).unwrap(), BootRole::Application);
        assert!(!layout.path(BACKUP_ENTRY).exists());
    }

    #[test]
    fn test_promote_requires_verification() {
        let (_temp, layout) = prepared_root();
        let mut device = RecordingDevice::default();

        let result = promote(&layout, session(), &mut device);
        assert!(matches!(result, Err(UpdateError::Sequence(_))));
        assert_eq!(device.restarts, 0);
        assert_eq!(read_boot_role(&layout).unwrap(), BootRole::Application);
    }

    #[test]
    fn test_promote_restarts_after_swap() {
        let (_temp, layout) = prepared_root();
        let mut device = RecordingDevice::default();
        let mut session = session();
        session.record_download(layout.path("firmware_v1.1.0.tar.gz"));
        session.mark_verified();

        promote(&layout, session, &mut device).unwrap();
        assert_eq!(device.restarts, 1);
        assert_eq!(read_boot_role(&layout).unwrap(), BootRole::Installer);
    }

    #[test]
    fn test_failed_activation_restores_application() {
        let (_temp, layout) = prepared_root();
        let refuse_installer = |from: &Path, to: &Path| {
            if from.ends_with(INSTALLER_ENTRY) {
                return Err(io::Error::other("media error"));
            }
            fs::rename(from, to)
        };

        assert!(matches!(
            swap_with(&layout, refuse_installer),
            Err(UpdateError::StageSwap(_))
        ));
        assert_eq!(
            EntryManifest::read(&layout.path(ACTIVE_ENTRY)).unwrap().role,
            BootRole::Application
        );
        assert!(!layout.path(BACKUP_ENTRY).exists());
        assert!(layout.path(INSTALLER_ENTRY).exists());
    }
}
