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

//! Installer role: wipe the root, unpack the archive, activate the new application

use crate::boot::BootState;
use crate::device::Device;
use crate::error::InstallError;
use crate::events::{UpdateEvent, report_event};
use crate::layout::{
    ACTIVE_ENTRY, LIBRARY_DIR, RootLayout, STAGED_ENTRY, tag_from_archive_name,
};
use crate::version::VersionStore;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tar::EntryType;

type Result<T> = std::result::Result<T, InstallError>;

/// Removes one root entry during the wipe
type RemoveFn = fn(&Path) -> io::Result<()>;

#[derive(Debug)]
pub struct Installer {
    layout: RootLayout,
    remove: RemoveFn,
}

impl Installer {
    pub fn new(layout: RootLayout) -> Self {
        Self {
            layout,
            remove: remove_entry,
        }
    }

    #[cfg(test)]
    fn with_remove(mut self, remove: RemoveFn) -> Self {
        self.remove = remove;
        self
    }

    /// Run the whole install. Success restarts into the application; any failure suspends the
    /// device instead of rebooting into the same failure.
    pub fn run(&self, device: &mut dyn Device) -> BootState {
        match self.install(device) {
            Ok(()) => BootState::Application,
            Err(e) => {
                tracing::error!("Install failed: {e}");
                let _ = report_event(&UpdateEvent::InstallFailed {
                    error: e.to_string(),
                });
                device.suspend();
                BootState::LowPowerFallback
            }
        }
    }

    fn install(&self, device: &mut dyn Device) -> Result<()> {
        let archive = self.locate_archive()?;
        tracing::info!("Installing {archive}");
        self.wipe(&archive)?;
        let members = self.extract(&archive)?;
        tracing::info!("Extracted {members} members from {archive}");
        self.finalize(&archive, device)
    }

    /// The single pending archive on the root filesystem
    pub fn locate_archive(&self) -> Result<String> {
        let mut archives = self.layout.find_archives().map_err(|source| InstallError::Wipe {
            path: self.layout.root().to_path_buf(),
            source,
        })?;

        match archives.len() {
            0 => Err(InstallError::NoArchive(self.layout.root().to_path_buf())),
            1 => Ok(archives.remove(0)),
            _ => Err(InstallError::AmbiguousArchive(archives)),
        }
    }

    /// Remove every root entry except the library directory, the archive and the active entry
    /// point. The first failure aborts.
    pub fn wipe(&self, archive: &str) -> Result<()> {
        let root = self.layout.root();
        let wipe_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| InstallError::Wipe { path, source }
        };

        for entry in fs::read_dir(root).map_err(wipe_err(root))? {
            let entry = entry.map_err(wipe_err(root))?;
            let path = entry.path();
            let name = entry.file_name();

            if name == LIBRARY_DIR || name == archive || name == ACTIVE_ENTRY {
                tracing::debug!("Keeping {}", path.display());
                continue;
            }

            (self.remove)(&path).map_err(wipe_err(&path))?;
            tracing::debug!("Removed {}", path.display());
        }

        Ok(())
    }

    /// Unpack members in archive order. Returns the number of members written.
    pub fn extract(&self, archive: &str) -> Result<usize> {
        let archive_path = self.layout.path(archive);
        let file = File::open(&archive_path).map_err(|source| InstallError::Extract {
            member: archive.to_string(),
            source,
        })?;
        let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));

        let entries = tarball.entries().map_err(|source| InstallError::Extract {
            member: archive.to_string(),
            source,
        })?;

        let mut written = 0;
        for entry in entries {
            let mut entry = entry.map_err(|source| InstallError::Extract {
                member: archive.to_string(),
                source,
            })?;
            let raw = entry
                .path()
                .map_err(|source| InstallError::Extract {
                    member: archive.to_string(),
                    source,
                })?
                .into_owned();
            let member = raw.display().to_string();

            let Some(relative) = member_path(&raw)? else {
                continue;
            };
            let target = self.layout.root().join(&relative);
            let extract_err = |source| InstallError::Extract {
                member: member.clone(),
                source,
            };

            match entry.header().entry_type() {
                EntryType::Directory => create_member_dir(&target).map_err(extract_err)?,
                EntryType::Regular | EntryType::Continuous => {
                    let mut out = File::create(&target).map_err(extract_err)?;
                    io::copy(&mut entry, &mut out).map_err(extract_err)?;
                }
                EntryType::XGlobalHeader => continue,
                other => {
                    return Err(InstallError::UnsupportedMember {
                        member,
                        kind: format!("{other:?}"),
                    });
                }
            }

            tracing::info!("{member}");
            written += 1;
        }

        Ok(written)
    }

    /// Retire the installer entry point, activate the staged application and drop the archive,
    /// then restart.
    pub fn finalize(&self, archive: &str, device: &mut dyn Device) -> Result<()> {
        let active = self.layout.path(ACTIVE_ENTRY);
        let staged = self.layout.path(STAGED_ENTRY);

        if !staged.is_file() {
            return Err(InstallError::Finalize(format!(
                "archive did not ship {STAGED_ENTRY}"
            )));
        }

        fs::remove_file(&active).map_err(|e| {
            InstallError::Finalize(format!("Failed to remove installer entry point: {e}"))
        })?;
        fs::rename(&staged, &active).map_err(|e| {
            InstallError::Finalize(format!("Failed to activate new entry point: {e}"))
        })?;

        self.ensure_version_file(archive)?;

        fs::remove_file(self.layout.path(archive))
            .map_err(|e| InstallError::Finalize(format!("Failed to remove {archive}: {e}")))?;

        let _ = report_event(&UpdateEvent::InstallCompleted {
            archive: archive.to_string(),
        });
        tracing::info!("Install complete, restarting into application");
        device.restart();
        Ok(())
    }

    /// The installed tree normally ships its own `version`; fall back to the archive tag so the
    /// next check does not offer the same release again.
    fn ensure_version_file(&self, archive: &str) -> Result<()> {
        let store = VersionStore::new(&self.layout);
        if store.exists() {
            return Ok(());
        }

        let tag = tag_from_archive_name(archive)
            .ok_or_else(|| InstallError::Finalize(format!("Cannot derive tag from {archive}")))?;
        tracing::warn!("Archive shipped no version file, writing {tag}");
        store
            .store(tag)
            .map_err(|e| InstallError::Finalize(format!("Failed to write version: {e}")))
    }
}

/// Directories go recursively; files and links are unlinked
fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Root-relative path of a member, `None` for the archive root itself
fn member_path(raw: &Path) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => relative.push(part),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::UnsafeMember(raw.display().to_string()));
            }
        }
    }
    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}

/// Parents are not created: a member arriving before its directory is an error
fn create_member_dir(target: &Path) -> io::Result<()> {
    match fs::create_dir(target) {
        Err(e) if e.kind() == ErrorKind::AlreadyExists && target.is_dir() => Ok(()),
        other => other,
    }
}
