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

//! Fixed names of the firmware root filesystem

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Installed version tag, plain text
pub const VERSION_FILE: &str = "version";
pub const DEFAULT_VERSION: &str = "v0.0.0";

/// Precompiled libraries, never touched by the installer
pub const LIBRARY_DIR: &str = "lib";

/// Entry point loaded at boot
pub const ACTIVE_ENTRY: &str = "entry.json";
/// Installer entry point waiting for the next stage swap
pub const INSTALLER_ENTRY: &str = "installer.json";
/// Previous application entry point after a stage swap
pub const BACKUP_ENTRY: &str = "entry_OLD.json";
/// New application entry point shipped inside the archive
pub const STAGED_ENTRY: &str = "entry_NEW.json";

const ARCHIVE_PREFIX: &str = "firmware_";
const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Archive file name for a release tag, e.g. `firmware_v1.2.0.tar.gz`
pub fn archive_name(tag: &str) -> String {
    format!("{ARCHIVE_PREFIX}{tag}{ARCHIVE_SUFFIX}")
}

/// True for `firmware_v<anything>.tar.gz` plain file names
pub fn is_archive_name(name: &str) -> bool {
    tag_from_archive_name(name).is_some()
}

/// Extract the release tag from an archive file name
pub fn tag_from_archive_name(name: &str) -> Option<&str> {
    if name.contains('/') || name.contains('\\') {
        return None;
    }
    let tag = name
        .strip_prefix(ARCHIVE_PREFIX)?
        .strip_suffix(ARCHIVE_SUFFIX)?;
    (tag.len() > 1 && tag.starts_with('v')).then_some(tag)
}

/// The firmware root directory
#[derive(Debug, Clone)]
pub struct RootLayout {
    root: PathBuf,
}

impl RootLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a root-level entry
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Names of all root-level files matching the archive pattern, sorted
    pub fn find_archives(&self) -> io::Result<Vec<String>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && is_archive_name(name)
            {
                found.push(name.to_string());
            }
        }
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_name_pattern() {
        assert!(is_archive_name("firmware_v1.1.0.tar.gz"));
        assert!(!is_archive_name("firmware_1.1.0.tar.gz"));
        assert!(!is_archive_name("firmware_v1.1.0.tar.gz.part"));
        assert!(!is_archive_name("firmware_v.tar.gz"));
        assert!(!is_archive_name("../firmware_v1.1.0.tar.gz"));
        assert!(!is_archive_name("update.tar.gz"));
    }

    #[test]
    fn test_tag_roundtrip_through_name() {
        let name = archive_name("v2.0.1");
        assert_eq!(name, "firmware_v2.0.1.tar.gz");
        assert_eq!(tag_from_archive_name(&name), Some("v2.0.1"));
    }

    #[test]
    fn test_find_archives_ignores_directories_and_partials() {
        let temp = TempDir::new().unwrap();
        let layout = RootLayout::new(temp.path());
        fs::write(layout.path("firmware_v1.0.0.tar.gz"), b"a").unwrap();
        fs::write(layout.path("firmware_v1.1.0.tar.gz.part"), b"b").unwrap();
        fs::create_dir(layout.path("firmware_v9.9.9.tar.gz")).unwrap();
        fs::write(layout.path("version"), b"v1.0.0").unwrap();

        assert_eq!(
            layout.find_archives().unwrap(),
            vec!["firmware_v1.0.0.tar.gz".to_string()]
        );
    }
}
