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

//! Persisted version tag of the installed firmware

use crate::error::Result;
use crate::layout::{DEFAULT_VERSION, RootLayout, VERSION_FILE};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads and writes the root `version` file
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(layout: &RootLayout) -> Self {
        Self {
            path: layout.path(VERSION_FILE),
        }
    }

    /// Current version tag, writing the default first when the file is absent
    pub fn load_or_init(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No version file, initializing to {DEFAULT_VERSION}");
                self.store(DEFAULT_VERSION)?;
                Ok(DEFAULT_VERSION.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn store(&self, version: &str) -> Result<()> {
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, version)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
