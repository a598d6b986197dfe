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

//! State carried through one update attempt

use crate::release_checker::ReleaseMetadata;
use std::path::{Path, PathBuf};

/// One update attempt, from a successful check up to the stage swap.
///
/// Only a check that found a differing tag produces a session, and each later step records what
/// it established, so download, verify and promote can refuse to run out of order.
#[derive(Debug, Clone)]
pub struct UpdateSession {
    current_version: String,
    release: ReleaseMetadata,
    archive: Option<PathBuf>,
    verified: bool,
}

impl UpdateSession {
    pub(crate) fn new(current_version: String, release: ReleaseMetadata) -> Self {
        Self {
            current_version,
            release,
            archive: None,
            verified: false,
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn release(&self) -> &ReleaseMetadata {
        &self.release
    }

    /// Downloaded archive, once `download` succeeded
    pub fn archive(&self) -> Option<&Path> {
        self.archive.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub(crate) fn record_download(&mut self, path: PathBuf) {
        self.archive = Some(path);
        self.verified = false;
    }

    pub(crate) fn mark_verified(&mut self) {
        self.verified = true;
    }
}
