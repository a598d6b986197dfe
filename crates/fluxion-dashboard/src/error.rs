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

//! Error types for the update subsystem

use std::path::PathBuf;
use thiserror::Error;

/// How a failure propagates through the application duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Release feed unreachable or malformed, ignored until the next cycle
    Indeterminate,
    /// Download failed, retried on the next daily cycle
    Retryable,
    /// Archive does not match the published digest
    Integrity,
    /// Local storage, configuration or sequencing problem in the application role
    Local,
}

/// Errors raised while running in the application role
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("config error: {0}")]
    Config(String),

    #[error("release check failed: {0}")]
    ReleaseCheck(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("integrity check failed: file [...]{actual_tail}, expected [...]{expected_tail}")]
    Integrity {
        actual_tail: String,
        expected_tail: String,
    },

    #[error("stage swap failed: {0}")]
    StageSwap(String),

    #[error("update step out of order: {0}")]
    Sequence(&'static str),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReleaseCheck(_) => ErrorKind::Indeterminate,
            Self::Download(_) => ErrorKind::Retryable,
            Self::Integrity { .. } => ErrorKind::Integrity,
            Self::Config(_)
            | Self::StageSwap(_)
            | Self::Sequence(_)
            | Self::Io(_)
            | Self::Json(_) => ErrorKind::Local,
        }
    }

    /// Error screen code, only for failures shown to the user
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Download(_) => Some("2601"),
            Self::Integrity { .. } => Some("2602"),
            Self::Config(_)
            | Self::ReleaseCheck(_)
            | Self::StageSwap(_)
            | Self::Sequence(_)
            | Self::Io(_)
            | Self::Json(_) => None,
        }
    }

    /// The four lines drawn under the error code
    pub fn display_lines(&self) -> Option<[String; 4]> {
        match self {
            Self::Download(_) => Some([
                "Update Download Failed!".to_string(),
                "Something went wrong while downloading".to_string(),
                "the update. The system will attempt to".to_string(),
                "download the update in 24 hours again!".to_string(),
            ]),
            Self::Integrity {
                actual_tail,
                expected_tail,
            } => Some([
                "Update Verification Failed!".to_string(),
                "The system will discard this update.".to_string(),
                format!("File SHA256 (tail): [...]{actual_tail}"),
                format!("True SHA256 (tail): [...]{expected_tail}"),
            ]),
            Self::Config(_)
            | Self::ReleaseCheck(_)
            | Self::StageSwap(_)
            | Self::Sequence(_)
            | Self::Io(_)
            | Self::Json(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised while running in the installer role. Every variant is fatal for the boot.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("no update archive found in {0}")]
    NoArchive(PathBuf),

    #[error("more than one update archive found: {0:?}")]
    AmbiguousArchive(Vec<String>),

    #[error("failed to wipe {path}: {source}")]
    Wipe {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to extract {member}: {source}")]
    Extract {
        member: String,
        source: std::io::Error,
    },

    #[error("archive member {0} escapes the firmware root")]
    UnsafeMember(String),

    #[error("archive member {member} has unsupported type {kind}")]
    UnsupportedMember { member: String, kind: String },

    #[error("failed to finalize install: {0}")]
    Finalize(String),
}
