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

//! SHA-256 integrity verification of the downloaded archive

use crate::error::{Result, UpdateError};
use crate::session::UpdateSession;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const CHUNK_SIZE: usize = 8 * 1024;

/// Hex characters of each digest shown on a mismatch
pub const TAIL_LEN: usize = 10;

/// Lowercase hex SHA-256 of a file, read in [`CHUNK_SIZE`] chunks
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn digest_tail(digest: &str) -> &str {
    let start = digest.len().saturating_sub(TAIL_LEN);
    digest.get(start..).unwrap_or(digest)
}

/// Exact, case-sensitive comparison
pub fn check_digest(actual: &str, expected: &str) -> Result<()> {
    if actual == expected {
        return Ok(());
    }
    Err(UpdateError::Integrity {
        actual_tail: digest_tail(actual).to_string(),
        expected_tail: digest_tail(expected).to_string(),
    })
}

/// Hash the downloaded archive and compare against the published digest.
///
/// On mismatch the archive stays on disk for inspection.
pub fn verify(session: &mut UpdateSession) -> Result<()> {
    let path = session
        .archive()
        .ok_or(UpdateError::Sequence("verify requires a downloaded archive"))?;

    let actual = sha256_file(path)?;
    if let Err(e) = check_digest(&actual, &session.release().expected_digest) {
        tracing::error!("Archive {} failed verification: {e}", path.display());
        return Err(e);
    }

    tracing::info!("Archive {} verified", path.display());
    session.mark_verified();
    Ok(())
}
