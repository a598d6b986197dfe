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

//! Release packaging: build `firmware_<tag>.tar.gz` from a source tree

use crate::error::{Result, UpdateError};
use crate::layout::{ACTIVE_ENTRY, INSTALLER_ENTRY, STAGED_ENTRY, VERSION_FILE, archive_name, is_archive_name};
use crate::verifier::sha256_file;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PackagedFirmware {
    pub archive: PathBuf,
    /// `sha256:<hex>`, the form published next to the release asset
    pub digest: String,
}

/// Package `source` as release `tag` into `output_dir`.
///
/// The top-level `entry.json` ships as `entry_NEW.json` and a `version` file containing the tag
/// is added; directories always precede their contents.
pub fn package_firmware(source: &Path, tag: &str, output_dir: &Path) -> Result<PackagedFirmware> {
    let name = archive_name(tag);
    if !is_archive_name(&name) {
        return Err(UpdateError::Config(format!(
            "Release tag must look like v<semver>, got {tag}"
        )));
    }
    for required in [ACTIVE_ENTRY, INSTALLER_ENTRY] {
        if !source.join(required).is_file() {
            return Err(UpdateError::Config(format!(
                "Source tree {} has no {required}",
                source.display()
            )));
        }
    }

    fs::create_dir_all(output_dir)?;
    let archive = output_dir.join(&name);
    let file = File::create(&archive)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    append_tree(&mut builder, source, Path::new(""))?;

    let mut header = tar::Header::new_gnu();
    header.set_size(tag.len() as u64);
    header.set_mode(0o644);
    builder.append_data(&mut header, VERSION_FILE, tag.as_bytes())?;

    builder.into_inner()?.finish()?;

    let digest = format!("sha256:{}", sha256_file(&archive)?);
    tracing::info!("Firmware archive created: {}", archive.display());
    Ok(PackagedFirmware { archive, digest })
}

fn append_tree(builder: &mut tar::Builder<GzEncoder<File>>, dir: &Path, relative: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);
    let top_level = relative.as_os_str().is_empty();

    for entry in entries {
        let path = entry.path();
        let file_name = entry.file_name();
        let member = relative.join(&file_name);

        if top_level {
            let name = file_name.to_string_lossy();
            if name == VERSION_FILE || name == STAGED_ENTRY || is_archive_name(&name) {
                tracing::debug!("Skipping {}", path.display());
                continue;
            }
            if name == ACTIVE_ENTRY {
                builder.append_path_with_name(&path, STAGED_ENTRY)?;
                continue;
            }
        }

        if path.is_dir() {
            builder.append_dir(&member, &path)?;
            append_tree(builder, &path, &member)?;
        } else {
            builder.append_path_with_name(&path, &member)?;
        }
    }
    Ok(())
}
