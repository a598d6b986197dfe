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

//! Release feed checking module

use crate::config::UpdaterConfig;
use crate::error::{Result, UpdateError};
use crate::layout::{RootLayout, is_archive_name};
use crate::session::UpdateSession;
use crate::version::VersionStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const USER_AGENT: &str = concat!("fluxion-dashboard/", env!("CARGO_PKG_VERSION"));

/// Length of the `sha256:` algorithm prefix on the asset digest
const DIGEST_PREFIX_LEN: usize = 7;
const SHA256_HEX_LEN: usize = 64;

/// What the release feed says about the newest firmware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    pub tag: String,
    pub asset_name: String,
    pub download_url: String,
    /// 64 lowercase hex characters
    pub expected_digest: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct GithubRelease {
    tag_name: String,
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
    digest: String,
}

/// Result of comparing the persisted version with the release feed
#[derive(Debug)]
pub enum CheckOutcome {
    /// Feed unreachable or malformed; nothing was learned and nothing changed
    Indeterminate,
    /// Remote tag equals the installed one
    UpToDate { current: String },
    UpdateAvailable(UpdateSession),
}

impl CheckOutcome {
    /// `(current, latest)` as reported to the display; both `None` when indeterminate
    pub fn versions(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Self::Indeterminate => (None, None),
            Self::UpToDate { current } => (Some(current.as_str()), Some(current.as_str())),
            Self::UpdateAvailable(session) => (
                Some(session.current_version()),
                Some(session.release().tag.as_str()),
            ),
        }
    }
}

/// HTTP client shared by the release check and the download.
///
/// The timeout bounds connecting and each socket read, not the whole transfer: an archive that
/// keeps arriving is never cut off.
pub fn build_client(config: &UpdaterConfig) -> Result<reqwest::Client> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
        .map_err(|e| UpdateError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Strip the algorithm prefix and require a lowercase SHA-256 hex digest
pub fn digest_from_field(raw: &str) -> Option<&str> {
    let hex = raw.get(DIGEST_PREFIX_LEN..)?;
    let valid = hex.len() == SHA256_HEX_LEN
        && hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    valid.then_some(hex)
}

#[derive(Debug)]
pub struct ReleaseChecker {
    client: reqwest::Client,
    url: String,
    store: VersionStore,
}

impl ReleaseChecker {
    pub fn new(client: reqwest::Client, config: &UpdaterConfig, layout: &RootLayout) -> Self {
        Self {
            client,
            url: config.release_url.clone(),
            store: VersionStore::new(layout),
        }
    }

    /// Compare the installed version with the newest release.
    ///
    /// Feed failures are folded into [`CheckOutcome::Indeterminate`]; only local storage errors
    /// on the version file are returned as `Err`.
    pub async fn check(&self) -> Result<CheckOutcome> {
        let current = self.store.load_or_init()?;

        let release = match self.fetch_latest().await {
            Ok(release) => release,
            Err(e) => {
                tracing::warn!("Release check indeterminate: {e}");
                return Ok(CheckOutcome::Indeterminate);
            }
        };

        if release.tag == current {
            return Ok(CheckOutcome::UpToDate { current });
        }

        tracing::info!("Release {} available (installed: {current})", release.tag);
        Ok(CheckOutcome::UpdateAvailable(UpdateSession::new(
            current, release,
        )))
    }

    pub async fn fetch_latest(&self) -> Result<ReleaseMetadata> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpdateError::ReleaseCheck(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(UpdateError::ReleaseCheck(format!(
                "Release feed returned {}",
                response.status()
            )));
        }

        let release: GithubRelease = response
            .json()
            .await
            .map_err(|e| UpdateError::ReleaseCheck(format!("Failed to parse response: {e}")))?;

        metadata_from_release(release)
    }
}

fn metadata_from_release(release: GithubRelease) -> Result<ReleaseMetadata> {
    let asset = release
        .assets
        .into_iter()
        .next()
        .ok_or_else(|| UpdateError::ReleaseCheck("Release has no assets".to_string()))?;

    if !is_archive_name(&asset.name) {
        return Err(UpdateError::ReleaseCheck(format!(
            "Unexpected asset name: {}",
            asset.name
        )));
    }

    let expected_digest = digest_from_field(&asset.digest)
        .ok_or_else(|| UpdateError::ReleaseCheck(format!("Malformed digest: {}", asset.digest)))?
        .to_string();

    Ok(ReleaseMetadata {
        tag: release.tag_name,
        asset_name: asset.name,
        download_url: asset.browser_download_url,
        expected_digest,
    })
}
