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

//! Application-side update orchestration

use crate::boot::{BootEvent, BootState};
use crate::config::UpdaterConfig;
use crate::device::Device;
use crate::downloader;
use crate::error::{ErrorKind, Result, UpdateError};
use crate::events::{UpdateEvent, report_event};
use crate::layout::RootLayout;
use crate::release_checker::{CheckOutcome, ReleaseChecker, build_client};
use crate::reporter::UpdateReporter;
use crate::session::UpdateSession;
use crate::stage;
use crate::verifier;
use std::path::PathBuf;

/// Check, download, verify and promote, with the attempt carried in an explicit
/// [`UpdateSession`].
#[derive(Debug)]
pub struct Updater {
    layout: RootLayout,
    client: reqwest::Client,
    checker: ReleaseChecker,
}

impl Updater {
    pub fn new(config: &UpdaterConfig, layout: RootLayout) -> Result<Self> {
        let client = build_client(config)?;
        let checker = ReleaseChecker::new(client.clone(), config, &layout);
        Ok(Self {
            layout,
            client,
            checker,
        })
    }

    pub async fn check(&self) -> Result<CheckOutcome> {
        self.checker.check().await
    }

    pub async fn download(&self, session: &mut UpdateSession) -> Result<PathBuf> {
        downloader::download(&self.client, &self.layout, session).await
    }

    pub fn verify(&self, session: &mut UpdateSession) -> Result<()> {
        verifier::verify(session)
    }

    pub fn promote(&self, session: UpdateSession, device: &mut dyn Device) -> Result<()> {
        stage::promote(&self.layout, session, device)
    }

    /// One scheduled update attempt.
    ///
    /// Returns [`BootState::StagedSwap`] once control has been handed to the installer and
    /// [`BootState::Application`] when there was nothing to do. Download and integrity failures
    /// are shown on the error screen and returned; the duty cycle carries on either way.
    pub async fn run_cycle(
        &self,
        device: &mut dyn Device,
        reporter: &mut dyn UpdateReporter,
    ) -> Result<BootState> {
        let mut session = match self.check().await? {
            CheckOutcome::Indeterminate => {
                tracing::debug!("Release feed unavailable, retrying next cycle");
                return Ok(BootState::Application);
            }
            CheckOutcome::UpToDate { current } => {
                tracing::info!("Already on latest version: {current}");
                return Ok(BootState::Application);
            }
            CheckOutcome::UpdateAvailable(session) => session,
        };

        let from_version = session.current_version().to_string();
        let to_version = session.release().tag.clone();
        reporter.update_screen(&from_version, &to_version);
        let _ = report_event(&UpdateEvent::UpdateAvailable {
            from_version: from_version.clone(),
            to_version: to_version.clone(),
        });

        reporter.update_action("Downloading update...");
        if let Err(e) = self.download(&mut session).await {
            let _ = report_event(&UpdateEvent::DownloadFailed {
                to_version,
                error: e.to_string(),
            });
            return Err(surface(e, reporter));
        }

        reporter.update_action("Verifying update...");
        if let Err(e) = self.verify(&mut session) {
            if e.kind() == ErrorKind::Integrity {
                let _ = report_event(&UpdateEvent::IntegrityFailed {
                    to_version,
                    error: e.to_string(),
                });
            }
            return Err(surface(e, reporter));
        }

        reporter.update_action("Installing update...");
        let state = BootState::Application
            .next(BootEvent::UpdateVerified)
            .unwrap_or(BootState::StagedSwap);
        self.promote(session, device)?;
        let _ = report_event(&UpdateEvent::StageSwapped {
            from_version,
            to_version,
        });

        Ok(state)
    }
}

fn surface(error: UpdateError, reporter: &mut dyn UpdateReporter) -> UpdateError {
    if let (Some(code), Some(lines)) = (error.code(), error.display_lines()) {
        reporter.error_screen(code, &lines);
    }
    error
}
