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

//! Firmware archive downloader module

use crate::error::{Result, UpdateError};
use crate::layout::RootLayout;
use crate::session::UpdateSession;
use futures_util::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fetch the release asset into `/<asset name>`.
///
/// Any failure is retryable: the partial file is removed and the next daily cycle tries again.
pub async fn download(
    client: &reqwest::Client,
    layout: &RootLayout,
    session: &mut UpdateSession,
) -> Result<PathBuf> {
    let asset_name = session.release().asset_name.clone();
    let target = layout.path(&asset_name);
    let partial = layout.path(&format!("{asset_name}.part"));

    remove_stale_archives(layout, &asset_name)?;

    tracing::info!(
        "Downloading {} from {}",
        asset_name,
        session.release().download_url
    );

    if let Err(e) = fetch_to_file(client, &session.release().download_url, &partial).await {
        if partial.exists() {
            let _ = fs::remove_file(&partial);
        }
        return Err(e);
    }

    fs::rename(&partial, &target)
        .map_err(|e| UpdateError::Download(format!("Failed to move archive into place: {e}")))?;

    session.record_download(target.clone());
    Ok(target)
}

/// Keep at most one pending archive on the root filesystem
fn remove_stale_archives(layout: &RootLayout, keep: &str) -> Result<()> {
    let archives = layout
        .find_archives()
        .map_err(|e| UpdateError::Download(format!("Failed to list root: {e}")))?;

    for name in archives.iter().filter(|name| name.as_str() != keep) {
        tracing::info!("Removing stale archive {name}");
        fs::remove_file(layout.path(name))
            .map_err(|e| UpdateError::Download(format!("Failed to remove {name}: {e}")))?;
    }
    Ok(())
}

async fn fetch_to_file(client: &reqwest::Client, url: &str, path: &Path) -> Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| UpdateError::Download(format!("Request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(UpdateError::Download(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let mut file = File::create(path)
        .map_err(|e| UpdateError::Download(format!("Failed to create {}: {e}", path.display())))?;

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| UpdateError::Download(format!("Failed to read body: {e}")))?;
        file.write_all(&chunk)
            .map_err(|e| UpdateError::Download(format!("Failed to write archive: {e}")))?;
        written += chunk.len() as u64;
    }

    file.sync_all()
        .map_err(|e| UpdateError::Download(format!("Failed to flush archive: {e}")))?;

    tracing::debug!("Downloaded {written} bytes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpdaterConfig;
    use crate::error::ErrorKind;
    use crate::release_checker::{ReleaseMetadata, build_client};
    use mockito::Server;
    use std::time::Duration;
    use tempfile::TempDir;

    fn client_with_timeout(secs: u64) -> reqwest::Client {
        build_client(&UpdaterConfig {
            request_timeout_secs: secs,
            ..Default::default()
        })
        .unwrap()
    }

    fn session_for(url: String) -> UpdateSession {
        UpdateSession::new(
            "v1.0.0".to_string(),
            ReleaseMetadata {
                tag: "v1.1.0".to_string(),
                asset_name: "firmware_v1.1.0.tar.gz".to_string(),
                download_url: url,
                expected_digest: "0".repeat(64),
            },
        )
    }

    #[tokio::test]
    async fn test_download_writes_body_verbatim() {
        let mut server = Server::new_async().await;
        let root = TempDir::new().unwrap();
        let layout = RootLayout::new(root.path());
        let body: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();

        let mock = server
            .mock("GET", "/download/firmware_v1.1.0.tar.gz")
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let mut session = session_for(format!(
            "{}/download/firmware_v1.1.0.tar.gz",
            server.url()
        ));
        let path = download(&reqwest::Client::new(), &layout, &mut session)
            .await
            .unwrap();

        assert_eq!(path, layout.path("firmware_v1.1.0.tar.gz"));
        assert_eq!(fs::read(&path).unwrap(), body);
        assert_eq!(session.archive(), Some(path.as_path()));
        assert!(!layout.path("firmware_v1.1.0.tar.gz.part").exists());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_replaces_stale_archive() {
        let mut server = Server::new_async().await;
        let root = TempDir::new().unwrap();
        let layout = RootLayout::new(root.path());
        fs::write(layout.path("firmware_v1.0.5.tar.gz"), b"old").unwrap();

        let _mock = server
            .mock("GET", "/download/firmware_v1.1.0.tar.gz")
            .with_status(200)
            .with_body("new")
            .create_async()
            .await;

        let mut session = session_for(format!(
            "{}/download/firmware_v1.1.0.tar.gz",
            server.url()
        ));
        download(&reqwest::Client::new(), &layout, &mut session)
            .await
            .unwrap();

        assert_eq!(
            layout.find_archives().unwrap(),
            vec!["firmware_v1.1.0.tar.gz".to_string()]
        );
    }

    #[tokio::test]
    async fn test_http_error_is_retryable() {
        let mut server = Server::new_async().await;
        let root = TempDir::new().unwrap();
        let layout = RootLayout::new(root.path());

        let _mock = server
            .mock("GET", "/download/firmware_v1.1.0.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let mut session = session_for(format!(
            "{}/download/firmware_v1.1.0.tar.gz",
            server.url()
        ));
        let err = download(&reqwest::Client::new(), &layout, &mut session)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Retryable);
        assert_eq!(err.code(), Some("2601"));
        assert!(session.archive().is_none());
        assert!(layout.find_archives().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_transfer_outlasting_timeout_completes() {
        let mut server = Server::new_async().await;
        let root = TempDir::new().unwrap();
        let layout = RootLayout::new(root.path());

        let _mock = server
            .mock("GET", "/download/firmware_v1.1.0.tar.gz")
            .with_status(200)
            .with_chunked_body(|w| {
                for _ in 0..4 {
                    w.write_all(&[0x5a; 1024])?;
                    w.flush()?;
                    std::thread::sleep(Duration::from_millis(600));
                }
                Ok(())
            })
            .create_async()
            .await;

        let mut session = session_for(format!(
            "{}/download/firmware_v1.1.0.tar.gz",
            server.url()
        ));
        let path = download(&client_with_timeout(1), &layout, &mut session)
            .await
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![0x5a; 4096]);
    }

    #[tokio::test]
    async fn test_stalled_transfer_is_retryable() {
        let mut server = Server::new_async().await;
        let root = TempDir::new().unwrap();
        let layout = RootLayout::new(root.path());

        let _mock = server
            .mock("GET", "/download/firmware_v1.1.0.tar.gz")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(&[0x5a; 1024])?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(2500));
                w.write_all(&[0x5a; 1024])
            })
            .create_async()
            .await;

        let mut session = session_for(format!(
            "{}/download/firmware_v1.1.0.tar.gz",
            server.url()
        ));
        let err = download(&client_with_timeout(1), &layout, &mut session)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Retryable);
        assert!(layout.find_archives().unwrap().is_empty());
        assert!(!layout.path("firmware_v1.1.0.tar.gz.part").exists());
    }
}
