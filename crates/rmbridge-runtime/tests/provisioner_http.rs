//! Provisioning against a local release server.
//!
//! A minimal HTTP/1.1 responder stands in for the release index and asset
//! host; archives are built in-test for the running platform.

#![cfg(unix)]

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flate2::Compression;
use flate2::write::GzEncoder;
use rmbridge_core::paths::binary_file_name;
use rmbridge_core::{ClientConfig, EntryKind, ProvisionError, Provisioner};
use rmbridge_runtime::provision::{ArchiveFormat, PlatformTarget};
use rmbridge_runtime::{BinaryProvisioner, InstallStatus, connect};
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const FAKE_RMAPI: &[u8] = b"#!/bin/sh\nprintf '[d] installed\\n'\n";

type Hits = Arc<Mutex<HashMap<String, usize>>>;

/// Serve `handler(path, nth_hit) -> (status, body)` until the test ends.
async fn serve<F>(handler: F) -> (String, Hits)
where
    F: Fn(&str, usize) -> (u16, Vec<u8>) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let hits: Hits = Arc::default();
    let handler = Arc::new(handler);

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let handler = handler.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).await.is_err() {
                    return;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                    }
                }

                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                let nth = {
                    let mut hits = counter.lock().unwrap();
                    let entry = hits.entry(path.clone()).or_insert(0);
                    *entry += 1;
                    *entry
                };

                let (status, body) = handler(&path, nth);
                let head = format!(
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let stream = reader.get_mut();
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (base, hits)
}

fn hit_count(hits: &Hits, path: &str) -> usize {
    hits.lock().unwrap().get(path).copied().unwrap_or(0)
}

fn archive_for(target: PlatformTarget) -> Vec<u8> {
    match target.format {
        ArchiveFormat::TarGz => {
            let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
            let mut header = tar::Header::new_gnu();
            header.set_size(FAKE_RMAPI.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, binary_file_name(), FAKE_RMAPI)
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap()
        }
        ArchiveFormat::Zip => {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
            writer
                .start_file(binary_file_name(), zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(FAKE_RMAPI).unwrap();
            writer.finish().unwrap().into_inner()
        }
    }
}

fn release_json(base: &str, asset_name: &str, asset_path: &str) -> Vec<u8> {
    serde_json::json!({
        "tag_name": "v0.0.29",
        "assets": [
            {
                "name": asset_name,
                "browser_download_url": format!("{base}{asset_path}"),
            }
        ]
    })
    .to_string()
    .into_bytes()
}

fn asset_name(target: PlatformTarget) -> String {
    format!("rmapi-{}{}", target.tag, target.format.extension())
}

fn install_path(root: &Path) -> PathBuf {
    root.join("bin").join(binary_file_name())
}

fn provisioner_for(binary: &Path, base: &str) -> BinaryProvisioner {
    BinaryProvisioner::new(binary, format!("{base}/release")).unwrap()
}

fn leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != binary_file_name() && name != "install.json")
        .collect()
}

/// Release server whose asset route answers with `asset`.
async fn release_server<F>(target: PlatformTarget, asset: F) -> (String, Hits)
where
    F: Fn(usize) -> (u16, Vec<u8>) + Send + Sync + 'static,
{
    let base = Arc::new(Mutex::new(String::new()));
    let shared = base.clone();
    let name = asset_name(target);
    let (url, hits) = serve(move |path, nth| match path {
        "/release" => {
            let base = shared.lock().unwrap().clone();
            (200, release_json(&base, &name, "/asset"))
        }
        "/asset" => asset(nth),
        _ => (404, Vec::new()),
    })
    .await;
    *base.lock().unwrap() = url.clone();
    (url, hits)
}

#[tokio::test]
async fn setup_installs_once_and_client_uses_it() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let archive = archive_for(target);
    let (base, hits) = release_server(target, move |_| (200, archive.clone())).await;

    let dir = tempdir().unwrap();
    let binary = install_path(dir.path());
    let root = dir.path().to_string_lossy().into_owned();
    let index = format!("{base}/release");
    let config = ClientConfig::from_lookup(move |key| match key {
        "RMBRIDGE_DATA_DIR" => Some(root.clone()),
        "RMBRIDGE_RELEASE_URL" => Some(index.clone()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.binary_path, binary);

    let client = connect(config.clone()).unwrap();
    let installed = client.setup().await.unwrap();
    assert_eq!(installed, binary);
    assert_eq!(client.setup().await.unwrap(), binary);

    let mode = fs::metadata(&binary).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert_eq!(fs::read(&binary).unwrap(), FAKE_RMAPI);

    // A second client sharing the install path finds the binary
    let other = connect(config.clone()).unwrap();
    other.setup().await.unwrap();
    assert_eq!(hit_count(&hits, "/asset"), 1);
    assert_eq!(hit_count(&hits, "/release"), 1);

    let entries = other.list("/").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Directory);
    assert_eq!(entries[0].name, "installed");

    let status = InstallStatus::probe(&config);
    assert!(status.is_installed());
    let record = status.record.unwrap();
    assert_eq!(record.descriptor.version, "v0.0.29");
    assert_eq!(record.descriptor.platform_tag, target.tag);
}

#[tokio::test]
async fn transient_server_error_is_retried_once() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let archive = archive_for(target);
    let (base, hits) = release_server(target, move |nth| {
        if nth == 1 {
            (503, Vec::new())
        } else {
            (200, archive.clone())
        }
    })
    .await;

    let dir = tempdir().unwrap();
    let provisioner = provisioner_for(&install_path(dir.path()), &base);

    provisioner.ensure_installed().await.unwrap();
    assert_eq!(hit_count(&hits, "/asset"), 2);
}

#[tokio::test]
async fn persistent_server_error_gives_up_after_two_attempts() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let (base, hits) = release_server(target, |_| (502, Vec::new())).await;

    let dir = tempdir().unwrap();
    let provisioner = provisioner_for(&install_path(dir.path()), &base);

    let err = provisioner.ensure_installed().await.unwrap_err();
    assert!(matches!(err, ProvisionError::NetworkUnreachable { .. }));
    assert_eq!(hit_count(&hits, "/asset"), 2);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let (base, hits) = release_server(target, |_| (404, Vec::new())).await;

    let dir = tempdir().unwrap();
    let provisioner = provisioner_for(&install_path(dir.path()), &base);

    assert!(provisioner.ensure_installed().await.is_err());
    assert_eq!(hit_count(&hits, "/asset"), 1);
}

#[tokio::test]
async fn corrupt_archive_leaves_nothing_installed() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let (base, _hits) =
        release_server(target, |_| (200, b"<html>not an archive</html>".to_vec())).await;

    let dir = tempdir().unwrap();
    let binary = install_path(dir.path());
    let provisioner = provisioner_for(&binary, &base);

    let err = provisioner.ensure_installed().await.unwrap_err();
    assert!(matches!(err, ProvisionError::CorruptArchive(_)));
    assert!(!binary.exists());

    // The download temp file is removed along with the failed attempt
    assert!(fs::read_dir(binary.parent().unwrap()).unwrap().next().is_none());
}

#[tokio::test]
async fn release_without_platform_asset_is_reported() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let (base, _hits) = serve(|path, _| match path {
        "/release" => (
            200,
            br#"{"tag_name": "v0.0.29", "assets": [{"name": "rmapi-plan9.zip", "browser_download_url": "http://127.0.0.1:9/x"}]}"#
                .to_vec(),
        ),
        _ => (404, Vec::new()),
    })
    .await;

    let dir = tempdir().unwrap();
    let provisioner = provisioner_for(&install_path(dir.path()), &base);

    let err = provisioner.ensure_installed().await.unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::AssetNotFound { ref platform_tag, .. } if platform_tag == target.tag
    ));
}

#[tokio::test]
async fn failing_release_index_is_reported() {
    let (base, _hits) = serve(|_, _| (500, b"upstream down".to_vec())).await;

    let dir = tempdir().unwrap();
    let provisioner = provisioner_for(&install_path(dir.path()), &base);

    let err = provisioner.ensure_installed().await.unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::ReleaseIndex(_) | ProvisionError::UnsupportedPlatform { .. }
    ));
}

/// Server that sends response headers and then never finishes the body.
async fn stalling_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n")
                    .await;
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(stream);
            });
        }
    });
    base
}

#[tokio::test]
async fn stalled_release_index_hits_download_timeout() {
    let base = stalling_server().await;

    let dir = tempdir().unwrap();
    let provisioner = provisioner_for(&install_path(dir.path()), &base)
        .with_download_timeout(Duration::from_millis(500));

    let result = tokio::time::timeout(Duration::from_secs(10), provisioner.ensure_installed())
        .await
        .expect("provisioning did not honor its download timeout");
    assert!(
        matches!(
            result,
            Err(ProvisionError::NetworkUnreachable { .. }
                | ProvisionError::UnsupportedPlatform { .. })
        ),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn download_timeout_comes_from_config() {
    let base = stalling_server().await;

    let dir = tempdir().unwrap();
    let root = dir.path().to_string_lossy().into_owned();
    let index = format!("{base}/release");
    let config = ClientConfig::from_lookup(move |key| match key {
        "RMBRIDGE_DATA_DIR" => Some(root.clone()),
        "RMBRIDGE_RELEASE_URL" => Some(index.clone()),
        "RMBRIDGE_DOWNLOAD_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .unwrap();

    let client = connect(config).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(15), client.setup())
        .await
        .expect("setup did not honor the configured download timeout");
    assert!(result.is_err());
}

#[tokio::test]
async fn concurrent_provisioners_converge_on_one_binary() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let archive = archive_for(target);
    let (base, _hits) = release_server(target, move |_| (200, archive.clone())).await;

    let dir = tempdir().unwrap();
    let binary = install_path(dir.path());
    let first = provisioner_for(&binary, &base);
    let second = provisioner_for(&binary, &base);

    let (a, b) = tokio::join!(first.ensure_installed(), second.ensure_installed());
    assert_eq!(a.unwrap(), binary);
    assert_eq!(b.unwrap(), binary);

    assert_eq!(fs::read(&binary).unwrap(), FAKE_RMAPI);
    let mode = fs::metadata(&binary).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert_eq!(leftovers(binary.parent().unwrap()), Vec::<String>::new());
}

#[tokio::test]
async fn unusable_binary_at_install_path_is_replaced() {
    let Ok(target) = PlatformTarget::current() else {
        return;
    };
    let archive = archive_for(target);
    let (base, hits) = release_server(target, move |_| (200, archive.clone())).await;

    let dir = tempdir().unwrap();
    let binary = install_path(dir.path());
    fs::create_dir_all(binary.parent().unwrap()).unwrap();

    // Left behind by an interrupted copy
    fs::write(&binary, b"").unwrap();
    let provisioner = provisioner_for(&binary, &base);
    assert_eq!(provisioner.ensure_installed().await.unwrap(), binary);
    assert_eq!(fs::read(&binary).unwrap(), FAKE_RMAPI);
    assert_eq!(hit_count(&hits, "/asset"), 1);

    // Present but not executable
    fs::write(&binary, FAKE_RMAPI).unwrap();
    fs::set_permissions(&binary, fs::Permissions::from_mode(0o644)).unwrap();
    assert_eq!(provisioner.ensure_installed().await.unwrap(), binary);
    let mode = fs::metadata(&binary).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert_eq!(hit_count(&hits, "/asset"), 2);

    assert_eq!(leftovers(binary.parent().unwrap()), Vec::<String>::new());
}
