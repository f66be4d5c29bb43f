//! Handlers for operations on the remote document tree.

use std::path::Path;

use rmbridge_core::{
    BridgeError, EntryKind, OperationOutcome, RemarkableClient, RemoteEntry, RemotePath,
};

use crate::error::CliError;

pub async fn mkdir(client: &RemarkableClient, classification: &str) -> Result<(), CliError> {
    let path = ensured_path(classification)?;
    client.ensure_directory_detailed(classification).await?;
    println!("Ensured {path}");
    Ok(())
}

/// The normalized directory `mkdir` creates for `classification`.
fn ensured_path(classification: &str) -> Result<RemotePath, CliError> {
    Ok(RemotePath::papers(classification).map_err(BridgeError::from)?)
}

pub async fn put(
    client: &RemarkableClient,
    file: &Path,
    directory: &str,
    name: Option<&str>,
) -> Result<(), CliError> {
    let outcome = client.upload_detailed(file, directory, name).await?;
    print_stdout(&outcome);

    let shown = name.map_or_else(
        || {
            file.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        },
        str::to_string,
    );
    println!("Uploaded '{shown}' to {directory}");
    Ok(())
}

pub async fn ls(client: &RemarkableClient, path: &str) -> Result<(), CliError> {
    let entries = client.list(path).await?;
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

pub async fn mv(client: &RemarkableClient, from: &str, to: &str) -> Result<(), CliError> {
    client.move_entry_detailed(from, to).await?;
    println!("Moved {from} -> {to}");
    Ok(())
}

fn print_stdout(outcome: &OperationOutcome) {
    let stdout = outcome.stdout.trim();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
}

fn format_entry(entry: &RemoteEntry) -> String {
    let marker = match entry.kind {
        EntryKind::Directory => "[d]",
        EntryKind::Document => "[f]",
    };
    format!("{marker} {}", entry.name)
}
