//! Archive verification and executable extraction.
//!
//! The whole archive is decoded before anything is installed. Truncated or
//! malformed archives surface as [`ProvisionError::CorruptArchive`] and the
//! install location is never touched.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use rmbridge_core::ProvisionError;
use rmbridge_core::paths::binary_file_name;

use super::platform::ArchiveFormat;

/// Decode `archive` and return the bytes of the `rmapi` executable.
pub fn extract_binary(archive: File, format: ArchiveFormat) -> Result<Vec<u8>, ProvisionError> {
    let binary = match format {
        ArchiveFormat::TarGz => extract_from_tar_gz(archive)?,
        ArchiveFormat::Zip => extract_from_zip(archive)?,
    };

    match binary {
        Some(bytes) if !bytes.is_empty() => Ok(bytes),
        Some(_) => Err(ProvisionError::corrupt(format!(
            "{} in archive is empty",
            binary_file_name()
        ))),
        None => Err(ProvisionError::corrupt(format!(
            "archive does not contain {}",
            binary_file_name()
        ))),
    }
}

fn is_target_entry(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == binary_file_name())
}

fn extract_from_tar_gz(archive: File) -> Result<Option<Vec<u8>>, ProvisionError> {
    let mut tar = tar::Archive::new(GzDecoder::new(archive));
    let mut found = None;

    let entries = tar.entries().map_err(ProvisionError::corrupt)?;
    for entry in entries {
        let mut entry = entry.map_err(ProvisionError::corrupt)?;
        let is_file = entry.header().entry_type().is_file();
        let path = entry.path().map_err(ProvisionError::corrupt)?.into_owned();

        // Every entry is read to the end so truncation anywhere is detected
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(ProvisionError::corrupt)?;

        if is_file && found.is_none() && is_target_entry(&path) {
            found = Some(bytes);
        }
    }

    // Drain the gzip trailer so its CRC is checked as well
    io::copy(&mut tar.into_inner(), &mut io::sink()).map_err(ProvisionError::corrupt)?;

    Ok(found)
}

fn extract_from_zip(archive: File) -> Result<Option<Vec<u8>>, ProvisionError> {
    let mut zip = zip::ZipArchive::new(archive).map_err(ProvisionError::corrupt)?;
    let mut found = None;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(ProvisionError::corrupt)?;
        if entry.is_dir() {
            continue;
        }

        // Reading to the end verifies the entry CRC
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(ProvisionError::corrupt)?;

        let matches = entry
            .enclosed_name()
            .is_some_and(|path| is_target_entry(&path));
        if matches && found.is_none() {
            found = Some(bytes);
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Seek, SeekFrom, Write};

    fn tar_gz_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn as_file(bytes: &[u8]) -> File {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file
    }

    #[test]
    fn test_extracts_binary_from_tar_gz() {
        let name = binary_file_name();
        let archive = tar_gz_with(&[("README.md", b"docs"), (name, b"\x7fELF-binary")]);

        let bytes = extract_binary(as_file(&archive), ArchiveFormat::TarGz).unwrap();
        assert_eq!(bytes, b"\x7fELF-binary");
    }

    #[test]
    fn test_truncated_tar_gz_is_corrupt() {
        let name = binary_file_name();
        let payload = vec![42u8; 64 * 1024];
        let archive = tar_gz_with(&[(name, &payload)]);
        let truncated = &archive[..archive.len() / 2];

        let result = extract_binary(as_file(truncated), ArchiveFormat::TarGz);
        assert!(matches!(result, Err(ProvisionError::CorruptArchive(_))));
    }

    #[test]
    fn test_tar_gz_without_binary_is_corrupt() {
        let archive = tar_gz_with(&[("LICENSE", b"MIT")]);
        let result = extract_binary(as_file(&archive), ArchiveFormat::TarGz);
        assert!(matches!(result, Err(ProvisionError::CorruptArchive(_))));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let result = extract_binary(as_file(b"<html>rate limited</html>"), ArchiveFormat::TarGz);
        assert!(matches!(result, Err(ProvisionError::CorruptArchive(_))));

        let result = extract_binary(as_file(b"<html>rate limited</html>"), ArchiveFormat::Zip);
        assert!(matches!(result, Err(ProvisionError::CorruptArchive(_))));
    }

    #[test]
    fn test_extracts_binary_from_nested_zip_path() {
        let path = format!("rmapi-macos-arm64/{}", binary_file_name());
        let archive = zip_with(&[(path.as_str(), b"mach-o")]);

        let bytes = extract_binary(as_file(&archive), ArchiveFormat::Zip).unwrap();
        assert_eq!(bytes, b"mach-o");
    }

    #[test]
    fn test_truncated_zip_is_corrupt() {
        let archive = zip_with(&[(binary_file_name(), &[7u8; 4096])]);
        let truncated = &archive[..archive.len() - 30];

        let result = extract_binary(as_file(truncated), ArchiveFormat::Zip);
        assert!(matches!(result, Err(ProvisionError::CorruptArchive(_))));
    }
}
