//! Release platform detection.
//!
//! Platform support follows the published rmapi release assets:
//! - Linux x64/ARM64: `.tar.gz`
//! - macOS Intel/Apple Silicon: `.zip`
//! - Windows x64: `.zip`

use rmbridge_core::ProvisionError;

/// Archive container used by a release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => ".tar.gz",
            Self::Zip => ".zip",
        }
    }
}

/// The asset flavour to fetch for one OS/architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    pub tag: &'static str,
    pub format: ArchiveFormat,
}

impl PlatformTarget {
    /// Target for the running process.
    pub fn current() -> Result<Self, ProvisionError> {
        Self::for_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Target for an explicit OS/architecture pair.
    pub fn for_target(os: &str, arch: &str) -> Result<Self, ProvisionError> {
        let (tag, format) = match (os, arch) {
            ("linux", "x86_64") => ("linux-amd64", ArchiveFormat::TarGz),
            ("linux", "aarch64") => ("linux-arm64", ArchiveFormat::TarGz),
            ("macos", "x86_64") => ("macos-intel", ArchiveFormat::Zip),
            ("macos", "aarch64") => ("macos-arm64", ArchiveFormat::Zip),
            ("windows", "x86_64") => ("win64", ArchiveFormat::Zip),
            _ => {
                return Err(ProvisionError::UnsupportedPlatform {
                    os: os.to_string(),
                    arch: arch.to_string(),
                });
            }
        };
        Ok(Self { tag, format })
    }

    /// Whether a release asset name belongs to this target.
    pub fn matches_asset(&self, asset_name: &str) -> bool {
        asset_name.contains(self.tag) && asset_name.ends_with(self.format.extension())
    }
}
