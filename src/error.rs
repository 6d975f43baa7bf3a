//! Error types for the star package manager.

use std::path::PathBuf;
use crate::package::PackageId;

/// Errors returned by the package lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum StarError {
    /// The running OS/architecture pair has no platform token.
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The latest release of a package could not be fetched or decoded.
    #[error("failed to fetch release of {package}: {reason}")]
    ReleaseFetch { package: PackageId, reason: FetchFailure },

    /// No asset of the latest release matches the platform token.
    #[error("no compatible release found for {package} on platform: {platform}")]
    NoCompatibleAsset { package: PackageId, platform: String },

    /// The selected asset could not be downloaded into the install directory.
    #[error("failed to download {file}: {reason}")]
    Download { file: String, reason: FetchFailure },

    /// The manifest exists but is not a valid package list.
    #[error("manifest {path} is corrupt: {source}")]
    ManifestCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest exists but could not be read.
    #[error("failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be persisted.
    #[error("failed to write manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("package {package} not found")]
    PackageNotFound { package: PackageId },

    #[error("package {package} is already installed at {version}, use update to replace it")]
    AlreadyInstalled { package: PackageId, version: String },

    /// The installed file of a package could not be deleted.
    #[error("failed to remove {path}: {source}")]
    Removal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package '{0}', expected user/repo")]
    InvalidPackageId(String),

    /// Install directory could not be created or scanned.
    #[error("install directory {path}: {source}")]
    InstallDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a request to the release host failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("status code {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid asset file name '{0}'")]
    InvalidFileName(String),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchFailure::Status(status.as_u16()),
            None if err.is_decode() => FetchFailure::Decode(err.to_string()),
            None => FetchFailure::Transport(err.to_string()),
        }
    }
}

/// Result type alias for star operations.
pub type Result<T> = std::result::Result<T, StarError>;
