use std::path::{Path, PathBuf};
use directories::BaseDirs;
use crate::error::{Result, StarError};

/// Default install directory, relative to the working directory.
pub const STARS_DIR: &str = "./stars";
/// Manifest file name inside the install directory.
pub const MANIFEST_FILE: &str = ".stars";

/// Prefix of the temp file a manifest save writes before renaming it.
pub const TEMP_PREFIX: &str = ".stars.tmp";

/// Creates the install directory if it doesn't exist yet.
pub fn ensure_install_dir<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|source| StarError::InstallDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.to_path_buf())
}

/// Whether `name` can be used as a file name directly inside a directory:
/// not empty, not `.` or `..`, and without path separators.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// The user's home directory, or `.` when there is none.
pub fn home_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Checks if a given path is an executable file on Unix.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
/// Checks if a given path has a Windows executable extension (.exe, .bat, .cmd).
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_ascii_lowercase();
        matches!(ext.as_str(), "exe" | "bat" | "cmd")
    } else {
        false
    }
}
