use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use tempfile::Builder;
use tracing::debug;
use crate::error::{Result, StarError};
use crate::package::{Package, PackageId};
use crate::util::TEMP_PREFIX;

/// The `.stars` manifest: every installed package, in install order.
///
/// Serialized as a bare JSON array of [`Package`] records.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct Manifest {
    pub packages: Vec<Package>,
}

impl Manifest {
    /// Loads the manifest at `path`.
    ///
    /// A missing file is an empty manifest. A file holding `null` is also
    /// empty, since that is what gets written for an empty list by older
    /// versions of the tool.
    ///
    /// # Errors
    /// [`StarError::ManifestCorrupt`] if the file does not decode,
    /// [`StarError::ManifestRead`] for any other read failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no manifest, starting empty");
                return Ok(Manifest::default());
            }
            Err(e) => {
                return Err(StarError::ManifestRead {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        let packages: Option<Vec<Package>> = serde_json::from_str(&content)
            .map_err(|e| StarError::ManifestCorrupt {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Manifest {
            packages: packages.unwrap_or_default(),
        })
    }

    /// Replaces the manifest at `path` with this one.
    ///
    /// The content goes to a temporary file next to `path` first and is then
    /// renamed over it, so readers never see a half-written manifest.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| StarError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(e.into()))?;
        let mut tmp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        debug!(path = %path.display(), packages = self.packages.len(), "manifest saved");
        Ok(())
    }

    /// First record with the given identity.
    pub fn get(&self, id: &PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| p.is(id))
    }

    pub fn contains(&self, id: &PackageId) -> bool {
        self.get(id).is_some()
    }

    pub fn push(&mut self, package: Package) {
        self.packages.push(package);
    }

    /// Drops every record with the given identity and returns how many were removed.
    pub fn remove(&mut self, id: &PackageId) -> usize {
        let before = self.packages.len();
        self.packages.retain(|p| !p.is(id));
        before - self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
