use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use walkdir::WalkDir;
use crate::error::{Result, StarError};
use crate::manifest::Manifest;
use crate::package::{Package, PackageId};
use crate::release::ReleaseSource;
use crate::installer::StarManager;
use crate::util::{MANIFEST_FILE, TEMP_PREFIX};

/// Differences between the manifest and the install directory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HealthReport {
    /// Files in the install directory no record refers to.
    pub orphaned: Vec<PathBuf>,
    /// Records whose file is gone.
    pub missing: Vec<Package>,
    /// Identities recorded more than once.
    pub duplicates: Vec<PackageId>,
    /// Orphans deleted by this run.
    pub pruned: Vec<PathBuf>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.orphaned.is_empty() && self.missing.is_empty() && self.duplicates.is_empty()
    }
}

impl<S: ReleaseSource> StarManager<S> {
    /// Compares the manifest with the install directory. With `prune`, orphaned
    /// files are deleted.
    ///
    /// Orphans come from installs whose manifest save failed or from downloads
    /// that broke off half way.
    pub fn doctor(&self, prune: bool) -> Result<HealthReport> {
        let manifest = Manifest::load(self.manifest_path())?;
        let mut report = HealthReport::default();

        let mut seen = HashMap::new();
        for package in &manifest.packages {
            let count = seen.entry(package.id()).or_insert(0usize);
            *count += 1;
            if *count == 2 {
                report.duplicates.push(package.id());
            }
            if !self.install_dir().join(&package.file).is_file() {
                report.missing.push(package.clone());
            }
        }

        if !self.install_dir().exists() {
            return Ok(report);
        }
        let recorded: HashSet<&str> = manifest.packages.iter().map(|p| p.file.as_str()).collect();
        let entries = WalkDir::new(self.install_dir())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in entries {
            let entry = entry.map_err(|e| StarError::InstallDir {
                path: self.install_dir().to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name == MANIFEST_FILE || name.starts_with(TEMP_PREFIX) || recorded.contains(&*name) {
                continue;
            }
            warn!(file = %entry.path().display(), "orphaned file");
            report.orphaned.push(entry.path().to_path_buf());
        }

        if prune {
            for path in &report.orphaned {
                fs::remove_file(path).map_err(|source| StarError::Removal {
                    path: path.clone(),
                    source,
                })?;
                info!(file = %path.display(), "pruned");
                report.pruned.push(path.clone());
            }
        }
        Ok(report)
    }
}
