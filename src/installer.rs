use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::error::{FetchFailure, Result, StarError};
use crate::manifest::Manifest;
use crate::package::{Package, PackageId};
use crate::platform::Platform;
use crate::release::{GitHubSource, ReleaseSource};
use crate::util::{ensure_install_dir, is_plain_file_name, MANIFEST_FILE};

/// Installs, lists, removes and updates packages in one install directory.
///
/// Every operation runs to completion before returning and assumes it is the
/// only one touching the install directory; nothing is locked.
pub struct StarManager<S> {
    source: S,
    install_dir: PathBuf,
    platform: Option<Platform>,
}

impl StarManager<GitHubSource> {
    /// A manager for `install_dir` backed by GitHub, configured from the environment.
    pub fn github<P: AsRef<Path>>(install_dir: P) -> anyhow::Result<Self> {
        let source = GitHubSource::from_env()?;
        Ok(StarManager::new(source, install_dir))
    }
}

impl<S: ReleaseSource> StarManager<S> {
    pub fn new<P: AsRef<Path>>(source: S, install_dir: P) -> Self {
        Self {
            source,
            install_dir: install_dir.as_ref().to_path_buf(),
            platform: None,
        }
    }

    /// Selects assets for `platform` instead of the running host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.install_dir.join(MANIFEST_FILE)
    }

    fn platform(&self) -> Result<Platform> {
        match &self.platform {
            Some(platform) => Ok(platform.clone()),
            None => Platform::current(),
        }
    }

    /// Downloads the latest release asset of `id` built for the platform and
    /// records it in the manifest.
    ///
    /// Steps run in order and stop at the first failure: platform token,
    /// uniqueness check, release lookup, asset selection, download, manifest
    /// save. If the download succeeds but the save fails the file stays on
    /// disk without a record; [`StarManager::doctor`] reports it.
    ///
    /// # Errors
    /// `UnsupportedPlatform` (before any request), `AlreadyInstalled`,
    /// `ReleaseFetch`, `NoCompatibleAsset`, `Download`, and the manifest errors.
    pub fn install(&self, id: &PackageId) -> Result<Package> {
        let platform = self.platform()?;
        let manifest_path = self.manifest_path();
        let mut manifest = Manifest::load(&manifest_path)?;
        if let Some(existing) = manifest.get(id) {
            return Err(StarError::AlreadyInstalled {
                package: id.clone(),
                version: existing.version.clone(),
            });
        }

        info!(package = %id, platform = %platform, "resolving latest release");
        let release = self.source
            .latest_release(&id.user, &id.repo)
            .map_err(|reason| StarError::ReleaseFetch {
                package: id.clone(),
                reason,
            })?;
        let asset = release
            .select_asset(&platform)
            .ok_or_else(|| StarError::NoCompatibleAsset {
                package: id.clone(),
                platform: platform.token(),
            })?;
        info!(package = %id, version = %release.tag_name, asset = %asset.name, "selected asset");

        if !is_plain_file_name(&asset.name) {
            return Err(StarError::Download {
                file: asset.name.clone(),
                reason: FetchFailure::InvalidFileName(asset.name.clone()),
            });
        }
        ensure_install_dir(&self.install_dir)?;
        let dest = self.install_dir.join(&asset.name);
        let bytes = self.source
            .download(&asset.browser_download_url, &dest)
            .map_err(|reason| StarError::Download {
                file: asset.name.clone(),
                reason,
            })?;
        info!(dest = %dest.display(), bytes, "downloaded");

        let package = Package {
            user: id.user.clone(),
            repo: id.repo.clone(),
            version: release.tag_name.clone(),
            file: asset.name.clone(),
        };
        manifest.push(package.clone());
        if let Err(e) = manifest.save(&manifest_path) {
            warn!(file = %dest.display(), "downloaded file is not recorded in the manifest");
            return Err(e);
        }
        Ok(package)
    }

    /// All installed packages in install order.
    pub fn list(&self) -> Result<Vec<Package>> {
        Ok(Manifest::load(self.manifest_path())?.packages)
    }

    /// Deletes the installed file of `id` and drops it from the manifest.
    ///
    /// The file is removed first; if that fails the manifest is not touched.
    /// Every record with the identity is dropped from the manifest.
    pub fn uninstall(&self, id: &PackageId) -> Result<Package> {
        let manifest_path = self.manifest_path();
        let mut manifest = Manifest::load(&manifest_path)?;
        let package = manifest
            .get(id)
            .cloned()
            .ok_or_else(|| StarError::PackageNotFound { package: id.clone() })?;

        let path = self.install_dir.join(&package.file);
        info!(package = %id, file = %path.display(), "removing");
        fs::remove_file(&path).map_err(|source| StarError::Removal { path, source })?;

        let removed = manifest.remove(id);
        if removed > 1 {
            warn!(package = %id, records = removed, "removed duplicate manifest records");
        }
        manifest.save(&manifest_path)?;
        Ok(package)
    }

    /// Uninstalls `id` and installs its latest release again.
    ///
    /// Not atomic: if the install step fails, the package stays uninstalled.
    pub fn update(&self, id: &PackageId) -> Result<Package> {
        let previous = self.uninstall(id)?;
        match self.install(id) {
            Ok(package) => {
                info!(package = %id, from = %previous.version, to = %package.version, "updated");
                Ok(package)
            }
            Err(e) => {
                warn!(package = %id, "update failed after uninstall, package is no longer installed");
                Err(e)
            }
        }
    }
}
