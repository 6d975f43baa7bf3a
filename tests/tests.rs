use std::cell::Cell;
use std::path::Path;
use tempfile::TempDir;
use star::*;

/// Serves one release of `acme/tool` until it is withdrawn.
struct Upstream {
    assets: Vec<&'static str>,
    withdrawn: Cell<bool>,
    calls: Cell<usize>,
}

impl Upstream {
    fn new(assets: &[&'static str]) -> Self {
        Upstream {
            assets: assets.to_vec(),
            withdrawn: Cell::new(false),
            calls: Cell::new(0),
        }
    }
}

impl ReleaseSource for Upstream {
    fn latest_release(&self, user: &str, repo: &str) -> std::result::Result<Release, FetchFailure> {
        self.calls.set(self.calls.get() + 1);
        if self.withdrawn.get() || (user, repo) != ("acme", "tool") {
            return Err(FetchFailure::Status(404));
        }
        Ok(Release {
            tag_name: "v0.9.1".to_string(),
            assets: self
                .assets
                .iter()
                .map(|name| Asset {
                    name: name.to_string(),
                    browser_download_url: format!("https://github.com/acme/tool/releases/download/v0.9.1/{name}"),
                })
                .collect(),
        })
    }

    fn download(&self, url: &str, dest: &Path) -> std::result::Result<u64, FetchFailure> {
        self.calls.set(self.calls.get() + 1);
        std::fs::write(dest, url)?;
        Ok(url.len() as u64)
    }
}

fn setup_tests(platform: &str) -> (TempDir, StarManager<Upstream>) {
    let temp_dir = TempDir::new().unwrap();
    let upstream = Upstream::new(&["tool-darwin-amd64.tar.gz", "tool-linux-amd64.tar.gz"]);
    let manager = StarManager::new(upstream, temp_dir.path().join(STARS_DIR))
        .with_platform(platform.parse().unwrap());
    (temp_dir, manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme_tool() -> PackageId {
        "acme/tool".parse().unwrap()
    }

    #[test]
    fn test_fresh_environment_lists_nothing() {
        let (_dir, manager) = setup_tests("linux-amd64");
        assert!(manager.list().unwrap().is_empty());
        assert!(manager.doctor(false).unwrap().is_healthy());
    }

    #[test]
    fn test_lifecycle_on_linux_amd64() {
        let (_dir, manager) = setup_tests("linux-amd64");

        let installed = manager.install(&acme_tool()).unwrap();
        assert_eq!(installed.file, "tool-linux-amd64.tar.gz");
        assert_eq!(manager.list().unwrap(), vec![installed.clone()]);
        let file = manager.install_dir().join(&installed.file);
        assert!(file.exists());

        let updated = manager.update(&acme_tool()).unwrap();
        assert_eq!(updated, installed);
        assert!(file.exists());

        manager.uninstall(&acme_tool()).unwrap();
        assert!(manager.list().unwrap().is_empty());
        assert!(!file.exists());
        assert!(manager.doctor(false).unwrap().is_healthy());
    }

    #[test]
    fn test_unmatched_host_gets_no_asset() {
        let (_dir, manager) = setup_tests("linux-386");
        let err = manager.install(&acme_tool()).unwrap_err();
        assert!(matches!(err, StarError::NoCompatibleAsset { ref platform, .. } if platform == "linux-386"));
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_after_release_disappears() {
        let (_dir, manager) = setup_tests("darwin-amd64");
        let installed = manager.install(&acme_tool()).unwrap();
        assert_eq!(installed.file, "tool-darwin-amd64.tar.gz");

        manager.source().withdrawn.set(true);
        let err = manager.update(&acme_tool()).unwrap_err();
        assert!(matches!(err, StarError::ReleaseFetch { .. }));
        assert!(manager.list().unwrap().is_empty());
        assert!(!manager.install_dir().join(&installed.file).exists());
    }

    #[test]
    fn test_uninstall_unknown_makes_no_requests() {
        let (_dir, manager) = setup_tests("linux-amd64");
        let err = manager.uninstall(&acme_tool()).unwrap_err();
        assert!(matches!(err, StarError::PackageNotFound { .. }));
        assert_eq!(manager.source().calls.get(), 0);
    }
}
