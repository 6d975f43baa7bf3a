use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::StarError;

/// Identity of a GitHub project, written `user/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    pub user: String,
    pub repo: String,
}

impl PackageId {
    pub fn new(user: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.repo)
    }
}

impl FromStr for PackageId {
    type Err = StarError;

    /// Parses `user/repo`. Both halves must be non-empty and free of further slashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StarError::InvalidPackageId(s.to_string());
        let (user, repo) = s.trim().split_once('/').ok_or_else(invalid)?;
        if user.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        Ok(PackageId::new(user, repo))
    }
}

/// A record in the manifest: one installed release asset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub user: String,
    pub repo: String,
    /// Tag name of the release the file came from.
    pub version: String,
    /// File name of the asset inside the install directory.
    pub file: String,
}

impl Package {
    pub fn id(&self) -> PackageId {
        PackageId::new(&self.user, &self.repo)
    }

    pub fn is(&self, id: &PackageId) -> bool {
        self.user == id.user && self.repo == id.repo
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.user, self.repo, self.version)
    }
}
