use std::fmt;
use std::str::FromStr;
use crate::error::StarError;

const KNOWN_OS: &[&str] = &[
    "linux", "darwin", "windows", "freebsd", "netbsd", "openbsd",
    "dragonfly", "android", "ios", "solaris", "illumos",
];

const KNOWN_ARCH: &[&str] = &[
    "amd64", "386", "arm64", "arm", "riscv64", "ppc64", "ppc64le",
    "s390x", "mips", "mipsle", "mips64", "mips64le", "loong64",
];

/// An operating system / CPU architecture pair in the naming used by
/// release assets (`linux-amd64`, `darwin-arm64`, `windows-386`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: &'static str,
    arch: &'static str,
}

impl Platform {
    /// The platform this binary was compiled for.
    ///
    /// # Errors
    /// [`StarError::UnsupportedPlatform`] when the pair has no asset name.
    pub fn current() -> Result<Platform, StarError> {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps Rust's `std::env::consts` names onto asset names.
    pub fn from_rust(os: &str, arch: &str) -> Result<Platform, StarError> {
        let asset_os = match os {
            "macos" => Some("darwin"),
            other => lookup(KNOWN_OS, other),
        };
        let asset_arch = match arch {
            "x86_64" => Some("amd64"),
            "x86" => Some("386"),
            "aarch64" => Some("arm64"),
            "arm" => Some("arm"),
            "riscv64" => Some("riscv64"),
            "powerpc64" if cfg!(target_endian = "little") => Some("ppc64le"),
            "powerpc64" => Some("ppc64"),
            "s390x" => Some("s390x"),
            "mips" if cfg!(target_endian = "little") => Some("mipsle"),
            "mips" => Some("mips"),
            "mips64" if cfg!(target_endian = "little") => Some("mips64le"),
            "mips64" => Some("mips64"),
            "loongarch64" => Some("loong64"),
            _ => None,
        };
        match (asset_os, asset_arch) {
            (Some(os), Some(arch)) => Ok(Platform { os, arch }),
            _ => Err(StarError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    pub fn os(&self) -> &str {
        self.os
    }

    pub fn arch(&self) -> &str {
        self.arch
    }

    /// The `<os>-<arch>` string searched for in asset names.
    pub fn token(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

fn lookup(known: &[&'static str], name: &str) -> Option<&'static str> {
    known.iter().copied().find(|k| *k == name)
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = StarError;

    /// Parses an asset-style token such as `linux-amd64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let unsupported = || StarError::UnsupportedPlatform {
            os: lower.clone(),
            arch: String::new(),
        };
        let (os, arch) = lower.split_once('-').ok_or_else(unsupported)?;
        match (lookup(KNOWN_OS, os), lookup(KNOWN_ARCH, arch)) {
            (Some(os), Some(arch)) => Ok(Platform { os, arch }),
            _ => Err(StarError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }
}
