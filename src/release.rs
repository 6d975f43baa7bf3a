//! Resolving and downloading release assets.
//!
//! The [`ReleaseSource`] trait abstracts over where releases come from so the
//! lifecycle operations can run against GitHub or against an in-memory fake.

use std::fs::File;
use std::path::Path;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::debug;
use crate::error::FetchFailure;
use crate::platform::Platform;

/// Default GitHub REST API endpoint.
pub const GITHUB_API: &str = "https://api.github.com";
/// Overrides [`GITHUB_API`], mainly for mirrors and GitHub Enterprise.
pub const API_ENV: &str = "STARSHELL_GITHUB_API";
/// Bearer token sent with API requests when set.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// The "latest release" document of a repository.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

impl Asset {
    /// Whether the asset name contains the platform token, ignoring case.
    pub fn matches(&self, platform: &Platform) -> bool {
        self.name.to_lowercase().contains(&platform.token())
    }
}

impl Release {
    /// The first asset, in listed order, built for `platform`.
    pub fn select_asset(&self, platform: &Platform) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.matches(platform))
    }
}

/// Somewhere releases can be looked up and downloaded from.
pub trait ReleaseSource {
    /// Fetches the latest release of `user/repo`.
    fn latest_release(&self, user: &str, repo: &str) -> Result<Release, FetchFailure>;

    /// Streams `url` into a new file at `dest`, creating parent directories.
    /// Returns the number of bytes written. A partially written file is left
    /// in place on failure.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchFailure>;
}

/// [`ReleaseSource`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api: String,
    token: Option<String>,
}

impl GitHubSource {
    pub fn new(api: impl Into<String>, token: Option<String>) -> Result<Self, FetchFailure> {
        let client = Client::builder()
            .user_agent(concat!("starshell/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api: api.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Reads [`API_ENV`] and [`TOKEN_ENV`] from the environment.
    pub fn from_env() -> Result<Self, FetchFailure> {
        let api = std::env::var(API_ENV).unwrap_or_else(|_| GITHUB_API.to_string());
        let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(api, token)
    }

    pub fn latest_release_url(&self, user: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases/latest", self.api, user, repo)
    }
}

impl ReleaseSource for GitHubSource {
    fn latest_release(&self, user: &str, repo: &str) -> Result<Release, FetchFailure> {
        let url = self.latest_release_url(user, repo);
        debug!(%url, "fetching latest release");
        let mut request = self.client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = request.send()?;

        if !response.status().is_success() {
            return Err(FetchFailure::Status(response.status().as_u16()));
        }
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| FetchFailure::Decode(e.to_string()))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchFailure> {
        debug!(%url, dest = %dest.display(), "downloading asset");
        let mut response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(FetchFailure::Status(response.status().as_u16()));
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(dest)?;
        let written = response.copy_to(&mut file)?;
        file.sync_all()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use tempfile::tempdir;

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_string(),
            browser_download_url: format!("https://example.invalid/{name}"),
        }
    }

    fn release(names: &[&str]) -> Release {
        Release {
            tag_name: "v1.0.0".to_string(),
            assets: names.iter().map(|n| asset(n)).collect(),
        }
    }

    #[test]
    fn test_select_asset_for_host() {
        let release = release(&["tool-darwin-amd64.tar.gz", "tool-linux-amd64.tar.gz"]);
        let linux: Platform = "linux-amd64".parse().unwrap();
        assert_eq!(release.select_asset(&linux).unwrap().name, "tool-linux-amd64.tar.gz");

        let darwin: Platform = "darwin-amd64".parse().unwrap();
        assert_eq!(release.select_asset(&darwin).unwrap().name, "tool-darwin-amd64.tar.gz");

        let x86: Platform = "linux-386".parse().unwrap();
        assert!(release.select_asset(&x86).is_none());
    }

    #[test]
    fn test_select_asset_first_match_wins() {
        let linux: Platform = "linux-amd64".parse().unwrap();
        let release_a = release(&["tool-linux-amd64.tar.gz", "tool-linux-amd64.zip"]);
        let release_b = release(&["tool-linux-amd64.zip", "tool-linux-amd64.tar.gz"]);
        assert_eq!(release_a.select_asset(&linux).unwrap().name, "tool-linux-amd64.tar.gz");
        assert_eq!(release_b.select_asset(&linux).unwrap().name, "tool-linux-amd64.zip");
    }

    #[test]
    fn test_select_asset_ignores_case() {
        let release = release(&["checksums.txt", "Tool-Linux-AMD64"]);
        let linux: Platform = "linux-amd64".parse().unwrap();
        assert_eq!(release.select_asset(&linux).unwrap().name, "Tool-Linux-AMD64");
    }

    #[test]
    fn test_decode_release_document() {
        let body = r#"{
            "tag_name": "v0.4.2",
            "name": "ignored",
            "assets": [
                {"name": "a-linux-arm64", "browser_download_url": "https://x/a", "size": 12}
            ]
        }"#;
        let release: Release = serde_json::from_str(body).unwrap();
        assert_eq!(release.tag_name, "v0.4.2");
        assert_eq!(release.assets, vec![Asset {
            name: "a-linux-arm64".to_string(),
            browser_download_url: "https://x/a".to_string(),
        }]);
    }

    #[test]
    fn test_latest_release_url() {
        let source = GitHubSource::new("https://ghe.example.com/api/v3/", None).unwrap();
        assert_eq!(
            source.latest_release_url("sharkdp", "bat"),
            "https://ghe.example.com/api/v3/repos/sharkdp/bat/releases/latest"
        );
    }

    /// Answers a single HTTP request with `status` and `body`, returning the
    /// raw request head once the connection is done.
    fn serve_once(status: &str, body: &[u8]) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (base, handle)
    }

    /// A [`GitHubSource`] talking to `base` directly, whatever proxy the
    /// environment configures.
    fn local_source(base: &str, token: Option<&str>) -> GitHubSource {
        let mut source = GitHubSource::new(base, token.map(str::to_string)).unwrap();
        source.client = Client::builder()
            .user_agent(concat!("starshell/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()
            .unwrap();
        source
    }

    #[test]
    fn test_latest_release_over_http() {
        let body = br#"{"tag_name":"v2.1.0","assets":[{"name":"tool-linux-amd64","browser_download_url":"https://x/tool"}]}"#;
        let (base, server) = serve_once("200 OK", body);
        let source = local_source(&base, None);

        let release = source.latest_release("acme", "tool").unwrap();
        assert_eq!(release.tag_name, "v2.1.0");
        assert_eq!(release.assets[0].name, "tool-linux-amd64");

        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /repos/acme/tool/releases/latest http/1.1"));
        assert!(request.contains("accept: application/vnd.github+json"));
        assert!(request.contains("user-agent: starshell/"));
        assert!(!request.contains("authorization:"));
    }

    #[test]
    fn test_latest_release_sends_token() {
        let (base, server) = serve_once("200 OK", br#"{"tag_name":"v1"}"#);
        let source = local_source(&base, Some("s3cret"));

        let release = source.latest_release("acme", "tool").unwrap();
        assert!(release.assets.is_empty());
        let request = server.join().unwrap().to_lowercase();
        assert!(request.contains("authorization: bearer s3cret"));
    }

    #[test]
    fn test_latest_release_not_found() {
        let (base, server) = serve_once("404 Not Found", br#"{"message":"Not Found"}"#);
        let source = local_source(&base, None);

        let err = source.latest_release("acme", "missing").unwrap_err();
        assert!(matches!(err, FetchFailure::Status(404)));
        server.join().unwrap();
    }

    #[test]
    fn test_latest_release_garbage_body() {
        let (base, server) = serve_once("200 OK", b"<html>rate limited</html>");
        let source = local_source(&base, None);

        let err = source.latest_release("acme", "tool").unwrap_err();
        assert!(matches!(err, FetchFailure::Decode(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_download_writes_exact_body() {
        let body: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let (base, server) = serve_once("200 OK", &body);
        let source = local_source(&base, None);
        let dir = tempdir().unwrap();
        let dest = dir.path().join("stars").join("nested").join("tool-linux-amd64");

        let written = source.download(&format!("{base}/dl/tool"), &dest).unwrap();
        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        assert!(server.join().unwrap().starts_with("GET /dl/tool "));
    }

    #[test]
    fn test_download_error_status_writes_nothing() {
        let (base, server) = serve_once("404 Not Found", b"Not Found");
        let source = local_source(&base, None);
        let dir = tempdir().unwrap();
        let dest = dir.path().join("stars").join("tool-linux-amd64");

        let err = source.download(&format!("{base}/dl/tool"), &dest).unwrap_err();
        assert!(matches!(err, FetchFailure::Status(404)));
        assert!(!dest.exists());
        assert!(!dir.path().join("stars").exists());
        server.join().unwrap();
    }
}
