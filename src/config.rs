use std::collections::HashMap;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use colored::{Color, Colorize};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file name looked up in the working and user config directories.
pub const CONFIG_FILE: &str = "config.json";

/// Shell customization, read from `config.json`.
///
/// Colors are names understood by [`colored`], e.g. `"yellow"` or `"bright blue"`,
/// or raw ANSI escape sequences such as `"\u001b[1;33m"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Colors for the `user`, `host`, `path` and `time` prompt components.
    pub prompt_colors: HashMap<String, String>,
    /// Colors for `directory`, `symlink`, `compressed`, `media` and `executable` entries.
    pub file_colors: HashMap<String, String>,
    /// Prompt template with `{user}`, `{host}`, `{path}` and `{time}` placeholders.
    pub prompt_format: String,
    /// Command aliases, e.g. `"ll" => "ls -l"`.
    pub aliases: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_colors: HashMap::new(),
            file_colors: HashMap::new(),
            prompt_format: "{user}@{host} {path}".to_string(),
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Loads a config from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or deserialized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Finds and loads the shell config.
    ///
    /// An explicit path must exist. Otherwise `./config.json` and then the
    /// user config directory are tried, falling back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file {} not found", path.display());
            }
            return Config::load(path);
        }
        for candidate in candidate_paths() {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading config");
                return Config::load(candidate);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Color for a prompt component, if configured and known.
    pub fn prompt_color(&self, name: &str) -> Option<ColorSpec> {
        lookup_color(&self.prompt_colors, name)
    }

    /// Color for a kind of directory entry, if configured and known.
    pub fn file_color(&self, name: &str) -> Option<ColorSpec> {
        lookup_color(&self.file_colors, name)
    }
}

/// A configured color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// A named color, printed bold.
    Named(Color),
    /// An escape sequence used as is, reset after the text.
    Escape(String),
}

impl ColorSpec {
    /// Parses a color name or an escape sequence starting with `ESC`.
    pub fn parse(value: &str) -> Option<ColorSpec> {
        if value.starts_with('\x1b') {
            return Some(ColorSpec::Escape(value.to_string()));
        }
        value.parse::<Color>().ok().map(ColorSpec::Named)
    }

    /// Wraps `text` in this color. Honors `NO_COLOR` and the other
    /// switches `colored` respects.
    pub fn paint(&self, text: &str) -> String {
        match self {
            ColorSpec::Named(color) => text.color(*color).bold().to_string(),
            ColorSpec::Escape(escape) => {
                paint_escape(escape, text, colored::control::SHOULD_COLORIZE.should_colorize())
            }
        }
    }
}

fn paint_escape(escape: &str, text: &str, colorize: bool) -> String {
    if colorize {
        format!("{escape}{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn lookup_color(colors: &HashMap<String, String>, name: &str) -> Option<ColorSpec> {
    colors.get(name).and_then(|c| ColorSpec::parse(c))
}

/// Paths searched by [`Config::discover`], in order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Ok(dir) = global_config_dir() {
        paths.push(dir.join(CONFIG_FILE));
    }
    paths
}

pub fn global_config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "starshell", "starshell")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"aliases": {"ll": "ls -l"}, "prompt_colors": {"user": "red"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.aliases["ll"], "ls -l");
        assert_eq!(config.prompt_format, Config::default().prompt_format);
        assert_eq!(config.prompt_color("user"), Some(ColorSpec::Named(Color::Red)));
        assert_eq!(config.prompt_color("host"), None);
    }

    #[test]
    fn test_unknown_color_is_ignored() {
        let mut config = Config::default();
        config.file_colors.insert("directory".to_string(), "octarine".to_string());
        assert_eq!(config.file_color("directory"), None);
    }

    #[test]
    fn test_raw_escape_colors_are_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"prompt_colors": {"user": "\u001b[1;33m"}, "file_colors": {"media": "bright cyan"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.prompt_color("user"), Some(ColorSpec::Escape("\x1b[1;33m".to_string())));
        assert_eq!(config.file_color("media"), Some(ColorSpec::Named(Color::BrightCyan)));
    }

    #[test]
    fn test_escape_color_paints_and_resets() {
        assert_eq!(paint_escape("\x1b[0;32m", "ok", true), "\x1b[0;32mok\x1b[0m");
        assert_eq!(paint_escape("\x1b[0;32m", "ok", false), "ok");
    }

    #[test]
    fn test_discover_explicit_missing_fails() {
        let dir = tempdir().unwrap();
        assert!(Config::discover(Some(dir.path().join("nope.json").as_path())).is_err());
    }

    #[test]
    fn test_load_invalid_config_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::discover(Some(path.as_path())).is_err());
    }
}
