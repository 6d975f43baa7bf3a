//! The interactive shell.
//!
//! Reads a line, expands aliases, and either runs a built-in (`cd`, `ls`,
//! `clear`, `star`) or hands the command to the operating system. Failures
//! are printed as one red line and never end the loop.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;
use chrono::{DateTime, Local, TimeZone};
use colored::{Color, Colorize};
use tracing::debug;
use crate::config::{ColorSpec, Config};
use crate::doctor::HealthReport;
use crate::installer::StarManager;
use crate::package::PackageId;
use crate::release::ReleaseSource;
use crate::util::{home_dir, is_executable};

/// What the loop should do after a line ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Kinds of directory entries, each with its own `ls` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Symlink,
    Compressed,
    Media,
    Executable,
    Regular,
}

impl FileKind {
    /// Key in `file_colors`; `None` for entries that stay uncolored.
    pub fn config_key(self) -> Option<&'static str> {
        match self {
            FileKind::Directory => Some("directory"),
            FileKind::Symlink => Some("symlink"),
            FileKind::Compressed => Some("compressed"),
            FileKind::Media => Some("media"),
            FileKind::Executable => Some("executable"),
            FileKind::Regular => None,
        }
    }

    fn default_color(self) -> Option<Color> {
        match self {
            FileKind::Directory => Some(Color::Blue),
            FileKind::Symlink => Some(Color::Yellow),
            FileKind::Compressed => Some(Color::Magenta),
            FileKind::Media => Some(Color::Cyan),
            FileKind::Executable => Some(Color::Green),
            FileKind::Regular => None,
        }
    }
}

/// Classifies `path` without following symlinks.
pub fn classify(path: &Path) -> FileKind {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return FileKind::Regular;
    };
    if meta.is_dir() {
        return FileKind::Directory;
    }
    if meta.file_type().is_symlink() {
        return FileKind::Symlink;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "zip" | "tar" | "gz" => FileKind::Compressed,
        "mp4" | "jpg" | "png" => FileKind::Media,
        _ if is_executable(path) => FileKind::Executable,
        _ => FileKind::Regular,
    }
}

/// Replaces an aliased command name with its expansion.
///
/// Only the first word is looked up; the alias value is split on whitespace
/// and the remaining arguments are appended unchanged.
pub fn expand_alias(config: &Config, args: Vec<String>) -> Vec<String> {
    let Some(expansion) = args.first().and_then(|cmd| config.aliases.get(cmd)) else {
        return args;
    };
    expansion
        .split_whitespace()
        .map(str::to_string)
        .chain(args.into_iter().skip(1))
        .collect()
}

/// Values substituted into the prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub user: String,
    pub host: String,
    pub path: String,
    pub time: String,
}

impl PromptContext {
    /// Reads user, host, working directory and clock from the environment.
    pub fn capture() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();
        let path = std::env::current_dir()
            .map(|cwd| tilde_path(&cwd, &home_dir()))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            user,
            host: hostname(),
            path,
            time: clock(&Local::now()),
        }
    }
}

/// The machine's host name as reported by the OS, or `unknown`.
pub fn hostname() -> String {
    ::hostname::get()
        .map(|h| h.to_string_lossy().trim().to_string())
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Shows `path` with the home directory prefix replaced by `~`.
pub fn tilde_path(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        Err(_) => path.display().to_string(),
    }
}

/// `HH:MM:SS` of `now` in its own time zone.
pub fn clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

fn paint(text: &str, color: Option<ColorSpec>) -> String {
    match color {
        Some(color) => color.paint(text),
        None => text.to_string(),
    }
}

/// Fills the prompt template and appends `" $ "`.
pub fn render_prompt(config: &Config, ctx: &PromptContext) -> String {
    let part = |name: &str, value: &str, default: Color| {
        paint(value, Some(config.prompt_color(name).unwrap_or(ColorSpec::Named(default))))
    };
    let prompt = config
        .prompt_format
        .replace("{user}", &part("user", &ctx.user, Color::Yellow))
        .replace("{host}", &part("host", &ctx.host, Color::Blue))
        .replace("{path}", &part("path", &ctx.path, Color::Green))
        .replace("{time}", &part("time", &ctx.time, Color::Magenta));
    format!("{prompt} $ ")
}

/// The shell, writing its own output to `out`.
pub struct Shell<S, W> {
    config: Config,
    manager: StarManager<S>,
    out: W,
}

impl<S: ReleaseSource, W: Write> Shell<S, W> {
    pub fn new(config: Config, manager: StarManager<S>, out: W) -> Self {
        Self { config, manager, out }
    }

    /// Runs until `exit` or end of input.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        loop {
            let prompt = render_prompt(&self.config, &PromptContext::capture());
            write!(self.out, "{prompt}")?;
            self.out.flush()?;

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => {
                    writeln!(self.out)?;
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    self.error(&e.to_string())?;
                    continue;
                }
            }
            if self.execute_line(&line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Runs one line of input.
    pub fn execute_line(&mut self, line: &str) -> io::Result<Flow> {
        let line = line.trim();
        if line == "exit" {
            return Ok(Flow::Exit);
        }
        let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if args.is_empty() {
            return Ok(Flow::Continue);
        }
        let args = expand_alias(&self.config, args);
        debug!(?args, "executing");

        match args[0].as_str() {
            "cd" => self.change_dir(args.get(1).map(String::as_str))?,
            "ls" | "dir" => match std::env::current_dir() {
                Ok(cwd) => self.list_dir(&cwd)?,
                Err(e) => self.error(&format!("Error reading directory: {e}"))?,
            },
            "clear" | "cls" => self.clear()?,
            "star" => self.star(&args[1..])?,
            _ => self.run_external(&args)?,
        }
        Ok(Flow::Continue)
    }

    fn change_dir(&mut self, dir: Option<&str>) -> io::Result<()> {
        let target = match dir {
            None => Path::new(".").to_path_buf(),
            Some("~") => home_dir(),
            Some(dir) => Path::new(dir).to_path_buf(),
        };
        if let Err(e) = std::env::set_current_dir(&target) {
            self.error(&format!("Cannot change directory: {e}"))?;
        }
        Ok(())
    }

    /// Prints the entries of `dir`, sorted by name and colored by kind.
    pub fn list_dir(&mut self, dir: &Path) -> io::Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => return self.error(&format!("Error reading directory: {e}")),
        };
        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let kind = classify(&entry.path());
            let color = kind
                .config_key()
                .and_then(|key| self.config.file_color(key))
                .or(kind.default_color().map(ColorSpec::Named));
            let name = entry.file_name().to_string_lossy().to_string();
            writeln!(self.out, "{}", paint(&name, color))?;
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        if cfg!(windows) {
            match Command::new("cmd").args(["/c", "cls"]).status() {
                Ok(_) => Ok(()),
                Err(e) => self.error(&format!("Cannot clear screen: {e}")),
            }
        } else {
            write!(self.out, "\x1b[H\x1b[2J")?;
            self.out.flush()
        }
    }

    fn run_external(&mut self, args: &[String]) -> io::Result<()> {
        self.out.flush()?;
        match Command::new(&args[0]).args(&args[1..]).status() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => self.error(&format!("{}: {status}", args[0])),
            Err(e) => self.error(&format!("{}: {e}", args[0])),
        }
    }

    /// The `star` built-in: package management.
    pub fn star(&mut self, args: &[String]) -> io::Result<()> {
        let Some(sub) = args.first() else {
            return self.error("Missing subcommand. Use 'star install user/repo' or other commands.");
        };
        match sub.as_str() {
            "list" => self.star_list(),
            "doctor" => {
                let prune = args.get(1).is_some_and(|a| a == "--prune");
                match self.manager.doctor(prune) {
                    Ok(report) => write_report(&mut self.out, &report),
                    Err(e) => self.error(&format!("Health check failed: {e}")),
                }
            }
            "install" | "uninstall" | "update" => {
                let Some(target) = args.get(1) else {
                    return self.error(&format!("Missing repository argument. Use 'star {sub} user/repo'."));
                };
                let id = match target.parse::<PackageId>() {
                    Ok(id) => id,
                    Err(e) => return self.error(&e.to_string()),
                };
                self.star_lifecycle(sub, &id)
            }
            _ => self.error("Unknown 'star' subcommand."),
        }
    }

    fn star_lifecycle(&mut self, sub: &str, id: &PackageId) -> io::Result<()> {
        let (doing, done, failed) = match sub {
            "install" => ("Installing", "installed", "Installation"),
            "uninstall" => ("Uninstalling", "uninstalled", "Uninstallation"),
            _ => ("Updating", "updated", "Update"),
        };
        writeln!(self.out, "{}", format!("{doing} {id}...").green())?;
        let result = match sub {
            "install" => self.manager.install(id),
            "uninstall" => self.manager.uninstall(id),
            _ => self.manager.update(id),
        };
        match result {
            Ok(package) => self.success(&format!("{id} {done} successfully! ({})", package.version)),
            Err(e) => self.error(&format!("{failed} failed: {e}")),
        }
    }

    fn star_list(&mut self) -> io::Result<()> {
        match self.manager.list() {
            Ok(packages) if packages.is_empty() => writeln!(self.out, "No stars installed"),
            Ok(packages) => {
                for package in packages {
                    writeln!(self.out, "{}", format!("- {package}").green())?;
                }
                Ok(())
            }
            Err(e) => self.error(&format!("Could not list installed packages: {e}")),
        }
    }

    fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("[SUCCESS] {message}").green())
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("[ERROR] {message}").red().bold())
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

/// Prints a [`HealthReport`] one finding per line.
pub fn write_report<W: Write>(out: &mut W, report: &HealthReport) -> io::Result<()> {
    if report.is_healthy() {
        writeln!(out, "{}", "No problems found".green())?;
    }
    for path in &report.orphaned {
        writeln!(out, "orphaned file: {}", path.display())?;
    }
    for package in &report.missing {
        writeln!(out, "missing file: {} ({})", package.file, package)?;
    }
    for id in &report.duplicates {
        writeln!(out, "duplicate record: {id}")?;
    }
    for path in &report.pruned {
        writeln!(out, "pruned: {}", path.display())?;
    }
    Ok(())
}
