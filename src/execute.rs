use std::io::{self, BufReader};
use std::path::Path;
use anyhow::{bail, Result};
use colored::Colorize;
use star::config::Config;
use star::installer::StarManager;
use star::package::PackageId;
use star::platform::Platform;
use star::release::GitHubSource;
use star::shell::{write_report, Shell};
use crate::cli::{StarCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    match cli.command.unwrap_or(StarCommand::Shell) {
        StarCommand::Shell => {
            execute_shell(&cli.root, cli.config.as_deref())
        }
        StarCommand::Install { package, platform } => {
            execute_install(&cli.root, &package, platform.as_deref())
        }
        StarCommand::List => {
            execute_list(&cli.root)
        }
        StarCommand::Uninstall { package } => {
            execute_uninstall(&cli.root, &package)
        }
        StarCommand::Update { package } => {
            execute_update(&cli.root, &package)
        }
        StarCommand::Doctor { prune } => {
            execute_doctor(&cli.root, prune)
        }
    }
}

fn manager(root: &Path) -> Result<StarManager<GitHubSource>> {
    StarManager::github(root)
}

pub fn execute_shell(root: &Path, config: Option<&Path>) -> Result<()> {
    let config = Config::discover(config)?;
    let mut shell = Shell::new(config, manager(root)?, io::stdout());
    shell.run(BufReader::new(io::stdin()))?;
    Ok(())
}

pub fn execute_install(root: &Path, package: &str, platform: Option<&str>) -> Result<()> {
    let id: PackageId = package.parse()?;
    let mut manager = manager(root)?;
    if let Some(platform) = platform {
        manager = manager.with_platform(platform.parse::<Platform>()?);
    }
    println!("Installing {}...", id);
    let installed = manager.install(&id)?;
    println!("{}", format!("Installed {installed} ({})", installed.file).green());
    Ok(())
}

pub fn execute_list(root: &Path) -> Result<()> {
    let packages = manager(root)?.list()?;
    if packages.is_empty() {
        println!("No stars installed");
        return Ok(());
    }
    for package in packages {
        println!("- {}", package);
    }
    Ok(())
}

pub fn execute_uninstall(root: &Path, package: &str) -> Result<()> {
    let id: PackageId = package.parse()?;
    println!("Uninstalling {}...", id);
    let removed = manager(root)?.uninstall(&id)?;
    println!("{}", format!("Uninstalled {removed}").green());
    Ok(())
}

pub fn execute_update(root: &Path, package: &str) -> Result<()> {
    let id: PackageId = package.parse()?;
    println!("Updating {}...", id);
    let updated = manager(root)?.update(&id)?;
    println!("{}", format!("Updated {updated} ({})", updated.file).green());
    Ok(())
}

pub fn execute_doctor(root: &Path, prune: bool) -> Result<()> {
    let report = manager(root)?.doctor(prune)?;
    write_report(&mut io::stdout(), &report)?;
    if !report.missing.is_empty() || !report.duplicates.is_empty() {
        bail!("The manifest does not match {}", root.display());
    }
    if !report.orphaned.is_empty() && !prune {
        bail!("Found orphaned files. Run `starshell doctor --prune` to delete them");
    }
    Ok(())
}
