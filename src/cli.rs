use std::path::PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use star::STARS_DIR;

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: Option<StarCommand>,

    /// Install directory; the manifest lives in `<root>/.stars`
    #[clap(long, global = true, default_value = STARS_DIR)]
    pub(crate) root: PathBuf,

    /// Shell config file. Defaults to `./config.json`, then the user config directory
    #[clap(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). `RUST_LOG` overrides this
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum StarCommand {
    /// Start the interactive shell (the default)
    Shell,
    /// Install the latest release of a GitHub project
    Install {
        /// Repository as `user/repo`
        package: String,
        /// Pick assets for another platform, e.g. `linux-arm64`
        #[clap(long)]
        platform: Option<String>,
    },
    /// List installed packages
    List,
    /// Remove an installed package and its file in the install directory
    Uninstall {
        /// Repository as `user/repo`
        package: String,
    },
    /// Uninstall a package and install its latest release again
    Update {
        /// Repository as `user/repo`
        package: String,
    },
    /// Report files and manifest records that don't match
    Doctor {
        /// Delete orphaned files
        #[clap(long)]
        prune: bool,
    },
}
