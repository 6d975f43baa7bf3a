//! # Star Core Library
//!
//! This crate contains the core logic of `starshell`, a minimal interactive shell with
//! a tiny package manager for prebuilt binaries published on GitHub release pages.
//!
//! A package is a `user/repo` GitHub project. Installing it resolves the latest release,
//! picks the first asset whose name contains the platform token (`linux-amd64`,
//! `darwin-arm64`, ...), downloads it into `./stars` and records it in the `./stars/.stars`
//! manifest.
//!
//! ## Modules Overview
//! - [`package`] – Package identities and manifest records
//! - [`manifest`] – Loading and saving the `.stars` manifest
//! - [`platform`] – OS/architecture tokens used to pick release assets
//! - [`release`] – Release lookup and asset download (GitHub)
//! - [`installer`] – Install, list, uninstall and update
//! - [`doctor`] – Finding drift between the manifest and the install directory
//! - [`shell`] – The interactive shell
//! - [`config`] – Shell configuration (`config.json`)
//! - [`logging`] – Log output for the binary
//! - [`error`] – Error types
//! - [`util`] – Paths and small filesystem helpers

pub mod error;
pub mod package;
pub mod manifest;
pub mod platform;
pub mod release;
pub mod installer;
pub mod doctor;
pub mod shell;
pub mod config;
pub mod logging;
pub mod util;

pub use error::*;
pub use package::*;
pub use manifest::*;
pub use platform::*;
pub use release::*;
pub use installer::*;
pub use doctor::*;
pub use config::{ColorSpec, Config};
pub use util::*;
