// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::packages::DEFAULT_JOBS;

/// Command-line arguments for `pytoolbox`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pytoolbox",
    version,
    about = "Manage a local Python toolchain: versions, packages, mirrors and virtualenvs.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PYTOOLBOX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Use plain pip instead of `uv pip` for package operations.
    #[arg(long, global = true)]
    pub pip: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Detect interpreter and package-manager versions and paths.
    Info {
        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run an arbitrary command through the relay, streaming its output.
    Exec {
        /// The command line to run (joined with spaces).
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// List globally installed packages.
    List {
        /// Print the package list as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Install a package globally.
    Install { name: String },

    /// Upgrade a package to its latest version.
    Update { name: String },

    /// Upgrade several packages with a bounded worker pool.
    UpdateAll {
        #[arg(required = true)]
        names: Vec<String>,

        /// Worker pool size.
        #[arg(long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,
    },

    /// Uninstall a package.
    Uninstall { name: String },

    /// Check whether a package is installed.
    Check { name: String },

    /// Show the latest available version of a package.
    Latest { name: String },

    /// Search PyPI through pip.
    Search { keyword: String },

    /// Manage virtual environments.
    #[command(subcommand)]
    Venv(VenvCommand),

    /// Read and edit pip/uv configuration files.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum VenvCommand {
    /// Create a virtual environment at the given path.
    Create {
        path: PathBuf,

        /// Create with `uv venv` instead of `python -m venv`.
        #[arg(long)]
        uv: bool,
    },

    /// List virtual environments under a base directory.
    List { base: PathBuf },

    /// Delete a virtual environment directory.
    Remove { path: PathBuf },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the default config file location.
    Path {
        #[arg(value_enum, default_value_t)]
        tool: ConfigTool,
    },

    /// Print the parsed config file contents.
    Show {
        #[arg(value_enum, default_value_t)]
        tool: ConfigTool,
    },

    /// Set one key in the config file, rewriting it in canonical form.
    Set {
        key: String,
        value: String,

        #[arg(long, value_enum, default_value_t)]
        tool: ConfigTool,
    },
}

/// Which tool's config file a `config` subcommand targets.
#[derive(Debug, Copy, Clone, Default, ValueEnum)]
pub enum ConfigTool {
    #[default]
    Pip,
    Uv,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
