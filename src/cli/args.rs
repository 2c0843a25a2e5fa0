//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitrun - run git natively or inside WSL
#[derive(Parser, Debug)]
#[command(name = "gitrun")]
#[command(about = "Run git natively or inside WSL with streamed output, progress detection and safe abort")]
#[command(long_about = r#"
gitrun launches one git command for a repository. Repositories that live inside
a WSL distro (\\wsl$\<distro>\...) are reached through wsl.exe: paths and option
values are rewritten for the distro shell. Output is streamed; progress refreshes
are shown on stderr and never recorded. Ctrl-C aborts the whole process tree and
releases any index.lock the aborted git left behind.

EXAMPLES:
  # Fetch in the current repository
  gitrun run -- fetch --all --progress

  # Status of a repository inside WSL
  gitrun run -C '\\wsl$\Ubuntu\home\me\repo' -- status

  # Show what would be launched, without running it
  gitrun translate -C '\\wsl$\Ubuntu\home\me\repo' -- log --format="%H %s"

  # Machine-readable result
  gitrun run --json -- pull --ff-only

  # Effective configuration with sources
  gitrun config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is $GITRUN_HOME/config.toml, or found by searching upward from the
  working directory for .gitrun/config.toml
  Use --config to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// git program to launch for native runs
    #[arg(long, global = true)]
    pub git_command: Option<String>,

    /// Full path to wsl.exe (located automatically when unset)
    #[arg(long, global = true)]
    pub wsl_launcher: Option<PathBuf>,

    /// Program to run inside the WSL distro
    #[arg(long, global = true)]
    pub wsl_tool: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a git command
    Run {
        /// Repository working directory (defaults to the current directory)
        #[arg(short = 'C', long = "dir", value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Runner mode: auto (WSL for \\wsl$\ paths), native, or wsl
        #[arg(long)]
        mode: Option<String>,

        /// Encoding of git's output (any WHATWG label, e.g. utf-8, windows-1252)
        #[arg(long)]
        encoding: Option<String>,

        /// Print a JSON summary instead of streaming lines to stdout
        #[arg(long)]
        json: bool,

        /// Show the command that would be launched without running it
        #[arg(long)]
        dry_run: bool,

        /// Arguments passed to git
        #[arg(last = true, value_name = "GIT_ARGS")]
        args: Vec<String>,
    },

    /// Show how a git command would be launched for a directory
    Translate {
        /// Repository working directory
        #[arg(short = 'C', long = "dir", value_name = "DIR")]
        dir: PathBuf,

        /// Runner mode: auto, native, or wsl
        #[arg(long)]
        mode: Option<String>,

        /// Arguments passed to git
        #[arg(last = true, value_name = "GIT_ARGS")]
        args: Vec<String>,
    },

    /// Show the effective configuration
    Config {
        /// Directory to start config discovery from
        #[arg(short = 'C', long = "dir", value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Name used in error reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Run { .. } => "run",
            Self::Translate { .. } => "translate",
            Self::Config { .. } => "config",
        }
    }

    /// Directory the command works in, if one was given.
    #[must_use]
    pub fn dir(&self) -> Option<&PathBuf> {
        match self {
            Self::Run { dir, .. } | Self::Config { dir, .. } => dir.as_ref(),
            Self::Translate { dir, .. } => Some(dir),
        }
    }
}

/// Build the clap command (for completions and help tests).
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
