//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for fsx using the `clap` crate.
//!
//! # Commands
//!
//! - **shell**: interactive explorer session (default)
//! - **tree**: print the tree of one or more paths
//! - **search**: print the matches of a name/extension/content search
//! - **export**: copy whole paths into a destination folder
//!
//! Global flags: `--quiet` for scripting-friendly output, `--config` for an
//! alternative config file, `-v` (repeatable) for diagnostics on stderr.

use crate::config::{PathFormat, SearchDefaults};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "fsx")]
#[command(about = "Explore, search and export file trees", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log diagnostics to stderr at debug level
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Display absolute paths (overrides config)
    #[arg(long = "absolute", global = true, conflicts_with = "relative")]
    pub absolute: bool,

    /// Display relative paths (overrides config)
    #[arg(long = "relative", global = true, conflicts_with = "absolute")]
    pub relative: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// Criterion switches shared by search-like commands
#[derive(clap::Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriteriaArgs {
    /// Match the query against file and folder names
    #[arg(short = 'n', long = "name")]
    pub name: bool,

    /// Match the query's extension against file extensions
    #[arg(short = 'e', long = "ext")]
    pub ext: bool,

    /// Match the query against file contents
    #[arg(short = 'c', long = "content")]
    pub content: bool,
}

impl CriteriaArgs {
    /// The switched-on criteria, or `defaults` when none was given
    #[must_use]
    pub const fn resolve(self, defaults: SearchDefaults) -> SearchDefaults {
        if self.name || self.ext || self.content {
            SearchDefaults {
                match_name: self.name,
                match_extension: self.ext,
                match_content: self.content,
            }
        } else {
            defaults
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive explorer session (default)
    #[command(visible_alias = "sh")]
    Shell {
        /// Paths to open at startup
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Print the tree of one or more paths
    #[command(visible_alias = "t")]
    Tree {
        /// Directories or files to show
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Print JSON instead of an indented tree
        #[arg(long = "json")]
        json: bool,
    },

    /// Search paths by name, extension or content
    #[command(visible_alias = "s")]
    Search {
        /// Text to search for
        #[arg(value_name = "QUERY")]
        query: String,

        /// Where to search (defaults to the current directory)
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Print JSON instead of an indented tree
        #[arg(long = "json")]
        json: bool,
    },

    /// Copy paths into a destination folder
    #[command(visible_alias = "x")]
    Export {
        /// Folder to copy into (created if missing)
        #[arg(value_name = "DEST")]
        dest: PathBuf,

        /// Files or folders to copy
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to Shell if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Shell { paths: Vec::new() })
    }

    /// Path format from the flags, falling back to the configured one
    #[must_use]
    pub const fn path_format(&self, configured: PathFormat) -> PathFormat {
        if self.absolute {
            PathFormat::Absolute
        } else if self.relative {
            PathFormat::Relative
        } else {
            configured
        }
    }

    /// Default log filter for the verbosity flag
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose == 0 { "warn" } else { "debug" }
    }
}
