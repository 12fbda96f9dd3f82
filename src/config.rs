//! Configuration management for the code-check language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project root markers
//! - Base rule file locations

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::project::{default_markers, RootMarker};
use crate::validation::MAX_NUMBER_OF_PROBLEMS;

/// Command-line arguments for the code-check language server
#[derive(Debug, Parser)]
#[command(name = "code-check-ls")]
#[command(about = "Language server that lints documents with per-project regex rules")]
#[command(version)]
pub struct Args {
    /// Maximum number of diagnostics reported per document
    #[arg(long, default_value_t = MAX_NUMBER_OF_PROBLEMS)]
    pub max_problems: usize,

    /// Extra file name marking a project root (stops the upward search)
    #[arg(long = "root-marker", value_name = "FILE_NAME")]
    pub root_markers: Vec<String>,

    /// Extra file name marking a candidate project root (search continues upward)
    #[arg(long = "weak-root-marker", value_name = "FILE_NAME")]
    pub weak_root_markers: Vec<String>,

    /// TOML file replacing the built-in base rules
    #[arg(long, help = "TOML file with [[lints]] replacing the built-in base rules")]
    pub base_rules: Option<PathBuf>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,

    /// Accepted for editors that always pass a transport flag; stdio is the only transport
    #[arg(long, hide = true)]
    pub stdio: bool,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Cap on diagnostics per document
    pub max_problems: usize,
    /// Marker files checked at each directory, in order
    pub root_markers: Vec<RootMarker>,
    /// Base rule files to try before the embedded set, in order
    pub base_rule_files: Vec<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_problems: MAX_NUMBER_OF_PROBLEMS,
            root_markers: default_markers(),
            base_rule_files: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        if args
            .root_markers
            .iter()
            .chain(&args.weak_root_markers)
            .any(|name| name.is_empty() || name.contains(['/', '\\']))
        {
            bail!("Root markers must be plain file names");
        }

        let mut root_markers = default_markers();
        root_markers.extend(args.root_markers.into_iter().map(RootMarker::strong));
        root_markers.extend(args.weak_root_markers.into_iter().map(RootMarker::weak));

        let mut base_rule_files = Vec::new();

        // Add user-specified file if provided
        if let Some(path) = args.base_rules {
            base_rule_files.push(path);
        }

        // Add default user config location
        if let Some(config_dir) = dirs::config_dir() {
            base_rule_files.push(config_dir.join("code-check").join("base-rules.toml"));
        }

        Ok(Config {
            max_problems: args.max_problems,
            root_markers,
            base_rule_files,
            log_level: args.log_level,
        })
    }
}
