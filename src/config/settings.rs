//! Configuration settings for crossfs
//!
//! Defines the CLI arguments and the runtime configuration derived from them.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// crossfs - copy directory trees between filesystem instances
#[derive(Parser, Debug, Clone)]
#[command(name = "crossfs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Copy directory trees between independent filesystem instances")]
#[command(long_about = r#"
crossfs reconstructs directory trees under a destination directory that lives
on a different filesystem instance. Every side is opened as its own instance,
so paths are rebuilt segment by segment instead of being reused.

Nothing is overwritten: the copy stops at the first destination entry that
already exists.

Examples:
  crossfs tree ./project /backup          # creates /backup/project/...
  crossfs contents ./project /backup      # creates /backup/...
  crossfs files a.txt docs/b.txt --into /backup
"#)]
pub struct CliArgs {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Output format for the copy summary
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub output_format: OutputFormat,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Log filter used when `RUST_LOG` is not set
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Copy a directory into DEST_DIR, keeping the directory itself
    #[command(name = "tree")]
    Tree {
        /// Directory to copy
        #[arg(value_name = "SOURCE_DIR")]
        source: PathBuf,
        /// Existing directory receiving the copy
        #[arg(value_name = "DEST_DIR")]
        destination: PathBuf,
    },

    /// Copy everything inside a directory into DEST_DIR
    #[command(name = "contents")]
    Contents {
        /// Directory whose contents are copied
        #[arg(value_name = "SOURCE_DIR")]
        source: PathBuf,
        /// Existing directory receiving the copy
        #[arg(value_name = "DEST_DIR")]
        destination: PathBuf,
    },

    /// Copy regular files into DEST_DIR under their own names
    #[command(name = "files")]
    Files {
        /// Files to copy
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Existing directory receiving the copies
        #[arg(long, value_name = "DEST_DIR")]
        into: PathBuf,
    },
}

/// Which copy operation to run
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// Directory itself plus its contents
    Tree,
    /// Directory contents only
    Contents,
    /// Flat list of regular files
    Files,
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Log line format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Copy operation
    pub mode: CopyMode,
    /// Source directory (tree, contents) or files (files)
    pub sources: Vec<PathBuf>,
    /// Destination directory
    pub destination: PathBuf,
    /// Summary format
    pub output_format: OutputFormat,
    /// Suppress the summary
    pub quiet: bool,
}

impl CopyConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let (mode, sources, destination) = match &args.command {
            Commands::Tree {
                source,
                destination,
            } => (CopyMode::Tree, vec![source.clone()], destination.clone()),
            Commands::Contents {
                source,
                destination,
            } => (CopyMode::Contents, vec![source.clone()], destination.clone()),
            Commands::Files { files, into } => (CopyMode::Files, files.clone(), into.clone()),
        };

        let config = Self {
            mode,
            sources,
            destination,
            output_format: args.output_format,
            quiet: args.quiet,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the shape of the configuration without touching the host
    pub fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("At least one source path required".to_string());
        }
        if self.mode != CopyMode::Files && self.sources.len() != 1 {
            return Err(format!(
                "{:?} copies take exactly one source directory",
                self.mode
            ));
        }
        if self.destination.as_os_str().is_empty() {
            return Err("Destination path required".to_string());
        }
        if let Some(empty) = self.sources.iter().position(|s| s.as_os_str().is_empty()) {
            return Err(format!("Source path #{} is empty", empty + 1));
        }
        Ok(())
    }

    /// Make every host path absolute and reject a source directory that
    /// overlaps the destination.
    ///
    /// The destination is canonicalized. Sources keep their last component as
    /// given, so a symbolic link is handed to the engine as a link.
    pub fn resolve_host_paths(&self) -> Result<Self, String> {
        let mut resolved = self.clone();
        resolved.destination = canonical(&self.destination)?;
        resolved.sources = self
            .sources
            .iter()
            .map(|source| canonical_parent(source))
            .collect::<Result<_, _>>()?;

        if resolved.mode != CopyMode::Files {
            for source in &resolved.sources {
                if is_overlap(source, &resolved.destination) {
                    return Err(format!(
                        "Source {} and destination {} overlap",
                        source.display(),
                        resolved.destination.display()
                    ));
                }
            }
        }
        Ok(resolved)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, String> {
    std::fs::canonicalize(path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Canonical parent joined with the untouched last component
fn canonical_parent(path: &Path) -> Result<PathBuf, String> {
    std::fs::symlink_metadata(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let Some(name) = path.file_name() else {
        return canonical(path);
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(canonical(parent)?.join(name))
}

/// Whether one path contains the other (component-wise)
pub fn is_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
