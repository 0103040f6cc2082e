//! CLI definition and parsing.
//!
//! Notes:
//! - `write` streams stdin into one session; flags map 1:1 to WriteConfig.
//! - Session flags from the config file are defaults; a CLI flag can only
//!   turn an option on.
//! - --debug is a shorthand for --log-level debug.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{AppConfig, ContentMode, LogLevel, WriteConfig};

/// Transactional single-file writes with lock, atomic replace and rollback.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Transactional single-file writes")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location used by openz and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write stdin to PATH through a write session.
    Write(WriteArgs),
    /// Restore PATH from its backup (<PATH>.bak).
    Rollback {
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WriteArgs {
    /// Target file.
    #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub path: PathBuf,

    /// Treat input as UTF-8 text (rejects invalid UTF-8).
    #[arg(long)]
    pub text: bool,

    /// Replace the target if it exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Stage into a temp file and rename onto the target on success.
    #[arg(long)]
    pub atomic: bool,

    /// Hold <PATH>.lock while writing; fail if it already exists.
    #[arg(long)]
    pub lock: bool,

    /// Create the target exclusively (incompatible with --atomic).
    #[arg(long)]
    pub exclusive: bool,

    /// Keep the previous content in <PATH>.bak.
    #[arg(long)]
    pub backup: bool,

    /// Keep the previous content in <PATH>.bak only if the write fails (implies --backup).
    #[arg(long)]
    pub backup_on_fault: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded AppConfig (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
    }
}

impl WriteArgs {
    /// Session options: config-file defaults, then flags from this command line.
    pub fn write_config(&self, defaults: &WriteConfig) -> WriteConfig {
        let mode = if self.text { ContentMode::Text } else { defaults.mode };
        WriteConfig {
            mode,
            overwrite: defaults.overwrite || self.overwrite,
            atomic: defaults.atomic || self.atomic,
            lockfile: defaults.lockfile || self.lock,
            exclusive: defaults.exclusive || self.exclusive,
            backup: defaults.backup || self.backup || self.backup_on_fault,
            backup_on_fault: defaults.backup_on_fault || self.backup_on_fault,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
