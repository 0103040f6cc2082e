//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the interrupt handler,
//! and runs the requested command.

use anyhow::{Context, Result, bail};
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

use openz::cli::{Args, Command, WriteArgs};
use openz::fs_ops::{hint_for, io_error_with_help};
use openz::output as out;
use openz::{
    ContentMode, OpenzError, WriteConfig, default_config_path, load_app_config, open_for_write,
    shutdown, try_rollback,
};

use crate::logging::init_tracing;

/// Exit status when `rollback` finds no backup.
const EXIT_NO_BACKUP: u8 = 3;

const CHUNK: usize = 64 * 1024;

/// Run the CLI application and map failures to an exit status.
pub fn run(args: Args) -> ExitCode {
    // Declared first so it outlives `report` and buffered file logs are flushed.
    let mut log_guard: Option<WorkerGuard> = None;
    match execute(args, &mut log_guard) {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            let code = e.downcast_ref::<OpenzError>().map(OpenzError::code).unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn execute(args: Args, log_guard: &mut Option<WorkerGuard>) -> Result<ExitCode> {
    if args.print_config {
        match default_config_path() {
            Some(p) => {
                let state = if p.exists() { "exists" } else { "not present" };
                out::print_info(&format!("openz config path: {} ({state})", p.display()));
            }
            None => out::print_warn("Could not determine a config path for this platform"),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = args.command.clone() else {
        bail!("no command given; try `openz write --help` or `openz rollback --help`");
    };

    let mut cfg = load_app_config()?;
    args.apply_overrides(&mut cfg);

    *log_guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .context("initialize logging")?;

    ctrlc::set_handler(shutdown::request).context("install interrupt handler")?;

    debug!("Starting openz: {:?}", args);

    match command {
        Command::Write(w) => run_write(&w, &w.write_config(&cfg.defaults)),
        Command::Rollback { path } => run_rollback(&path),
    }
}

fn run_write(args: &WriteArgs, wcfg: &WriteConfig) -> Result<ExitCode> {
    let mut session = open_for_write(&args.path, wcfg)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    match wcfg.mode {
        ContentMode::Text => {
            let mut text = String::new();
            input
                .read_to_string(&mut text)
                .map_err(io_error_with_help("read text from", Path::new("<stdin>")))?;
            if shutdown::is_requested() {
                bail!("interrupted; write to {} aborted", args.path.display());
            }
            session.write_text(&text)?;
        }
        ContentMode::Binary => {
            let mut buf = vec![0u8; CHUNK];
            loop {
                if shutdown::is_requested() {
                    // Dropping the session aborts it.
                    bail!("interrupted; write to {} aborted", args.path.display());
                }
                let n = match input.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(io_error_with_help("read", Path::new("<stdin>"))(e)),
                };
                session.write_bytes(&buf[..n])?;
            }
        }
    }

    session.commit()?;
    info!(path = %args.path.display(), "write committed");
    out::print_success(&format!("wrote {}", args.path.display()));
    Ok(ExitCode::SUCCESS)
}

fn run_rollback(path: &Path) -> Result<ExitCode> {
    if try_rollback(path)? {
        out::print_success(&format!("restored {} from backup", path.display()));
        Ok(ExitCode::SUCCESS)
    } else {
        out::print_warn(&format!("no backup available for {}", path.display()));
        Ok(ExitCode::from(EXIT_NO_BACKUP))
    }
}

/// Log a failure with its typed kind and print an actionable message.
fn report(e: &anyhow::Error) {
    let Some(oe) = e.downcast_ref::<OpenzError>() else {
        error!(error = ?e, "openz failed");
        out::print_error(&format!("{e:#}"));
        return;
    };

    let code = oe.code();
    match oe {
        OpenzError::Configuration(msg) => error!(code, kind = "configuration", %msg, "Write refused"),
        OpenzError::AlreadyExists(p) => error!(code, kind = "already_exists", path = %p.display(), "Write refused"),
        OpenzError::LockContention(p) => error!(code, kind = "lock_contention", lock = %p.display(), "Write refused"),
        OpenzError::ModeMismatch { expected, got } => {
            error!(code, kind = "mode_mismatch", %expected, %got, "Write refused")
        }
        OpenzError::WriteFault { path, source } => {
            error!(code, kind = "write_fault", path = %path.display(), error = %source, "Write aborted")
        }
        OpenzError::Io { op, path, source } => {
            error!(code, kind = "io", op = *op, path = %path.display(), error = %source, "Operation failed")
        }
    }

    let hint = match oe {
        OpenzError::WriteFault { source, .. } | OpenzError::Io { source, .. } => hint_for(source),
        OpenzError::LockContention(_) => {
            Some("another write is in progress; if none is, the lock file is stale and can be removed")
        }
        OpenzError::AlreadyExists(_) => Some("pass --overwrite to replace it"),
        _ => None,
    };
    match hint {
        Some(h) => out::print_error(&format!("{oe} ({h})")),
        None => out::print_error(&oe.to_string()),
    }
}
