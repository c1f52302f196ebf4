//! Logger setup for the arm executables
//!
//! Two sinks are used. The terminal shows records at the level asked for on
//! the command line, with coloured level tags. The session log file always
//! keeps at least `DEBUG` records in plain text, so a run's settling and
//! behaviour decisions can be read back after the fact.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info, Level};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;
use std::fmt::Display;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Notes
///
/// - `min_level` must be at least `log::Level::Info`, the sweep trace and
///   phase transitions are logged at `INFO` and must always be visible.
/// - `min_level` applies to the terminal. The log file uses
///   [`file_level`] of it.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let file_level = file_level(min_level);

    let terminal = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message,
                    true
                )
            ))
        })
        .level(min_level)
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message,
                    false
                )
            ))
        })
        .level(file_level)
        .chain(
            fern::log_file(session.log_file_path.clone())
                .map_err(LoggerInitError::LogFileInitError)?
        );

    // The root level lets through everything either sink wants
    fern::Dispatch::new()
        .level(file_level)
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Terminal log level: {:?}", min_level);
    info!("    File log level: {:?}", file_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Level used for the session log file given the terminal level.
pub fn file_level(min_level: LevelFilter) -> LevelFilter {
    std::cmp::max(min_level, LevelFilter::Debug)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log line.
///
/// Debug and trace lines carry the target module, since they come from the
/// per-cycle control code and are hard to place otherwise.
fn format_line(
    elapsed_s: f64,
    level: Level,
    target: &str,
    message: impl Display,
    colour: bool
) -> String {
    let tag = if colour {
        level_to_str(level).to_string()
    }
    else {
        level_tag(level).to_string()
    };

    if level > Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed_s, tag, target, message)
    }
    else {
        format!("[{:10.6} {}] {}", elapsed_s, tag, message)
    }
}

/// Plain three letter tag of a log level
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

/// Get the coloured string representation of a log level
fn level_to_str(level: Level) -> ColoredString {
    let tag = level_tag(level);
    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
