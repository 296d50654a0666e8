//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use fern;
use log::{self, info};
use thiserror::Error;

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
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),

    #[error("Expected a level override of the form `target=level`, found `{0}`")]
    InvalidLevelOverride(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `level_overrides` sets the level of individual targets (module paths), for example to silence
/// the per-cell trace output of the planner while keeping debug output elsewhere.
///
/// # Notes
///
/// - `min_level` must be greater than `log::Level::Info`.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    level_overrides: &[(String, LevelFilter)],
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(session.log_file_path.clone()).map_err(LoggerInitError::LogFileInitError)?;

    // Setup the logger using fern's builder pattern
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // If debug or trace include the target, otherwise don't include it
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(min_level);

    for (target, level) in level_overrides {
        dispatch = dispatch.level_for(target.clone(), *level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (target, level) in level_overrides {
        info!("    Log level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Parse a `target=level` level override, as accepted on the command line.
pub fn parse_level_override(s: &str) -> Result<(String, LevelFilter), LoggerInitError> {
    let invalid = || LoggerInitError::InvalidLevelOverride(s.to_string());

    let mut parts = s.splitn(2, '=');
    let target = parts.next().map(str::trim).unwrap_or("");
    let level = parts.next().map(str::trim).ok_or_else(invalid)?;

    if target.is_empty() {
        return Err(invalid());
    }

    let level = level.parse::<LevelFilter>().map_err(|_| invalid())?;

    Ok((target.to_string(), level))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_level_override() {
        assert_eq!(
            parse_level_override("nav_lib::nav::astar=trace").unwrap(),
            ("nav_lib::nav::astar".to_string(), LevelFilter::Trace)
        );
        assert_eq!(
            parse_level_override(" nav_lib::map = Info ").unwrap(),
            ("nav_lib::map".to_string(), LevelFilter::Info)
        );

        for bad in ["nav_lib::map", "=debug", "nav_lib::map=loud", ""].iter() {
            assert!(matches!(
                parse_level_override(bad),
                Err(LoggerInitError::InvalidLevelOverride(_))
            ));
        }
    }
}
