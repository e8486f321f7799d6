// Driftfield: logging setup
//
// The terminal is the render target, so logs go to a file under the system
// temp dir instead of stdout or stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::consts::{LOG_DIR_NAME, LOG_FILE_NAME};
use crate::errors::{DriftError, DriftResult};

const LOG_PATTERN: &str = "[{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {M}] {m}{n}";

pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join(LOG_DIR_NAME)
}

/// Parse a level name, falling back to `Info` for anything unrecognized
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Install the global file logger in the default log directory.
/// Returns the path of the log file.
pub fn configure_logger(level: &str) -> DriftResult<PathBuf> {
    configure_logger_in(&default_log_dir(), level)
}

pub fn configure_logger_in(log_dir: &Path, level: &str) -> DriftResult<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let log_file = log_dir.join(LOG_FILE_NAME);

    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .append(true)
        .build(&log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("logFile", Box::new(appender)))
        .build(
            Root::builder()
                .appender("logFile")
                .build(parse_level(level)),
        )
        .map_err(|e| DriftError::Logging(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| DriftError::Logging(e.to_string()))?;
    Ok(log_file)
}
