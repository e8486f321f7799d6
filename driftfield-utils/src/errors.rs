// Driftfield error types
//
// The missing-container case is not an error anywhere in Driftfield; these
// cover the ambient failures around it (config files, terminal output,
// logger setup, the frame task itself).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriftError {
    /// Config file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config text is not valid JSON
    #[error("failed to parse particle config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Writing a frame (or restoring the screen) failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Logger could not be installed
    #[error("failed to set up logging: {0}")]
    Logging(String),

    /// The frame task panicked or was aborted
    #[error("frame loop aborted: {0}")]
    LoopAborted(String),
}

/// Result type for Driftfield operations
pub type DriftResult<T> = Result<T, DriftError>;
