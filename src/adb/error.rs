use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed with code {code}: {output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("`{command}` timed out after {duration:?}")]
    Timeout { command: String, duration: Duration },

    #[error("local file {path:?} does not exist")]
    MissingLocalFile { path: PathBuf },

    #[error("{0} is required")]
    MissingArgument(&'static str),

    #[error("device {serial} not found")]
    DeviceNotFound { serial: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
