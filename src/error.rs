//! Error types for dockerrun-deploy
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::options::OptionKey;

/// Result type alias for deploy operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Option file exists but is not a flat key/value mapping
    #[error("malformed option file {file}: {message}")]
    MalformedOptionFile { file: PathBuf, message: String },

    /// One half of the auth bucket pair was provided without the other
    #[error("option '{present}' also requires '{missing}'")]
    MissingCounterpart {
        present: OptionKey,
        missing: OptionKey,
    },

    /// A key required by the current operation is absent from the resolved set
    #[error("the required option '{key}' was not provided")]
    MissingOption { key: OptionKey },

    /// `proxy-config` names a file that does not exist
    #[error("proxy config file not found: {path}")]
    ProxyConfigNotFound { path: PathBuf },

    /// The `aws` CLI is not installed or not on PATH
    #[error("the 'aws' command-line tool was not found on PATH")]
    AwsCliUnavailable,

    /// An external tool exited with a failure status
    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
