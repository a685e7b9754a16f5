use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Identifier / checksum errors
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),
    /// Browser session errors
    #[error("browser error: {0}")]
    Session(#[from] SessionError),
    /// Output file errors
    #[error("output error: {0}")]
    Output(#[from] OutputError),
    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Record-level retrieval errors
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}

/// Identifier errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The code cannot produce a valid check digit
    #[error("invalid identifier '{code}': {reason}")]
    InvalidIdentifier { code: String, reason: String },
}

impl IdentifierError {
    pub fn invalid(code: impl Into<String>, reason: impl Into<String>) -> Self {
        IdentifierError::InvalidIdentifier {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

/// Browser session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Launching the browser failed
    #[error("failed to launch browser: {0}")]
    Launch(String),
    /// The element did not appear in time
    #[error("element '{selector}' not found within {waited:?}")]
    Timeout { selector: String, waited: Duration },
    /// DevTools protocol error
    #[error("devtools protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

impl SessionError {
    /// Selector / timeout misses, as opposed to a broken session
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

/// Output file errors
#[derive(Debug, Error)]
pub enum OutputError {
    /// Creating a directory failed
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing a file failed
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Only Chrome has a driver
    #[error("unsupported browser '{0}', only chrome is supported")]
    UnsupportedBrowser(String),
    /// Config file could not be parsed
    #[error("failed to load config from {path}: {message}")]
    Load { path: PathBuf, message: String },
    /// Default config file could not be written
    #[error("failed to write default config to {path}: {message}")]
    Write { path: PathBuf, message: String },
    /// A value is out of range
    #[error("invalid config value '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Errors that end a single record without an outcome
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
