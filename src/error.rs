use thiserror::Error;

/// Classifies source errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// HTTP request failed (connection, timeout, non-2xx status)
    Network,
    /// Local file open/read failure
    FileError,
    /// Cache directory or cache file could not be used
    Cache,
    /// Source identifier is not an http(s) URL
    InvalidUrl,
}

/// Classifies fatal configuration errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// Options that cannot be combined (root reduction in hosts mode)
    InvalidCombination,
    /// Nothing is left to write after reconciliation
    EmptyRuleSet,
    /// A single value failed validation
    InvalidValue,
    /// A required input is absent
    Missing,
    /// The config file could not be decoded
    Parse,
}

/// dnsgate error types
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Invalid domain '{entry}': {reason}")]
    Validation { entry: String, reason: String },

    #[error("Source unavailable: {source_id}: {message}")]
    SourceUnavailable {
        kind: SourceErrorKind,
        source_id: String,
        message: String,
    },

    #[error("Config error: {message}")]
    Config {
        kind: ConfigErrorKind,
        message: String,
    },

    #[error("Public suffix list error: {0}")]
    SuffixList(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GateError {
    pub(crate) fn validation(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        GateError::Validation {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        GateError::Config {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn source(
        kind: SourceErrorKind,
        source_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GateError::SourceUnavailable {
            kind,
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// True for errors that must abort the run before any output is written.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            GateError::Validation { .. } | GateError::SourceUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
