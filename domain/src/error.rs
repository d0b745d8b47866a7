//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure with
/// `domain::error::Error` as the root, holding an `error_kind` that says what
/// went wrong and an optional `source` holding the lower-level error that
/// caused it. The `web` layer only looks at `error_kind` (and `Display`) when
/// choosing a status code and message, so upstream error bodies and transport
/// details never leak out through the HTTP API.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// A required configuration value is missing or unusable.
    Config(String),
    /// A caller-supplied value was refused before any upstream call.
    InvalidInput(String),
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// A call to the upstream task-board API failed. `status` is the HTTP
    /// status of a non-2xx reply, and `None` when no usable response was
    /// received (connect failure, timeout, unreadable or undecodable body).
    Upstream { path: String, status: Option<u16> },
    Other(String),
}

impl Error {
    pub fn upstream(
        path: impl Into<String>,
        status: Option<u16>,
        source: Option<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Error {
            source,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Upstream {
                path: path.into(),
                status,
            }),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::InvalidInput(message.into())),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(message.into())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Upstream { path, status }) => {
                write!(f, "Failed upstream API call to {path}. Status: ")?;
                match status {
                    Some(status) => write!(f, "{status}"),
                    None => write!(f, "unavailable"),
                }
            }
            DomainErrorKind::External(ExternalErrorKind::Other(message)) => {
                write!(f, "External error: {message}")
            }
            DomainErrorKind::Internal(InternalErrorKind::Config(message)) => {
                write!(f, "Configuration error: {message}")
            }
            DomainErrorKind::Internal(InternalErrorKind::InvalidInput(message)) => {
                write!(f, "Invalid input: {message}")
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(message)) => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                    "Network error".to_string(),
                )),
            }
        }
    }
}
