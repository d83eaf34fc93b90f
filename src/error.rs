//! Error types
//!
//! [`ClientError`] is what a backing client reports. [`Error`] is what the
//! registry and dispatch layer report; client errors are carried through
//! unchanged, tagged with the operation and kind that failed.

use std::fmt;
use thiserror::Error;

/// CRUD operation, used to tag errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Get,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a backing client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("resource does not exist: {kind}({name})")]
    NotFound { kind: String, name: String },

    #[error("resource already exists: {kind}({name})")]
    AlreadyExists { kind: String, name: String },

    #[error("update conflict: {kind}({name}): {message}")]
    Conflict {
        kind: String,
        name: String,
        message: String,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unexpected response: {status}: {message}")]
    Unexpected { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn conflict(
        kind: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            kind: kind.into(),
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Registry and dispatch errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("alias '{alias}' of {new} is already registered to {existing}")]
    DuplicateAlias {
        alias: String,
        existing: &'static str,
        new: &'static str,
    },

    #[error("invalid descriptor for {kind}: {message}")]
    InvalidDescriptor { kind: &'static str, message: String },

    #[error("resource type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{operation} {kind}: {source}")]
    NotFound {
        operation: Operation,
        kind: &'static str,
        source: ClientError,
    },

    #[error("{operation} {kind}: {source}")]
    Conflict {
        operation: Operation,
        kind: &'static str,
        source: ClientError,
    },

    #[error("{operation} {kind}: {source}")]
    AlreadyExists {
        operation: Operation,
        kind: &'static str,
        source: ClientError,
    },

    #[error("{operation} {kind}: {source}")]
    Client {
        operation: Operation,
        kind: &'static str,
        source: ClientError,
    },

    #[error("{operation} {kind}: cancelled")]
    Cancelled {
        operation: Operation,
        kind: &'static str,
    },

    #[error("{operation} {kind}: deadline exceeded")]
    DeadlineExceeded {
        operation: Operation,
        kind: &'static str,
    },

    #[error("document {index}: {message}")]
    Decode { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Tag a backing client error with the operation and kind that produced it
    pub fn from_client(operation: Operation, kind: &'static str, source: ClientError) -> Self {
        match source {
            ClientError::NotFound { .. } => Self::NotFound {
                operation,
                kind,
                source,
            },
            ClientError::Conflict { .. } => Self::Conflict {
                operation,
                kind,
                source,
            },
            ClientError::AlreadyExists { .. } => Self::AlreadyExists {
                operation,
                kind,
                source,
            },
            source => Self::Client {
                operation,
                kind,
                source,
            },
        }
    }

    pub fn decode(index: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: message.into(),
        }
    }

    /// Errors that can only come from a wiring defect; the process should abort
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateAlias { .. } | Self::InvalidDescriptor { .. } | Self::TypeMismatch { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// The original backing client error, if this error carries one
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::NotFound { source, .. }
            | Self::Conflict { source, .. }
            | Self::AlreadyExists { source, .. }
            | Self::Client { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_tagged_not_rewritten() {
        let source = ClientError::Connection("refused".to_string());
        let err = Error::from_client(Operation::Get, "BGPConfiguration", source.clone());

        assert!(matches!(err, Error::Client { .. }));
        assert_eq!(err.client_error(), Some(&source));
        assert_eq!(
            err.to_string(),
            "get BGPConfiguration: connection failed: refused"
        );
    }

    #[test]
    fn test_not_found_and_conflict_get_their_own_variants() {
        let err = Error::from_client(
            Operation::Get,
            "BGPPeer",
            ClientError::not_found("BGPPeer", "rack1"),
        );
        assert!(err.is_not_found());

        let err = Error::from_client(
            Operation::Update,
            "BGPPeer",
            ClientError::conflict("BGPPeer", "rack1", "stale"),
        );
        assert!(err.is_conflict());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_wiring_errors_are_fatal() {
        let err = Error::TypeMismatch {
            expected: "BGPConfiguration",
            actual: "BGPPeer",
        };
        assert!(err.is_fatal());
        assert!(!Error::UnknownKind("foo".to_string()).is_fatal());
    }
}
