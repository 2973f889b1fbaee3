//! Error type shared by ports, connectors and wiring graphs.
//!
//! # Propagation
//!
//! Connectors never catch or wrap a downstream error. Whatever a sink returns
//! from [`PushPort::push`](crate::PushPort::push) reaches the caller of the
//! outermost push unchanged, and the remaining deliveries of that push are
//! skipped.
//!
//! # Failure Modes
//!
//! | Variant | Raised by | When |
//! |---------|-----------|------|
//! | `TypeMismatch` | dynamic ports, graph wiring | value or sink kind differs from the port kind |
//! | `Reaction` | user sinks and listeners | a reaction could not process the value |
//! | `LastAlreadyWired` | `Connector::set_last` | a last port is already designated |
//! | `DuplicateName` / `UnknownNode` / `NotAConnector` | `WiringGraph` | bad node reference |
//! | `Config` / `Io` | graph configuration loading | malformed or unreadable config |

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::value::ValueKind;

/// Result alias used throughout wirekit.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;

/// Errors raised while wiring or propagating values.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A dynamically typed value or sink did not match the declared port kind.
    #[error("type mismatch at port '{port}': expected {expected}, found {found}")]
    TypeMismatch {
        port: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A downstream reaction failed while processing a value.
    #[error("reaction failed at '{port}': {source}")]
    Reaction {
        port: String,
        #[source]
        source: Box<dyn StdError + 'static>,
    },

    /// The connector already designates a last port.
    #[error("connector '{connector}' already has a last port wired")]
    LastAlreadyWired { connector: String },

    /// A graph node with this name already exists.
    #[error("duplicate node name '{0}'")]
    DuplicateName(String),

    /// No graph node with this name exists.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// The node is a plain sink and has no value to read or notify about.
    #[error("node '{0}' is a sink, not a connector")]
    NotAConnector(String),

    /// A graph configuration was malformed.
    #[error("graph configuration error: {0}")]
    Config(String),

    /// A graph configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FlowError {
    /// Build a [`FlowError::Reaction`] for the named port.
    ///
    /// Accepts anything convertible into a boxed error, including `&str` and
    /// `String` messages.
    pub fn reaction(port: impl Into<String>, source: impl Into<Box<dyn StdError + 'static>>) -> Self {
        Self::Reaction {
            port: port.into(),
            source: source.into(),
        }
    }

    /// Whether this error was raised by a downstream reaction.
    #[must_use]
    pub fn is_reaction(&self) -> bool {
        matches!(self, Self::Reaction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_from_message() {
        let err = FlowError::reaction("label", "font missing");
        assert!(err.is_reaction());
        assert_eq!(err.to_string(), "reaction failed at 'label': font missing");
        assert!(err.source().is_some());
    }

    #[test]
    fn type_mismatch_display_names_kinds() {
        let err = FlowError::TypeMismatch {
            port: "visible".into(),
            expected: ValueKind::Bool,
            found: ValueKind::Text,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch at port 'visible': expected bool, found text"
        );
        assert!(!err.is_reaction());
    }

    #[test]
    fn last_already_wired_display() {
        let err = FlowError::LastAlreadyWired {
            connector: "status".into(),
        };
        assert!(err.to_string().contains("'status'"));
    }
}
