//! Client error types for transport and protocol failures.

use std::{io, time::Duration};
use thiserror::Error;

use crate::{config::ConfigError, game::parser::ParseError};

/// Errors that can occur while talking to the solver.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket-level failure (connect refused, read or write failed)
    #[error("{operation}: connection error: {source}")]
    Connection {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// The peer stopped accepting or producing bytes
    #[error("{operation}: connection broken: {reason}")]
    ConnectionBroken {
        operation: &'static str,
        reason: &'static str,
    },

    /// The connection was never opened or has been disconnected
    #[error("{operation}: not connected")]
    NotConnected { operation: &'static str },

    /// A reply did not match the grammar expected for the request
    #[error("{operation}: protocol error: {source} (received {received:?})")]
    Protocol {
        operation: &'static str,
        received: String,
        #[source]
        source: ParseError,
    },

    /// The handshake reply was not the connection banner
    #[error("unexpected connection banner: {received:?}")]
    UnexpectedBanner { received: String },

    /// The connection settings failed validation
    #[error("invalid connection configuration: {0}")]
    Config(#[from] ConfigError),

    /// The reply grew past the configured maximum size
    #[error("{operation}: reply exceeded {limit} bytes")]
    MessageTooLarge {
        operation: &'static str,
        limit: usize,
    },

    /// The solver stayed busy past the configured maximum wait
    #[error("{operation}: solver still busy after {waited:?}")]
    Timeout {
        operation: &'static str,
        waited: Duration,
    },
}

impl ClientError {
    /// Whether the underlying socket is unusable after this error.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionBroken { .. }
                | Self::NotConnected { .. }
                | Self::MessageTooLarge { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::UnexpectedBanner { .. })
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
