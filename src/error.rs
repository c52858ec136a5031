//! Error handling for the refine client
//!
//! One `thiserror` enum covers every way a command can fail, so call sites
//! need a single handling path. A server-reported business failure (an
//! envelope with `code == "error"`) is NOT an error here: envelope commands
//! parse it into [`crate::response::CommandResponse::Error`] and callers
//! branch on the response code.

use thiserror::Error;

use crate::mapping::MappingError;

/// Main error type for the client
#[derive(Error, Debug)]
pub enum RefineError {
    /// Network or I/O failure before a usable response was obtained.
    /// `operation` names the command and its identifying parameter.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: crate::http::TransportError,
    },

    /// The server answered, but not with the status the command expects.
    /// The body is never parsed in this case.
    #[error("unexpected status {status} from {endpoint} (expected {expected})")]
    StatusMismatch {
        endpoint: String,
        status: u16,
        expected: u16,
    },

    /// Response body is not well-formed JSON where JSON was required.
    #[error("malformed JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed as JSON but a required field is absent.
    #[error("no field '{path}' in response: {document}")]
    MissingField { path: String, document: String },

    /// Envelope `code` value outside the known set {"ok", "error"}.
    #[error("unexpected response code '{code}'")]
    UnexpectedCode { code: String },

    /// Command builder finalized with a missing or blank required parameter.
    /// Raised at build time, never at execute time.
    #[error("{command}: required parameter '{parameter}' is missing or blank")]
    Validation {
        command: &'static str,
        parameter: &'static str,
    },

    /// Mapping document could not be normalized.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Client-side setup problem (unparseable base URL and the like).
    #[error("client error: {message}")]
    Client { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RefineError>;
