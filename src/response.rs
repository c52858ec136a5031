//! Response taxonomy shared by mutating commands
//!
//! The server answers every envelope-style command (delete-project,
//! set-preference, apply-operations) with `{"code": "ok"}` or
//! `{"code": "error", "message": "..."}`. [`CommandResponse`] models that
//! envelope as a sum type: an error without a message, or an ok with one,
//! cannot be represented at all. A `CommandResponse::Error` is a successful
//! parse of a failed operation; infrastructure failures surface as
//! [`RefineError`](crate::RefineError) instead.

use serde_json::Value;

use crate::error::{RefineError, Result};
use crate::json;

/// The two-valued outcome reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    Error,
}

impl ResponseCode {
    /// Parse the wire string. Anything outside {"ok", "error"} is an
    /// [`RefineError::UnexpectedCode`].
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "ok" => Ok(ResponseCode::Ok),
            "error" => Ok(ResponseCode::Error),
            other => Err(RefineError::UnexpectedCode {
                code: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseCode::Ok => "ok",
            ResponseCode::Error => "error",
        }
    }
}

/// Parsed `{code, message?}` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    Ok,
    Error { message: String },
}

impl CommandResponse {
    pub fn code(&self) -> ResponseCode {
        match self {
            CommandResponse::Ok => ResponseCode::Ok,
            CommandResponse::Error { .. } => ResponseCode::Error,
        }
    }

    /// Server-supplied message; present exactly when the code is `error`.
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandResponse::Ok => None,
            CommandResponse::Error { message } => Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResponse::Ok)
    }

    pub fn is_error(&self) -> bool {
        !self.is_ok()
    }
}

/// Parse an envelope document into a [`CommandResponse`].
///
/// `code == "error"` requires a non-empty `message` field; an error envelope
/// without one is a shape failure, not a valid response.
pub(crate) fn parse_envelope(document: &Value) -> Result<CommandResponse> {
    let code = json::find_required_string(document, "code")?;
    match ResponseCode::parse(&code)? {
        ResponseCode::Ok => Ok(CommandResponse::Ok),
        ResponseCode::Error => {
            let message = json::find_required_string(document, "message")?;
            if message.trim().is_empty() {
                return Err(RefineError::MissingField {
                    path: "message".to_string(),
                    document: document.to_string(),
                });
            }
            Ok(CommandResponse::Error { message })
        }
    }
}
