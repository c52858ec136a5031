//! The command protocol
//!
//! Every server operation is a value type implementing [`Command`]: it builds
//! its wire request from immutable fields and parses the raw response into a
//! typed output. Execution itself lives on
//! [`RefineClient`](crate::client::RefineClient), which is the only place
//! that touches the transport; the protocol here is pure.
//!
//! Commands are constructed through builders that validate required fields
//! eagerly: a blank project id is a build-time error, not something the
//! server gets to reject four network hops later.

use crate::csrf::CsrfToken;
use crate::error::{RefineError, Result};
use crate::http::{HttpRequest, RawResponse, StatusCode};

pub mod apply_operations;
pub mod create_project;
pub mod delete_project;
pub mod export_rdf;
pub mod export_rows;
pub mod expression_preview;
pub mod get_all_project_metadata;
pub mod get_models;
pub mod get_preference;
pub mod get_version;
pub mod set_preference;

pub use apply_operations::ApplyOperationsCommand;
pub use create_project::CreateProjectCommand;
pub use delete_project::DeleteProjectCommand;
pub use export_rdf::{ExportRdfCommand, RdfFormat};
pub use export_rows::{ExportFormat, ExportRowsCommand};
pub use expression_preview::{ExpressionPreview, ExpressionPreviewCommand};
pub use get_all_project_metadata::{GetAllProjectMetadataCommand, ProjectList};
pub use get_models::{GetModelsCommand, ProjectModels};
pub use get_preference::GetPreferenceCommand;
pub use get_version::{GetVersionCommand, VersionInfo};
pub use set_preference::SetPreferenceCommand;

/// A typed server operation.
///
/// `build` and `parse` are pure: no I/O, no shared state. The lifecycle per
/// invocation is build → send → status check → parse, with any failure
/// terminal for that invocation (retrying is the caller's business).
pub trait Command {
    type Output;

    /// Fixed endpoint path on the workspace server.
    fn endpoint(&self) -> &'static str;

    /// Human-readable operation name including its identifying parameter
    /// (e.g. `"delete project 1234567890"`), used in transport errors.
    fn describe(&self) -> String;

    /// HTTP status the server answers with on success.
    fn expected_status(&self) -> StatusCode {
        StatusCode::OK
    }

    /// Assemble the wire request from the command's immutable fields.
    fn build(&self) -> HttpRequest;

    /// Interpret the raw body. Only called when the status matched.
    fn parse(&self, response: RawResponse) -> Result<Self::Output>;
}

/// Builder helper: a required string parameter must be present and non-blank.
pub(crate) fn require(
    command: &'static str,
    parameter: &'static str,
    value: Option<String>,
) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RefineError::Validation { command, parameter }),
    }
}

/// Builder helper: a mutating command must carry a non-blank token.
pub(crate) fn require_token(command: &'static str, token: Option<CsrfToken>) -> Result<CsrfToken> {
    match token {
        Some(t) if !t.as_str().trim().is_empty() => Ok(t),
        _ => Err(RefineError::Validation {
            command,
            parameter: "csrf_token",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        assert!(require("delete project", "project", None).is_err());
        assert!(require("delete project", "project", Some("".into())).is_err());
        assert!(require("delete project", "project", Some("   ".into())).is_err());
        assert_eq!(
            require("delete project", "project", Some("1234".into())).unwrap(),
            "1234"
        );
    }

    #[test]
    fn test_require_token_rejects_blank_token() {
        let err = require_token("delete project", Some(CsrfToken::new(""))).unwrap_err();
        assert!(matches!(
            err,
            RefineError::Validation {
                parameter: "csrf_token",
                ..
            }
        ));
        assert!(require_token("delete project", Some(CsrfToken::new("tok"))).is_ok());
    }
}
