//! Operations-history replay
//!
//! Applies an operations-history document (as produced by the server's
//! "extract operations" view) to a project. The command takes the
//! operations text as given; callers holding a mapping document in some
//! other shape go through [`crate::mapping::for_apply_operations`] first,
//! which is what [`RefineClient::save_mapping`](crate::RefineClient::save_mapping)
//! does.

use crate::commands::{require, require_token, Command};
use crate::csrf::CsrfToken;
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;
use crate::response::{parse_envelope, CommandResponse};

/// POST `/command/core/apply-operations`. Mutating; carries a CSRF token.
#[derive(Debug, Clone)]
pub struct ApplyOperationsCommand {
    token: CsrfToken,
    project: String,
    operations: String,
}

#[derive(Debug, Default)]
pub struct ApplyOperationsBuilder {
    token: Option<CsrfToken>,
    project: Option<String>,
    operations: Option<String>,
}

impl ApplyOperationsCommand {
    pub fn builder() -> ApplyOperationsBuilder {
        ApplyOperationsBuilder::default()
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl ApplyOperationsBuilder {
    pub fn token(mut self, token: CsrfToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn operations(mut self, operations: impl Into<String>) -> Self {
        self.operations = Some(operations.into());
        self
    }

    pub fn build(self) -> Result<ApplyOperationsCommand> {
        Ok(ApplyOperationsCommand {
            token: require_token("apply operations", self.token)?,
            project: require("apply operations", "project", self.project)?,
            operations: require("apply operations", "operations", self.operations)?,
        })
    }
}

impl Command for ApplyOperationsCommand {
    type Output = CommandResponse;

    fn endpoint(&self) -> &'static str {
        "/command/core/apply-operations"
    }

    fn describe(&self) -> String {
        format!("apply operations to project {}", self.project)
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::post(self.endpoint())
            .accept_json()
            .form_field("csrf_token", self.token.as_str())
            .form_field("project", &self.project)
            .form_field("operations", &self.operations)
    }

    fn parse(&self, response: RawResponse) -> Result<CommandResponse> {
        let document = json::parse(&response.body_text())?;
        parse_envelope(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefineError;
    use crate::http::StatusCode;
    use crate::mapping::SAVE_SCHEMA_OP;
    use serde_json::json;

    fn operations_text() -> String {
        json!([{
            "op": SAVE_SCHEMA_OP,
            "schema": {"baseUri": "http://example.com/"},
        }])
        .to_string()
    }

    fn command() -> ApplyOperationsCommand {
        ApplyOperationsCommand::builder()
            .token(CsrfToken::new("tok-3"))
            .project("1234567890")
            .operations(operations_text())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_operations_text() {
        let err = ApplyOperationsCommand::builder()
            .token(CsrfToken::new("t"))
            .project("1")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RefineError::Validation {
                parameter: "operations",
                ..
            }
        ));
        assert!(ApplyOperationsCommand::builder()
            .token(CsrfToken::new("t"))
            .project("1")
            .operations("  ")
            .build()
            .is_err());
    }

    #[test]
    fn test_build_posts_operations_verbatim() {
        let request = command().build();
        assert_eq!(request.path(), "/command/core/apply-operations");
        assert_eq!(request.form_value("csrf_token"), Some("tok-3"));
        assert_eq!(request.form_value("project"), Some("1234567890"));
        assert_eq!(request.form_value("operations"), Some(operations_text().as_str()));
    }

    #[test]
    fn test_parse_error_envelope_keeps_server_message() {
        let response = command()
            .parse(RawResponse::new(
                StatusCode::OK,
                r#"{"code": "error", "message": "Operation history is invalid"}"#,
            ))
            .unwrap();
        assert_eq!(response.message(), Some("Operation history is invalid"));
    }
}
