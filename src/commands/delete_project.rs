//! Project deletion

use crate::commands::{require, require_token, Command};
use crate::csrf::CsrfToken;
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;
use crate::response::{parse_envelope, CommandResponse};

/// POST `/command/core/delete-project`. Mutating; carries a CSRF token.
///
/// The server answers with a code envelope even when the project does not
/// exist, so "project not found" is a [`CommandResponse::Error`], not a
/// client-side error.
#[derive(Debug, Clone)]
pub struct DeleteProjectCommand {
    token: CsrfToken,
    project: String,
}

#[derive(Debug, Default)]
pub struct DeleteProjectBuilder {
    token: Option<CsrfToken>,
    project: Option<String>,
}

impl DeleteProjectCommand {
    pub fn builder() -> DeleteProjectBuilder {
        DeleteProjectBuilder::default()
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl DeleteProjectBuilder {
    pub fn token(mut self, token: CsrfToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn build(self) -> Result<DeleteProjectCommand> {
        Ok(DeleteProjectCommand {
            token: require_token("delete project", self.token)?,
            project: require("delete project", "project", self.project)?,
        })
    }
}

impl Command for DeleteProjectCommand {
    type Output = CommandResponse;

    fn endpoint(&self) -> &'static str {
        "/command/core/delete-project"
    }

    fn describe(&self) -> String {
        format!("delete project {}", self.project)
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::post(self.endpoint())
            .accept_json()
            .form_field("csrf_token", self.token.as_str())
            .form_field("project", &self.project)
    }

    fn parse(&self, response: RawResponse) -> Result<CommandResponse> {
        let document = json::parse(&response.body_text())?;
        parse_envelope(&document)
    }
}
