//! Tabular row export
//!
//! Export bodies can be as large as the project, so they are materialized
//! into a named temp file instead of a `String`. Dropping the returned
//! handle deletes the file on every exit path; callers that want to keep
//! the data persist or copy it first.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::commands::{require, require_token, Command};
use crate::csrf::CsrfToken;
use crate::error::{RefineError, Result};
use crate::http::{HttpRequest, RawResponse};

/// Tabular formats the export endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Html,
}

impl ExportFormat {
    /// Wire value of the `format` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Html => "html",
        }
    }

    /// Conventional file extension, for callers naming a persisted copy.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

/// POST `/command/core/export-rows`. Mutating from the server's point of
/// view (it records the export), so it carries a CSRF token.
#[derive(Debug, Clone)]
pub struct ExportRowsCommand {
    token: CsrfToken,
    project: String,
    format: ExportFormat,
    engine: Option<String>,
}

#[derive(Debug, Default)]
pub struct ExportRowsBuilder {
    token: Option<CsrfToken>,
    project: Option<String>,
    format: Option<ExportFormat>,
    engine: Option<String>,
}

impl ExportRowsCommand {
    pub fn builder() -> ExportRowsBuilder {
        ExportRowsBuilder::default()
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }
}

impl ExportRowsBuilder {
    pub fn token(mut self, token: CsrfToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Optional facet-engine state restricting which rows are exported.
    /// Omitted, the server exports everything.
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn build(self) -> Result<ExportRowsCommand> {
        const COMMAND: &str = "export rows";
        let format = self.format.ok_or(RefineError::Validation {
            command: COMMAND,
            parameter: "format",
        })?;
        Ok(ExportRowsCommand {
            token: require_token(COMMAND, self.token)?,
            project: require(COMMAND, "project", self.project)?,
            format,
            engine: self.engine,
        })
    }
}

impl Command for ExportRowsCommand {
    type Output = NamedTempFile;

    fn endpoint(&self) -> &'static str {
        "/command/core/export-rows"
    }

    fn describe(&self) -> String {
        format!("export rows from project {}", self.project)
    }

    fn build(&self) -> HttpRequest {
        let mut request = HttpRequest::post(self.endpoint())
            .form_field("csrf_token", self.token.as_str())
            .form_field("project", &self.project)
            .form_field("format", self.format.as_str());
        if let Some(engine) = &self.engine {
            request = request.form_field("engine", engine);
        }
        request
    }

    fn parse(&self, response: RawResponse) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new().map_err(|err| RefineError::Client {
            message: format!("cannot materialize export: {err}"),
        })?;
        file.write_all(&response.body)
            .and_then(|()| file.flush())
            .map_err(|err| RefineError::Client {
                message: format!("cannot materialize export: {err}"),
            })?;
        Ok(file)
    }
}
