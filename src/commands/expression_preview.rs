//! Expression preview
//!
//! Evaluates an expression against a handful of rows without changing the
//! project, the same dry-run the transform dialog offers. The server reuses
//! the code envelope but attaches a `results` array on success, so the
//! output is its own sum type rather than [`CommandResponse`].

use serde_json::Value;

use crate::commands::{require, Command};
use crate::error::{RefineError, Result};
use crate::http::{HttpRequest, RawResponse};
use crate::json;
use crate::response::ResponseCode;

/// Outcome of a preview: one evaluated value per requested row, or the
/// server's explanation of why the expression does not evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionPreview {
    Ok { results: Vec<Value> },
    Error { message: String },
}

impl ExpressionPreview {
    pub fn is_ok(&self) -> bool {
        matches!(self, ExpressionPreview::Ok { .. })
    }

    pub fn results(&self) -> Option<&[Value]> {
        match self {
            ExpressionPreview::Ok { results } => Some(results),
            ExpressionPreview::Error { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ExpressionPreview::Ok { .. } => None,
            ExpressionPreview::Error { message } => Some(message),
        }
    }
}

/// POST `/command/core/preview-expression`. Read-only, no token.
#[derive(Debug, Clone)]
pub struct ExpressionPreviewCommand {
    project: String,
    expression: String,
    cell_index: u32,
    row_indices: Vec<u64>,
}

#[derive(Debug, Default)]
pub struct ExpressionPreviewBuilder {
    project: Option<String>,
    expression: Option<String>,
    cell_index: Option<u32>,
    row_indices: Vec<u64>,
}

impl ExpressionPreviewCommand {
    pub fn builder() -> ExpressionPreviewBuilder {
        ExpressionPreviewBuilder::default()
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl ExpressionPreviewBuilder {
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Expression in the server's language syntax, e.g. `grel:value.trim()`.
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Zero-based column index the expression's `value` binds to.
    pub fn cell_index(mut self, cell_index: u32) -> Self {
        self.cell_index = Some(cell_index);
        self
    }

    pub fn row_indices(mut self, rows: impl IntoIterator<Item = u64>) -> Self {
        self.row_indices.extend(rows);
        self
    }

    pub fn build(self) -> Result<ExpressionPreviewCommand> {
        const COMMAND: &str = "preview expression";
        let cell_index = self.cell_index.ok_or(RefineError::Validation {
            command: COMMAND,
            parameter: "cellIndex",
        })?;
        if self.row_indices.is_empty() {
            return Err(RefineError::Validation {
                command: COMMAND,
                parameter: "rowIndices",
            });
        }
        Ok(ExpressionPreviewCommand {
            project: require(COMMAND, "project", self.project)?,
            expression: require(COMMAND, "expression", self.expression)?,
            cell_index,
            row_indices: self.row_indices,
        })
    }
}

impl Command for ExpressionPreviewCommand {
    type Output = ExpressionPreview;

    fn endpoint(&self) -> &'static str {
        "/command/core/preview-expression"
    }

    fn describe(&self) -> String {
        format!("preview expression on project {}", self.project)
    }

    fn build(&self) -> HttpRequest {
        let indices = self
            .row_indices
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        HttpRequest::post(self.endpoint())
            .accept_json()
            .form_field("project", &self.project)
            .form_field("expression", &self.expression)
            .form_field("cellIndex", self.cell_index.to_string())
            .form_field("rowIndices", format!("[{indices}]"))
    }

    fn parse(&self, response: RawResponse) -> Result<ExpressionPreview> {
        let document = json::parse(&response.body_text())?;
        let code = json::find_required_string(&document, "code")?;
        match ResponseCode::parse(&code)? {
            ResponseCode::Ok => {
                let results = json::find_required(&document, "results")?;
                let results = results
                    .as_array()
                    .ok_or_else(|| RefineError::MissingField {
                        path: "results".to_string(),
                        document: document.to_string(),
                    })?
                    .clone();
                Ok(ExpressionPreview::Ok { results })
            }
            ResponseCode::Error => {
                let message = json::find_required_string(&document, "message")?;
                Ok(ExpressionPreview::Error { message })
            }
        }
    }
}
