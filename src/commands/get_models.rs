//! Project model retrieval
//!
//! The models document describes a project's column layout and any
//! extension overlays. The pieces are kept as raw JSON values; their inner
//! structure belongs to the server and its extensions, and callers that
//! care (the mapping normalizer does, for `overlayModels.rdfSchema`) probe
//! them as documents.

use serde_json::Value;

use crate::commands::{require, Command};
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;

#[derive(Debug, Clone)]
pub struct ProjectModels {
    pub column_model: Value,
    pub http_headers: Value,
    pub overlay_models: Value,
    pub record_model: Value,
    pub scripting: Value,
}

impl ProjectModels {
    /// The RDF mapping overlay, if the project has one.
    pub fn rdf_schema(&self) -> Option<&Value> {
        self.overlay_models.get("rdfSchema")
    }
}

/// GET `/command/core/get-models?project=<id>`. Read-only, no token.
#[derive(Debug, Clone)]
pub struct GetModelsCommand {
    project: String,
}

#[derive(Debug, Default)]
pub struct GetModelsBuilder {
    project: Option<String>,
}

impl GetModelsCommand {
    pub fn builder() -> GetModelsBuilder {
        GetModelsBuilder::default()
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl GetModelsBuilder {
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn build(self) -> Result<GetModelsCommand> {
        Ok(GetModelsCommand {
            project: require("get models", "project", self.project)?,
        })
    }
}

impl Command for GetModelsCommand {
    type Output = ProjectModels;

    fn endpoint(&self) -> &'static str {
        "/command/core/get-models"
    }

    fn describe(&self) -> String {
        format!("get models for project {}", self.project)
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::get(self.endpoint())
            .accept_json()
            .query("project", &self.project)
    }

    fn parse(&self, response: RawResponse) -> Result<ProjectModels> {
        let document = json::parse(&response.body_text())?;
        Ok(ProjectModels {
            column_model: json::find_required(&document, "columnModel")?.clone(),
            http_headers: json::find_required(&document, "httpHeaders")?.clone(),
            overlay_models: json::find_required(&document, "overlayModels")?.clone(),
            record_model: json::find_required(&document, "recordModel")?.clone(),
            scripting: json::find_required(&document, "scripting")?.clone(),
        })
    }
}
