//! Workspace-wide project listing

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::commands::Command;
use crate::error::{RefineError, Result};
use crate::http::{HttpRequest, RawResponse};
use crate::json;

/// Metadata for every project in the workspace, keyed by project id.
/// Metadata entries are kept as raw JSON; their fields vary by server
/// version.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectList {
    pub projects: BTreeMap<String, Value>,
}

impl ProjectList {
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn get(&self, project: &str) -> Option<&Value> {
        self.projects.get(project)
    }
}

/// GET `/command/core/get-all-project-metadata`. Read-only, no token.
#[derive(Debug, Clone, Default)]
pub struct GetAllProjectMetadataCommand;

impl GetAllProjectMetadataCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetAllProjectMetadataCommand {
    type Output = ProjectList;

    fn endpoint(&self) -> &'static str {
        "/command/core/get-all-project-metadata"
    }

    fn describe(&self) -> String {
        "list projects".to_string()
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::get(self.endpoint()).accept_json()
    }

    fn parse(&self, response: RawResponse) -> Result<ProjectList> {
        let document = json::parse(&response.body_text())?;
        let projects = json::find_required(&document, "projects")?;
        let projects = projects
            .as_object()
            .ok_or_else(|| RefineError::MissingField {
                path: "projects".to_string(),
                document: document.to_string(),
            })?
            .iter()
            .map(|(id, metadata)| (id.clone(), metadata.clone()))
            .collect();
        Ok(ProjectList { projects })
    }
}
