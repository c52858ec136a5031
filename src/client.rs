//! The workspace server client
//!
//! [`RefineClient`] owns the base URL and the injected transport, and is the
//! only place a command meets the network. The generic [`execute`] method is
//! the whole protocol: build the wire request, send it, check the status,
//! hand the raw body to the command's parser. Everything else on the client
//! is a convenience wrapper that constructs one command and executes it,
//! fetching a fresh CSRF token first where the server demands one.
//!
//! Command paths are absolute (`/command/...`), so the base URL only
//! contributes scheme, host and port.
//!
//! [`execute`]: RefineClient::execute

use std::fmt;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use url::Url;

use crate::commands::{
    ApplyOperationsCommand, Command, CreateProjectCommand, DeleteProjectCommand, ExportFormat,
    ExportRdfCommand, ExportRowsCommand, ExpressionPreview, ExpressionPreviewCommand,
    GetAllProjectMetadataCommand, GetModelsCommand, GetPreferenceCommand, GetVersionCommand,
    ProjectList, ProjectModels, RdfFormat, SetPreferenceCommand, VersionInfo,
};
use crate::csrf::{CsrfToken, GetCsrfTokenCommand};
use crate::error::{RefineError, Result};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::mapping;
use crate::response::CommandResponse;

/// Client for one workspace server.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct RefineClient {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
}

// The transport is a trait object without a Debug bound, so it is elided.
impl fmt::Debug for RefineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefineClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RefineClient {
    /// Connect to the server at `server` (e.g. `http://localhost:3333`)
    /// using the bundled reqwest transport.
    pub fn new(server: &str) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Self::with_transport(server, transport)
    }

    /// Connect using a caller-supplied transport. This is also the seam
    /// tests use to script server behavior.
    pub fn with_transport(server: &str, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(server)?,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run one command against the server.
    ///
    /// A response with a status other than the command's expected one is
    /// rejected without parsing the body. Transport failures come back
    /// wrapped with the operation's describing name, so an error message
    /// always says which command on which resource went wrong.
    pub async fn execute<C: Command>(&self, command: &C) -> Result<C::Output> {
        let request = command.build();
        let url = self
            .base_url
            .join(request.path())
            .map_err(|err| RefineError::Client {
                message: format!("cannot resolve endpoint {}: {err}", request.path()),
            })?;

        debug!(endpoint = request.path(), operation = %command.describe(), "sending command");
        let response = self
            .transport
            .send(url, request)
            .await
            .map_err(|source| RefineError::Transport {
                operation: command.describe(),
                source,
            })?;

        let expected = command.expected_status();
        debug!(
            endpoint = command.endpoint(),
            status = response.status.as_u16(),
            "received response"
        );
        if response.status != expected {
            warn!(
                endpoint = command.endpoint(),
                status = response.status.as_u16(),
                expected = expected.as_u16(),
                "unexpected status"
            );
            return Err(RefineError::StatusMismatch {
                endpoint: command.endpoint().to_string(),
                status: response.status.as_u16(),
                expected: expected.as_u16(),
            });
        }

        command.parse(response)
    }

    /// Fetch a fresh anti-forgery token.
    pub async fn fetch_csrf_token(&self) -> Result<CsrfToken> {
        self.execute(&GetCsrfTokenCommand::new()).await
    }

    pub async fn get_version(&self) -> Result<VersionInfo> {
        self.execute(&GetVersionCommand::new()).await
    }

    pub async fn get_models(&self, project: &str) -> Result<ProjectModels> {
        let command = GetModelsCommand::builder().project(project).build()?;
        self.execute(&command).await
    }

    pub async fn list_projects(&self) -> Result<ProjectList> {
        self.execute(&GetAllProjectMetadataCommand::new()).await
    }

    pub async fn get_preference(&self, name: &str) -> Result<serde_json::Value> {
        let command = GetPreferenceCommand::builder().name(name).build()?;
        self.execute(&command).await
    }

    /// Upload `content` as a new project and return the new project id.
    pub async fn create_project(
        &self,
        project_name: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String> {
        let token = self.fetch_csrf_token().await?;
        let command = CreateProjectCommand::builder()
            .token(token)
            .project_name(project_name)
            .file(filename, content)
            .build()?;
        self.execute(&command).await
    }

    pub async fn delete_project(&self, project: &str) -> Result<CommandResponse> {
        let token = self.fetch_csrf_token().await?;
        let command = DeleteProjectCommand::builder()
            .token(token)
            .project(project)
            .build()?;
        self.execute(&command).await
    }

    /// Apply an operations-history document to a project, verbatim. Use
    /// [`save_mapping`](Self::save_mapping) when the document is a mapping
    /// that may still be in a wrapped shape.
    pub async fn apply_operations(
        &self,
        project: &str,
        operations: &str,
    ) -> Result<CommandResponse> {
        let token = self.fetch_csrf_token().await?;
        let command = ApplyOperationsCommand::builder()
            .token(token)
            .project(project)
            .operations(operations)
            .build()?;
        self.execute(&command).await
    }

    /// Record `mapping` as the project's RDF schema. The document may be in
    /// any of the known shapes; it is normalized into the save-schema
    /// operations payload before submission.
    pub async fn save_mapping(&self, project: &str, mapping: &str) -> Result<CommandResponse> {
        let operations = mapping::for_apply_operations(Some(mapping))?;
        let token = self.fetch_csrf_token().await?;
        let mut builder = ApplyOperationsCommand::builder().token(token).project(project);
        if let Some(operations) = operations {
            builder = builder.operations(operations);
        }
        let command = builder.build()?;
        self.execute(&command).await
    }

    pub async fn set_preference(&self, name: &str, value: &str) -> Result<CommandResponse> {
        let token = self.fetch_csrf_token().await?;
        let command = SetPreferenceCommand::builder()
            .token(token)
            .name(name)
            .value(value)
            .build()?;
        self.execute(&command).await
    }

    pub async fn preview_expression(
        &self,
        project: &str,
        expression: &str,
        cell_index: u32,
        row_indices: &[u64],
    ) -> Result<ExpressionPreview> {
        let command = ExpressionPreviewCommand::builder()
            .project(project)
            .expression(expression)
            .cell_index(cell_index)
            .row_indices(row_indices.iter().copied())
            .build()?;
        self.execute(&command).await
    }

    /// Export project rows in `format`, materialized into a temp file that
    /// is deleted when the returned handle drops.
    pub async fn export_rows(&self, project: &str, format: ExportFormat) -> Result<NamedTempFile> {
        let token = self.fetch_csrf_token().await?;
        let command = ExportRowsCommand::builder()
            .token(token)
            .project(project)
            .format(format)
            .build()?;
        self.execute(&command).await
    }

    /// Export a project as RDF. `mapping` may be in any of the known shapes;
    /// it is normalized before the request is built, and an absent or empty
    /// mapping omits the parameter so the server falls back to the schema
    /// stored with the project.
    pub async fn export_rdf(
        &self,
        project: &str,
        mapping: Option<&str>,
        format: RdfFormat,
    ) -> Result<String> {
        let mapping = mapping::for_rdf_export(mapping)?;
        let mut builder = ExportRdfCommand::builder().project(project).format(format);
        if let Some(mapping) = mapping {
            builder = builder.mapping(mapping);
        }
        let command = builder.build()?;
        self.execute(&command).await
    }
}

fn parse_base_url(server: &str) -> Result<Url> {
    Url::parse(server).map_err(|err| RefineError::Client {
        message: format!("invalid server URL '{server}': {err}"),
    })
}
