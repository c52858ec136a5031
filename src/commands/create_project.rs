//! Project creation from an uploaded dataset
//!
//! The odd one out in the command set: the body is multipart (the dataset
//! travels as a file part), the CSRF token rides in the query string rather
//! than a form field, and success is a 302 redirect whose `Location` header
//! carries the new project id. The transport never follows redirects, so
//! the header reaches the parser intact.

use std::path::Path;

use crate::commands::{require, require_token, Command};
use crate::csrf::CsrfToken;
use crate::error::{RefineError, Result};
use crate::http::{HttpRequest, MultipartField, MultipartValue, RawResponse, StatusCode};

/// POST `/command/core/create-project-from-upload`. Mutating.
/// Output is the id of the newly created project.
#[derive(Debug, Clone)]
pub struct CreateProjectCommand {
    token: CsrfToken,
    project_name: String,
    filename: String,
    content: Vec<u8>,
    format: Option<String>,
}

#[derive(Debug, Default)]
pub struct CreateProjectBuilder {
    token: Option<CsrfToken>,
    project_name: Option<String>,
    file: Option<(String, Vec<u8>)>,
    format: Option<String>,
}

impl CreateProjectCommand {
    pub fn builder() -> CreateProjectBuilder {
        CreateProjectBuilder::default()
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }
}

impl CreateProjectBuilder {
    pub fn token(mut self, token: CsrfToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// The dataset to upload, held in memory. See [`upload_from_path`] for
    /// reading it off disk.
    pub fn file(mut self, filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.file = Some((filename.into(), content.into()));
        self
    }

    /// Optional importer hint, e.g. `text/line-based/*sv`. Omitted, the
    /// server guesses from the filename.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn build(self) -> Result<CreateProjectCommand> {
        const COMMAND: &str = "create project";
        let (filename, content) = self.file.ok_or(RefineError::Validation {
            command: COMMAND,
            parameter: "project-file",
        })?;
        let format = self
            .format
            .map(|format| require(COMMAND, "format", Some(format)))
            .transpose()?;
        Ok(CreateProjectCommand {
            token: require_token(COMMAND, self.token)?,
            project_name: require(COMMAND, "project-name", self.project_name)?,
            filename: require(COMMAND, "project-file", Some(filename))?,
            content,
            format,
        })
    }
}

impl Command for CreateProjectCommand {
    type Output = String;

    fn endpoint(&self) -> &'static str {
        "/command/core/create-project-from-upload"
    }

    fn describe(&self) -> String {
        format!("create project '{}'", self.project_name)
    }

    fn expected_status(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn build(&self) -> HttpRequest {
        let mut request = HttpRequest::post(self.endpoint())
            .query("csrf_token", self.token.as_str())
            .multipart_field(MultipartField {
                name: "project-file".to_string(),
                value: MultipartValue::File {
                    filename: self.filename.clone(),
                    content: self.content.clone(),
                },
            })
            .multipart_field(MultipartField {
                name: "project-name".to_string(),
                value: MultipartValue::Text(self.project_name.clone()),
            });
        if let Some(format) = &self.format {
            request = request.multipart_field(MultipartField {
                name: "format".to_string(),
                value: MultipartValue::Text(format.clone()),
            });
        }
        request
    }

    fn parse(&self, response: RawResponse) -> Result<String> {
        let location = response
            .header("location")
            .ok_or_else(|| RefineError::MissingField {
                path: "location".to_string(),
                document: format!("{:?}", response.headers),
            })?;
        project_id_from_location(location)
    }
}

/// Pull the project id out of a redirect target such as
/// `http://127.0.0.1:3333/project?project=1702021156382`.
fn project_id_from_location(location: &str) -> Result<String> {
    let query = location.split_once('?').map(|(_, query)| query);
    let id = query.and_then(|query| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("project="))
            .filter(|id| !id.is_empty())
    });
    match id {
        Some(id) => Ok(id.to_string()),
        None => Err(RefineError::MissingField {
            path: "project".to_string(),
            document: location.to_string(),
        }),
    }
}

/// Read a dataset file into the `(filename, content)` pair the builder's
/// `file` setter takes. Kept outside the builder so `build` stays free of
/// I/O.
pub async fn upload_from_path(path: impl AsRef<Path>) -> Result<(String, Vec<u8>)> {
    let path = path.as_ref();
    let content = tokio::fs::read(path)
        .await
        .map_err(|err| RefineError::Client {
            message: format!("cannot read upload file {}: {err}", path.display()),
        })?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok((filename, content))
}
