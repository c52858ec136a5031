//! RDF export
//!
//! Serves the `rdf-extension` endpoint rather than a core one. The body
//! comes back as RDF text in the requested serialization and is returned
//! verbatim; nothing in it is parsed or validated here. The `mapping` form
//! field, when present, must already be in canonical shape: callers go
//! through [`crate::mapping::for_rdf_export`] first, which is what
//! [`RefineClient::export_rdf`](crate::RefineClient::export_rdf) does.

use crate::commands::{require, Command};
use crate::error::{RefineError, Result};
use crate::http::{HttpRequest, RawResponse};

/// RDF serializations the extension can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    RdfXml,
    NTriples,
}

impl RdfFormat {
    /// Wire value of the `format` form field (the extension's exporter
    /// registry names).
    pub fn as_str(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "Turtle",
            RdfFormat::RdfXml => "RDF/XML",
            RdfFormat::NTriples => "N-Triples",
        }
    }

    /// MIME type sent as the `Accept` header.
    pub fn accept(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle;charset=UTF-8",
            RdfFormat::RdfXml => "application/rdf+xml;charset=UTF-8",
            RdfFormat::NTriples => "application/n-triples",
        }
    }
}

/// POST `/command/rdf-extension/export-rdf`. Read-only, no token.
#[derive(Debug, Clone)]
pub struct ExportRdfCommand {
    project: String,
    mapping: Option<String>,
    format: RdfFormat,
}

#[derive(Debug, Default)]
pub struct ExportRdfBuilder {
    project: Option<String>,
    mapping: Option<String>,
    format: Option<RdfFormat>,
}

impl ExportRdfCommand {
    pub fn builder() -> ExportRdfBuilder {
        ExportRdfBuilder::default()
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn format(&self) -> RdfFormat {
        self.format
    }
}

impl ExportRdfBuilder {
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Canonical mapping body to export with. Omitted, the server uses the
    /// schema stored with the project.
    pub fn mapping(mut self, mapping: impl Into<String>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    pub fn format(mut self, format: RdfFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn build(self) -> Result<ExportRdfCommand> {
        const COMMAND: &str = "export RDF";
        let format = self.format.ok_or(RefineError::Validation {
            command: COMMAND,
            parameter: "format",
        })?;
        let mapping = self
            .mapping
            .map(|mapping| require(COMMAND, "mapping", Some(mapping)))
            .transpose()?;
        Ok(ExportRdfCommand {
            project: require(COMMAND, "project", self.project)?,
            mapping,
            format,
        })
    }
}

impl Command for ExportRdfCommand {
    type Output = String;

    fn endpoint(&self) -> &'static str {
        "/command/rdf-extension/export-rdf"
    }

    fn describe(&self) -> String {
        format!("export RDF from project {}", self.project)
    }

    fn build(&self) -> HttpRequest {
        let mut request = HttpRequest::post(self.endpoint())
            .accept(self.format.accept())
            .form_field("project", &self.project)
            .form_field("format", self.format.as_str());
        if let Some(mapping) = &self.mapping {
            request = request.form_field("mapping", mapping);
        }
        request
    }

    /// The RDF text is returned exactly as received, byte for byte.
    fn parse(&self, response: RawResponse) -> Result<String> {
        Ok(response.body_text())
    }
}
