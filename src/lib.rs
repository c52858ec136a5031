//! refine-client - Typed client for an OpenRefine-compatible workspace server
//!
//! This crate provides a strongly-typed command layer over the server's
//! HTTP+JSON surface: each server operation is an immutable command value
//! built through a validating builder and executed by a client that injects
//! CSRF tokens where required and turns raw responses into typed results.
//!
//! ## Architecture
//! Every call flows through the same pipeline:
//! Command builder -> wire request -> HttpTransport -> status check -> typed output
//!
//! Alongside the command layer sits the mapping normalizer, which reconciles
//! the three JSON shapes an RDF mapping document can arrive in into one
//! canonical form before it is put on the wire.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use refine_client::{ExportFormat, RefineClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), refine_client::RefineError> {
//!     let client = RefineClient::new("http://localhost:3333")?;
//!     let version = client.get_version().await?;
//!     println!("connected to {}", version.full_name);
//!
//!     let csv = b"name,lei\nAcme,529900T8BM49AURSDO55\n".to_vec();
//!     let project = client.create_project("clients", "clients.csv", csv).await?;
//!     let export = client.export_rows(&project, ExportFormat::Csv).await?;
//!     println!("exported to {}", export.path().display());
//!     Ok(())
//! }
//! ```

// Core error handling
pub mod error;

// JSON document helpers shared by all command parsers
pub mod json;

// Wire types and the transport boundary
pub mod http;

// Response code/envelope taxonomy
pub mod response;

// CSRF token type and acquisition command
pub mod csrf;

// The command set, one module per server operation
pub mod commands;

// Command execution and the per-operation convenience surface
pub mod client;

// Mapping document normalization
pub mod mapping;

// Public re-exports: the client and everything needed to call it
pub use client::RefineClient;
pub use csrf::{CsrfToken, GetCsrfTokenCommand};
pub use error::{RefineError, Result};
pub use response::{CommandResponse, ResponseCode};

// Transport boundary, for callers supplying their own implementation
pub use http::{HttpRequest, HttpTransport, RawResponse, ReqwestTransport, TransportError};

// Command values and their outputs
pub use commands::{
    ApplyOperationsCommand, Command, CreateProjectCommand, DeleteProjectCommand, ExportFormat,
    ExportRdfCommand, ExportRowsCommand, ExpressionPreview, ExpressionPreviewCommand,
    GetAllProjectMetadataCommand, GetModelsCommand, GetPreferenceCommand, GetVersionCommand,
    ProjectList, ProjectModels, RdfFormat, SetPreferenceCommand, VersionInfo,
};

// Mapping normalizer entry points
pub use mapping::{for_apply_operations, for_rdf_export, MappingError};
