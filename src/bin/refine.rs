//! Workspace Server CLI
//!
//! A command-line front end for the refine-client command layer: project
//! lifecycle, exports, preferences, and expression previews against a
//! running workspace server.
//!
//! # Usage
//!
//! ```bash
//! # Server identity
//! refine version
//!
//! # Create a project from a CSV and export it back
//! refine create --name clients --file clients.csv
//! refine export-rows --project 1702021156382 --format csv --output clients-out.csv
//!
//! # RDF export with a mapping document in any of the accepted shapes
//! refine export-rdf --project 1702021156382 --mapping schema.json
//!
//! # Dry-run an expression against the first rows
//! refine preview --project 1702021156382 --expression "grel:value.trim()" --cell-index 0
//! ```
//!
//! The server URL comes from `--url` or the `REFINE_URL` environment
//! variable, defaulting to the local server.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use refine_client::commands::create_project::upload_from_path;
use refine_client::{
    CommandResponse, CreateProjectCommand, ExportFormat, RdfFormat, RefineClient,
};

#[derive(Parser)]
#[command(name = "refine")]
#[command(about = "Typed client CLI for an OpenRefine-compatible workspace server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace server base URL
    #[arg(long, global = true, env = "REFINE_URL", default_value = "http://localhost:3333")]
    url: String,

    /// Print results as JSON where the subcommand supports it
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the server's version identity
    Version,

    /// List all projects in the workspace
    Projects,

    /// Create a project from a local dataset file
    Create {
        /// Project name
        #[arg(long)]
        name: String,

        /// Dataset file to upload
        #[arg(long)]
        file: PathBuf,

        /// Importer format hint, e.g. "text/line-based/*sv"
        #[arg(long)]
        format: Option<String>,
    },

    /// Delete a project
    Delete {
        /// Project id
        #[arg(long)]
        project: String,
    },

    /// Export project rows to a file or stdout
    ExportRows {
        #[arg(long)]
        project: String,

        #[arg(long, value_enum, default_value = "csv")]
        format: RowFormat,

        /// Destination file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export a project as RDF to stdout
    ExportRdf {
        #[arg(long)]
        project: String,

        #[arg(long, value_enum, default_value = "turtle")]
        format: RdfFormatArg,

        /// Mapping document file, in any of the accepted shapes
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Preview an expression against a few rows without changing anything
    Preview {
        #[arg(long)]
        project: String,

        /// Expression, e.g. "grel:value.toUppercase()"
        #[arg(long)]
        expression: String,

        /// Zero-based column index the expression runs on
        #[arg(long, default_value_t = 0)]
        cell_index: u32,

        /// Rows to evaluate, comma-separated
        #[arg(long, value_delimiter = ',', default_value = "0,1,2,3,4")]
        rows: Vec<u64>,
    },

    /// Apply an operations-history document to a project, verbatim
    Apply {
        #[arg(long)]
        project: String,

        /// Operations file
        #[arg(long)]
        file: PathBuf,
    },

    /// Save a mapping document as the project's RDF schema
    SaveSchema {
        #[arg(long)]
        project: String,

        /// Mapping file, in any of the accepted shapes
        #[arg(long)]
        file: PathBuf,
    },

    /// Read a server preference
    GetPref {
        #[arg(long)]
        name: String,
    },

    /// Write a server preference
    SetPref {
        #[arg(long)]
        name: String,

        #[arg(long)]
        value: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RowFormat {
    Csv,
    Tsv,
    Html,
}

impl From<RowFormat> for ExportFormat {
    fn from(format: RowFormat) -> Self {
        match format {
            RowFormat::Csv => ExportFormat::Csv,
            RowFormat::Tsv => ExportFormat::Tsv,
            RowFormat::Html => ExportFormat::Html,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RdfFormatArg {
    Turtle,
    RdfXml,
    NTriples,
}

impl From<RdfFormatArg> for RdfFormat {
    fn from(format: RdfFormatArg) -> Self {
        match format {
            RdfFormatArg::Turtle => RdfFormat::Turtle,
            RdfFormatArg::RdfXml => RdfFormat::RdfXml,
            RdfFormatArg::NTriples => RdfFormat::NTriples,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let client = RefineClient::new(&cli.url)?;

    match cli.command {
        Commands::Version => cmd_version(&client, cli.json).await,
        Commands::Projects => cmd_projects(&client, cli.json).await,
        Commands::Create { name, file, format } => cmd_create(&client, name, file, format).await,
        Commands::Delete { project } => cmd_delete(&client, project).await,
        Commands::ExportRows {
            project,
            format,
            output,
        } => cmd_export_rows(&client, project, format.into(), output).await,
        Commands::ExportRdf {
            project,
            format,
            mapping,
        } => cmd_export_rdf(&client, project, format.into(), mapping).await,
        Commands::Preview {
            project,
            expression,
            cell_index,
            rows,
        } => cmd_preview(&client, project, expression, cell_index, rows).await,
        Commands::Apply { project, file } => cmd_apply(&client, project, file).await,
        Commands::SaveSchema { project, file } => cmd_save_schema(&client, project, file).await,
        Commands::GetPref { name } => cmd_get_pref(&client, name).await,
        Commands::SetPref { name, value } => cmd_set_pref(&client, name, value).await,
    }
}

/// Turn an envelope outcome into process success/failure.
fn check(response: CommandResponse) -> Result<()> {
    match response {
        CommandResponse::Ok => {
            println!("{}", "OK".green().bold());
            Ok(())
        }
        CommandResponse::Error { message } => bail!("server refused: {message}"),
    }
}

async fn cmd_version(client: &RefineClient, json: bool) -> Result<()> {
    let version = client.get_version().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&version)?);
        return Ok(());
    }
    println!("{} {}", "Server:".cyan().bold(), version.full_name);
    println!("{} {}", "Version:".cyan(), version.version);
    println!("{} {}", "Revision:".cyan(), version.revision);
    Ok(())
}

async fn cmd_projects(client: &RefineClient, json: bool) -> Result<()> {
    let list = client.list_projects().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("no projects");
        return Ok(());
    }
    for id in list.ids() {
        let name = list
            .get(id)
            .and_then(|metadata| metadata.get("name"))
            .and_then(|name| name.as_str())
            .unwrap_or("<unnamed>");
        println!("{} {}", id.yellow(), name);
    }
    Ok(())
}

async fn cmd_create(
    client: &RefineClient,
    name: String,
    file: PathBuf,
    format: Option<String>,
) -> Result<()> {
    let (filename, content) = upload_from_path(&file).await?;
    let token = client.fetch_csrf_token().await?;
    let mut builder = CreateProjectCommand::builder()
        .token(token)
        .project_name(&name)
        .file(filename, content);
    if let Some(format) = format {
        builder = builder.format(format);
    }
    let project = client.execute(&builder.build()?).await?;
    println!("{} {}", "Created project:".green().bold(), project);
    Ok(())
}

async fn cmd_delete(client: &RefineClient, project: String) -> Result<()> {
    check(client.delete_project(&project).await?)
}

async fn cmd_export_rows(
    client: &RefineClient,
    project: String,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let file = client.export_rows(&project, format).await?;
    match output {
        Some(path) => {
            std::fs::copy(file.path(), &path)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("{} {}", "Exported to:".green().bold(), path.display());
        }
        None => {
            let contents = std::fs::read_to_string(file.path())
                .context("export is not valid UTF-8; use --output")?;
            print!("{contents}");
        }
    }
    Ok(())
}

async fn cmd_export_rdf(
    client: &RefineClient,
    project: String,
    format: RdfFormat,
    mapping: Option<PathBuf>,
) -> Result<()> {
    let mapping = match mapping {
        Some(path) => Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read mapping {}", path.display()))?,
        ),
        None => None,
    };
    let rdf = client
        .export_rdf(&project, mapping.as_deref(), format)
        .await?;
    print!("{rdf}");
    Ok(())
}

async fn cmd_preview(
    client: &RefineClient,
    project: String,
    expression: String,
    cell_index: u32,
    rows: Vec<u64>,
) -> Result<()> {
    let preview = client
        .preview_expression(&project, &expression, cell_index, &rows)
        .await?;
    match preview.results() {
        Some(results) => {
            for (row, value) in rows.iter().zip(results) {
                println!("{} {}", format!("row {row}:").cyan(), value);
            }
            Ok(())
        }
        None => bail!(
            "expression rejected: {}",
            preview.message().unwrap_or("unknown reason")
        ),
    }
}

async fn cmd_apply(client: &RefineClient, project: String, file: PathBuf) -> Result<()> {
    let operations = std::fs::read_to_string(&file)
        .with_context(|| format!("cannot read operations {}", file.display()))?;
    check(client.apply_operations(&project, &operations).await?)
}

async fn cmd_save_schema(client: &RefineClient, project: String, file: PathBuf) -> Result<()> {
    let mapping = std::fs::read_to_string(&file)
        .with_context(|| format!("cannot read mapping {}", file.display()))?;
    check(client.save_mapping(&project, &mapping).await?)
}

async fn cmd_get_pref(client: &RefineClient, name: String) -> Result<()> {
    let value = client.get_preference(&name).await?;
    println!("{value}");
    Ok(())
}

async fn cmd_set_pref(client: &RefineClient, name: String, value: String) -> Result<()> {
    check(client.set_preference(&name, &value).await?)
}
