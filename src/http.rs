//! Wire-level request/response types and the transport boundary
//!
//! Commands build an [`HttpRequest`] as pure data; an injected
//! [`HttpTransport`] turns it into an actual network exchange. The bundled
//! [`ReqwestTransport`] is the production implementation; tests swap in a
//! scripted one. Transport-level concerns (TLS, pooling, timeouts) live
//! entirely behind this trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

pub use reqwest::{Method, StatusCode};

use crate::error::RefineError;

/// A transport-level request, built without performing any I/O.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: &'static str,
    accept: Option<String>,
    query: Vec<(String, String)>,
    body: RequestBody,
}

/// Request payload variants used by the command set.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded` key/value pairs.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` fields (project upload).
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

#[derive(Debug, Clone)]
pub enum MultipartValue {
    Text(String),
    File { filename: String, content: Vec<u8> },
}

impl HttpRequest {
    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }

    fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            accept: None,
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Declare that the command expects a JSON reply.
    pub fn accept_json(self) -> Self {
        self.accept("application/json")
    }

    pub fn accept(mut self, mime: impl Into<String>) -> Self {
        self.accept = Some(mime.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a form field, switching the body to form encoding.
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.body {
            RequestBody::Form(fields) => fields.push((name.into(), value.into())),
            _ => self.body = RequestBody::Form(vec![(name.into(), value.into())]),
        }
        self
    }

    /// Append a multipart field, switching the body to multipart encoding.
    pub fn multipart_field(mut self, field: MultipartField) -> Self {
        match &mut self.body {
            RequestBody::Multipart(fields) => fields.push(field),
            _ => self.body = RequestBody::Multipart(vec![field]),
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn accept_header(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Form field lookup, used by tests to assert what a command sends.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

/// Raw response handed back by the transport: status, headers, body bytes.
/// Interpretation is entirely the command's job.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body decoded as UTF-8 text.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Error raised by a transport implementation. Opaque to the protocol layer,
/// which wraps it into [`RefineError::Transport`] together with the name of
/// the failed operation.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(source.into())
    }
}

/// The injected HTTP exchange: one request in, one raw response out.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        url: Url,
        request: HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl ReqwestTransport {
    pub fn new() -> Result<Self, RefineError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, RefineError> {
        // Redirects are surfaced to commands, not followed: create-project
        // reads the project id out of the 302 Location header.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| RefineError::Client {
                message: format!("failed to create HTTP client: {err}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        url: Url,
        request: HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self.client.request(request.method().clone(), url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(mime) = request.accept_header() {
            builder = builder.header(ACCEPT, mime);
        }
        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart(fields) => {
                let mut form = reqwest::multipart::Form::new();
                for field in fields {
                    form = match &field.value {
                        MultipartValue::Text(text) => form.text(field.name.clone(), text.clone()),
                        MultipartValue::File { filename, content } => form.part(
                            field.name.clone(),
                            reqwest::multipart::Part::bytes(content.clone())
                                .file_name(filename.clone()),
                        ),
                    };
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(TransportError::new)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(TransportError::new)?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
