//! Scripted transport for integration tests
//!
//! Stands in for the real server behind the `HttpTransport` seam: queue up
//! the replies the fake server should give, run client calls, then assert
//! on the requests the transport captured. Replies are consumed in order;
//! running out of script is a test bug and panics.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use refine_client::http::StatusCode;
use refine_client::{HttpRequest, HttpTransport, RawResponse, RefineClient, TransportError};

pub const SERVER: &str = "http://localhost:3333";

enum ScriptedReply {
    Respond(RawResponse),
    Fail(String),
}

pub struct MockTransport {
    script: Mutex<VecDeque<ScriptedReply>>,
    seen: Mutex<Vec<(Url, HttpRequest)>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Queue a full raw response.
    pub fn push(&self, response: RawResponse) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Respond(response));
    }

    /// Queue a 200 response with the given body.
    pub fn push_ok(&self, body: &str) {
        self.push(RawResponse::new(StatusCode::OK, body));
    }

    /// Queue a token reply, the first exchange of every mutating flow.
    pub fn push_token(&self, token: &str) {
        self.push_ok(&format!(r#"{{"token": "{token}"}}"#));
    }

    /// Queue a connection-level failure.
    pub fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Fail(message.to_string()));
    }

    /// Everything the client sent, in order.
    pub fn requests(&self) -> Vec<(Url, HttpRequest)> {
        self.seen.lock().unwrap().clone()
    }

    /// The nth captured request; panics when fewer were sent.
    pub fn request(&self, index: usize) -> (Url, HttpRequest) {
        self.requests()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no request {index} was captured"))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        url: Url,
        request: HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError> {
        self.seen.lock().unwrap().push((url.clone(), request));
        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedReply::Respond(response)) => Ok(response),
            Some(ScriptedReply::Fail(message)) => Err(TransportError::new(message)),
            None => panic!("no scripted reply left for {url}"),
        }
    }
}

/// A client wired to the given mock, pointing at the fixed test server URL.
pub fn client(transport: &Arc<MockTransport>) -> RefineClient {
    RefineClient::with_transport(SERVER, transport.clone())
        .expect("test server URL must be valid")
}
