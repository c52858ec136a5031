//! CSRF token acquisition
//!
//! The server rejects mutating commands unless they carry an anti-forgery
//! token previously fetched from `/command/core/get-csrf-token`. Tokens are
//! opaque and short-lived; the client neither caches nor tracks expiry. Each
//! mutating command is expected to carry its own freshly fetched token, and a
//! stale one simply comes back as a server-side error at execute time.

use std::fmt;

use crate::commands::Command;
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;

/// Opaque anti-forgery token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetch a fresh token. Read-only, so it needs no token itself.
#[derive(Debug, Clone, Default)]
pub struct GetCsrfTokenCommand;

impl GetCsrfTokenCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetCsrfTokenCommand {
    type Output = CsrfToken;

    fn endpoint(&self) -> &'static str {
        "/command/core/get-csrf-token"
    }

    fn describe(&self) -> String {
        "fetch CSRF token".to_string()
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::get(self.endpoint()).accept_json()
    }

    fn parse(&self, response: RawResponse) -> Result<CsrfToken> {
        let document = json::parse(&response.body_text())?;
        let token = json::find_required_string(&document, "token")?;
        Ok(CsrfToken::new(token))
    }
}
