//! Server version lookup

use serde::Serialize;

use crate::commands::Command;
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;

/// Version identity reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// Full display name, e.g. `OpenRefine 3.0-beta [TRUNK]`.
    pub full_name: String,
    pub full_version: String,
    pub version: String,
    pub revision: String,
}

/// GET `/command/core/get-version`. Read-only, no token.
#[derive(Debug, Clone, Default)]
pub struct GetVersionCommand;

impl GetVersionCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetVersionCommand {
    type Output = VersionInfo;

    fn endpoint(&self) -> &'static str {
        "/command/core/get-version"
    }

    fn describe(&self) -> String {
        "get version".to_string()
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::get(self.endpoint()).accept_json()
    }

    fn parse(&self, response: RawResponse) -> Result<VersionInfo> {
        let document = json::parse(&response.body_text())?;
        Ok(VersionInfo {
            full_name: json::find_required_string(&document, "full_name")?,
            full_version: json::find_required_string(&document, "full_version")?,
            version: json::find_required_string(&document, "version")?,
            revision: json::find_required_string(&document, "revision")?,
        })
    }
}
