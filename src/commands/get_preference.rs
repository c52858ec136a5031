//! Preference lookup

use serde_json::Value;

use crate::commands::{require, Command};
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;

/// GET `/command/core/get-preference?name=<key>`. Read-only, no token.
///
/// The server wraps the stored value in `{"value": ...}`; the value itself
/// is returned as raw JSON since preferences are free-form.
#[derive(Debug, Clone)]
pub struct GetPreferenceCommand {
    name: String,
}

#[derive(Debug, Default)]
pub struct GetPreferenceBuilder {
    name: Option<String>,
}

impl GetPreferenceCommand {
    pub fn builder() -> GetPreferenceBuilder {
        GetPreferenceBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GetPreferenceBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<GetPreferenceCommand> {
        Ok(GetPreferenceCommand {
            name: require("get preference", "name", self.name)?,
        })
    }
}

impl Command for GetPreferenceCommand {
    type Output = Value;

    fn endpoint(&self) -> &'static str {
        "/command/core/get-preference"
    }

    fn describe(&self) -> String {
        format!("get preference {}", self.name)
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::get(self.endpoint())
            .accept_json()
            .query("name", &self.name)
    }

    fn parse(&self, response: RawResponse) -> Result<Value> {
        let document = json::parse(&response.body_text())?;
        Ok(json::find_required(&document, "value")?.clone())
    }
}
