//! Preference update

use crate::commands::{require, require_token, Command};
use crate::csrf::CsrfToken;
use crate::error::Result;
use crate::http::{HttpRequest, RawResponse};
use crate::json;
use crate::response::{parse_envelope, CommandResponse};

/// POST `/command/core/set-preference`. Mutating; carries a CSRF token.
/// The value travels as text; the server stores it JSON-encoded.
#[derive(Debug, Clone)]
pub struct SetPreferenceCommand {
    token: CsrfToken,
    name: String,
    value: String,
}

#[derive(Debug, Default)]
pub struct SetPreferenceBuilder {
    token: Option<CsrfToken>,
    name: Option<String>,
    value: Option<String>,
}

impl SetPreferenceCommand {
    pub fn builder() -> SetPreferenceBuilder {
        SetPreferenceBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SetPreferenceBuilder {
    pub fn token(mut self, token: CsrfToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn build(self) -> Result<SetPreferenceCommand> {
        Ok(SetPreferenceCommand {
            token: require_token("set preference", self.token)?,
            name: require("set preference", "name", self.name)?,
            value: require("set preference", "value", self.value)?,
        })
    }
}

impl Command for SetPreferenceCommand {
    type Output = CommandResponse;

    fn endpoint(&self) -> &'static str {
        "/command/core/set-preference"
    }

    fn describe(&self) -> String {
        format!("set preference {}", self.name)
    }

    fn build(&self) -> HttpRequest {
        HttpRequest::post(self.endpoint())
            .accept_json()
            .form_field("csrf_token", self.token.as_str())
            .form_field("name", &self.name)
            .form_field("value", &self.value)
    }

    fn parse(&self, response: RawResponse) -> Result<CommandResponse> {
        let document = json::parse(&response.body_text())?;
        parse_envelope(&document)
    }
}
