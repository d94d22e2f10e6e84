// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;
pub type Result<T> = std::result::Result<T, K1Error>;

#[derive(Error, Debug)]
pub enum K1Error {
    #[error("Failed to parse {document}: {message}")]
    Parse { document: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cloud provider API error ({provider}): {message}")]
    ProviderApi { provider: String, message: String },

    #[error("Configuration not found: '{key}'")]
    NotFound { key: String },

    #[error(
        "Missing credentials for {provider}\n\n  Set the following environment variable(s) and retry:\n{}",
        remediation(.variables)
    )]
    MissingCredential {
        provider: String,
        variables: Vec<String>,
    },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn remediation(variables: &[String]) -> String {
    variables
        .iter()
        .map(|v| format!("  export {}=<value>", v))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<dialoguer::Error> for K1Error {
    fn from(err: dialoguer::Error) -> Self {
        K1Error::Prompt(err.to_string())
    }
}

impl K1Error {
    pub fn parse(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            document: document.into(),
            message: message.into(),
        }
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Self::Validation(context.into())
    }

    pub fn provider_api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderApi {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn missing_credential(provider: impl Into<String>, variables: &[&str]) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_lists_exports() {
        let err = K1Error::missing_credential("civo", &["CIVO_TOKEN"]);
        let msg = err.to_string();
        assert!(msg.contains("Missing credentials for civo"));
        assert!(msg.contains("export CIVO_TOKEN=<value>"));
    }

    #[test]
    fn test_not_found_message() {
        let err = K1Error::not_found("civo_lon1_K1");
        assert_eq!(err.to_string(), "Configuration not found: 'civo_lon1_K1'");
    }
}
