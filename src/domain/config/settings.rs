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

//! Tool settings loaded from `config.toml`.

use super::registry::RecordSchema;
use crate::infrastructure::constants::{
    CATALOG_FILE_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_HOME_SUBDIR, HOME_ENV_VAR,
    REGISTRY_FILE_NAME,
};
use crate::shared::error::K1Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// What the builder does when a live catalog refresh fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogFallback {
    /// Abort the session.
    #[default]
    FailFast,
    /// Continue with the last persisted catalog, if it has data for the provider.
    LastSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the registry, catalog and generated artifacts.
    #[serde(skip)]
    pub home: PathBuf,
    pub kubefirst_binary: String,
    /// Command that reads the env file and prints resolved exports.
    pub secrets_wrapper: String,
    pub default_prefix: String,
    pub provider_timeout_secs: u64,
    pub provider_retries: usize,
    pub catalog_fallback: CatalogFallback,
    pub record_schema: RecordSchema,
    /// Base URL overrides keyed by provider name.
    pub api_endpoints: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            kubefirst_binary: "kubefirst".to_string(),
            secrets_wrapper: "op inject -i".to_string(),
            default_prefix: "K1".to_string(),
            provider_timeout_secs: 30,
            provider_retries: 3,
            catalog_fallback: CatalogFallback::FailFast,
            record_schema: RecordSchema::default(),
            api_endpoints: BTreeMap::new(),
        }
    }
}

fn default_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_SUBDIR)
}

impl AppConfig {
    /// Resolves the home directory (`--home` > `K1SPACE_HOME` > `~/.ssot/k1space`)
    /// and loads `config.toml` from it, or from `K1SPACE_CONFIG` when set.
    pub fn load(home_override: Option<PathBuf>) -> Result<Self, K1Error> {
        let home = home_override
            .or_else(|| std::env::var_os(HOME_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(default_home);

        let config_path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(CONFIG_FILE_NAME));

        let mut config = if config_path.exists() {
            tracing::debug!("Loading settings from {}", config_path.display());
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };
        config.home = home;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, K1Error> {
        let content = read_to_string(path).map_err(|e| {
            K1Error::config_error(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            K1Error::config_error(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Self::default()
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.home.join(REGISTRY_FILE_NAME)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.home.join(CATALOG_FILE_NAME)
    }
}
