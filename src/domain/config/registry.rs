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

//! Registry document: configuration records, their artifacts and the global
//! default-value table.

use super::key::ConfigurationKey;
use crate::infrastructure::constants::{ENV_FILE_NAME, INIT_SCRIPT_NAME, PROVIDER_SCRIPT_NAME};
use crate::shared::error::K1Error;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Current on-disk layout: flags nested under each config.
pub const REGISTRY_VERSION: u32 = 1;

const REGISTRY_DOCUMENT: &str = "registry";

pub type FlagMap = BTreeMap<String, String>;

static FLAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("flag name pattern"));

/// Flag names end up verbatim as `--<name>` in the provider script, so only
/// lowercase alphanumerics and `-` are accepted.
pub fn validate_flag_name(name: &str) -> Result<(), K1Error> {
    if FLAG_NAME.is_match(name) {
        return Ok(());
    }
    Err(K1Error::validation(format!(
        "invalid flag name '{}': use lowercase letters, digits and '-'",
        name
    )))
}

pub fn validate_flag_names(flags: &FlagMap) -> Result<(), K1Error> {
    flags.keys().try_for_each(|name| validate_flag_name(name))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigurationRecord {
    /// Env file, init script, provider script, in that order.
    pub files: Vec<String>,
    pub flags: FlagMap,
}

impl ConfigurationRecord {
    /// Init script, located by position and confirmed by suffix.
    pub fn init_script(&self) -> Option<&str> {
        self.files
            .get(1)
            .filter(|f| f.ends_with(INIT_SCRIPT_NAME))
            .or_else(|| self.files.iter().find(|f| f.ends_with(INIT_SCRIPT_NAME)))
            .map(String::as_str)
    }

    pub fn env_file(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.ends_with(ENV_FILE_NAME))
            .map(String::as_str)
    }
}

/// Baseline flags every well-formed record carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSchema {
    pub baseline_flags: Vec<String>,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            baseline_flags: [
                "alerts-email",
                "cloud-region",
                "cluster-name",
                "domain-name",
                "node-count",
                "node-type",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RecordSchema {
    /// Adds every missing baseline flag as an empty string.
    pub fn pad(&self, flags: &mut FlagMap) {
        for name in &self.baseline_flags {
            flags.entry(name.clone()).or_default();
        }
    }

    pub fn is_well_formed(&self, record: &ConfigurationRecord) -> bool {
        self.baseline_flags
            .iter()
            .all(|name| record.flags.contains_key(name))
    }
}

/// Canonical artifact locations for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub env_file: PathBuf,
    pub init_script: PathBuf,
    pub provider_script: PathBuf,
}

impl ArtifactPaths {
    pub fn for_key(base_dir: &Path, key: &ConfigurationKey) -> Self {
        let dir = key.artifact_dir(base_dir);
        Self {
            env_file: dir.join(ENV_FILE_NAME),
            init_script: dir.join(INIT_SCRIPT_NAME),
            provider_script: dir.join(PROVIDER_SCRIPT_NAME),
            dir,
        }
    }

    /// Paths in record order, normalized.
    pub fn to_record_files(&self) -> Vec<String> {
        [&self.env_file, &self.init_script, &self.provider_script]
            .iter()
            .map(|p| normalize_artifact_path(&p.to_string_lossy()))
            .collect()
    }
}

/// Strips stray quoting, converts `\` to `/` and collapses repeated `/`.
/// Applying it to an already normalized path is a no-op.
pub fn normalize_artifact_path(raw: &str) -> String {
    let unquoted: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .map(|c| if c == '\\' { '/' } else { c })
        .collect();

    let mut out = String::with_capacity(unquoted.len());
    let mut prev_slash = false;
    for c in unquoted.trim().chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub version: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_prefix: Option<String>,
    #[serde(default)]
    pub configs: BTreeMap<ConfigurationKey, ConfigurationRecord>,
    /// Flat namespace: the most recent non-empty value of every flag name,
    /// regardless of provider.
    #[serde(default)]
    pub default_values: FlagMap,
}

impl RegistryDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: REGISTRY_VERSION,
            last_updated: now,
            last_prefix: None,
            configs: BTreeMap::new(),
            default_values: FlagMap::new(),
        }
    }

    /// Parses a persisted document, migrating older layouts and normalizing
    /// artifact paths.
    pub fn from_toml_str(content: &str) -> Result<Self, K1Error> {
        let mut raw: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| K1Error::parse(REGISTRY_DOCUMENT, e.to_string()))?;

        let version = match raw.get("version") {
            None => 0,
            Some(toml::Value::Integer(v)) => u32::try_from(*v).map_err(|_| {
                K1Error::parse(REGISTRY_DOCUMENT, format!("invalid version field: {}", v))
            })?,
            Some(other) => {
                return Err(K1Error::parse(
                    REGISTRY_DOCUMENT,
                    format!("invalid version field: {}", other),
                ))
            }
        };

        if version > REGISTRY_VERSION {
            return Err(K1Error::parse(
                REGISTRY_DOCUMENT,
                format!(
                    "document version {} is newer than the supported version {}",
                    version, REGISTRY_VERSION
                ),
            ));
        }

        if version == 0 {
            migrate_flat_flags(&mut raw);
            raw.insert(
                "version".to_string(),
                toml::Value::Integer(REGISTRY_VERSION as i64),
            );
            if !raw.contains_key("last_updated") {
                raw.insert(
                    "last_updated".to_string(),
                    toml::Value::String(Utc::now().to_rfc3339()),
                );
            }
            tracing::info!("Migrated unversioned registry document to version {}", REGISTRY_VERSION);
        }

        let mut doc = toml::Value::Table(raw)
            .try_into::<RegistryDocument>()
            .map_err(|e: toml::de::Error| K1Error::parse(REGISTRY_DOCUMENT, e.to_string()))?;
        doc.normalize_paths();
        Ok(doc)
    }

    pub fn to_toml_string(&self) -> Result<String, K1Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn normalize_paths(&mut self) {
        for record in self.configs.values_mut() {
            for file in record.files.iter_mut() {
                *file = normalize_artifact_path(file);
            }
        }
    }

    pub fn get(&self, key: &ConfigurationKey) -> Option<&ConfigurationRecord> {
        self.configs.get(key)
    }

    /// Inserts or merges the record for `key`.
    ///
    /// Non-empty values in `flags` override existing ones; empty values only
    /// fill flags that do not exist yet. Every non-empty value becomes the new
    /// global default for its flag name.
    pub fn upsert(
        &mut self,
        key: ConfigurationKey,
        flags: &FlagMap,
        paths: &ArtifactPaths,
        schema: &RecordSchema,
        now: DateTime<Utc>,
    ) -> &ConfigurationRecord {
        let record = self.configs.entry(key.clone()).or_default();
        record.files = paths.to_record_files();

        for (name, value) in flags {
            if value.is_empty() {
                record.flags.entry(name.clone()).or_default();
            } else {
                record.flags.insert(name.clone(), value.clone());
                self.default_values.insert(name.clone(), value.clone());
            }
        }
        schema.pad(&mut record.flags);

        self.last_prefix = Some(key.prefix().to_string());
        self.last_updated = now;
        &self.configs[&key]
    }

    pub fn remove(
        &mut self,
        key: &ConfigurationKey,
        now: DateTime<Utc>,
    ) -> Result<ConfigurationRecord, K1Error> {
        let record = self
            .configs
            .remove(key)
            .ok_or_else(|| K1Error::not_found(key.encode()))?;
        self.last_updated = now;
        Ok(record)
    }

    /// Registry default for a flag, ignoring empty values.
    pub fn default_for(&self, flag: &str) -> Option<&str> {
        self.default_values
            .get(flag)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Unversioned documents stored flag values directly next to `files`, and
/// allowed non-string scalars both there and in `default_values`.
fn migrate_flat_flags(raw: &mut toml::Table) {
    if let Some(toml::Value::Table(defaults)) = raw.get_mut("default_values") {
        for (_, value) in defaults.iter_mut() {
            *value = toml::Value::String(scalar_to_string(value.clone()));
        }
    }

    let Some(toml::Value::Table(configs)) = raw.get_mut("configs") else {
        return;
    };

    for (_, entry) in configs.iter_mut() {
        let toml::Value::Table(entry) = entry else {
            continue;
        };
        if entry.contains_key("flags") {
            continue;
        }
        let flat: Vec<String> = entry
            .keys()
            .filter(|k| k.as_str() != "files")
            .cloned()
            .collect();
        let mut flags = toml::Table::new();
        for name in flat {
            if let Some(value) = entry.remove(&name) {
                flags.insert(name, toml::Value::String(scalar_to_string(value)));
            }
        }
        entry.insert("flags".to_string(), toml::Value::Table(flags));
    }
}

fn scalar_to_string(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }
}
