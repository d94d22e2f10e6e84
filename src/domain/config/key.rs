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

//! Composite configuration key.
//!
//! Internally a key is a `(provider, region, prefix)` tuple. It is only turned
//! into a single token at the serialization boundary, where the components are
//! joined with `_` and any `_` or `%` inside a component is percent-escaped.

use crate::shared::error::K1Error;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

const SEPARATOR: char = '_';

/// Components become directory names and appear inside generated scripts.
static COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.%-]+$").expect("key component pattern"));

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigurationKey {
    provider: String,
    region: String,
    prefix: String,
}

impl ConfigurationKey {
    pub fn new(
        provider: impl Into<String>,
        region: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self, K1Error> {
        let key = Self {
            provider: provider.into(),
            region: region.into(),
            prefix: prefix.into(),
        };
        validate_component("provider", &key.provider)?;
        validate_component("region", &key.region)?;
        validate_component("prefix", &key.prefix)?;
        Ok(key)
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory holding this configuration's artifacts: `<base>/<provider>/<region>/<prefix>`.
    pub fn artifact_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir
            .join(&self.provider)
            .join(&self.region)
            .join(&self.prefix)
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            escape(&self.provider),
            escape(&self.region),
            escape(&self.prefix),
            sep = SEPARATOR
        )
    }
}

fn validate_component(name: &str, value: &str) -> Result<(), K1Error> {
    if value.trim().is_empty() {
        return Err(K1Error::validation(format!(
            "configuration {} must not be empty",
            name
        )));
    }
    if !COMPONENT.is_match(value) {
        return Err(K1Error::validation(format!(
            "configuration {} '{}' may only contain letters, digits, '_', '.', '%' and '-'",
            name, value
        )));
    }
    if value == "." || value == ".." {
        return Err(K1Error::validation(format!(
            "configuration {} '{}' is not a valid directory name",
            name, value
        )));
    }
    Ok(())
}

fn escape(component: &str) -> String {
    component.replace('%', "%25").replace(SEPARATOR, "%5F")
}

fn unescape(component: &str) -> Result<String, K1Error> {
    let mut out = String::with_capacity(component.len());
    let mut rest = component;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let code = rest.get(idx + 1..idx + 3).ok_or_else(|| {
            K1Error::validation(format!("truncated escape sequence in '{}'", component))
        })?;
        match code.to_ascii_uppercase().as_str() {
            "25" => out.push('%'),
            "5F" => out.push(SEPARATOR),
            other => {
                return Err(K1Error::validation(format!(
                    "unknown escape sequence '%{}' in '{}'",
                    other, component
                )))
            }
        }
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    Ok(out)
}

impl FromStr for ConfigurationKey {
    type Err = K1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(K1Error::validation(format!(
                "invalid configuration key '{}': expected <provider>_<region>_<prefix>, found {} component(s)",
                s,
                parts.len()
            )));
        }
        Self::new(
            unescape(parts[0])?,
            unescape(parts[1])?,
            unescape(parts[2])?,
        )
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for ConfigurationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for ConfigurationKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_key() {
        let key = ConfigurationKey::new("civo", "lon1", "K1").unwrap();
        assert_eq!(key.encode(), "civo_lon1_K1");
        assert_eq!("civo_lon1_K1".parse::<ConfigurationKey>().unwrap(), key);
    }

    #[test]
    fn test_components_with_separator_are_escaped() {
        let key = ConfigurationKey::new("aws", "us_east_1", "my_prefix%1").unwrap();
        let encoded = key.encode();
        assert_eq!(encoded, "aws_us%5Feast%5F1_my%5Fprefix%251");
        let decoded: ConfigurationKey = encoded.parse().unwrap();
        assert_eq!(decoded.region(), "us_east_1");
        assert_eq!(decoded.prefix(), "my_prefix%1");
    }

    #[test]
    fn test_wrong_component_count_is_rejected() {
        for raw in ["civo_lon1", "civo_lon1_K1_extra", ""] {
            let err = raw.parse::<ConfigurationKey>().unwrap_err();
            assert!(matches!(err, K1Error::Validation(_)), "{}", raw);
        }
    }

    #[test]
    fn test_invalid_components_are_rejected() {
        assert!(ConfigurationKey::new("civo", "", "K1").is_err());
        assert!(ConfigurationKey::new("civo", "lon/1", "K1").is_err());
        assert!(ConfigurationKey::new("civo", "lon1", "K 1").is_err());
        assert!(ConfigurationKey::new("civo", "..", "K1").is_err());
        assert!("civo_lon1_K%2".parse::<ConfigurationKey>().is_err());
    }

    #[test]
    fn test_shell_metacharacters_are_rejected() {
        for prefix in ["$(id)", "`id`", "K1\"", "K1;ls", "K1'x"] {
            let err = ConfigurationKey::new("civo", "lon1", prefix).unwrap_err();
            assert!(matches!(err, K1Error::Validation(_)), "{} accepted", prefix);
        }
        assert!(ConfigurationKey::new("civo", "$REGION", "K1").is_err());
        assert!(ConfigurationKey::new("aws", "us_east-1.a", "my%prefix").is_ok());
    }

    #[test]
    fn test_artifact_dir_layout() {
        let key = ConfigurationKey::new("civo", "lon1", "K1").unwrap();
        assert_eq!(
            key.artifact_dir(Path::new("/home/u/.ssot/k1space")),
            PathBuf::from("/home/u/.ssot/k1space/civo/lon1/K1")
        );
    }
}
