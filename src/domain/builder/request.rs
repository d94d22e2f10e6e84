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

//! Non-interactive configuration creation.

use super::session::{BuildSummary, BuilderContext, LOCAL_REGION};
use crate::domain::config::{
    validate_flag_name, validate_flag_names, CloudProvider, ConfigurationKey, FlagMap,
    RegistryDocument, FLAG_CLOUD_REGION, FLAG_NODE_TYPE,
};
use crate::shared::error::K1Error;

/// A configuration described entirely on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRequest {
    pub provider: CloudProvider,
    pub region: Option<String>,
    pub prefix: Option<String>,
    pub flags: FlagMap,
}

impl ConfigRequest {
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            provider,
            region: None,
            prefix: None,
            flags: FlagMap::new(),
        }
    }

    /// Key and complete flag set for this request. Flags not given are filled
    /// from the registry defaults, then from the provider's fallbacks.
    pub fn resolve(
        &self,
        doc: &RegistryDocument,
        default_prefix: &str,
    ) -> Result<(ConfigurationKey, FlagMap), K1Error> {
        validate_flag_names(&self.flags)?;
        let prefix = self
            .prefix
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| doc.last_prefix.clone())
            .unwrap_or_else(|| default_prefix.to_string());

        let mut flags: FlagMap = self
            .flags
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let region = if self.provider.is_local() {
            LOCAL_REGION.to_string()
        } else {
            let region = self
                .region
                .clone()
                .filter(|r| !r.is_empty())
                .or_else(|| flags.get(FLAG_CLOUD_REGION).cloned())
                .or_else(|| doc.default_for(FLAG_CLOUD_REGION).map(str::to_string))
                .ok_or_else(|| {
                    K1Error::validation(format!(
                        "no region given for {} and no default region is recorded",
                        self.provider
                    ))
                })?;
            flags.insert(FLAG_CLOUD_REGION.to_string(), region.clone());
            fill_missing(&mut flags, doc, FLAG_NODE_TYPE, None);
            region
        };

        for spec in self.provider.declared_flags() {
            fill_missing(&mut flags, doc, spec.name, spec.fallback);
        }

        let key = ConfigurationKey::new(self.provider.as_str(), region, prefix)?;
        Ok((key, flags))
    }

    /// Checks credentials, writes the artifacts and stores the record.
    pub fn apply(&self, ctx: &BuilderContext<'_>) -> Result<BuildSummary, K1Error> {
        ctx.require_credentials(self.provider)?;
        let doc = ctx.registry.load()?;
        let (key, flags) = self.resolve(&doc, &ctx.default_prefix)?;
        ctx.generate(&doc, &key, &flags)?;
        ctx.persist(&key, &flags)
    }
}

fn fill_missing(flags: &mut FlagMap, doc: &RegistryDocument, name: &str, fallback: Option<&str>) {
    if flags.get(name).is_some_and(|v| !v.is_empty()) {
        return;
    }
    if let Some(value) = doc.default_for(name).or(fallback) {
        flags.insert(name.to_string(), value.to_string());
    }
}

/// Parses repeated `name=value` arguments.
pub fn parse_flag_assignments(items: &[String]) -> Result<FlagMap, K1Error> {
    let mut map = FlagMap::new();

    for item in items {
        let Some((name, value)) = item.split_once('=') else {
            return Err(K1Error::validation(format!(
                "Invalid flag format: '{}'. Expected 'name=value'",
                item
            )));
        };

        let name = name.trim().trim_start_matches("--");
        if name.is_empty() {
            return Err(K1Error::validation(format!("Empty flag name in '{}'", item)));
        }
        validate_flag_name(name)?;

        map.insert(name.to_string(), value.trim().to_string());
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_flag_assignments() {
        let flags = parse_flag_assignments(&[
            "cluster-name=demo".to_string(),
            "--domain-name = example.com".to_string(),
            "subdomain=".to_string(),
        ])
        .unwrap();
        assert_eq!(flags["cluster-name"], "demo");
        assert_eq!(flags["domain-name"], "example.com");
        assert_eq!(flags["subdomain"], "");

        assert!(parse_flag_assignments(&["novalue".to_string()]).is_err());
        assert!(parse_flag_assignments(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_parse_flag_assignments_rejects_unsafe_names() {
        for item in ["x;touch /tmp/x;#=1", "cluster_name=b", "Cluster-Name=a", "-x=1", "a b=c"] {
            let err = parse_flag_assignments(&[item.to_string()]).unwrap_err();
            assert!(matches!(err, K1Error::Validation(_)), "{} accepted", item);
        }
    }

    #[test]
    fn test_resolve_rejects_unsafe_flag_names() {
        let doc = RegistryDocument::new(Utc::now());
        let mut request = ConfigRequest::new(CloudProvider::Civo);
        request.region = Some("lon1".to_string());
        request.flags.insert("cluster-name".to_string(), "a".to_string());
        request.flags.insert("cluster_name".to_string(), "b".to_string());

        let err = request.resolve(&doc, "K1").unwrap_err();
        assert!(matches!(err, K1Error::Validation(_)));
    }

    #[test]
    fn test_resolve_inherits_region_from_defaults() {
        let mut doc = RegistryDocument::new(Utc::now());
        doc.default_values
            .insert(FLAG_CLOUD_REGION.to_string(), "lon1".to_string());

        let (key, flags) = ConfigRequest::new(CloudProvider::Civo)
            .resolve(&doc, "K1")
            .unwrap();
        assert_eq!(key.encode(), "civo_lon1_K1");
        assert_eq!(flags[FLAG_CLOUD_REGION], "lon1");
        assert_eq!(flags["cluster-name"], "kubefirst");
    }

    #[test]
    fn test_resolve_explicit_values_win() {
        let mut doc = RegistryDocument::new(Utc::now());
        doc.default_values
            .insert("cluster-name".to_string(), "old".to_string());
        doc.last_prefix = Some("PREV".to_string());

        let mut request = ConfigRequest::new(CloudProvider::Civo);
        request.region = Some("nyc1".to_string());
        request.flags.insert("cluster-name".to_string(), "new".to_string());

        let (key, flags) = request.resolve(&doc, "K1").unwrap();
        assert_eq!(key.prefix(), "PREV");
        assert_eq!(key.region(), "nyc1");
        assert_eq!(flags["cluster-name"], "new");
    }

    #[test]
    fn test_resolve_without_region_fails() {
        let doc = RegistryDocument::new(Utc::now());
        let err = ConfigRequest::new(CloudProvider::Vultr)
            .resolve(&doc, "K1")
            .unwrap_err();
        assert!(matches!(err, K1Error::Validation(_)));
    }

    #[test]
    fn test_local_provider_uses_local_region() {
        let doc = RegistryDocument::new(Utc::now());
        let (key, flags) = ConfigRequest::new(CloudProvider::K3d)
            .resolve(&doc, "K1")
            .unwrap();
        assert_eq!(key.encode(), "k3d_local_K1");
        assert!(!flags.contains_key(FLAG_CLOUD_REGION));
    }
}
