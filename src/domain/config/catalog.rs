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

//! Clouds catalog: per-provider regions and node types.

use super::provider::CloudProvider;
use crate::shared::error::K1Error;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SIZE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)(vcpu|cpu|gb|mb)$").expect("size token pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeTypeDescriptor {
    pub name: String,
    pub cpu_cores: u32,
    pub ram_megabytes: u64,
    pub disk_gigabytes: u64,
}

impl NodeTypeDescriptor {
    pub fn new(name: impl Into<String>, cpu_cores: u32, ram_megabytes: u64, disk_gigabytes: u64) -> Self {
        Self {
            name: name.into(),
            cpu_cores,
            ram_megabytes,
            disk_gigabytes,
        }
    }

    /// Builds a descriptor from a size slug such as `s-2vcpu-4gb` or
    /// `s-1vcpu-512mb-10gb`. Anything that cannot be parsed stays zero.
    pub fn from_size_slug(slug: &str) -> Self {
        let (cpu_cores, ram_megabytes, disk_gigabytes) = parse_size_slug(slug);
        Self::new(slug, cpu_cores, ram_megabytes, disk_gigabytes)
    }

    pub fn label(&self) -> String {
        format!(
            "{} ({} vCPU, {} MB RAM, {} GB disk)",
            self.name, self.cpu_cores, self.ram_megabytes, self.disk_gigabytes
        )
    }
}

/// Returns `(vcpus, ram_mb, disk_gb)`. The first memory token is RAM, a second
/// `gb` token is disk.
fn parse_size_slug(slug: &str) -> (u32, u64, u64) {
    let mut cpu = 0u32;
    let mut ram_mb: Option<u64> = None;
    let mut disk_gb = 0u64;

    for token in slug.split('-') {
        let Some(caps) = SIZE_TOKEN.captures(token) else {
            continue;
        };
        let Ok(amount) = caps[1].parse::<u64>() else {
            continue;
        };
        match caps[2].to_lowercase().as_str() {
            "vcpu" | "cpu" => cpu = u32::try_from(amount).unwrap_or(0),
            "mb" if ram_mb.is_none() => ram_mb = Some(amount),
            "gb" if ram_mb.is_none() => ram_mb = Some(amount.checked_mul(1024).unwrap_or(0)),
            "gb" => disk_gb = amount,
            _ => {}
        }
    }

    (cpu, ram_mb.unwrap_or(0), disk_gb)
}

const CATALOG_DOCUMENT: &str = "clouds catalog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudCatalogDocument {
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub cloud_regions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub cloud_node_types: BTreeMap<String, Vec<NodeTypeDescriptor>>,
}

impl CloudCatalogDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_updated: now,
            cloud_regions: BTreeMap::new(),
            cloud_node_types: BTreeMap::new(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, K1Error> {
        toml::from_str(content).map_err(|e| K1Error::parse(CATALOG_DOCUMENT, e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, K1Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn regions(&self, provider: CloudProvider) -> &[String] {
        self.cloud_regions
            .get(provider.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node_types(&self, provider: CloudProvider) -> &[NodeTypeDescriptor] {
        self.cloud_node_types
            .get(provider.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replaces the provider's regions wholesale.
    pub fn replace_regions(&mut self, provider: CloudProvider, regions: Vec<String>, now: DateTime<Utc>) {
        self.cloud_regions.insert(provider.as_str().to_string(), regions);
        self.last_updated = now;
    }

    /// Replaces the provider's node types wholesale.
    pub fn replace_node_types(
        &mut self,
        provider: CloudProvider,
        node_types: Vec<NodeTypeDescriptor>,
        now: DateTime<Utc>,
    ) {
        self.cloud_node_types
            .insert(provider.as_str().to_string(), node_types);
        self.last_updated = now;
    }

    pub fn has_snapshot(&self, provider: CloudProvider) -> bool {
        !self.regions(provider).is_empty() && !self.node_types(provider).is_empty()
    }
}
