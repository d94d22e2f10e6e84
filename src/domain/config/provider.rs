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

use crate::shared::error::K1Error;

pub const FLAG_CLOUD_REGION: &str = "cloud-region";
pub const FLAG_NODE_TYPE: &str = "node-type";

/// A kubefirst flag a provider accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Used when the registry has no default for this flag yet
    pub fallback: Option<&'static str>,
}

impl FlagSpec {
    const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            fallback: None,
        }
    }

    const fn with_fallback(
        name: &'static str,
        description: &'static str,
        fallback: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            fallback: Some(fallback),
        }
    }
}

const GIT_FLAGS: &[FlagSpec] = &[
    FlagSpec::with_fallback("git-provider", "Git provider (github or gitlab)", "github"),
    FlagSpec::with_fallback("git-protocol", "Git protocol (ssh or https)", "ssh"),
    FlagSpec::new("github-org", "GitHub organization for the gitops repositories"),
    FlagSpec::new("gitlab-group", "GitLab group for the gitops repositories"),
    FlagSpec::new("gitops-template-url", "Override the gitops template repository"),
    FlagSpec::new("gitops-template-branch", "Override the gitops template branch"),
];

const CLOUD_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("alerts-email", "Email address for certificate and alert notifications"),
    FlagSpec::with_fallback("cluster-name", "Name of the management cluster", "kubefirst"),
    FlagSpec::with_fallback("cluster-type", "Cluster type (mgmt or workload)", "mgmt"),
    FlagSpec::new("domain-name", "DNS domain the cluster will be reachable at"),
    FlagSpec::with_fallback("dns-provider", "DNS provider (cloud or cloudflare)", "cloud"),
    FlagSpec::with_fallback("node-count", "Number of worker nodes", "4"),
    FlagSpec::new("subdomain", "Optional subdomain under the domain name"),
];

const K3D_FLAGS: &[FlagSpec] = &[FlagSpec::with_fallback(
    "cluster-name",
    "Name of the local k3d cluster",
    "kubefirst",
)];

const GOOGLE_FLAGS: &[FlagSpec] = &[FlagSpec::new("google-project", "GCP project id")];

const AZURE_FLAGS: &[FlagSpec] = &[FlagSpec::new(
    "dns-azure-resource-group",
    "Resource group holding the Azure DNS zone",
)];

const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-west-2",
    "eu-central-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
];

const GOOGLE_REGIONS: &[&str] = &[
    "us-central1",
    "us-east1",
    "us-east4",
    "us-west1",
    "europe-west1",
    "europe-west2",
    "europe-west4",
    "asia-east1",
    "asia-southeast1",
];

const AZURE_REGIONS: &[&str] = &[
    "eastus",
    "eastus2",
    "westus2",
    "westus3",
    "centralus",
    "northeurope",
    "westeurope",
    "uksouth",
    "southeastasia",
];

/// Cloud providers kubefirst can bootstrap clusters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CloudProvider {
    Civo,
    DigitalOcean,
    Vultr,
    Akamai,
    Aws,
    Google,
    Azure,
    K3d,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 8] = [
        CloudProvider::Civo,
        CloudProvider::DigitalOcean,
        CloudProvider::Vultr,
        CloudProvider::Akamai,
        CloudProvider::Aws,
        CloudProvider::Google,
        CloudProvider::Azure,
        CloudProvider::K3d,
    ];

    /// Name used in configuration keys, directory names and kubefirst subcommands.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Civo => "civo",
            CloudProvider::DigitalOcean => "digitalocean",
            CloudProvider::Vultr => "vultr",
            CloudProvider::Akamai => "akamai",
            CloudProvider::Aws => "aws",
            CloudProvider::Google => "google",
            CloudProvider::Azure => "azure",
            CloudProvider::K3d => "k3d",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Civo => "Civo",
            CloudProvider::DigitalOcean => "DigitalOcean",
            CloudProvider::Vultr => "Vultr",
            CloudProvider::Akamai => "Akamai",
            CloudProvider::Aws => "AWS",
            CloudProvider::Google => "Google Cloud",
            CloudProvider::Azure => "Azure",
            CloudProvider::K3d => "k3d (local)",
        }
    }

    /// Environment variables that must all be set before a configuration can be built.
    pub fn required_credentials(&self) -> &'static [&'static str] {
        match self {
            CloudProvider::Civo => &["CIVO_TOKEN"],
            CloudProvider::DigitalOcean => &["DO_TOKEN"],
            CloudProvider::Vultr => &["VULTR_API_KEY"],
            CloudProvider::Akamai => &["LINODE_TOKEN"],
            CloudProvider::Aws => &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"],
            CloudProvider::Google => &["GOOGLE_APPLICATION_CREDENTIALS"],
            CloudProvider::Azure => &[
                "ARM_CLIENT_ID",
                "ARM_CLIENT_SECRET",
                "ARM_TENANT_ID",
                "ARM_SUBSCRIPTION_ID",
            ],
            CloudProvider::K3d => &[],
        }
    }

    /// Whether regions and node types are fetched from the provider's API.
    pub fn has_live_catalog(&self) -> bool {
        matches!(
            self,
            CloudProvider::Civo
                | CloudProvider::DigitalOcean
                | CloudProvider::Vultr
                | CloudProvider::Akamai
        )
    }

    /// Regions offered when the provider has no live catalog.
    pub fn static_regions(&self) -> &'static [&'static str] {
        match self {
            CloudProvider::Aws => AWS_REGIONS,
            CloudProvider::Google => GOOGLE_REGIONS,
            CloudProvider::Azure => AZURE_REGIONS,
            _ => &[],
        }
    }

    /// k3d clusters run locally and take neither a region nor a node type.
    pub fn is_local(&self) -> bool {
        matches!(self, CloudProvider::K3d)
    }

    /// Flags collected for this provider besides region and node type.
    pub fn declared_flags(&self) -> Vec<FlagSpec> {
        let mut flags: Vec<FlagSpec> = Vec::new();
        match self {
            CloudProvider::K3d => flags.extend_from_slice(K3D_FLAGS),
            _ => flags.extend_from_slice(CLOUD_FLAGS),
        }
        flags.extend_from_slice(GIT_FLAGS);
        match self {
            CloudProvider::Google => flags.extend_from_slice(GOOGLE_FLAGS),
            CloudProvider::Azure => flags.extend_from_slice(AZURE_FLAGS),
            _ => {}
        }
        flags.sort_by_key(|f| f.name);
        flags
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CloudProvider {
    type Err = K1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "civo" => Ok(CloudProvider::Civo),
            "digitalocean" | "do" => Ok(CloudProvider::DigitalOcean),
            "vultr" => Ok(CloudProvider::Vultr),
            "akamai" | "linode" => Ok(CloudProvider::Akamai),
            "aws" => Ok(CloudProvider::Aws),
            "google" | "gcp" => Ok(CloudProvider::Google),
            "azure" => Ok(CloudProvider::Azure),
            "k3d" => Ok(CloudProvider::K3d),
            _ => Err(K1Error::validation(format!(
                "Unknown cloud provider: '{}' (expected one of: {})",
                s,
                CloudProvider::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}
