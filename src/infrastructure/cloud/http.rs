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

//! REST clients for the providers with a live catalog.

use super::client::CloudClient;
use crate::domain::config::{CloudProvider, NodeTypeDescriptor};
use crate::infrastructure::constants::{
    AKAMAI_API_URL, CIVO_API_URL, DIGITALOCEAN_API_URL, RETRY_MAX_DELAY_MS, RETRY_MIN_DELAY_MS,
    VULTR_API_URL,
};
use crate::shared::error::K1Error;
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug)]
struct RequestError {
    message: String,
    transient: bool,
}

pub struct HttpCloudClient {
    client: Client,
    endpoints: BTreeMap<CloudProvider, String>,
    tokens: BTreeMap<CloudProvider, String>,
    retries: usize,
}

impl std::fmt::Debug for HttpCloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCloudClient")
            .field("endpoints", &self.endpoints)
            .field("tokens", &"[REDACTED]")
            .field("retries", &self.retries)
            .finish()
    }
}

impl HttpCloudClient {
    /// `overrides` maps provider names to alternative API base URLs.
    pub fn new(
        overrides: &BTreeMap<String, String>,
        retries: usize,
        request_timeout: Duration,
    ) -> Result<Self, K1Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("k1space/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| K1Error::config_error(format!("Failed to create HTTP client: {}", e)))?;

        let mut endpoints = BTreeMap::new();
        for provider in CloudProvider::ALL {
            let default = match provider {
                CloudProvider::Civo => CIVO_API_URL,
                CloudProvider::DigitalOcean => DIGITALOCEAN_API_URL,
                CloudProvider::Vultr => VULTR_API_URL,
                CloudProvider::Akamai => AKAMAI_API_URL,
                _ => continue,
            };
            let url = overrides
                .get(provider.as_str())
                .map(String::as_str)
                .unwrap_or(default);
            endpoints.insert(provider, url.trim_end_matches('/').to_string());
        }

        Ok(Self {
            client,
            endpoints,
            tokens: BTreeMap::new(),
            retries,
        })
    }

    /// Reads API tokens from each provider's credential variable.
    pub fn with_env_tokens(mut self) -> Self {
        for provider in CloudProvider::ALL {
            if let Some(var) = provider.required_credentials().first() {
                if let Ok(token) = std::env::var(var) {
                    self.tokens.insert(provider, token);
                }
            }
        }
        self
    }

    pub fn with_token(mut self, provider: CloudProvider, token: impl Into<String>) -> Self {
        self.tokens.insert(provider, token.into());
        self
    }

    fn endpoint(&self, provider: CloudProvider, path: &str) -> Result<String, K1Error> {
        let base = self.endpoints.get(&provider).ok_or_else(|| {
            K1Error::provider_api(
                provider.as_str(),
                "provider has no live catalog API".to_string(),
            )
        })?;
        Ok(format!("{}{}", base, path))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        provider: CloudProvider,
        path: &str,
    ) -> Result<T, K1Error> {
        let url = self.endpoint(provider, path)?;
        let token = self.tokens.get(&provider).ok_or_else(|| {
            K1Error::missing_credential(provider.as_str(), provider.required_credentials())
        })?;

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(RETRY_MIN_DELAY_MS))
            .with_max_delay(Duration::from_millis(RETRY_MAX_DELAY_MS))
            .with_max_times(self.retries);

        let body = (|| async { self.send(&url, token).await })
            .retry(backoff)
            .when(|e: &RequestError| e.transient)
            .notify(|e: &RequestError, delay: Duration| {
                tracing::warn!("GET {} failed ({}), retrying in {:?}", url, e.message, delay);
            })
            .await
            .map_err(|e| K1Error::provider_api(provider.as_str(), e.message))?;

        serde_json::from_str(&body).map_err(|e| {
            K1Error::provider_api(
                provider.as_str(),
                format!("unexpected response from {}: {}", url, e),
            )
        })
    }

    async fn send(&self, url: &str, token: &str) -> Result<String, RequestError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RequestError {
                transient: e.is_timeout() || e.is_connect(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| RequestError {
            transient: true,
            message: e.to_string(),
        })?;

        if status.is_success() {
            return Ok(body);
        }

        Err(RequestError {
            transient: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
            message: match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    format!("{} (check the API token)", status)
                }
                _ => format!("{}: {}", status, body.chars().take(200).collect::<String>()),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct CivoRegion {
    code: String,
}

#[derive(Debug, Deserialize)]
struct CivoSize {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    cpu_cores: u32,
    #[serde(default)]
    ram_mb: u64,
    #[serde(default)]
    disk_gb: u64,
}

#[derive(Debug, Deserialize)]
struct DigitalOceanOptionsResponse {
    options: DigitalOceanOptions,
}

#[derive(Debug, Deserialize)]
struct DigitalOceanOptions {
    #[serde(default)]
    regions: Vec<DigitalOceanSlug>,
    #[serde(default)]
    sizes: Vec<DigitalOceanSlug>,
}

#[derive(Debug, Deserialize)]
struct DigitalOceanSlug {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct VultrRegions {
    regions: Vec<VultrRegion>,
}

#[derive(Debug, Deserialize)]
struct VultrRegion {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VultrPlans {
    plans: Vec<VultrPlan>,
}

#[derive(Debug, Deserialize)]
struct VultrPlan {
    id: String,
    #[serde(default)]
    vcpu_count: u32,
    #[serde(default)]
    ram: u64,
    #[serde(default)]
    disk: u64,
}

#[derive(Debug, Deserialize)]
struct LinodeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct LinodeRegion {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LinodeType {
    id: String,
    #[serde(default)]
    vcpus: u32,
    #[serde(default)]
    memory: u64,
    /// Megabytes
    #[serde(default)]
    disk: u64,
}

#[async_trait::async_trait]
impl CloudClient for HttpCloudClient {
    async fn list_regions(&self, provider: CloudProvider) -> Result<Vec<String>, K1Error> {
        let regions: Vec<String> = match provider {
            CloudProvider::Civo => self
                .get_json::<Vec<CivoRegion>>(provider, "/regions")
                .await?
                .into_iter()
                .map(|r| r.code)
                .collect(),
            CloudProvider::DigitalOcean => self
                .get_json::<DigitalOceanOptionsResponse>(provider, "/kubernetes/options")
                .await?
                .options
                .regions
                .into_iter()
                .map(|r| r.slug)
                .collect(),
            CloudProvider::Vultr => self
                .get_json::<VultrRegions>(provider, "/regions")
                .await?
                .regions
                .into_iter()
                .map(|r| r.id)
                .collect(),
            CloudProvider::Akamai => self
                .get_json::<LinodeList<LinodeRegion>>(provider, "/regions")
                .await?
                .data
                .into_iter()
                .map(|r| r.id)
                .collect(),
            other => other
                .static_regions()
                .iter()
                .map(|r| r.to_string())
                .collect(),
        };
        Ok(regions)
    }

    async fn list_node_types(
        &self,
        provider: CloudProvider,
    ) -> Result<Vec<NodeTypeDescriptor>, K1Error> {
        let node_types: Vec<NodeTypeDescriptor> = match provider {
            CloudProvider::Civo => self
                .get_json::<Vec<CivoSize>>(provider, "/sizes")
                .await?
                .into_iter()
                .filter(|s| s.kind.as_deref().map_or(true, |k| k == "kubernetes"))
                .map(|s| NodeTypeDescriptor::new(s.name, s.cpu_cores, s.ram_mb, s.disk_gb))
                .collect(),
            // The options endpoint only returns size slugs.
            CloudProvider::DigitalOcean => self
                .get_json::<DigitalOceanOptionsResponse>(provider, "/kubernetes/options")
                .await?
                .options
                .sizes
                .into_iter()
                .map(|s| NodeTypeDescriptor::from_size_slug(&s.slug))
                .collect(),
            CloudProvider::Vultr => self
                .get_json::<VultrPlans>(provider, "/plans")
                .await?
                .plans
                .into_iter()
                .map(|p| NodeTypeDescriptor::new(p.id, p.vcpu_count, p.ram, p.disk))
                .collect(),
            CloudProvider::Akamai => self
                .get_json::<LinodeList<LinodeType>>(provider, "/linode/types")
                .await?
                .data
                .into_iter()
                .map(|t| NodeTypeDescriptor::new(t.id, t.vcpus, t.memory, t.disk / 1024))
                .collect(),
            _ => Vec::new(),
        };
        Ok(node_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server, provider: CloudProvider) -> HttpCloudClient {
        let mut overrides = BTreeMap::new();
        overrides.insert(provider.as_str().to_string(), server.url());
        HttpCloudClient::new(&overrides, 2, Duration::from_secs(5))
            .unwrap()
            .with_token(provider, "test-token")
    }

    #[tokio::test]
    async fn test_civo_sizes_filtered_to_kubernetes() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/sizes")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"name": "g4s.kube.small", "type": "kubernetes", "cpu_cores": 2, "ram_mb": 4096, "disk_gb": 40},
                    {"name": "g3.small", "type": "instance", "cpu_cores": 1, "ram_mb": 2048, "disk_gb": 25}
                ]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, CloudProvider::Civo);
        let sizes = client.list_node_types(CloudProvider::Civo).await.unwrap();
        assert_eq!(sizes, vec![NodeTypeDescriptor::new("g4s.kube.small", 2, 4096, 40)]);
    }

    #[tokio::test]
    async fn test_digitalocean_sizes_parsed_from_slugs() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/kubernetes/options")
            .with_status(200)
            .with_body(
                r#"{"options": {
                    "regions": [{"name": "New York 1", "slug": "nyc1"}],
                    "sizes": [{"name": "s-2vcpu-4gb", "slug": "s-2vcpu-4gb"}, {"name": "odd", "slug": "odd"}]
                }}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, CloudProvider::DigitalOcean);
        let regions = client.list_regions(CloudProvider::DigitalOcean).await.unwrap();
        assert_eq!(regions, vec!["nyc1"]);

        let sizes = client.list_node_types(CloudProvider::DigitalOcean).await.unwrap();
        assert_eq!(sizes[0], NodeTypeDescriptor::new("s-2vcpu-4gb", 2, 4096, 0));
        assert_eq!(sizes[1], NodeTypeDescriptor::new("odd", 0, 0, 0));
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/regions")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server, CloudProvider::Vultr);
        let err = client.list_regions(CloudProvider::Vultr).await.unwrap_err();
        assert!(matches!(err, K1Error::ProviderApi { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_fails_fast() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/regions")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, CloudProvider::Akamai);
        let err = client.list_regions(CloudProvider::Akamai).await.unwrap_err();
        assert!(err.to_string().contains("check the API token"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_static_regions_need_no_network() {
        let client = HttpCloudClient::new(&BTreeMap::new(), 0, Duration::from_secs(1)).unwrap();
        let regions = client.list_regions(CloudProvider::Aws).await.unwrap();
        assert!(regions.contains(&"us-east-1".to_string()));
    }
}
