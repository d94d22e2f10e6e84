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

use super::backend::{DocumentBackend, FileBackend};
use crate::domain::config::{CloudCatalogDocument, CloudProvider, NodeTypeDescriptor};
use crate::infrastructure::cloud::CloudClient;
use crate::shared::error::K1Error;
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Persistent regions / node types catalog, kept apart from the registry so a
/// slow network refresh never holds per-configuration writes.
pub struct CatalogStore {
    backend: Box<dyn DocumentBackend>,
    timeout: Duration,
}

impl CatalogStore {
    pub fn new(backend: Box<dyn DocumentBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn open(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::new(Box::new(FileBackend::new(path)), timeout)
    }

    /// Returns an empty catalog when the file is absent.
    pub fn load(&self) -> Result<CloudCatalogDocument, K1Error> {
        match self.backend.read()? {
            Some(content) => CloudCatalogDocument::from_toml_str(&content),
            None => Ok(CloudCatalogDocument::new(Utc::now())),
        }
    }

    pub fn persist(&self, doc: &CloudCatalogDocument) -> Result<(), K1Error> {
        self.backend.write(&doc.to_toml_string()?)
    }

    /// Fetches the provider's regions and replaces its entry in `doc`. On
    /// failure `doc` is left untouched.
    pub async fn refresh_regions(
        &self,
        doc: &mut CloudCatalogDocument,
        client: &dyn CloudClient,
        provider: CloudProvider,
    ) -> Result<Vec<String>, K1Error> {
        let regions = self
            .with_timeout(provider, "regions", client.list_regions(provider))
            .await?;
        tracing::info!("Fetched {} regions for {}", regions.len(), provider);
        doc.replace_regions(provider, regions.clone(), Utc::now());
        Ok(regions)
    }

    /// Fetches the provider's node types and replaces its entry in `doc`.
    pub async fn refresh_node_types(
        &self,
        doc: &mut CloudCatalogDocument,
        client: &dyn CloudClient,
        provider: CloudProvider,
    ) -> Result<Vec<NodeTypeDescriptor>, K1Error> {
        let node_types = self
            .with_timeout(provider, "node types", client.list_node_types(provider))
            .await?;
        tracing::info!("Fetched {} node types for {}", node_types.len(), provider);
        doc.replace_node_types(provider, node_types.clone(), Utc::now());
        Ok(node_types)
    }

    /// Fetches regions and node types concurrently, replaces both entries and
    /// persists. Nothing is replaced unless both calls succeed.
    pub async fn refresh(
        &self,
        client: &dyn CloudClient,
        provider: CloudProvider,
    ) -> Result<CloudCatalogDocument, K1Error> {
        let mut doc = self.load()?;
        let (regions, node_types) = futures::try_join!(
            self.with_timeout(provider, "regions", client.list_regions(provider)),
            self.with_timeout(provider, "node types", client.list_node_types(provider)),
        )?;

        let now = Utc::now();
        doc.replace_regions(provider, regions, now);
        doc.replace_node_types(provider, node_types, now);
        self.persist(&doc)?;
        Ok(doc)
    }

    async fn with_timeout<T, F>(&self, provider: CloudProvider, what: &str, call: F) -> Result<T, K1Error>
    where
        F: Future<Output = Result<T, K1Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Listing {} for {} timed out", what, provider);
                Err(K1Error::provider_api(
                    provider.as_str(),
                    format!("listing {} timed out after {}s", what, self.timeout.as_secs()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticClient;

    #[async_trait::async_trait]
    impl CloudClient for StaticClient {
        async fn list_regions(&self, _provider: CloudProvider) -> Result<Vec<String>, K1Error> {
            Ok(vec!["lon1".to_string(), "nyc1".to_string()])
        }

        async fn list_node_types(
            &self,
            _provider: CloudProvider,
        ) -> Result<Vec<NodeTypeDescriptor>, K1Error> {
            Ok(vec![NodeTypeDescriptor::new("g4s.kube.small", 2, 4096, 40)])
        }
    }

    struct SlowClient;

    #[async_trait::async_trait]
    impl CloudClient for SlowClient {
        async fn list_regions(&self, _provider: CloudProvider) -> Result<Vec<String>, K1Error> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec!["late".to_string()])
        }

        async fn list_node_types(
            &self,
            _provider: CloudProvider,
        ) -> Result<Vec<NodeTypeDescriptor>, K1Error> {
            Err(K1Error::provider_api("civo", "401 Unauthorized"))
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("clouds.toml"), Duration::from_secs(1));
        let doc = store.load().unwrap();
        assert!(doc.cloud_regions.is_empty());
        assert!(!dir.path().join("clouds.toml").exists());
    }

    #[tokio::test]
    async fn test_refresh_persists_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("clouds.toml"), Duration::from_secs(1));
        store.refresh(&StaticClient, CloudProvider::Civo).await.unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.regions(CloudProvider::Civo), ["lon1", "nyc1"]);
        assert_eq!(doc.node_types(CloudProvider::Civo)[0].ram_megabytes, 4096);
    }

    #[tokio::test]
    async fn test_timeout_is_provider_error_and_keeps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("clouds.toml"), Duration::from_millis(50));
        let mut doc = CloudCatalogDocument::new(Utc::now());
        doc.replace_regions(CloudProvider::Civo, vec!["lon1".to_string()], Utc::now());

        let err = store
            .refresh_regions(&mut doc, &SlowClient, CloudProvider::Civo)
            .await
            .unwrap_err();
        assert!(matches!(err, K1Error::ProviderApi { .. }));
        assert!(err.to_string().contains("timed out"));
        assert_eq!(doc.regions(CloudProvider::Civo), ["lon1"]);

        let err = store.refresh(&SlowClient, CloudProvider::Civo).await.unwrap_err();
        assert!(matches!(err, K1Error::ProviderApi { .. }));
    }
}
