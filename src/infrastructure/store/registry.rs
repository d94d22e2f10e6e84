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
use crate::domain::config::{
    validate_flag_names, ArtifactPaths, ConfigurationKey, FlagMap, RecordSchema, RegistryDocument,
};
use crate::shared::error::K1Error;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Persistent index of configurations.
///
/// Every mutation is load, mutate in memory, rewrite the whole file.
pub struct RegistryStore {
    backend: Box<dyn DocumentBackend>,
    base_dir: PathBuf,
    schema: RecordSchema,
}

impl RegistryStore {
    pub fn new(backend: Box<dyn DocumentBackend>, base_dir: impl Into<PathBuf>, schema: RecordSchema) -> Self {
        Self {
            backend,
            base_dir: base_dir.into(),
            schema,
        }
    }

    pub fn open(path: impl Into<PathBuf>, base_dir: impl Into<PathBuf>, schema: RecordSchema) -> Self {
        Self::new(Box::new(FileBackend::new(path)), base_dir, schema)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Reads the registry, creating an empty version-1 document first if none
    /// exists.
    pub fn load(&self) -> Result<RegistryDocument, K1Error> {
        if let Some(content) = self.backend.read()? {
            return RegistryDocument::from_toml_str(&content);
        }

        let fresh = RegistryDocument::new(Utc::now()).to_toml_string()?;
        if self.backend.create_new(&fresh)? {
            tracing::info!("Created new registry at {}", self.backend.location());
        }

        let content = self.backend.read()?.ok_or_else(|| {
            K1Error::parse(
                "registry",
                format!("{} disappeared after creation", self.backend.location()),
            )
        })?;
        RegistryDocument::from_toml_str(&content)
    }

    pub fn persist(&self, doc: &RegistryDocument) -> Result<(), K1Error> {
        self.backend.write(&doc.to_toml_string()?)
    }

    pub fn artifact_paths(&self, key: &ConfigurationKey) -> ArtifactPaths {
        ArtifactPaths::for_key(&self.base_dir, key)
    }

    /// Merges `flags` into the record for `key` and persists.
    pub fn upsert(&self, key: &ConfigurationKey, flags: &FlagMap) -> Result<RegistryDocument, K1Error> {
        validate_flag_names(flags)?;
        let mut doc = self.load()?;
        let paths = self.artifact_paths(key);
        doc.upsert(key.clone(), flags, &paths, &self.schema, Utc::now());
        self.persist(&doc)?;
        tracing::info!("Stored configuration {}", key);
        Ok(doc)
    }

    /// Drops the record for `key` and persists. Artifact files are left alone.
    pub fn remove(&self, key: &ConfigurationKey) -> Result<RegistryDocument, K1Error> {
        let mut doc = self.load()?;
        doc.remove(key, Utc::now())?;
        self.persist(&doc)?;
        tracing::info!("Removed configuration {}", key);
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> RegistryStore {
        RegistryStore::open(dir.join("index.toml"), dir, RecordSchema::default())
    }

    #[test]
    fn test_load_creates_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let doc = store.load().unwrap();
        assert_eq!(doc.version, 1);
        assert!(doc.configs.is_empty());
        assert!(dir.path().join("index.toml").exists());
        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn test_remove_unknown_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.load().unwrap();
        let before = std::fs::read_to_string(dir.path().join("index.toml")).unwrap();

        let key = ConfigurationKey::new("civo", "lon1", "K1").unwrap();
        assert!(matches!(store.remove(&key), Err(K1Error::NotFound { .. })));

        let after = std::fs::read_to_string(dir.path().join("index.toml")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_upsert_rejects_invalid_flag_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let key = ConfigurationKey::new("civo", "lon1", "K1").unwrap();
        let flags: FlagMap = [("x;touch /tmp/x;#".to_string(), "1".to_string())].into();

        let err = store.upsert(&key, &flags).unwrap_err();
        assert!(matches!(err, K1Error::Validation(_)));
        assert!(store.load().unwrap().configs.is_empty());
    }
}
