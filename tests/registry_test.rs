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

use chrono::Utc;
use k1space::domain::config::ArtifactPaths;
use k1space::infrastructure::store::{DocumentBackend, FileBackend};
use k1space::infrastructure::workspace::Workspace;
use k1space::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod test_utils {
    use super::*;

    pub fn key(provider: &str, region: &str, prefix: &str) -> ConfigurationKey {
        ConfigurationKey::new(provider, region, prefix).unwrap()
    }

    pub fn flags(pairs: &[(&str, &str)]) -> FlagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn open_store(dir: &Path) -> RegistryStore {
        RegistryStore::open(dir.join(".k1space.index.toml"), dir, RecordSchema::default())
    }

    /// File backend whose writes can be switched off.
    pub struct FlakyBackend {
        pub inner: FileBackend,
        pub fail_writes: Arc<AtomicBool>,
    }

    impl DocumentBackend for FlakyBackend {
        fn read(&self) -> k1space::Result<Option<String>> {
            self.inner.read()
        }

        fn write(&self, contents: &str) -> k1space::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(K1Error::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "registry is read-only",
                )));
            }
            self.inner.write(contents)
        }

        fn create_new(&self, contents: &str) -> k1space::Result<bool> {
            self.inner.create_new(contents)
        }

        fn location(&self) -> String {
            self.inner.location()
        }
    }
}

use test_utils::*;

#[test]
fn test_round_trip_zero_one_and_many_configs() {
    let base = Path::new("/home/k1/.ssot/k1space");
    let schema = RecordSchema::default();

    for count in [0usize, 1, 5] {
        let mut doc = RegistryDocument::new(Utc::now());
        for i in 0..count {
            let key = key("civo", &format!("region{}", i), "K1");
            let paths = ArtifactPaths::for_key(base, &key);
            doc.upsert(
                key,
                &flags(&[("cluster-name", &format!("c{}", i)), ("domain-name", "")]),
                &paths,
                &schema,
                Utc::now(),
            );
        }

        let text = doc.to_toml_string().unwrap();
        let loaded = RegistryDocument::from_toml_str(&text).unwrap();
        assert_eq!(loaded, doc, "round trip with {} configs", count);
    }
}

#[test]
fn test_round_trip_keeps_awkward_key_components() {
    let mut doc = RegistryDocument::new(Utc::now());
    let key = key("aws", "us_east_1", "my%prefix");
    let paths = ArtifactPaths::for_key(Path::new("/k1"), &key);
    doc.upsert(key.clone(), &flags(&[("node-type", "t3.large")]), &paths, &RecordSchema::default(), Utc::now());

    let loaded = RegistryDocument::from_toml_str(&doc.to_toml_string().unwrap()).unwrap();
    let record = loaded.get(&key).unwrap();
    assert_eq!(record.flags["node-type"], "t3.large");
    assert_eq!(key.encode(), "aws_us%5Feast%5F1_my%25prefix");
}

#[test]
fn test_load_creates_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let doc = store.load().unwrap();
    assert_eq!(doc.version, 1);
    assert!(doc.configs.is_empty());
    assert!(dir.path().join(".k1space.index.toml").exists());

    // Loading again parses the document that was just created.
    assert_eq!(store.load().unwrap().version, 1);
}

#[test]
fn test_load_normalizes_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".k1space.index.toml");
    std::fs::write(
        &path,
        r#"version = 1
last_updated = "2024-05-01T10:00:00Z"

[configs.civo_lon1_K1]
files = ["'/k1//civo/lon1/K1/.local.cloud.env'", "\"/k1/civo/lon1/K1/00-init.sh\"", "/k1\\civo\\lon1\\K1\\01-kubefirst-cloud.sh"]

[configs.civo_lon1_K1.flags]
cluster-name = "demo"
"#,
    )
    .unwrap();

    let doc = open_store(dir.path()).load().unwrap();
    let record = doc.get(&key("civo", "lon1", "K1")).unwrap();
    assert_eq!(
        record.files,
        [
            "/k1/civo/lon1/K1/.local.cloud.env",
            "/k1/civo/lon1/K1/00-init.sh",
            "/k1/civo/lon1/K1/01-kubefirst-cloud.sh",
        ]
    );
    assert_eq!(record.init_script(), Some("/k1/civo/lon1/K1/00-init.sh"));
}

#[test]
fn test_malformed_document_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".k1space.index.toml");
    std::fs::write(&path, "version = 1\nconfigs = [ unterminated").unwrap();

    let err = open_store(dir.path()).load().unwrap_err();
    assert!(matches!(err, K1Error::Parse { .. }));
    // The file is left for the user to repair.
    assert!(std::fs::read_to_string(&path).unwrap().contains("unterminated"));
}

#[test]
fn test_upsert_same_key_merges() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());
    let key = key("civo", "lon1", "K1");

    store
        .upsert(&key, &flags(&[("cluster-name", "demo"), ("domain-name", "example.com")]))
        .unwrap();
    let doc = store
        .upsert(&key, &flags(&[("cluster-name", "demo2"), ("domain-name", "")]))
        .unwrap();

    assert_eq!(doc.configs.len(), 1);
    let record = doc.get(&key).unwrap();
    assert_eq!(record.flags["cluster-name"], "demo2");
    assert_eq!(record.flags["domain-name"], "example.com");
    assert_eq!(record.files.len(), 3);
    assert!(store.schema().is_well_formed(record));
    assert_eq!(doc.default_values["cluster-name"], "demo2");
    assert_eq!(doc.last_prefix.as_deref(), Some("K1"));
}

#[test]
fn test_remove_unknown_key_leaves_registry_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());
    store
        .upsert(&key("civo", "lon1", "K1"), &flags(&[("cluster-name", "demo")]))
        .unwrap();
    let before = std::fs::read_to_string(dir.path().join(".k1space.index.toml")).unwrap();

    let err = store.remove(&key("civo", "nyc1", "K1")).unwrap_err();
    assert!(matches!(err, K1Error::NotFound { .. }));

    let after = std::fs::read_to_string(dir.path().join(".k1space.index.toml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_failed_delete_restores_backup() {
    let dir = tempfile::tempdir().unwrap();
    let fail_writes = Arc::new(AtomicBool::new(false));
    let store = RegistryStore::new(
        Box::new(FlakyBackend {
            inner: FileBackend::new(dir.path().join(".k1space.index.toml")),
            fail_writes: fail_writes.clone(),
        }),
        dir.path(),
        RecordSchema::default(),
    );
    let workspace = Workspace::new(dir.path());
    let key = key("civo", "lon1", "K1");

    store.upsert(&key, &flags(&[("cluster-name", "demo")])).unwrap();
    let artifact_dir: PathBuf = store.artifact_paths(&key).dir;
    std::fs::create_dir_all(&artifact_dir).unwrap();
    std::fs::write(artifact_dir.join("00-init.sh"), "#!/usr/bin/env bash\n").unwrap();

    fail_writes.store(true, Ordering::SeqCst);
    let err = workspace.delete_configuration(&store, &key).unwrap_err();
    assert!(matches!(err, K1Error::Io(_)));

    assert!(artifact_dir.join("00-init.sh").exists());
    assert!(store.load().unwrap().get(&key).is_some());
    let leftover = workspace.backup_root().join("civo/lon1");
    let backups = std::fs::read_dir(&leftover).map(|d| d.count()).unwrap_or(0);
    assert_eq!(backups, 0);

    fail_writes.store(false, Ordering::SeqCst);
    workspace.delete_configuration(&store, &key).unwrap();
    assert!(!artifact_dir.exists());
    assert!(store.load().unwrap().get(&key).is_none());
}

#[test]
fn test_delete_all() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());
    let workspace = Workspace::new(dir.path());
    for region in ["lon1", "nyc1", "fra1"] {
        store.upsert(&key("civo", region, "K1"), &FlagMap::new()).unwrap();
    }

    let report = workspace.delete_all(&store).unwrap();
    assert_eq!(report.deleted.len(), 3);
    assert!(report.failed.is_none());
    assert!(store.load().unwrap().configs.is_empty());
}

#[test]
fn test_delete_all_reports_deletions_before_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());
    let workspace = Workspace::new(dir.path());
    for region in ["fra1", "lon1", "nyc1"] {
        store.upsert(&key("civo", region, "K1"), &FlagMap::new()).unwrap();
    }

    // A plain file where the lon1 backup directory belongs blocks that delete.
    std::fs::create_dir_all(store.artifact_paths(&key("civo", "lon1", "K1")).dir).unwrap();
    std::fs::create_dir_all(workspace.backup_root().join("civo")).unwrap();
    std::fs::write(workspace.backup_root().join("civo/lon1"), "").unwrap();

    let report = workspace.delete_all(&store).unwrap();
    assert_eq!(report.deleted, [key("civo", "fra1", "K1")]);
    let (failed, err) = report.failed.unwrap();
    assert_eq!(failed, key("civo", "lon1", "K1"));
    assert!(matches!(err, K1Error::Io(_)));

    let doc = store.load().unwrap();
    assert!(doc.get(&key("civo", "fra1", "K1")).is_none());
    assert!(doc.get(&key("civo", "lon1", "K1")).is_some());
    assert!(doc.get(&key("civo", "nyc1", "K1")).is_some());
}

#[test]
fn test_legacy_flat_document_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".k1space.index.toml"),
        r#"last_updated = "2023-01-01T00:00:00Z"

[configs.civo_lon1_K1]
files = ["/k1/civo/lon1/K1/.local.cloud.env", "/k1/civo/lon1/K1/00-init.sh", "/k1/civo/lon1/K1/01-kubefirst-cloud.sh"]
cluster-name = "legacy"
node-count = 3

[default_values]
cloud-region = "lon1"
"#,
    )
    .unwrap();

    let store = open_store(dir.path());
    let doc = store.load().unwrap();
    assert_eq!(doc.version, 1);
    let record = doc.get(&key("civo", "lon1", "K1")).unwrap();
    assert_eq!(record.flags["cluster-name"], "legacy");
    assert_eq!(record.flags["node-count"], "3");
    assert_eq!(doc.default_for("cloud-region"), Some("lon1"));

    // Persisting writes the nested layout.
    store.persist(&doc).unwrap();
    let text = std::fs::read_to_string(dir.path().join(".k1space.index.toml")).unwrap();
    assert!(text.contains("version = 1"));
    assert!(store.load().unwrap().get(&key("civo", "lon1", "K1")).is_some());
}

#[test]
fn test_newer_version_is_rejected() {
    let err = RegistryDocument::from_toml_str(
        "version = 99\nlast_updated = \"2030-01-01T00:00:00Z\"\n",
    )
    .unwrap_err();
    assert!(matches!(err, K1Error::Parse { .. }));
}
