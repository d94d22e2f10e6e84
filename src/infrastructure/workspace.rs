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

//! Filesystem side of configurations: writing generated artifacts and
//! moving artifact directories to the backup area on delete.

use crate::domain::builder::generator::RenderedArtifacts;
use crate::domain::config::{ConfigurationKey, RegistryDocument};
use crate::infrastructure::constants::{BACKUP_DIR_NAME, ENV_FILE_MODE, SCRIPT_FILE_MODE};
use crate::infrastructure::store::RegistryStore;
use crate::shared::error::K1Error;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of [`Workspace::delete_all`].
#[derive(Debug, Default)]
pub struct DeleteAllReport {
    pub deleted: Vec<ConfigurationKey>,
    pub failed: Option<(ConfigurationKey, K1Error)>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    backup_root: PathBuf,
}

impl Workspace {
    pub fn new(home: &Path) -> Self {
        Self {
            backup_root: home.join(BACKUP_DIR_NAME),
        }
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Writes the three artifacts, creating the configuration directory.
    pub fn write_artifacts(&self, artifacts: &RenderedArtifacts) -> Result<(), K1Error> {
        fs::create_dir_all(&artifacts.paths.dir)?;
        for (path, content, executable) in artifacts.files() {
            fs::write(path, content)?;
            set_mode(path, if executable { SCRIPT_FILE_MODE } else { ENV_FILE_MODE })?;
            tracing::debug!("Wrote {}", path.display());
        }
        Ok(())
    }

    /// Removes a configuration in two phases: its artifact directory is renamed
    /// into the backup area, then the registry entry is dropped. If the registry
    /// write fails the directory is moved back.
    pub fn delete_configuration(
        &self,
        store: &RegistryStore,
        key: &ConfigurationKey,
    ) -> Result<RegistryDocument, K1Error> {
        let doc = store.load()?;
        if doc.get(key).is_none() {
            return Err(K1Error::not_found(key.encode()));
        }

        let dir = store.artifact_paths(key).dir;
        let backup = if dir.exists() {
            let target = self.backup_path(key);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&dir, &target)?;
            tracing::info!("Moved {} to {}", dir.display(), target.display());
            Some(target)
        } else {
            tracing::warn!("Artifact directory {} is missing", dir.display());
            None
        };

        match store.remove(key) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                if let Some(target) = backup {
                    match fs::rename(&target, &dir) {
                        Ok(()) => tracing::info!("Restored {} after failed delete", dir.display()),
                        Err(restore) => tracing::error!(
                            "Failed to restore {} from {}: {}",
                            dir.display(),
                            target.display(),
                            restore
                        ),
                    }
                }
                Err(e)
            }
        }
    }

    /// Deletes every configuration, stopping at the first failure. Deletions
    /// committed before the failure are still reported.
    pub fn delete_all(&self, store: &RegistryStore) -> Result<DeleteAllReport, K1Error> {
        let keys: Vec<ConfigurationKey> = store.load()?.configs.into_keys().collect();
        let mut report = DeleteAllReport::default();
        for key in keys {
            if let Err(e) = self.delete_configuration(store, &key) {
                tracing::error!("Deleting {} failed: {}", key, e);
                report.failed = Some((key, e));
                break;
            }
            report.deleted.push(key);
        }
        Ok(report)
    }

    fn backup_path(&self, key: &ConfigurationKey) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
        self.backup_root
            .join(key.provider())
            .join(key.region())
            .join(format!("{}-{}", key.prefix(), stamp))
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), K1Error> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), K1Error> {
    Ok(())
}
