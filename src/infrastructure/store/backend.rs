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
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Whole-document storage used by the registry and catalog stores.
///
/// Callers own the single-writer guarantee: there is no locking and no
/// version check between `read` and `write`.
pub trait DocumentBackend: Send + Sync {
    /// `Ok(None)` when the document does not exist yet.
    fn read(&self) -> Result<Option<String>, K1Error>;

    /// Replaces the whole document.
    fn write(&self, contents: &str) -> Result<(), K1Error>;

    /// Creates the document only if it does not exist. Returns `false` when it
    /// was already present.
    fn create_new(&self, contents: &str) -> Result<bool, K1Error>;

    fn location(&self) -> String;
}

/// A document on the local filesystem.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<(), K1Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl DocumentBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, K1Error> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), K1Error> {
        self.ensure_parent()?;
        let tmp = self.temp_path();
        fs::write(&tmp, contents)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn create_new(&self, contents: &str) -> Result<bool, K1Error> {
        use std::io::Write;

        self.ensure_parent()?;
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                file.sync_all()?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("absent.toml"));
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn test_write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested/doc.toml"));
        backend.write("a = 1\n").unwrap();
        backend.write("a = 2\n").unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some("a = 2\n"));
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_create_new_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("doc.toml"));
        assert!(backend.create_new("first = true\n").unwrap());
        assert!(!backend.create_new("second = true\n").unwrap());
        assert_eq!(backend.read().unwrap().as_deref(), Some("first = true\n"));
    }
}
