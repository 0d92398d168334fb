use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::url::StorageKey;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Filesystem store rooted at a fixed output directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    extension: String,
}

impl FsStore {
    /// Creates a store writing `<root>/<key>.<extension>`
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output root if it is missing
    pub fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })
    }
}

impl PageStore for FsStore {
    fn write(&mut self, key: &StorageKey, markup: &[u8]) -> StorageResult<PathBuf> {
        let relative = key.relative_path(&self.extension);

        // Keys come from URL path segments; refuse anything that would
        // leave the output root.
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let path = self.root.join(relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, markup).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(key = %key, path = %path.display(), bytes = markup.len(), "Wrote page");

        Ok(path)
    }

    fn location(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.relative_path(&self.extension))
    }
}
