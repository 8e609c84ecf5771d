//! Tree accessor over a directory on the local filesystem
//!
//! Serves the same path convention as a remote share (`/`-joined segments
//! relative to a root, empty string for the root), which makes it the
//! accessor behind the command-line browser and the integration tests.

use super::backend::{AccessorError, Entry, TreeAccessor};
use async_trait::async_trait;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

#[derive(Debug, Clone)]
pub struct LocalTreeAccessor {
    root: PathBuf,
}

impl LocalTreeAccessor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a tree path onto the local filesystem
    ///
    /// Parent references are refused so a path can never leave the root.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." || segment == "." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Path segment not allowed: {:?}", segment),
                ));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }

    async fn entry_for(dir_entry: &tokio::fs::DirEntry) -> io::Result<Entry> {
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        // Follow symlinks so a link to a directory can be descended into
        let metadata = match tokio::fs::metadata(dir_entry.path()).await {
            Ok(metadata) => metadata,
            Err(_) => dir_entry.metadata().await?,
        };
        let last_modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        let is_hidden = name.starts_with('.');

        let entry = if metadata.is_dir() {
            Entry::directory(name, last_modified)
        } else {
            Entry::file(name, metadata.len(), last_modified)
        };
        Ok(entry.with_hidden(is_hidden))
    }
}

#[async_trait]
impl TreeAccessor for LocalTreeAccessor {
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, AccessorError> {
        let dir = self.resolve(path)?;
        let mut read_dir = tokio::fs::read_dir(&dir).await?;

        let mut entries = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await? {
            match Self::entry_for(&dir_entry).await {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry {:?}: {}", dir_entry.path(), e);
                }
            }
        }

        Ok(entries)
    }

    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, AccessorError> {
        let file_path = self.resolve(path)?;
        let mut file = tokio::fs::File::open(&file_path).await?;
        file.seek(SeekFrom::Start(offset)).await?;

        // `len` may be far larger than the file; let the buffer grow with the data
        let mut buf = Vec::new();
        file.take(len as u64).read_to_end(&mut buf).await?;
        Ok(buf)
    }
}
