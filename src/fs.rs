//! File system seam used by the static exporter.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Abstraction over the writes the exporter performs.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Creates `path` and any missing parents.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Replaces the contents of `path`, creating the file if needed.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;

    /// Regular files directly inside `dir`, sorted by name.
    async fn list_files(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>>;

    /// Copies `from` to `to`, returning the number of bytes copied.
    async fn copy_file(&self, from: &Path, to: &Path) -> std::io::Result<u64>;
}

/// Default file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn list_files(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> std::io::Result<u64> {
        tokio::fs::copy(from, to).await
    }
}
