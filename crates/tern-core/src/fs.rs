//! File access used by the compiler and plugins.
//!
//! The compiler never touches `std::fs` directly. [`NativeFileSystem`] reads
//! the real disk on the blocking pool; [`MemoryFileSystem`] keeps files in
//! memory for tests and embedders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error on {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("blocking task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub is_file: bool,
}

#[async_trait]
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    async fn read_file(&self, path: &Path) -> FsResult<Vec<u8>>;

    async fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    async fn metadata(&self, path: &Path) -> FsResult<FileMetadata>;

    /// Create `path` and all missing parents.
    async fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    async fn read_to_string(&self, path: &Path) -> FsResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes).map_err(|e| FsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFileSystem;

async fn blocking<T, F>(path: &Path, f: F) -> FsResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> std::io::Result<T> + Send + 'static,
{
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        f(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FsError::FileNotFound(path.clone())
            } else {
                FsError::Io {
                    path: path.clone(),
                    message: e.to_string(),
                }
            }
        })
    })
    .await
    .map_err(|e| FsError::Join(e.to_string()))?
}

#[async_trait]
impl FileSystem for NativeFileSystem {
    async fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        blocking(path, |p| std::fs::read(p)).await
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        let content = content.to_vec();
        blocking(path, move |p| std::fs::write(p, content)).await
    }

    async fn metadata(&self, path: &Path) -> FsResult<FileMetadata> {
        blocking(path, |p| {
            let metadata = std::fs::metadata(p)?;
            Ok(FileMetadata {
                size: metadata.len(),
                is_file: metadata.is_file(),
            })
        })
        .await
    }

    async fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        blocking(path, |p| std::fs::create_dir_all(p)).await
    }
}

/// In-memory files keyed by cleaned absolute path.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
    cwd: PathBuf,
}

impl MemoryFileSystem {
    /// Relative paths are resolved against `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            files: Arc::new(RwLock::new(FxHashMap::default())),
            cwd: cwd.into(),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let key = self.normalize(path.as_ref());
        self.files.write().insert(key, content.into());
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.read().contains_key(&self.normalize(path.as_ref()))
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        let key = self.normalize(path);
        self.files
            .read()
            .get(&key)
            .cloned()
            .ok_or(FsError::FileNotFound(key))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        self.add_file(path, content);
        Ok(())
    }

    async fn metadata(&self, path: &Path) -> FsResult<FileMetadata> {
        let key = self.normalize(path);
        self.files
            .read()
            .get(&key)
            .map(|content| FileMetadata {
                size: content.len() as u64,
                is_file: true,
            })
            .ok_or(FsError::FileNotFound(key))
    }

    async fn create_dir_all(&self, _path: &Path) -> FsResult<()> {
        Ok(())
    }
}
