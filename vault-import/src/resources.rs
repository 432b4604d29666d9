//! Filesystem resource checks
//!
//! The verifier only needs a go/no-go answer per path: a missing file, a
//! directory and a permission error are all reported the same way.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Answers whether a claimed resource path exists and is readable
#[async_trait]
pub trait ResourceChecker: Send + Sync {
    async fn exists(&self, path: &str) -> bool;
}

/// Checks resources on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsResourceChecker {
    base_dir: Option<PathBuf>,
}

impl FsResourceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative batch paths against `base_dir` instead of the
    /// process working directory
    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ResourceChecker for FsResourceChecker {
    async fn exists(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let resolved = self.resolve(path);

        match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => {}
            _ => return false,
        }
        // Existence is not enough: the persistence stage will need to read it
        tokio::fs::File::open(&resolved).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("video.mp4");
        std::fs::write(&file, b"data").unwrap();

        let checker = FsResourceChecker::new();
        assert!(checker.exists(file.to_str().unwrap()).await);
    }

    #[tokio::test]
    async fn test_missing_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let checker = FsResourceChecker::new();

        assert!(!checker.exists(dir.path().join("nope.jpg").to_str().unwrap()).await);
        assert!(!checker.exists(dir.path().to_str().unwrap()).await);
        assert!(!checker.exists("").await);
    }

    #[tokio::test]
    async fn test_relative_path_uses_base_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("covers")).unwrap();
        std::fs::write(dir.path().join("covers/front.jpg"), b"jpg").unwrap();

        let checker = FsResourceChecker::new().with_base_dir(Some(dir.path().to_path_buf()));
        assert!(checker.exists("covers/front.jpg").await);
        assert!(!checker.exists("covers/back.jpg").await);
    }
}
