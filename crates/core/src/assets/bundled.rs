//! Read-only assets shipped with the installed package.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::AssetPath;
use crate::Error;

/// Source of the install-time copy of an asset.
#[async_trait]
pub trait BundledSource: Send + Sync {
    async fn read_bundled(&self, path: &AssetPath) -> Result<String, Error>;
}

/// Bundle laid out as plain files under an install directory.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BundledSource for DirBundle {
    async fn read_bundled(&self, path: &AssetPath) -> Result<String, Error> {
        let file = path.segments().fold(self.root.clone(), |acc, segment| acc.join(segment));
        tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| Error::Bundle(format!("{path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_bundled_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets/ublock")).unwrap();
        std::fs::write(dir.path().join("assets/ublock/filters.txt"), "||ads.example^").unwrap();

        let bundle = DirBundle::new(dir.path());
        let path = AssetPath::new("assets/ublock/filters.txt").unwrap();
        assert_eq!(bundle.read_bundled(&path).await.unwrap(), "||ads.example^");
    }

    #[tokio::test]
    async fn test_missing_bundled_file() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = DirBundle::new(dir.path());
        let path = AssetPath::new("assets/nope.txt").unwrap();
        assert!(matches!(bundle.read_bundled(&path).await, Err(Error::Bundle(_))));
    }
}
