//! Hierarchical asset paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A hierarchical, `/`-separated asset identifier such as
/// `assets/ublock/filters.txt`.
///
/// Construction rejects absolute paths, empty segments and `.`/`..`
/// segments, so a path can always be joined onto a bundle root safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    pub fn new(path: impl Into<String>) -> Result<Self, Error> {
        let path = path.into();

        if path.is_empty() {
            return Err(Error::Package("asset path is empty".into()));
        }
        if path.contains(['\\', '\0']) {
            return Err(Error::Package(format!("asset path contains a forbidden character: {path:?}")));
        }
        for segment in path.split('/') {
            match segment {
                "" => return Err(Error::Package(format!("asset path has an empty segment: {path:?}"))),
                "." | ".." => return Err(Error::Package(format!("asset path is not normalized: {path:?}"))),
                _ => {}
            }
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Structural prefix test: `assets/user` contains `assets/user/filters.txt`
    /// but not `assets/username.txt` or `assets/ublock/user/x.txt`.
    pub fn starts_with(&self, prefix: &AssetPath) -> bool {
        let mut own = self.segments();
        prefix.segments().all(|p| own.next() == Some(p))
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AssetPath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
