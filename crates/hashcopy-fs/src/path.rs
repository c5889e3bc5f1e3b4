//! Normalized path handling for portable manifest entries

use std::path::{Path, PathBuf};

/// Forward-slash path used for manifest keys, manifest values and report
/// entries, so a manifest written on Windows reads the same on Linux.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Backslashes become forward slashes and leading `./` segments are
    /// dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut inner = path.as_ref().to_string_lossy().replace('\\', "/");
        while let Some(rest) = inner.strip_prefix("./") {
            inner = rest.to_string();
        }
        Self { inner }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// True for the empty path and for `.`.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty() || self.inner == "."
    }

    /// Append `segment`. Empty and `.` operands on either side are
    /// identities: `"".join("a.txt")` is `a.txt`.
    pub fn join(&self, segment: &str) -> Self {
        let segment = Self::new(segment);
        match (self.is_empty(), segment.is_empty()) {
            (_, true) => self.clone(),
            (true, false) => segment,
            (false, false) => Self {
                inner: format!("{}/{}", self.inner.trim_end_matches('/'), segment.inner),
            },
        }
    }

    /// Directory part, or `None` for a bare file name.
    pub fn parent(&self) -> Option<Self> {
        let (dir, _) = self.inner.trim_end_matches('/').rsplit_once('/')?;
        let inner = if dir.is_empty() { "/" } else { dir };
        Some(Self {
            inner: inner.to_string(),
        })
    }

    /// Last segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        let name = trimmed.rsplit_once('/').map_or(trimmed, |(_, name)| name);
        (!name.is_empty()).then_some(name)
    }

    /// Same directory, different file name.
    pub fn with_file_name(&self, name: &str) -> Self {
        self.parent()
            .map_or_else(|| Self::new(name), |dir| dir.join(name))
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> serde::Deserialize<'de> for NormalizedPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
