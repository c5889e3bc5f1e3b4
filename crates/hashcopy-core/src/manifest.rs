//! The persistent logical -> published path mapping
//!
//! The manifest is a flat JSON object. It is loaded at the start of every
//! pass, updated in memory, and written back only when its serialized
//! form differs from the one it was loaded with, so an unchanged pass
//! leaves both the bytes and the modification time of the file alone.

use std::collections::BTreeMap;
use std::path::Path;

use hashcopy_fs::{NormalizedPath, io};

use crate::{Error, Result};

/// Outcome of [`AssetManifest::persist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ManifestWrite {
    /// Content changed and was written
    Written { size_bytes: u64 },
    /// Content unchanged; the existing file was left alone
    Unchanged { size_bytes: u64 },
    /// Content unchanged and no file exists
    Absent,
}

/// Logical asset paths mapped to their currently published paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
    /// Compact serialization taken at load time
    snapshot: String,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetManifest {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            snapshot: "{}".to_string(),
        }
    }

    /// Load the manifest at `path`, or an empty one if no file exists.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(manifest = %path.display(), "No manifest yet; starting empty");
            return Ok(Self::new());
        }
        let text = io::read_text(path)?;
        Self::parse(&text, path)
    }

    /// Parse manifest JSON read from `path`.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|e| Error::ManifestParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let snapshot = serde_json::to_string(&entries)?;
        Ok(Self { entries, snapshot })
    }

    /// Point `logical` at `published`, returning the previous target.
    pub fn insert(&mut self, logical: &NormalizedPath, published: &NormalizedPath) -> Option<String> {
        self.entries
            .insert(logical.as_str().to_string(), published.as_str().to_string())
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries
            .get(NormalizedPath::new(logical).as_str())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when the content differs from what was loaded.
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(serde_json::to_string(&self.entries)? != self.snapshot)
    }

    /// On-disk form: pretty-printed with two-space indentation.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Write to `path` if the content changed since load.
    ///
    /// After a write the current content becomes the new snapshot.
    pub fn persist(&mut self, path: &Path) -> Result<ManifestWrite> {
        if !self.is_dirty()? {
            if !path.exists() {
                return Ok(ManifestWrite::Absent);
            }
            return Ok(ManifestWrite::Unchanged {
                size_bytes: io::file_size(path)?,
            });
        }

        let pretty = self.to_pretty_json()?;
        io::write_atomic(path, pretty.as_bytes())?;
        self.snapshot = serde_json::to_string(&self.entries)?;
        tracing::debug!(manifest = %path.display(), entries = self.entries.len(), "Manifest written");

        Ok(ManifestWrite::Written {
            size_bytes: pretty.len() as u64,
        })
    }
}
