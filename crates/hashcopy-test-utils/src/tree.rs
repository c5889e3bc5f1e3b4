//! [`AssetTree`] builder for publishing scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tempfile::TempDir;

/// A fixed modification time (2024-01-01T00:00:00Z) for deterministic tests.
pub const PINNED_MTIME: i64 = 1_704_067_200;

/// A temporary project directory with helpers for writing sources and
/// inspecting what a pass published.
///
/// # Example
///
/// ```rust,no_run
/// use hashcopy_test_utils::AssetTree;
///
/// let tree = AssetTree::new();
/// tree.write("assets/a.txt", "hello");
/// tree.assert_file_exists("assets/a.txt");
/// ```
pub struct AssetTree {
    temp_dir: TempDir,
}

impl Default for AssetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path for `rel`.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `content` to `rel` and pin its mtime to `secs`.
    pub fn write_at(&self, rel: &str, content: impl AsRef<[u8]>, secs: i64) -> PathBuf {
        let path = self.write(rel, content);
        self.set_mtime(rel, secs);
        path
    }

    /// Set both access and modification time of `rel` to `secs`.
    pub fn set_mtime(&self, rel: &str, secs: i64) {
        let time = FileTime::from_unix_time(secs, 0);
        filetime::set_file_times(self.path(rel), time, time).unwrap();
    }

    /// Modification time of `rel` in whole seconds.
    pub fn mtime(&self, rel: &str) -> i64 {
        let meta = fs::metadata(self.path(rel)).unwrap();
        FileTime::from_last_modification_time(&meta).unix_seconds()
    }

    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Sorted file names directly inside `rel`.
    pub fn file_names(&self, rel: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path(rel))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Parse the manifest at `rel` into its entries.
    pub fn manifest(&self, rel: &str) -> BTreeMap<String, String> {
        serde_json::from_str(&self.read(rel))
            .unwrap_or_else(|e| panic!("Manifest {rel} is not a JSON object of strings: {e}"))
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with the full path if it does not.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}
