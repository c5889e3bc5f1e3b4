//! Turning configured patterns into publishing tasks
//!
//! Each pattern is expanded by a [`Matcher`]. Every matched file becomes a
//! [`Task`] with its logical path (relative to the pattern's context) and
//! the output directory it publishes into. Output directories are created
//! here, before any copy happens.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use hashcopy_fs::{NormalizedPath, io};

use crate::config::{Pattern, PublishOptions};
use crate::{Error, Result};

/// Expands a glob into the files it matches.
pub trait Matcher {
    /// Matched files in a stable order. Directories are never returned.
    fn find(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// Filesystem matcher backed by the `glob` crate.
///
/// `*` does not cross directory separators and does not match a leading
/// dot; `**` recurses.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    options: glob::MatchOptions,
}

impl Default for GlobMatcher {
    fn default() -> Self {
        Self {
            options: glob::MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: true,
            },
        }
    }
}

impl GlobMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also match dotfiles with `*`.
    pub fn with_dotfiles(mut self) -> Self {
        self.options.require_literal_leading_dot = false;
        self
    }
}

impl Matcher for GlobMatcher {
    fn find(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob_with(pattern, self.options).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                hashcopy_fs::Error::io(path, e.into_error())
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// One matched file scheduled for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub source: PathBuf,
    /// Path relative to the pattern's context; the manifest key
    pub logical: NormalizedPath,
    pub output_dir: PathBuf,
}

/// Tasks of one pass, keyed by source path.
///
/// When two patterns match the same source, the later one wins.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: BTreeMap<PathBuf, Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing any earlier task for the same source.
    pub fn insert(&mut self, task: Task) -> Option<Task> {
        self.tasks.insert(task.source.clone(), task)
    }

    pub fn get(&self, source: &Path) -> Option<&Task> {
        self.tasks.get(source)
    }

    pub fn contains_source(&self, source: &Path) -> bool {
        self.tasks.contains_key(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Glob for a pattern: the escaped search root followed by `from`.
///
/// The root is escaped so that bracket characters in directory names are
/// taken literally.
pub fn search_glob(search_root: &Path, from: &str) -> String {
    let root = glob::Pattern::escape(&search_root.to_string_lossy());
    if from.is_empty() {
        return root;
    }
    if root.is_empty() || root.ends_with('/') {
        format!("{root}{from}")
    } else {
        format!("{root}/{from}")
    }
}

/// Drop `.` components so `./assets/` and `assets` compare equal.
///
/// `glob` reports matches without a leading `./`, so roots and matches
/// are both reduced to this form before one is stripped from the other.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Resolve every pattern into tasks and create their output directories.
///
/// `working_dir` anchors relative contexts; `destination` is the build's
/// output root joined with the root `to`. Fails on the first pattern that
/// matches nothing.
pub fn resolve_tasks(
    options: &PublishOptions,
    working_dir: &Path,
    destination: &Path,
    matcher: &dyn Matcher,
) -> Result<TaskSet> {
    if options.patterns.is_empty() {
        tracing::warn!("No patterns configured; nothing will be published");
    }

    let mut tasks = TaskSet::new();
    for pattern in &options.patterns {
        resolve_pattern(pattern, options, working_dir, destination, matcher, &mut tasks)?;
    }
    Ok(tasks)
}

fn resolve_pattern(
    pattern: &Pattern,
    options: &PublishOptions,
    working_dir: &Path,
    destination: &Path,
    matcher: &dyn Matcher,
    tasks: &mut TaskSet,
) -> Result<()> {
    let search_root = without_cur_dir(
        &working_dir.join(&options.context).join(&pattern.context),
    );
    let glob = search_glob(&search_root, &pattern.from);
    tracing::debug!(%glob, "Matching pattern");

    let files = matcher.find(&glob)?;
    if files.is_empty() {
        return Err(Error::NoFilesMatched {
            pattern: pattern.from.clone(),
        });
    }
    tracing::debug!(count = files.len(), from = %pattern.from, "Pattern matched");

    for file in files {
        let relative = without_cur_dir(&file)
            .strip_prefix(&search_root)
            .map_err(|_| Error::OutsideContext {
                path: file.clone(),
                context: search_root.clone(),
            })?
            .to_path_buf();

        let mut output_dir = destination.join(&pattern.to);
        if let Some(dir) = relative.parent() {
            output_dir.push(dir);
        }
        io::ensure_dir(&output_dir)?;

        tasks.insert(Task {
            logical: NormalizedPath::new(&relative),
            source: file,
            output_dir,
        });
    }
    Ok(())
}
