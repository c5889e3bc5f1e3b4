//! Publishing assets under content-derived names
//!
//! For each task the publisher fingerprints the source, derives the output
//! file name and decides between copying and skipping. An existing output
//! is only rewritten when its modification time no longer matches the
//! source's. Sourcemap twins follow their primary asset and carry the
//! primary's fingerprint so the pair stays correlated.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use hashcopy_fs::{NormalizedPath, io};

use crate::Result;
use crate::config::SourcemapMode;
use crate::fingerprint::FingerprintFunction;
use crate::resolver::{Task, TaskSet};

const MAP_EXTENSION: &str = "map";

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishDecision {
    /// Output did not exist and was copied
    Created,
    /// Output existed with a drifted timestamp and was overwritten
    Healed,
    /// Output existed with the source's timestamp; nothing written
    Unchanged,
}

impl PublishDecision {
    pub fn was_written(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// One file published (or confirmed current) during a pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PublishedArtifact {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Manifest key
    pub logical: NormalizedPath,
    /// Manifest value: the logical directory joined with the output name
    pub published: NormalizedPath,
    pub size_bytes: u64,
    pub decision: PublishDecision,
    /// True for a sourcemap published alongside its primary asset
    pub twin: bool,
}

impl PublishedArtifact {
    pub fn was_written(&self) -> bool {
        self.decision.was_written()
    }
}

/// `<stem>-<fingerprint><ext>`, or `<stem><ext>` without a fingerprint.
///
/// The extension is the last one only: `app.min.js` has stem `app.min`.
pub fn output_file_name(source: &Path, fingerprint: Option<&str>) -> String {
    let stem = source
        .file_stem()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    match fingerprint {
        Some(hash) => format!("{stem}-{hash}{ext}"),
        None => format!("{stem}{ext}"),
    }
}

/// Copy `source` to `output` unless `output` is already current.
///
/// An output counts as current when it exists and its modification time
/// equals the source's at millisecond resolution. Every copy gives the
/// output the source's timestamps.
pub fn publish_file(source: &Path, output: &Path) -> Result<PublishDecision> {
    if !output.exists() {
        io::copy_preserving_mtime(source, output)?;
        return Ok(PublishDecision::Created);
    }

    let source_mtime = io::modified_time(source)?;
    let output_mtime = io::modified_time(output)?;
    if same_millisecond(source_mtime, output_mtime) {
        return Ok(PublishDecision::Unchanged);
    }

    io::copy_preserving_mtime(source, output)?;
    Ok(PublishDecision::Healed)
}

fn same_millisecond(a: FileTime, b: FileTime) -> bool {
    millis(a) == millis(b)
}

fn millis(time: FileTime) -> i128 {
    i128::from(time.unix_seconds()) * 1000 + i128::from(time.nanoseconds() / 1_000_000)
}

fn is_sourcemap(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(MAP_EXTENSION))
}

/// `x.js.map` -> `x.js`
fn primary_of(map: &Path) -> PathBuf {
    map.with_extension("")
}

/// `x.js` -> `x.js.map`
fn twin_of(path: &Path) -> PathBuf {
    let mut twin = path.as_os_str().to_owned();
    twin.push(".");
    twin.push(MAP_EXTENSION);
    PathBuf::from(twin)
}

/// Decides and performs the filesystem work for each task.
pub struct Publisher<'a> {
    fingerprint: &'a dyn FingerprintFunction,
    hashed_names: bool,
    sourcemap: SourcemapMode,
}

impl<'a> Publisher<'a> {
    pub fn new(
        fingerprint: &'a dyn FingerprintFunction,
        hashed_names: bool,
        sourcemap: SourcemapMode,
    ) -> Self {
        Self {
            fingerprint,
            hashed_names,
            sourcemap,
        }
    }

    fn file_name_for(&self, source: &Path, bytes: &[u8]) -> String {
        if self.hashed_names {
            let hash = self.fingerprint.fingerprint(bytes);
            output_file_name(source, Some(&hash))
        } else {
            output_file_name(source, None)
        }
    }

    /// Publish one task and, where the sourcemap mode calls for it, its
    /// sourcemap twin.
    ///
    /// Errors on the task's own file abort; errors on the twin are logged
    /// and dropped.
    pub fn publish(&self, task: &Task, tasks: &TaskSet) -> Result<Vec<PublishedArtifact>> {
        if is_sourcemap(&task.source) {
            return self.publish_sourcemap(task, tasks);
        }

        let bytes = io::read_bytes(&task.source)?;
        let file_name = self.file_name_for(&task.source, &bytes);
        let primary = self.publish_one(
            &task.source,
            &task.output_dir,
            &task.logical,
            file_name.clone(),
            false,
        )?;

        let mut artifacts = vec![primary];
        if self.sourcemap.emits_separate_file() {
            let twin_source = twin_of(&task.source);
            let twin_logical = NormalizedPath::new(format!("{}.{MAP_EXTENSION}", task.logical));
            let twin_name = format!("{file_name}.{MAP_EXTENSION}");
            match self.publish_one(&twin_source, &task.output_dir, &twin_logical, twin_name, true) {
                Ok(twin) => artifacts.push(twin),
                Err(e) => {
                    tracing::debug!(twin = %twin_source.display(), error = %e, "Sourcemap twin not published");
                }
            }
        }
        Ok(artifacts)
    }

    /// A matched `.map` file. Its primary, when present, lends its
    /// fingerprint; when the primary is itself a task it publishes the map.
    fn publish_sourcemap(&self, task: &Task, tasks: &TaskSet) -> Result<Vec<PublishedArtifact>> {
        if !self.sourcemap.emits_separate_file() {
            tracing::debug!(source = %task.source.display(), mode = %self.sourcemap, "Skipping sourcemap");
            return Ok(Vec::new());
        }

        let primary = primary_of(&task.source);
        if tasks.contains_source(&primary) {
            return Ok(Vec::new());
        }

        let file_name = if primary.is_file() {
            let bytes = io::read_bytes(&primary)?;
            format!("{}.{MAP_EXTENSION}", self.file_name_for(&primary, &bytes))
        } else {
            let bytes = io::read_bytes(&task.source)?;
            self.file_name_for(&task.source, &bytes)
        };

        let artifact = self.publish_one(
            &task.source,
            &task.output_dir,
            &task.logical,
            file_name,
            false,
        )?;
        Ok(vec![artifact])
    }

    fn publish_one(
        &self,
        source: &Path,
        output_dir: &Path,
        logical: &NormalizedPath,
        file_name: String,
        twin: bool,
    ) -> Result<PublishedArtifact> {
        let output = output_dir.join(&file_name);
        let decision = publish_file(source, &output)?;
        let size_bytes = io::file_size(&output)?;
        tracing::debug!(
            source = %source.display(),
            output = %output.display(),
            ?decision,
            "Published"
        );

        Ok(PublishedArtifact {
            source: source.to_path_buf(),
            output,
            logical: logical.clone(),
            published: logical.with_file_name(&file_name),
            size_bytes,
            decision,
            twin,
        })
    }
}
