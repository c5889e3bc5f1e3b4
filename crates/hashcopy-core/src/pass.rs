//! One publishing pass, split along a build tool's lifecycle
//!
//! [`Pass::prepare`] runs when the build is configured: it resolves the
//! manifest location and the task set and creates output directories.
//! [`PreparedPass::finish`] runs when the build has completed. It does
//! nothing if the build reported errors; otherwise it publishes every
//! task, merges the manifest and reports sizes.

use std::path::{Path, PathBuf};

use hashcopy_fs::NormalizedPath;
use serde::Serialize;

use crate::Result;
use crate::config::{BuildContext, PublishOptions};
use crate::manifest::{AssetManifest, ManifestWrite};
use crate::publisher::{PublishedArtifact, Publisher};
use crate::report::{ReportSink, SizeReport};
use crate::resolver::{GlobMatcher, Matcher, TaskSet, resolve_tasks};

/// Result of the upstream build, as far as the engine cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    pub errors: Vec<String>,
}

impl BuildOutcome {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(errors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Everything a completed pass did.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub artifacts: Vec<PublishedArtifact>,
    pub report: SizeReport,
    pub manifest_path: PathBuf,
    pub manifest_write: ManifestWrite,
}

impl PassSummary {
    pub fn written_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.was_written()).count()
    }
}

/// How a call to [`PreparedPass::finish`] ended.
#[derive(Debug, Clone)]
pub enum PassOutcome {
    /// The build had errors; nothing was copied and the manifest was not touched
    Skipped { build_errors: usize },
    Completed(PassSummary),
}

impl PassOutcome {
    pub fn summary(&self) -> Option<&PassSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            Self::Skipped { .. } => None,
        }
    }
}

/// Where the manifest lives for this build: the destination root joined
/// with the resolved manifest location.
pub fn manifest_path(options: &PublishOptions, build: &BuildContext) -> Result<PathBuf> {
    let relative = options.manifest.resolve(build)?;
    Ok(build.output_root()?.join(&options.to).join(relative))
}

/// Entry point for a publishing pass.
pub struct Pass;

impl Pass {
    /// Configuration phase: validate, resolve tasks, create directories.
    ///
    /// The manifest location is checked first, so a malformed manifest
    /// option fails before any directory is created.
    pub fn prepare(
        options: PublishOptions,
        build: BuildContext,
        matcher: &dyn Matcher,
    ) -> Result<PreparedPass> {
        let manifest_path = manifest_path(&options, &build)?;
        let destination = build.output_root()?.join(&options.to);

        let tasks = resolve_tasks(&options, &build.working_dir, &destination, matcher)?;
        tracing::debug!(
            tasks = tasks.len(),
            manifest = %manifest_path.display(),
            "Pass prepared"
        );

        Ok(PreparedPass {
            options,
            build,
            manifest_path,
            tasks,
        })
    }

    /// Prepare with the glob matcher and finish against `outcome`.
    pub fn run(
        options: PublishOptions,
        build: BuildContext,
        outcome: &BuildOutcome,
        sink: &mut dyn ReportSink,
    ) -> Result<PassOutcome> {
        Self::prepare(options, build, &GlobMatcher::new())?.finish(outcome, sink)
    }
}

/// A pass whose tasks are resolved, waiting for the build to complete.
#[derive(Debug)]
pub struct PreparedPass {
    options: PublishOptions,
    build: BuildContext,
    manifest_path: PathBuf,
    tasks: TaskSet,
}

impl PreparedPass {
    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn build(&self) -> &BuildContext {
        &self.build
    }

    /// Completion phase. May be called once per build of a long-running
    /// host; the manifest is reloaded from disk every time.
    pub fn finish(&self, outcome: &BuildOutcome, sink: &mut dyn ReportSink) -> Result<PassOutcome> {
        if outcome.has_errors() {
            tracing::info!(
                errors = outcome.errors.len(),
                "Build reported errors; skipping asset publishing"
            );
            return Ok(PassOutcome::Skipped {
                build_errors: outcome.errors.len(),
            });
        }

        let mut manifest = AssetManifest::load(&self.manifest_path)?;
        let publisher = Publisher::new(
            self.options.fingerprint.as_ref(),
            self.options.add_hashes_to_file_names,
            self.build.sourcemap,
        );

        let mut artifacts = Vec::new();
        let mut report = SizeReport::new();
        for task in self.tasks.iter() {
            for artifact in publisher.publish(task, &self.tasks)? {
                let shown = self.display_path(&artifact.output);
                if artifact.was_written() {
                    report.record_written(shown, artifact.size_bytes);
                } else {
                    report.record_unchanged(shown, artifact.size_bytes);
                }
                manifest.insert(&artifact.logical, &artifact.published);
                artifacts.push(artifact);
            }
        }

        let manifest_write = manifest.persist(&self.manifest_path)?;
        let shown = self.display_path(&self.manifest_path);
        match manifest_write {
            ManifestWrite::Written { size_bytes } => report.record_written(shown, size_bytes),
            ManifestWrite::Unchanged { size_bytes } => report.record_unchanged(shown, size_bytes),
            ManifestWrite::Absent => {}
        }

        sink.report(&self.build.format_label(), &report);

        let summary = PassSummary {
            artifacts,
            report,
            manifest_path: self.manifest_path.clone(),
            manifest_write,
        };
        tracing::info!(
            published = summary.artifacts.len(),
            written = summary.written_count(),
            "Pass complete"
        );
        Ok(PassOutcome::Completed(summary))
    }

    /// Paths under the working directory are reported relative to it.
    fn display_path(&self, path: &Path) -> NormalizedPath {
        let relative = path.strip_prefix(&self.build.working_dir).unwrap_or(path);
        NormalizedPath::new(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::report::CollectingReportSink;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/a.txt"), "hello").unwrap();
        temp
    }

    fn build(temp: &TempDir) -> BuildContext {
        BuildContext::new(temp.path()).with_outdir("dist")
    }

    #[test]
    fn empty_manifest_path_fails_before_directories_exist() {
        let temp = project();
        let options = PublishOptions::new(["*.txt"])
            .with_context("assets")
            .with_to("static")
            .with_manifest("");

        let err = Pass::prepare(options, build(&temp), &GlobMatcher::new()).unwrap_err();

        assert!(matches!(err, Error::EmptyManifestPath));
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    fn build_errors_skip_publishing() {
        let temp = project();
        let options = PublishOptions::new(["*.txt"]).with_context("assets");
        let prepared = Pass::prepare(options, build(&temp), &GlobMatcher::new()).unwrap();
        let mut sink = CollectingReportSink::default();

        let outcome = prepared
            .finish(&BuildOutcome::failed(["Unterminated string literal"]), &mut sink)
            .unwrap();

        assert!(matches!(outcome, PassOutcome::Skipped { build_errors: 1 }));
        assert!(temp.path().join("dist").is_dir(), "directories come from prepare");
        assert!(!prepared.manifest_path().exists());
        assert_eq!(fs::read_dir(temp.path().join("dist")).unwrap().count(), 0);
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn completed_pass_reports_relative_paths_with_format_label() {
        let temp = project();
        let options = PublishOptions::new(["*.txt"])
            .with_context("assets")
            .with_hashed_names(false);
        let mut sink = CollectingReportSink::default();

        let outcome = Pass::run(
            options,
            build(&temp).with_format("\"esm\""),
            &BuildOutcome::success(),
            &mut sink,
        )
        .unwrap();

        let summary = outcome.summary().unwrap();
        assert_eq!(summary.artifacts.len(), 1);
        assert!(matches!(summary.manifest_write, ManifestWrite::Written { .. }));
        let (format, report) = &sink.reports[0];
        assert_eq!(format, "ESM");
        let keys: Vec<String> = report.entries().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["dist/a.txt", "dist/manifest.json"]);
    }

    #[test]
    fn empty_error_list_counts_as_success() {
        let temp = project();
        let options = PublishOptions::new(["*.txt"]).with_context("assets");
        let prepared = Pass::prepare(options, build(&temp), &GlobMatcher::new()).unwrap();
        let outcome = BuildOutcome::failed(Vec::<String>::new());
        assert_eq!(outcome, BuildOutcome::success());

        let finished = prepared
            .finish(&outcome, &mut CollectingReportSink::default())
            .unwrap();

        assert_eq!(finished.summary().unwrap().written_count(), 1);
    }

    #[test]
    fn finish_can_run_for_successive_builds() {
        let temp = project();
        let options = PublishOptions::new(["*.txt"]).with_context("assets");
        let prepared = Pass::prepare(options, build(&temp), &GlobMatcher::new()).unwrap();
        let mut sink = CollectingReportSink::default();

        prepared.finish(&BuildOutcome::success(), &mut sink).unwrap();
        let second = prepared.finish(&BuildOutcome::success(), &mut sink).unwrap();

        let summary = second.summary().unwrap();
        assert_eq!(summary.written_count(), 0);
        assert!(matches!(summary.manifest_write, ManifestWrite::Unchanged { .. }));
        assert!(sink.reports[1].1.written().next().is_none());
    }
}
