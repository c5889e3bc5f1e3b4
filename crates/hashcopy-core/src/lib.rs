//! Post-build asset publishing with content fingerprints
//!
//! Given files produced or referenced by a build, this crate:
//!
//! - **fingerprints** each file's bytes into a short digest,
//! - **publishes** it as `<name>-<fingerprint><ext>` unless the published
//!   copy is already current (judged by modification time),
//! - **synchronizes** a JSON manifest mapping logical paths to published
//!   paths, writing it only when it changed,
//! - **reports** every file touched, with its size, to a [`ReportSink`].
//!
//! # Architecture
//!
//! ```text
//!   PublishOptions + BuildContext
//!              |
//!        Pass::prepare ---- Matcher ----> TaskSet (+ output dirs)
//!              |
//!   PreparedPass::finish(BuildOutcome)
//!              |
//!     Publisher (FingerprintFunction) -> PublishedArtifact
//!              |
//!        AssetManifest ----> ReportSink
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hashcopy_core::{BuildContext, BuildOutcome, Pass, PublishOptions, TracingReportSink};
//!
//! let options = PublishOptions::new(["img/*.png"]).with_context("assets");
//! let build = BuildContext::new("/srv/site").with_outdir("dist");
//! let outcome = Pass::run(options, build, &BuildOutcome::success(), &mut TracingReportSink)?;
//! # Ok::<(), hashcopy_core::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod pass;
pub mod publisher;
pub mod report;
pub mod resolver;

pub use config::{
    BuildContext, MANIFEST_DEFAULT, ManifestLocation, ManifestPathResolver, ManifestTemplate,
    Pattern, PatternSpec, PublishOptions, SourcemapMode,
};
pub use error::{Error, Result};
pub use fingerprint::{
    Alphabet, BASE36, FingerprintFunction, HashAlgorithm, Xxh3Fingerprint, Xxh64Fingerprint,
    default_fingerprint, encode_base,
};
pub use manifest::{AssetManifest, ManifestWrite};
pub use pass::{BuildOutcome, Pass, PassOutcome, PassSummary, PreparedPass, manifest_path};
pub use publisher::{PublishDecision, PublishedArtifact, Publisher, output_file_name};
pub use report::{
    CollectingReportSink, NullReportSink, ReportEntry, ReportSink, SizeReport, TracingReportSink,
    human_size,
};
pub use resolver::{GlobMatcher, Matcher, Task, TaskSet, resolve_tasks};
