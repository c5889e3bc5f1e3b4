//! Engine options and the context a host build provides
//!
//! Patterns may arrive as bare glob strings or as `{context, from, to}`
//! objects; both are normalized into [`Pattern`] right away.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fingerprint::{FingerprintFunction, default_fingerprint};
use crate::{Error, Result};

/// Manifest file name used when none is configured.
pub const MANIFEST_DEFAULT: &str = "manifest.json";

/// A pattern as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    /// Bare glob, relative to the root context
    Glob(String),
    /// Glob with its own context and destination suffix
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<PathBuf>,
        from: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PathBuf>,
    },
}

/// Canonical pattern form. Absent parts are empty paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    pub context: PathBuf,
    pub from: String,
    pub to: PathBuf,
}

impl Pattern {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<PathBuf>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_to(mut self, to: impl Into<PathBuf>) -> Self {
        self.to = to.into();
        self
    }
}

impl From<PatternSpec> for Pattern {
    fn from(spec: PatternSpec) -> Self {
        match spec {
            PatternSpec::Glob(from) => Self::new(from),
            PatternSpec::Object { context, from, to } => Self {
                context: context.unwrap_or_default(),
                from,
                to: to.unwrap_or_default(),
            },
        }
    }
}

impl From<&str> for Pattern {
    fn from(from: &str) -> Self {
        Self::new(from)
    }
}

impl From<String> for Pattern {
    fn from(from: String) -> Self {
        Self::new(from)
    }
}

/// How the host build emits sourcemaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SourcemapSetting", into = "SourcemapSetting")]
pub enum SourcemapMode {
    /// `false`: no sourcemaps
    #[default]
    Disabled,
    /// `true`: separate map files, linked from the asset
    Enabled,
    /// Map embedded in the asset; no separate file
    Inline,
    /// Separate map files without a link comment
    External,
    /// Separate map files with a link comment
    Linked,
    /// Inline and external at once
    Both,
}

impl SourcemapMode {
    /// True when the build leaves a `<asset>.map` file next to the asset.
    pub fn emits_separate_file(self) -> bool {
        matches!(
            self,
            Self::Enabled | Self::External | Self::Linked | Self::Both
        )
    }
}

impl fmt::Display for SourcemapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disabled => "false",
            Self::Enabled => "true",
            Self::Inline => "inline",
            Self::External => "external",
            Self::Linked => "linked",
            Self::Both => "both",
        };
        f.write_str(name)
    }
}

impl FromStr for SourcemapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "false" | "none" | "off" => Ok(Self::Disabled),
            "true" => Ok(Self::Enabled),
            "inline" => Ok(Self::Inline),
            "external" => Ok(Self::External),
            "linked" => Ok(Self::Linked),
            "both" => Ok(Self::Both),
            _ => Err(Error::InvalidSourcemapMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Serialized shape of a sourcemap setting: a flag or a mode name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourcemapSetting {
    Flag(bool),
    Mode(String),
}

impl TryFrom<SourcemapSetting> for SourcemapMode {
    type Error = Error;

    fn try_from(setting: SourcemapSetting) -> Result<Self> {
        match setting {
            SourcemapSetting::Flag(true) => Ok(Self::Enabled),
            SourcemapSetting::Flag(false) => Ok(Self::Disabled),
            SourcemapSetting::Mode(mode) => mode.parse(),
        }
    }
}

impl From<SourcemapMode> for SourcemapSetting {
    fn from(mode: SourcemapMode) -> Self {
        match mode {
            SourcemapMode::Disabled => Self::Flag(false),
            SourcemapMode::Enabled => Self::Flag(true),
            other => Self::Mode(other.to_string()),
        }
    }
}

/// What the host build tells the engine about itself.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    /// Directory relative paths resolve against
    pub working_dir: PathBuf,
    pub outdir: Option<PathBuf>,
    /// Used for the output root when `outdir` is absent
    pub outfile: Option<PathBuf>,
    pub sourcemap: SourcemapMode,
    /// Output format name, e.g. `esm` or `cjs`
    pub format: Option<String>,
}

impl BuildContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    pub fn with_outfile(mut self, outfile: impl Into<PathBuf>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }

    pub fn with_sourcemap(mut self, sourcemap: SourcemapMode) -> Self {
        self.sourcemap = sourcemap;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Directory the build writes into: `outdir`, or the directory of
    /// `outfile`, resolved against `working_dir`.
    pub fn output_root(&self) -> Result<PathBuf> {
        let root = match (&self.outdir, &self.outfile) {
            (Some(outdir), _) => outdir.clone(),
            (None, Some(outfile)) => outfile
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            (None, None) => return Err(Error::MissingOutputDirectory),
        };
        Ok(self.working_dir.join(root))
    }

    /// Format name with surrounding quotes removed, as given.
    pub fn format_name(&self) -> String {
        self.format
            .as_deref()
            .map(|f| f.trim().replace('"', ""))
            .unwrap_or_default()
    }

    /// Uppercased format name used to label size reports.
    pub fn format_label(&self) -> String {
        self.format_name().to_uppercase()
    }
}

/// Computes the manifest path from the current build.
pub trait ManifestPathResolver: Send + Sync {
    fn resolve(&self, build: &BuildContext) -> String;
}

impl<F> ManifestPathResolver for F
where
    F: Fn(&BuildContext) -> String + Send + Sync,
{
    fn resolve(&self, build: &BuildContext) -> String {
        self(build)
    }
}

/// Resolver that substitutes `{format}` with the lowercased format name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTemplate(pub String);

impl ManifestPathResolver for ManifestTemplate {
    fn resolve(&self, build: &BuildContext) -> String {
        self.0
            .replace("{format}", &build.format_name().to_lowercase())
    }
}

/// Where the manifest lives, relative to the destination root.
pub enum ManifestLocation {
    Fixed(String),
    Resolver(Box<dyn ManifestPathResolver>),
}

impl ManifestLocation {
    /// Template location; `{format}` expands per build.
    pub fn template(template: impl Into<String>) -> Self {
        Self::Resolver(Box::new(ManifestTemplate(template.into())))
    }

    pub fn resolver(resolver: impl ManifestPathResolver + 'static) -> Self {
        Self::Resolver(Box::new(resolver))
    }

    /// Resolve for this build. An empty result is a configuration error.
    pub fn resolve(&self, build: &BuildContext) -> Result<String> {
        let path = match self {
            Self::Fixed(path) => path.clone(),
            Self::Resolver(resolver) => resolver.resolve(build),
        };
        if path.is_empty() {
            return Err(Error::EmptyManifestPath);
        }
        Ok(path)
    }
}

impl Default for ManifestLocation {
    fn default() -> Self {
        Self::Fixed(MANIFEST_DEFAULT.to_string())
    }
}

impl fmt::Debug for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for ManifestLocation {
    fn from(path: &str) -> Self {
        Self::Fixed(path.to_string())
    }
}

impl From<String> for ManifestLocation {
    fn from(path: String) -> Self {
        Self::Fixed(path)
    }
}

/// Options for a publishing pass.
pub struct PublishOptions {
    /// Root context prefixed to every pattern's search root
    pub context: PathBuf,
    /// Suffix appended to the build's output root
    pub to: PathBuf,
    pub patterns: Vec<Pattern>,
    pub manifest: ManifestLocation,
    /// Embed the fingerprint in published file names
    pub add_hashes_to_file_names: bool,
    pub fingerprint: Box<dyn FingerprintFunction>,
}

impl PublishOptions {
    pub fn new<P: Into<Pattern>>(patterns: impl IntoIterator<Item = P>) -> Self {
        Self {
            context: PathBuf::new(),
            to: PathBuf::new(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            manifest: ManifestLocation::default(),
            add_hashes_to_file_names: true,
            fingerprint: default_fingerprint(),
        }
    }

    pub fn with_context(mut self, context: impl Into<PathBuf>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_to(mut self, to: impl Into<PathBuf>) -> Self {
        self.to = to.into();
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<ManifestLocation>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn with_hashed_names(mut self, enabled: bool) -> Self {
        self.add_hashes_to_file_names = enabled;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl FingerprintFunction + 'static) -> Self {
        self.fingerprint = Box::new(fingerprint);
        self
    }
}

impl fmt::Debug for PublishOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishOptions")
            .field("context", &self.context)
            .field("to", &self.to)
            .field("patterns", &self.patterns)
            .field("manifest", &self.manifest)
            .field("add_hashes_to_file_names", &self.add_hashes_to_file_names)
            .finish_non_exhaustive()
    }
}
