//! The `hashcopy.toml` configuration file
//!
//! The file describes the engine options plus a `[build]` section standing
//! in for what a host build tool would report. Command-line flags override
//! the `[build]` values and the manifest location.

use std::path::{Path, PathBuf};

use hashcopy_core::{
    Alphabet, BuildContext, HashAlgorithm, ManifestLocation, Pattern, PatternSpec,
    PublishOptions, SourcemapMode,
};
use hashcopy_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::cli::BuildOverrides;
use crate::error::{CliError, Result};

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub context: PathBuf,
    pub to: PathBuf,
    pub manifest: Option<String>,
    pub add_hashes_to_file_names: bool,
    pub hash: HashAlgorithm,
    pub alphabet: Option<String>,
    pub patterns: Vec<PatternSpec>,
    pub build: BuildSection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            context: PathBuf::new(),
            to: PathBuf::new(),
            manifest: None,
            add_hashes_to_file_names: true,
            hash: HashAlgorithm::default(),
            alphabet: None,
            patterns: Vec::new(),
            build: BuildSection::default(),
        }
    }
}

/// The `[build]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    pub outdir: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub sourcemap: SourcemapMode,
    pub format: Option<String>,
}

impl Settings {
    /// Load from `path`; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::user(format!(
                "No configuration file at {}",
                path.display()
            )));
        }
        let settings: Self = ConfigStore::new().load(path)?;
        tracing::debug!(config = %path.display(), patterns = settings.patterns.len(), "Loaded configuration");
        Ok(settings)
    }

    /// Apply command-line overrides to the `[build]` and manifest values.
    pub fn apply(&mut self, overrides: &BuildOverrides) {
        if let Some(outdir) = &overrides.outdir {
            self.build.outdir = Some(outdir.clone());
        }
        if let Some(sourcemap) = overrides.sourcemap {
            self.build.sourcemap = sourcemap;
        }
        if let Some(format) = &overrides.format {
            self.build.format = Some(format.clone());
        }
        if let Some(manifest) = &overrides.manifest {
            self.manifest = Some(manifest.clone());
        }
    }

    /// Engine options for a pass.
    pub fn publish_options(&self) -> Result<PublishOptions> {
        let alphabet = match &self.alphabet {
            Some(symbols) => Alphabet::new(symbols)?,
            None => Alphabet::default(),
        };

        let mut options = PublishOptions::new(self.patterns.iter().cloned().map(Pattern::from))
            .with_context(&self.context)
            .with_to(&self.to)
            .with_hashed_names(self.add_hashes_to_file_names);
        options.fingerprint = self.hash.build(alphabet);
        if let Some(manifest) = &self.manifest {
            options.manifest = manifest_location(manifest);
        }
        Ok(options)
    }

    /// Build context with relative paths anchored at `working_dir`.
    pub fn build_context(&self, working_dir: &Path) -> BuildContext {
        BuildContext {
            working_dir: working_dir.to_path_buf(),
            outdir: self.build.outdir.clone(),
            outfile: self.build.outfile.clone(),
            sourcemap: self.build.sourcemap,
            format: self.build.format.clone(),
        }
    }
}

fn manifest_location(manifest: &str) -> ManifestLocation {
    if manifest.contains("{format}") {
        ManifestLocation::template(manifest)
    } else {
        ManifestLocation::Fixed(manifest.to_string())
    }
}

/// Directory that relative paths in a configuration file resolve against.
pub fn working_dir_for(config: &Path) -> Result<PathBuf> {
    let config = if config.is_absolute() {
        config.to_path_buf()
    } else {
        std::env::current_dir()?.join(config)
    };
    Ok(config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default())
}
