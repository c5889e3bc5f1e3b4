//! The lookup command: the consumer side of the manifest

use std::path::Path;

use hashcopy_core::{AssetManifest, manifest_path};

use crate::cli::BuildOverrides;
use crate::error::{CliError, Result};
use crate::settings::{Settings, working_dir_for};

/// Resolve `logical` through the manifest.
///
/// Returns the published path relative to the destination root.
pub fn lookup(config: &Path, logical: &str, overrides: &BuildOverrides) -> Result<String> {
    let mut settings = Settings::load(config)?;
    settings.apply(overrides);

    let working_dir = working_dir_for(config)?;
    let options = settings.publish_options()?;
    let build = settings.build_context(&working_dir);
    let path = manifest_path(&options, &build)?;

    let manifest = AssetManifest::load(&path)?;
    manifest.get(logical).map(str::to_string).ok_or_else(|| {
        CliError::user(format!(
            "No manifest entry for {logical} in {}",
            path.display()
        ))
    })
}

/// Run the lookup command
pub fn run_lookup(config: &Path, logical: &str, overrides: &BuildOverrides) -> Result<()> {
    println!("{}", lookup(config, logical, overrides)?);
    Ok(())
}
