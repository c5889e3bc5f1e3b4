//! The publish command
//!
//! Resolves tasks, optionally runs the build command, then publishes.
//! Task resolution happens before the build so that configuration errors
//! surface without waiting for a build.

use std::path::Path;
use std::process::{Command, Stdio};

use colored::Colorize;
use hashcopy_core::{BuildOutcome, GlobMatcher, NullReportSink, Pass, PassOutcome, ReportSink};

use crate::cli::BuildOverrides;
use crate::console::ConsoleReportSink;
use crate::error::{CliError, Result};
use crate::settings::{Settings, working_dir_for};

/// Everything `hashcopy publish` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub overrides: BuildOverrides,
    pub no_hash: bool,
    pub json: bool,
    pub quiet: bool,
    pub command: Vec<String>,
}

/// Run the publish command
pub fn run_publish(config: &Path, request: &PublishRequest) -> Result<()> {
    let mut settings = Settings::load(config)?;
    settings.apply(&request.overrides);
    if request.no_hash {
        settings.add_hashes_to_file_names = false;
    }

    let working_dir = working_dir_for(config)?;
    let options = settings.publish_options()?;
    let build = settings.build_context(&working_dir);
    let prepared = Pass::prepare(options, build, &GlobMatcher::new())?;
    tracing::debug!(tasks = prepared.tasks().len(), "Tasks resolved");

    let outcome = if request.command.is_empty() {
        BuildOutcome::success()
    } else {
        run_build(&request.command, &working_dir, request.json)?
    };

    let mut sink: Box<dyn ReportSink> = if request.json || request.quiet {
        Box::new(NullReportSink)
    } else {
        Box::new(ConsoleReportSink)
    };

    match prepared.finish(&outcome, sink.as_mut())? {
        PassOutcome::Skipped { build_errors } => {
            tracing::debug!(build_errors, "Publishing skipped");
            Err(CliError::user(format!(
                "Build failed ({}); assets were not published",
                outcome.errors.join("; ")
            )))
        }
        PassOutcome::Completed(summary) => {
            if request.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if !request.quiet {
                println!(
                    "{} Published {} asset(s), {} written",
                    "OK".green().bold(),
                    summary.artifacts.len(),
                    summary.written_count()
                );
            }
            Ok(())
        }
    }
}

/// Run the build command in `working_dir` and translate its exit status.
///
/// With `stdout_to_stderr` the child's stdout is redirected so that our
/// own stdout stays machine-readable.
pub fn run_build(command: &[String], working_dir: &Path, stdout_to_stderr: bool) -> Result<BuildOutcome> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| CliError::user("Empty build command"))?;
    let command_line = command.join(" ");
    tracing::info!(command = %command_line, "Running build");

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(working_dir);
    if stdout_to_stderr {
        cmd.stdout(Stdio::from(std::io::stderr()));
    }
    let status = cmd
        .status()
        .map_err(|e| CliError::user(format!("Failed to run `{command_line}`: {e}")))?;

    if status.success() {
        return Ok(BuildOutcome::success());
    }
    let code = status.code().unwrap_or(-1);
    tracing::warn!(command = %command_line, code, "Build failed");
    Ok(BuildOutcome::failed([format!("`{command_line}` exited with code {code}")]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashcopy_test_utils::AssetTree;

    fn request() -> PublishRequest {
        PublishRequest {
            quiet: true,
            ..PublishRequest::default()
        }
    }

    fn project() -> AssetTree {
        let tree = AssetTree::new();
        tree.write("assets/a.txt", "hello");
        tree.write(
            "hashcopy.toml",
            "context = \"assets\"\npatterns = [\"*.txt\"]\n\n[build]\noutdir = \"dist\"\n",
        );
        tree
    }

    #[test]
    fn test_publish_with_temp_project() {
        let tree = project();

        run_publish(&tree.path("hashcopy.toml"), &request()).unwrap();

        let manifest = tree.manifest("dist/manifest.json");
        assert!(manifest["a.txt"].starts_with("a-"));
    }

    #[test]
    fn test_no_hash_flag() {
        let tree = project();
        let request = PublishRequest {
            no_hash: true,
            ..request()
        };

        run_publish(&tree.path("hashcopy.toml"), &request).unwrap();

        assert_eq!(tree.manifest("dist/manifest.json")["a.txt"], "a.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_skips_publishing() {
        let tree = project();
        let request = PublishRequest {
            command: vec!["false".to_string()],
            ..request()
        };

        let err = run_publish(&tree.path("hashcopy.toml"), &request).unwrap_err();

        assert!(err.to_string().contains("assets were not published"));
        tree.assert_file_not_exists("dist/manifest.json");
    }

    #[cfg(unix)]
    #[test]
    fn test_build_runs_in_config_directory() {
        let tree = project();
        let outcome = run_build(
            &["sh".to_string(), "-c".to_string(), "test -f hashcopy.toml".to_string()],
            tree.root(),
            false,
        )
        .unwrap();
        assert!(!outcome.has_errors());
    }

    #[test]
    fn test_missing_program_is_user_error() {
        let tree = project();
        let err = run_build(&["hashcopy-no-such-program".to_string()], tree.root(), false).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }
}
