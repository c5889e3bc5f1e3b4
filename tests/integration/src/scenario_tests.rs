//! Scenario Tests
//!
//! End-to-end publishing scenarios across hashcopy-fs and hashcopy-core:
//! the edit/re-publish cycle, unhashed names, sourcemap twins and the
//! build-error guard, each run against a real temporary tree.

use hashcopy_core::{
    BuildContext, BuildOutcome, CollectingReportSink, FingerprintFunction, GlobMatcher, Pass,
    PassOutcome, PassSummary, PreparedPass, PublishOptions, SourcemapMode, Xxh64Fingerprint,
};
use hashcopy_test_utils::{AssetTree, PINNED_MTIME};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn h(content: &str) -> String {
    Xxh64Fingerprint::default().fingerprint(content.as_bytes())
}

fn prepare(options: PublishOptions, build: BuildContext) -> PreparedPass {
    Pass::prepare(options, build, &GlobMatcher::new()).unwrap()
}

fn finish(prepared: &PreparedPass) -> PassSummary {
    let mut sink = CollectingReportSink::default();
    match prepared.finish(&BuildOutcome::success(), &mut sink).unwrap() {
        PassOutcome::Completed(summary) => summary,
        PassOutcome::Skipped { .. } => panic!("pass skipped"),
    }
}

fn entries(pairs: &[(&str, String)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

// =============================================================================
// Edit cycle
// =============================================================================

#[test]
fn edit_cycle_accumulates_fingerprinted_files() {
    let tree = AssetTree::new();
    tree.write_at("assets/a.txt", "hello", PINNED_MTIME);
    let build = BuildContext::new(tree.root()).with_outdir("dist");
    let options = || PublishOptions::new(["*.txt"]).with_context("assets");

    finish(&prepare(options(), build.clone()));
    let h1 = format!("a-{}.txt", h("hello"));
    assert_eq!(tree.manifest("dist/manifest.json"), entries(&[("a.txt", h1.clone())]));

    tree.write_at("assets/a.txt", "world", PINNED_MTIME + 1);
    finish(&prepare(options(), build.clone()));
    let h2 = format!("a-{}.txt", h("world"));
    assert_eq!(tree.manifest("dist/manifest.json"), entries(&[("a.txt", h2.clone())]));

    // Reverting content points the manifest back at the first file
    tree.write_at("assets/a.txt", "hello", PINNED_MTIME);
    let summary = finish(&prepare(options(), build));
    assert_eq!(tree.manifest("dist/manifest.json"), entries(&[("a.txt", h1.clone())]));
    assert_eq!(summary.written_count(), 0, "a-H1 already carries the source mtime");

    let mut expected = vec![h1, h2, "manifest.json".to_string()];
    expected.sort();
    assert_eq!(tree.file_names("dist"), expected);
}

#[test]
fn unhashed_names_are_stable_across_edits() {
    let tree = AssetTree::new();
    tree.write_at("assets/a.txt", "hello", PINNED_MTIME);
    let build = BuildContext::new(tree.root()).with_outdir("dist");
    let options = || {
        PublishOptions::new(["*.txt"])
            .with_context("assets")
            .with_hashed_names(false)
    };

    finish(&prepare(options(), build.clone()));
    tree.write_at("assets/a.txt", "world", PINNED_MTIME + 5);
    let summary = finish(&prepare(options(), build));

    assert_eq!(tree.read("dist/a.txt"), "world");
    assert_eq!(tree.mtime("dist/a.txt"), PINNED_MTIME + 5);
    assert_eq!(tree.manifest("dist/manifest.json"), entries(&[("a.txt", "a.txt".into())]));
    assert_eq!(tree.file_names("dist"), vec!["a.txt", "manifest.json"]);
    assert!(summary.artifacts[0].was_written());
}

// =============================================================================
// Long-running host: one prepare, several builds
// =============================================================================

#[test]
fn prepared_pass_serves_successive_builds() {
    let tree = AssetTree::new();
    tree.write_at("assets/app.css", "body{}", PINNED_MTIME);
    let prepared = prepare(
        PublishOptions::new(["*.css"]).with_context("assets"),
        BuildContext::new(tree.root()).with_outdir("dist"),
    );

    let first = finish(&prepared);
    let mut sink = CollectingReportSink::default();
    let failed = prepared
        .finish(&BuildOutcome::failed(["syntax error"]), &mut sink)
        .unwrap();
    tree.write_at("assets/app.css", "body{margin:0}", PINNED_MTIME + 10);
    let third = finish(&prepared);

    assert_eq!(first.written_count(), 1);
    assert!(matches!(failed, PassOutcome::Skipped { .. }));
    assert_eq!(third.written_count(), 1);
    assert_eq!(
        tree.manifest("dist/manifest.json")["app.css"],
        format!("app-{}.css", h("body{margin:0}"))
    );
}

// =============================================================================
// Sourcemaps
// =============================================================================

#[test]
fn disabled_sourcemaps_never_copy_twin() {
    let tree = AssetTree::new();
    tree.write("assets/a.js", "let a");
    tree.write("assets/a.js.map", "{}");

    finish(&prepare(
        PublishOptions::new(["*.js"]).with_context("assets"),
        BuildContext::new(tree.root()).with_outdir("dist"),
    ));

    assert_eq!(
        tree.file_names("dist"),
        vec![format!("a-{}.js", h("let a")), "manifest.json".to_string()]
    );
}

#[test]
fn twin_follows_primary_fingerprint_after_edit() {
    let tree = AssetTree::new();
    tree.write_at("assets/a.js", "let a", PINNED_MTIME);
    tree.write_at("assets/a.js.map", "{}", PINNED_MTIME);
    let build = BuildContext::new(tree.root())
        .with_outdir("dist")
        .with_sourcemap(SourcemapMode::Linked);
    let options = || PublishOptions::new(["*.js"]).with_context("assets");

    finish(&prepare(options(), build.clone()));
    tree.write_at("assets/a.js", "let b", PINNED_MTIME + 1);
    finish(&prepare(options(), build));

    let manifest = tree.manifest("dist/manifest.json");
    assert_eq!(manifest["a.js"], format!("a-{}.js", h("let b")));
    assert_eq!(manifest["a.js.map"], format!("a-{}.js.map", h("let b")));
    tree.assert_file_exists(&format!("dist/a-{}.js.map", h("let a")));
}

// =============================================================================
// Task set
// =============================================================================

#[test]
fn overlapping_patterns_last_one_wins() {
    let tree = AssetTree::new();
    tree.write("assets/img/logo.png", "png");

    let options = PublishOptions::new([
        hashcopy_core::Pattern::new("img/*.png").with_context("assets"),
        hashcopy_core::Pattern::new("*.png")
            .with_context("assets/img")
            .with_to("images"),
    ]);
    let summary = finish(&prepare(
        options,
        BuildContext::new(tree.root()).with_outdir("dist"),
    ));

    assert_eq!(summary.artifacts.len(), 1);
    assert_eq!(
        tree.manifest("dist/manifest.json"),
        entries(&[("logo.png", format!("logo-{}.png", h("png")))])
    );
    tree.assert_file_exists(&format!("dist/images/logo-{}.png", h("png")));
}
