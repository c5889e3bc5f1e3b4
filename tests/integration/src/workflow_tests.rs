//! Workflow Tests
//!
//! Configuration-driven passes: options read through `ConfigStore` in each
//! supported format, manifest templates, and content addressing checked
//! against files on disk.

use hashcopy_core::{
    AssetManifest, BuildContext, BuildOutcome, FingerprintFunction, ManifestLocation,
    NullReportSink, Pass, Pattern, PatternSpec, PublishOptions, SourcemapMode, Xxh64Fingerprint,
    manifest_path,
};
use hashcopy_fs::ConfigStore;
use hashcopy_test_utils::AssetTree;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde::Deserialize;

/// Minimal host configuration, as a build tool plugin would receive it
#[derive(Debug, Deserialize)]
struct HostConfig {
    context: String,
    manifest: String,
    patterns: Vec<PatternSpec>,
    sourcemap: SourcemapMode,
    format: String,
}

impl HostConfig {
    fn options(&self) -> PublishOptions {
        PublishOptions::new(self.patterns.iter().cloned().map(Pattern::from))
            .with_context(&self.context)
            .with_manifest(ManifestLocation::template(self.manifest.clone()))
    }

    fn build(&self, tree: &AssetTree) -> BuildContext {
        BuildContext::new(tree.root())
            .with_outfile("out/bundle.js")
            .with_sourcemap(self.sourcemap)
            .with_format(self.format.clone())
    }
}

fn seed(tree: &AssetTree) {
    tree.write("assets/esbuild/install.js", "install()");
    tree.write("assets/esbuild/install.js.map", "{}");
    tree.write("assets/fonts/a.woff2", "font");
}

fn run_with(config_name: &str, body: &str) -> AssetTree {
    let tree = AssetTree::new();
    seed(&tree);
    tree.write(config_name, body);

    let config: HostConfig = ConfigStore::new().load(&tree.path(config_name)).unwrap();
    Pass::run(
        config.options(),
        config.build(&tree),
        &BuildOutcome::success(),
        &mut NullReportSink,
    )
    .unwrap();
    tree
}

fn assert_published(tree: &AssetTree) {
    let h = |s: &str| Xxh64Fingerprint::default().fingerprint(s.as_bytes());
    let manifest = tree.manifest("out/manifest.esm.json");
    assert_eq!(manifest["install.js"], format!("install-{}.js", h("install()")));
    assert_eq!(manifest["install.js.map"], format!("install-{}.js.map", h("install()")));
    assert_eq!(manifest["a.woff2"], format!("a-{}.woff2", h("font")));
    tree.assert_file_exists(&format!("out/esbuild/install-{}.js.map", h("install()")));
    tree.assert_file_exists(&format!("out/fonts/a-{}.woff2", h("font")));
}

#[test]
fn toml_config_drives_pass() {
    let tree = run_with(
        "host.toml",
        r#"
context = "assets"
manifest = "manifest.{format}.json"
sourcemap = "external"
format = "\"esm\""
patterns = [
    { context = "esbuild", from = "*.js", to = "esbuild" },
    { context = "fonts", from = "*.woff2", to = "fonts" },
]
"#,
    );
    assert_published(&tree);
}

#[test]
fn json_config_drives_pass() {
    let tree = run_with(
        "host.json",
        r#"{
  "context": "assets",
  "manifest": "manifest.{format}.json",
  "sourcemap": true,
  "format": "esm",
  "patterns": [
    {"context": "esbuild", "from": "*.js", "to": "esbuild"},
    {"context": "fonts", "from": "*.woff2", "to": "fonts"}
  ]
}"#,
    );
    assert_published(&tree);
}

#[test]
fn yaml_config_drives_pass() {
    let tree = run_with(
        "host.yaml",
        r#"
context: assets
manifest: "manifest.{format}.json"
sourcemap: both
format: esm
patterns:
  - context: esbuild
    from: "*.js"
    to: esbuild
  - context: fonts
    from: "*.woff2"
    to: fonts
"#,
    );
    assert_published(&tree);
}

#[test]
fn manifest_path_is_stable_between_publish_and_lookup() {
    let tree = AssetTree::new();
    tree.write("assets/a.txt", "hello");
    let options = || {
        PublishOptions::new(["*.txt"])
            .with_context("assets")
            .with_to("static")
            .with_manifest(ManifestLocation::template("meta/manifest.{format}.json"))
    };
    let build = BuildContext::new(tree.root()).with_outdir("dist").with_format("cjs");

    Pass::run(options(), build.clone(), &BuildOutcome::success(), &mut NullReportSink).unwrap();

    let path = manifest_path(&options(), &build).unwrap();
    assert_eq!(path, tree.path("dist/static/meta/manifest.cjs.json"));
    let manifest = AssetManifest::load(&path).unwrap();
    assert_eq!(manifest.len(), 1);
    assert!(manifest.get("a.txt").is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Equal bytes give equal published names, distinct bytes distinct names
    #[test]
    fn content_addressing_on_disk(a in proptest::collection::vec(any::<u8>(), 0..256),
                                  b in proptest::collection::vec(any::<u8>(), 0..256)) {
        let tree = AssetTree::new();
        tree.write("assets/one/x.bin", &a);
        tree.write("assets/two/x.bin", &b);
        tree.write("assets/three/x.bin", &a);

        Pass::run(
            PublishOptions::new(["**/*.bin"]).with_context("assets"),
            BuildContext::new(tree.root()).with_outdir("dist"),
            &BuildOutcome::success(),
            &mut NullReportSink,
        )
        .unwrap();

        let manifest = tree.manifest("dist/manifest.json");
        let name = |dir: &str| manifest[&format!("{dir}/x.bin")].trim_start_matches(&format!("{dir}/")).to_string();
        prop_assert_eq!(name("one"), name("three"));
        if a != b {
            prop_assert_ne!(name("one"), name("two"));
        } else {
            prop_assert_eq!(name("one"), name("two"));
        }
    }
}
