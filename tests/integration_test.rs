use std::fs;
use std::path::Path;

use codectx::config::ExtractConfig;
use codectx::extractor::ContextExtractor;
use codectx::render::generate_output;
use codectx::types::{ProjectContext, SourceUnit};

fn write_project(root: &Path) {
    fs::write(
        root.join("main.go"),
        "package main\n\nfunc Run() {\n    Helper()\n}\n",
    )
    .unwrap();
    fs::write(root.join("util.go"), "package main\n\nfunc Helper() {}\n").unwrap();
    fs::write(root.join("README.md"), "x".repeat(400)).unwrap();
    fs::create_dir(root.join("node_modules")).unwrap();
    fs::write(root.join("node_modules").join("junk.js"), "junk();\n").unwrap();
}

fn unit<'a>(ctx: &'a ProjectContext, path: &str) -> &'a SourceUnit {
    ctx.files
        .iter()
        .find(|u| u.path == path)
        .unwrap_or_else(|| panic!("{path} missing from context"))
}

#[tokio::test]
async fn test_extract_with_focus_weights_and_summaries() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let cfg = ExtractConfig {
        path: dir.path().to_path_buf(),
        ast: true,
        focus: "Run".to_string(),
        depth: 1,
        ..ExtractConfig::default()
    };
    let ctx = ContextExtractor::new(cfg).extract().await.unwrap();

    // node_modules is pruned by the default excludes.
    assert_eq!(ctx.total_files, 3);
    assert!(ctx.files.iter().all(|u| !u.path.contains("node_modules")));
    assert!(ctx.tree_structure.contains("main.go"));
    assert!(!ctx.tree_structure.contains("node_modules"));

    // Run is the focus, Helper its direct callee, README untouched.
    assert_eq!(unit(&ctx, "main.go").weight, 1501);
    assert_eq!(unit(&ctx, "util.go").weight, 1001);
    assert_eq!(unit(&ctx, "README.md").weight, 1);

    let summary = unit(&ctx, "main.go").summary.as_ref().expect("summary");
    assert_eq!(summary.package, "main");
    assert_eq!(summary.functions, vec!["Run"]);
    assert!(!ctx.truncated);
}

#[tokio::test]
async fn test_budget_keeps_highest_weight_units() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let cfg = ExtractConfig {
        path: dir.path().to_path_buf(),
        focus: "Run".to_string(),
        depth: 1,
        max_tokens: 25,
        ..ExtractConfig::default()
    };
    let ctx = ContextExtractor::new(cfg).extract().await.unwrap();

    // The two focused Go files fit the ceiling; the large README does not.
    assert!(ctx.truncated);
    assert_eq!(ctx.total_files, 2);
    assert!(ctx.files.iter().any(|u| u.path == "main.go"));
    assert!(ctx.files.iter().any(|u| u.path == "util.go"));
    assert!(ctx.files.iter().all(|u| u.path != "README.md"));
    assert_eq!(
        ctx.total_size,
        ctx.files.iter().map(|u| u.size).sum::<u64>()
    );
}

#[tokio::test]
async fn test_extract_is_deterministic_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let cfg = ExtractConfig {
        path: dir.path().to_path_buf(),
        focus: "Run".to_string(),
        workers: 4,
        ..ExtractConfig::default()
    };
    let first = ContextExtractor::new(cfg.clone()).extract().await.unwrap();
    let second = ContextExtractor::new(cfg).extract().await.unwrap();

    let paths =
        |ctx: &ProjectContext| ctx.files.iter().map(|u| u.path.clone()).collect::<Vec<_>>();
    let weights = |ctx: &ProjectContext| ctx.files.iter().map(|u| u.weight).collect::<Vec<_>>();
    assert_eq!(paths(&first), paths(&second));
    assert_eq!(weights(&first), weights(&second));
    assert_eq!(first.estimated_tokens, second.estimated_tokens);
}

#[tokio::test]
async fn test_rendered_markdown_covers_the_corpus() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    let cfg = ExtractConfig {
        path: dir.path().to_path_buf(),
        ast: true,
        ..ExtractConfig::default()
    };
    let extractor = ContextExtractor::new(cfg);
    let ctx = extractor.extract().await.unwrap();

    let md = generate_output(&ctx, "markdown").unwrap();
    assert!(md.contains("# Project Context"));
    assert!(md.contains("### Go Files"));
    assert!(md.contains("### Markdown Files"));
    assert!(md.contains("#### `main.go`"));
    assert!(md.contains("func Run()"));

    let json = generate_output(&ctx, "json").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["total_files"], 3);
}

#[tokio::test]
async fn test_strip_comments_flows_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("main.go"),
        "package main\n\n// entry point\nfunc main() {}\n",
    )
    .unwrap();

    let cfg = ExtractConfig {
        path: dir.path().to_path_buf(),
        strip_comments: true,
        ..ExtractConfig::default()
    };
    let ctx = ContextExtractor::new(cfg).extract().await.unwrap();
    let main_go = unit(&ctx, "main.go");
    assert!(!main_go.content.contains("entry point"));
    assert!(main_go.content.contains("func main() {}"));
}
