use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::errors::{ContextError, Result};
use crate::types::{OutputFormat, ProjectContext, SourceUnit};

/// Serializes the context in the requested format.
pub fn generate_output(ctx: &ProjectContext, format: &str) -> Result<String> {
    match OutputFormat::parse(format) {
        Some(OutputFormat::Json) => generate_json(ctx),
        Some(OutputFormat::Markdown) => Ok(generate_markdown(ctx)),
        None => Err(ContextError::Render {
            message: format!("unsupported format: {format}"),
        }),
    }
}

fn generate_json(ctx: &ProjectContext) -> Result<String> {
    Ok(serde_json::to_string_pretty(ctx)?)
}

/// Renders a human-friendly Markdown document: header statistics, the
/// directory tree, then per-file sections grouped by language with summary
/// bullets and fenced content blocks.
fn generate_markdown(ctx: &ProjectContext) -> String {
    let mut out = String::new();
    out.push_str("# Project Context\n\n");
    let _ = writeln!(out, "**Project Path:** `{}`\n", ctx.project_path);
    let _ = writeln!(out, "**Total Files:** {}\n", ctx.total_files);
    let _ = writeln!(out, "**Total Size:** {} bytes\n", ctx.total_size);
    let _ = writeln!(out, "**Estimated Tokens:** {}\n", ctx.estimated_tokens);
    if ctx.truncated {
        out.push_str("> **Note:** context was truncated to satisfy token limits.\n\n");
    }
    out.push_str("## Directory Structure\n\n```\n");
    out.push_str(&ctx.tree_structure);
    out.push_str("```\n\n");

    // Group by language; BTreeMap keeps language sections sorted.
    let mut by_language: BTreeMap<&str, Vec<&SourceUnit>> = BTreeMap::new();
    for unit in &ctx.files {
        by_language.entry(unit.language.as_str()).or_default().push(unit);
    }

    for (language, mut units) in by_language {
        let _ = writeln!(out, "### {} Files\n", title_case(language));
        units.sort_by(|a, b| a.path.cmp(&b.path));
        for unit in units {
            let _ = writeln!(out, "#### `{}` — {} bytes\n", unit.path, unit.size);
            if let Some(summary) = &unit.summary {
                out.push_str("**Structure:**\n\n");
                if !summary.package.is_empty() {
                    let _ = writeln!(out, "- Package: `{}`", summary.package);
                }
                if !summary.imports.is_empty() {
                    let _ = writeln!(out, "- Imports: `{}`", summary.imports.join(", "));
                }
                if !summary.structs.is_empty() {
                    let _ = writeln!(out, "- Structs: `{}`", summary.structs.join(", "));
                }
                if !summary.functions.is_empty() {
                    let _ = writeln!(out, "- Functions: `{}`", summary.functions.join(", "));
                }
                out.push('\n');
            }
            let fence_language = if language == "plaintext" { "" } else { language };
            let _ = writeln!(out, "```{fence_language}");
            out.push_str(&unit.content);
            if !unit.content.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n\n");
        }
    }

    let _ = writeln!(
        out,
        "_Generated by codectx on {}_",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
    out
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AstSummary;

    fn sample_context() -> ProjectContext {
        let mut unit = SourceUnit::new("main.go", "go", "package main\n");
        unit.summary = Some(AstSummary {
            package: "main".to_string(),
            imports: vec!["fmt".to_string()],
            structs: Vec::new(),
            functions: vec!["main".to_string()],
        });
        ProjectContext {
            project_path: "/proj".to_string(),
            tree_structure: "main.go\n".to_string(),
            total_files: 1,
            total_size: unit.size,
            estimated_tokens: 5,
            truncated: true,
            files: vec![unit],
        }
    }

    #[test]
    fn test_markdown_sections() {
        let md = generate_output(&sample_context(), "markdown").unwrap();
        assert!(md.contains("# Project Context"));
        assert!(md.contains("## Directory Structure"));
        assert!(md.contains("### Go Files"));
        assert!(md.contains("#### `main.go`"));
        assert!(md.contains("- Package: `main`"));
        assert!(md.contains("truncated to satisfy token limits"));
        assert!(md.contains("```go\npackage main\n```"));
    }

    #[test]
    fn test_json_round_trip() {
        let json = generate_output(&sample_context(), "json").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["total_files"], 1);
        assert_eq!(parsed["files"][0]["path"], "main.go");
        assert_eq!(parsed["truncated"], true);
    }

    #[test]
    fn test_unsupported_format() {
        assert!(generate_output(&sample_context(), "yaml").is_err());
    }
}
