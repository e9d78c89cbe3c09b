use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::ExtractConfig;
use crate::errors::{ContextError, Result};

/// Result of scanning a project tree: the candidate file paths
/// (project-relative, slash-separated) and an indented tree listing.
#[derive(Debug, Default)]
pub struct CorpusScan {
    pub files: Vec<String>,
    pub tree_structure: String,
}

/// Walks the project root, applying include/exclude patterns and collecting
/// candidate files plus a human-readable tree string.
///
/// Entries are visited in sorted order so the scan is deterministic. Walk
/// errors are logged and skipped, never fatal.
pub fn scan(root: &Path, cfg: &ExtractConfig) -> Result<CorpusScan> {
    if !root.is_dir() {
        return Err(ContextError::Scan {
            message: "project root is not a directory".to_string(),
            path: root.display().to_string(),
        });
    }

    let mut exclude = cfg.exclude.clone();
    exclude.extend(read_gitignore(root));
    let include = cfg.include.clone();

    let mut scan = CorpusScan::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = match entry.path().strip_prefix(root) {
                Ok(r) => r,
                Err(_) => return true,
            };
            if rel.as_os_str().is_empty() {
                return true; // the root itself
            }
            !should_exclude(&rel_string(rel), &exclude, &include)
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "walk error, skipping entry");
                continue;
            }
        };
        let rel = match entry.path().strip_prefix(root) {
            Ok(r) => r,
            Err(_) => continue,
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let rel_str = rel_string(rel);
        let depth = rel_str.matches('/').count();
        let indent = "  ".repeat(depth);
        let name = rel.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if entry.file_type().is_dir() {
            let _ = writeln!(scan.tree_structure, "{indent}{name}/");
        } else if entry.file_type().is_file() {
            let _ = writeln!(scan.tree_structure, "{indent}{name}");
            scan.files.push(rel_str);
        }
    }

    Ok(scan)
}

/// Renders a relative path with forward slashes regardless of platform.
fn rel_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Returns `true` if `path` should be skipped.
///
/// Include patterns, when present, act as a whitelist. Exclude patterns are
/// tried as globs against the full path and the basename, with a substring
/// fallback for convenience. Patterns prefixed with `!` negate an exclusion.
pub fn should_exclude(path: &str, exclude: &[String], include: &[String]) -> bool {
    let opts = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let basename = path.rsplit('/').next().unwrap_or(path);

    if !include.is_empty() {
        let included = include.iter().any(|pat| {
            matches_glob(pat, path, opts)
                || matches_glob(pat, basename, opts)
                || path.contains(pat.as_str())
        });
        if !included {
            return true;
        }
    }

    let negations: Vec<&str> = exclude
        .iter()
        .filter_map(|p| p.strip_prefix('!'))
        .collect();

    let excluded = exclude.iter().any(|pat| {
        if pat.is_empty() || pat.starts_with('!') {
            return false;
        }
        matches_glob(pat, path, opts)
            || matches_glob(pat, basename, opts)
            || path.contains(pat.as_str())
    });
    if !excluded {
        return false;
    }

    // A matching negation rescues the path.
    !negations
        .iter()
        .any(|n| matches_glob(n, path, opts) || path.contains(n))
}

fn matches_glob(pattern: &str, candidate: &str, opts: MatchOptions) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches_with(candidate, opts))
        .unwrap_or(false)
}

/// Reads non-empty, non-comment lines from the project's `.gitignore`.
pub fn read_gitignore(root: &Path) -> Vec<String> {
    let path = root.join(".gitignore");
    let Ok(contents) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
