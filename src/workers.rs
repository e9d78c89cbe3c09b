use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ExtractConfig;
use crate::graph;
use crate::strip::strip_comments;
use crate::types::SourceUnit;

/// Files larger than this are replaced by a size placeholder.
const MAX_CONTENT_BYTES: u64 = 1 << 20;

/// Reads and prepares all candidate files using a bounded worker pool.
///
/// Workers consume paths from a shared queue and publish finished units to a
/// result queue. The function returns only after every worker has finished
/// (the barrier downstream stages rely on); unreadable or malformed files
/// are skipped with a warning, never escalated.
pub async fn extract_units(
    root: &Path,
    files: Vec<String>,
    cfg: &ExtractConfig,
) -> Vec<SourceUnit> {
    let capacity = files.len().max(1);
    let (work_tx, work_rx) = mpsc::channel::<String>(capacity);
    let (result_tx, mut result_rx) = mpsc::channel::<SourceUnit>(capacity);
    let work_rx = Arc::new(Mutex::new(work_rx));

    let mut workers = JoinSet::new();
    for _ in 0..cfg.workers.max(1) {
        let work_rx = Arc::clone(&work_rx);
        let result_tx = result_tx.clone();
        let root = root.to_path_buf();
        let cfg = cfg.clone();
        workers.spawn(async move {
            loop {
                let rel_path = {
                    let mut rx = work_rx.lock().await;
                    match rx.recv().await {
                        Some(p) => p,
                        None => break,
                    }
                };
                match process_file(&root, &rel_path, &cfg).await {
                    Some(unit) => {
                        if result_tx.send(unit).await.is_err() {
                            break;
                        }
                    }
                    None => debug!(path = %rel_path, "skipped during extraction"),
                }
            }
        });
    }
    drop(result_tx);

    for path in files {
        if work_tx.send(path).await.is_err() {
            break;
        }
    }
    drop(work_tx);

    let mut units = Vec::new();
    while let Some(unit) = result_rx.recv().await {
        units.push(unit);
    }
    // Result channel closure implies all workers dropped their senders;
    // join to surface panics and complete the barrier.
    while workers.join_next().await.is_some() {}

    // Collection order depends on worker scheduling; sort by path so every
    // downstream stage sees a deterministic corpus.
    units.sort_by(|a, b| a.path.cmp(&b.path));
    units
}

/// Reads one file and turns it into a `SourceUnit`.
///
/// Binary files become a placeholder with weight 0, oversized files a size
/// placeholder; otherwise the content is optionally comment-stripped and,
/// for Go with summaries enabled, annotated with a structural summary.
async fn process_file(root: &Path, rel_path: &str, cfg: &ExtractConfig) -> Option<SourceUnit> {
    let abs_path: PathBuf = root.join(rel_path);
    let data = match tokio::fs::read(&abs_path).await {
        Ok(d) => d,
        Err(e) => {
            warn!(path = %rel_path, error = %e, "failed to read file");
            return None;
        }
    };
    let size = data.len() as u64;
    let language = language_for_path(rel_path);

    if is_binary(&data) {
        return Some(SourceUnit {
            path: rel_path.to_string(),
            language: "binary".to_string(),
            content: format!("<binary file omitted, {size} bytes>"),
            size,
            summary: None,
            weight: 0,
        });
    }

    let mut content = String::from_utf8_lossy(&data).into_owned();
    if size > MAX_CONTENT_BYTES {
        content = format!("<file too large, {size} bytes, omitted>");
    } else if cfg.strip_comments {
        content = strip_comments(&content, language);
    }

    let summary = if cfg.ast && language == "go" {
        graph::summarize(&content)
    } else {
        None
    };

    Some(SourceUnit {
        path: rel_path.to_string(),
        language: language.to_string(),
        content,
        size,
        summary,
        weight: 1,
    })
}

/// Maps a file extension to a short language identifier. Names without an
/// extension are plaintext.
pub fn language_for_path(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = name.rsplit_once('.') else {
        return "plaintext";
    };
    match ext.to_ascii_lowercase().as_str() {
        "go" => "go",
        "java" => "java",
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "rs" => "rust",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" => "kotlin",
        "scala" => "scala",
        "r" => "r",
        "sh" => "shell",
        "bash" => "bash",
        "zsh" => "zsh",
        "ps1" => "powershell",
        "yaml" | "yml" => "yaml",
        "json" => "json",
        "xml" => "xml",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "sql" => "sql",
        "md" => "markdown",
        "rst" => "restructuredtext",
        "tex" => "latex",
        _ => "plaintext",
    }
}

/// Fast binary-content heuristics: ELF/PE headers, NUL bytes in the first
/// 512 bytes, then the control-character ratio of a 1 KiB sample.
pub fn is_binary(data: &[u8]) -> bool {
    if data.len() >= 4 && data[0] == 0x7f && &data[1..4] == b"ELF" {
        return true;
    }
    if data.len() >= 2 && data[0] == b'M' && data[1] == b'Z' {
        return true;
    }
    if data.iter().take(512).any(|&b| b == 0) {
        return true;
    }
    let sample = &data[..data.len().min(1024)];
    if sample.is_empty() {
        return false;
    }
    let non_text = sample
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\n' && b != b'\r' && b != b'\t')
        .count();
    non_text * 100 / sample.len() > 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_map() {
        assert_eq!(language_for_path("cmd/main.go"), "go");
        assert_eq!(language_for_path("lib.rs"), "rust");
        assert_eq!(language_for_path("script"), "plaintext");
        assert_eq!(language_for_path("notes.MD"), "markdown");
    }

    #[test]
    fn test_extensionless_names_are_plaintext() {
        // A bare name equal to a language extension is not that language.
        assert_eq!(language_for_path("go"), "plaintext");
        assert_eq!(language_for_path("src/c"), "plaintext");
        assert_eq!(language_for_path("dir.v2/Makefile"), "plaintext");
        assert_eq!(language_for_path("pkg/r"), "plaintext");
    }

    #[test]
    fn test_binary_detection() {
        assert!(is_binary(b"\x7fELF\x02\x01\x01"));
        assert!(is_binary(b"MZ\x90\x00"));
        assert!(is_binary(b"text with \x00 nul"));
        assert!(!is_binary(b"package main\n\nfunc main() {}\n"));
        assert!(!is_binary(b""));
    }

    #[tokio::test]
    async fn test_pool_extracts_all_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.go"), "package main\n").unwrap();
        std::fs::write(dir.path().join("a.go"), "package main\n").unwrap();
        std::fs::write(dir.path().join("bin.dat"), b"\x00\x01\x02").unwrap();

        let cfg = ExtractConfig::default();
        let files = vec!["b.go".to_string(), "a.go".to_string(), "bin.dat".to_string()];
        let units = extract_units(dir.path(), files, &cfg).await;

        let paths: Vec<&str> = units.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(paths, vec!["a.go", "b.go", "bin.dat"]);
        assert_eq!(units[0].weight, 1);
        let binary = &units[2];
        assert_eq!(binary.language, "binary");
        assert_eq!(binary.weight, 0);
        assert!(binary.content.contains("binary file omitted"));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.go"), "package main\n").unwrap();
        let cfg = ExtractConfig::default();
        let files = vec!["ok.go".to_string(), "missing.go".to_string()];
        let units = extract_units(dir.path(), files, &cfg).await;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].path, "ok.go");
    }

    #[tokio::test]
    async fn test_summary_attached_for_go() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("m.go"),
            "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println(1) }\n",
        )
        .unwrap();
        let cfg = ExtractConfig {
            ast: true,
            ..ExtractConfig::default()
        };
        let units = extract_units(dir.path(), vec!["m.go".to_string()], &cfg).await;
        let summary = units[0].summary.as_ref().expect("summary present");
        assert_eq!(summary.package, "main");
        assert_eq!(summary.imports, vec!["fmt"]);
        assert_eq!(summary.functions, vec!["main"]);
    }
}
