use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ContextError, Result};

/// Name of the optional per-project configuration file.
pub const CONFIG_FILENAME: &str = ".codectx.json";

/// Default number of extraction workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Directory and file patterns skipped by default.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "vendor",
    "target",
    "build",
    "dist",
    "out",
    "__pycache__",
    ".pytest_cache",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".DS_Store",
    "Thumbs.db",
    "*.log",
    "*.tmp",
    "*.temp",
    ".idea",
    ".vscode",
    ".vs",
    "*.exe",
    "*.dll",
    "*.so",
    "*.dylib",
    "*.class",
    "*.jar",
    "coverage",
    ".nyc_output",
];

/// Extraction configuration assembled from CLI flags and the optional
/// project config file. CLI values take precedence when merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Root of the project to extract.
    pub path: PathBuf,
    /// Explicit output file; `None` selects an auto-generated path.
    pub output: Option<PathBuf>,
    /// Output format name (markdown or json).
    pub format: String,
    /// Glob patterns to exclude; `!` prefixes negate.
    pub exclude: Vec<String>,
    /// Glob patterns acting as a whitelist when non-empty.
    pub include: Vec<String>,
    /// Strip comments from recognized languages.
    pub strip_comments: bool,
    /// Token ceiling for budget selection; 0 disables selection.
    pub max_tokens: usize,
    /// Attach structural summaries to Go units.
    pub ast: bool,
    /// Focus symbol for relevance tracing; empty disables tracing.
    pub focus: String,
    /// Hop bound for focus tracing.
    pub depth: u32,
    /// Number of parallel extraction workers.
    pub workers: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            output: None,
            format: "markdown".to_string(),
            exclude: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            include: Vec::new(),
            strip_comments: false,
            max_tokens: 0,
            ast: false,
            focus: String::new(),
            depth: 1,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl ExtractConfig {
    /// Clamps nonsensical numeric values to usable defaults.
    pub fn normalize(&mut self) {
        if self.workers == 0 {
            self.workers = DEFAULT_WORKERS;
        }
    }
}

/// Returns the path of the project config file under the given root.
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILENAME)
}

/// Merges an on-disk project config into `cfg` without overriding values
/// the CLI already set away from their defaults.
pub fn load_config_file(path: &Path, cfg: &mut ExtractConfig) -> Result<()> {
    let contents = fs::read_to_string(path).map_err(|e| ContextError::Config {
        message: format!("failed to read config file '{}': {}", path.display(), e),
    })?;

    let file_cfg: FileConfig =
        serde_json::from_str(&contents).map_err(|e| ContextError::Config {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
        })?;

    if let Some(exclude) = file_cfg.exclude {
        cfg.exclude.extend(exclude);
    }
    if cfg.include.is_empty() {
        if let Some(include) = file_cfg.include {
            cfg.include = include;
        }
    }
    if !cfg.strip_comments {
        if let Some(strip) = file_cfg.strip_comments {
            cfg.strip_comments = strip;
        }
    }
    if cfg.max_tokens == 0 {
        if let Some(max) = file_cfg.max_tokens {
            cfg.max_tokens = max;
        }
    }
    if !cfg.ast {
        if let Some(ast) = file_cfg.ast {
            cfg.ast = ast;
        }
    }
    if cfg.focus.is_empty() {
        if let Some(focus) = file_cfg.focus {
            cfg.focus = focus;
        }
    }
    Ok(())
}

/// The subset of settings readable from `.codectx.json`. All fields are
/// optional so a partial file merges cleanly.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    exclude: Option<Vec<String>>,
    include: Option<Vec<String>>,
    strip_comments: Option<bool>,
    max_tokens: Option<usize>,
    ast: Option<bool>,
    focus: Option<String>,
}
