use serde::{Deserialize, Serialize};

/// A single source file prepared for context assembly.
///
/// `path` is the project-relative path and acts as the unique key for the
/// unit. `weight` starts at 1 (0 for binary placeholders) and is only ever
/// increased, by the focus tracer; it is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: String,
    pub language: String,
    pub content: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AstSummary>,
    #[serde(skip, default = "default_weight")]
    pub weight: i64,
}

fn default_weight() -> i64 {
    1
}

impl SourceUnit {
    /// Creates a unit with baseline weight 1 and no structural summary.
    pub fn new(path: impl Into<String>, language: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let size = content.len() as u64;
        Self {
            path: path.into(),
            language: language.into(),
            content,
            size,
            summary: None,
            weight: 1,
        }
    }
}

/// Lightweight structural summary of a Go source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AstSummary {
    pub package: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub imports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub structs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub functions: Vec<String>,
}

/// The full extraction result handed to the output renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub project_path: String,
    pub tree_structure: String,
    pub files: Vec<SourceUnit>,
    pub total_files: usize,
    pub total_size: u64,
    pub estimated_tokens: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub truncated: bool,
}

/// A named function or method definition site with a byte range.
///
/// The qualified key is the bare identifier for free functions and
/// `<receiver-type-text>.<name>` for methods, with the receiver type
/// rendered as plain source text (e.g. `*Circle.Area`). Declarations are
/// rebuilt on every run and discarded after weight computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub key: String,
    pub path: String,
    pub start: usize,
    pub end: usize,
}

impl Declaration {
    /// Returns `true` if the byte offset falls within this declaration.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// Output format for rendered context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    /// Parses a user-supplied format name, returning `None` for unknown values.
    pub fn parse(s: &str) -> Option<OutputFormat> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// File extension used for auto-generated output paths.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_defaults() {
        let unit = SourceUnit::new("src/main.go", "go", "package main\n");
        assert_eq!(unit.weight, 1);
        assert_eq!(unit.size, 13);
        assert!(unit.summary.is_none());
    }

    #[test]
    fn test_weight_not_serialized() {
        let mut unit = SourceUnit::new("a.go", "go", "package a\n");
        unit.weight = 1501;
        let json = serde_json::to_string(&unit).unwrap();
        assert!(!json.contains("weight"));
        assert!(!json.contains("1501"));
    }

    #[test]
    fn test_declaration_contains() {
        let decl = Declaration {
            key: "Parse".to_string(),
            path: "parser.go".to_string(),
            start: 10,
            end: 50,
        };
        assert!(decl.contains(10));
        assert!(decl.contains(50));
        assert!(!decl.contains(9));
        assert!(!decl.contains(51));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse("md"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }
}
