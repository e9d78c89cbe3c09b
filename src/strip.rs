use regex::Regex;

/// Removes comments for common languages using regex heuristics, then drops
/// blank lines to keep the output compact.
///
/// Unrecognized languages pass through with only the whitespace cleanup.
pub fn strip_comments(content: &str, language: &str) -> String {
    let stripped = match language {
        "go" | "java" | "javascript" | "typescript" | "c" | "cpp" | "csharp" | "rust"
        | "swift" | "kotlin" | "scala" => {
            let content = replace_all(content, r"(?m)//.*$");
            replace_all(&content, r"(?s)/\*.*?\*/")
        }
        "python" | "ruby" | "shell" | "bash" | "zsh" | "powershell" | "yaml" | "r" => {
            replace_all(content, r"(?m)#.*$")
        }
        "html" | "xml" => replace_all(content, r"(?s)<!--.*?-->"),
        "css" | "scss" | "sass" | "less" => replace_all(content, r"(?s)/\*.*?\*/"),
        "sql" => {
            let content = replace_all(content, r"(?m)--.*$");
            replace_all(&content, r"(?s)/\*.*?\*/")
        }
        _ => content.to_string(),
    };

    stripped
        .lines()
        .map(|line| line.trim_end_matches([' ', '\t']))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn replace_all(content: &str, pattern: &str) -> String {
    // Patterns are static literals; construction cannot fail.
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(content, "").into_owned(),
        Err(_) => content.to_string(),
    }
}
