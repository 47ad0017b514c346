//! Source locations and comment records

use std::fmt;

/// A source position attached to a declaration
///
/// Line and column are 1-based; 0 means unknown. A declaration with no
/// location at all is synthetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// 1-based line, 0 when unknown
    pub line: u32,
    /// 1-based column, 0 when unknown
    pub column: u32,
    /// URI of the source file
    pub source_uri: String,
}

impl SourceLocation {
    /// Create a location at a known line and column
    pub fn new(source_uri: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLocation {
            line,
            column,
            source_uri: source_uri.into(),
        }
    }

    /// Whether the line/column pair is known
    pub fn is_resolved(&self) -> bool {
        self.line != 0 && self.column != 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_uri, self.line, self.column)
    }
}

/// A comment surfaced as a metadata-like entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment text exactly as written, delimiters included
    pub text: String,
    /// The text with comment syntax stripped per line
    pub trimmed_text: String,
    /// True for `///` and `/** */` documentation comments
    pub is_doc_comment: bool,
}

impl Comment {
    /// Build a comment record, deriving the trimmed text and doc flag
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let is_doc_comment = text.starts_with("///") || text.starts_with("/**");
        let trimmed_text = trim_comment(&text);
        Comment {
            text,
            trimmed_text,
            is_doc_comment,
        }
    }
}

/// Strip comment delimiters and per-line decoration from raw comment text
fn trim_comment(text: &str) -> String {
    if let Some(body) = text.strip_prefix("///") {
        return trim_line_comment_lines(text, "///").unwrap_or_else(|| body.trim().to_string());
    }
    if let Some(body) = text.strip_prefix("//") {
        return trim_line_comment_lines(text, "//").unwrap_or_else(|| body.trim().to_string());
    }
    let block = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*"))
        .map(|rest| rest.strip_suffix("*/").unwrap_or(rest));
    match block {
        Some(body) => body
            .lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        None => text.trim().to_string(),
    }
}

/// Trim a multi-line run of `//`-style comments, one prefix per line
fn trim_line_comment_lines(text: &str, prefix: &str) -> Option<String> {
    if !text.contains('\n') {
        return None;
    }
    let trimmed = text
        .lines()
        .map(|line| line.trim().trim_start_matches(prefix).trim())
        .collect::<Vec<_>>()
        .join("\n");
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_resolved() {
        let known = SourceLocation::new("demo.mirra", 3, 14);
        assert!(known.is_resolved());
        assert_eq!(format!("{}", known), "demo.mirra:3:14");

        let unknown = SourceLocation::new("demo.mirra", 0, 0);
        assert!(!unknown.is_resolved());
    }

    #[test]
    fn test_doc_comment_detection() {
        assert!(Comment::new("/// Adds two numbers.").is_doc_comment);
        assert!(Comment::new("/** Block doc. */").is_doc_comment);
        assert!(!Comment::new("// plain note").is_doc_comment);
        assert!(!Comment::new("/* plain block */").is_doc_comment);
    }

    #[test]
    fn test_line_comment_trimming() {
        let c = Comment::new("/// Adds two numbers.");
        assert_eq!(c.trimmed_text, "Adds two numbers.");

        let multi = Comment::new("/// First line.\n/// Second line.");
        assert_eq!(multi.trimmed_text, "First line.\nSecond line.");
    }

    #[test]
    fn test_block_comment_trimming() {
        let c = Comment::new("/**\n * Adds two numbers.\n * Never overflows.\n */");
        assert_eq!(c.trimmed_text, "Adds two numbers.\nNever overflows.");
    }
}
