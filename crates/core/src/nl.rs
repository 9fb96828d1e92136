//! Deterministic, rule-based natural-language parser (spec §4.8): maps a free-text
//! query to one intent purpose plus a confidence in `[0, 1]`. No model, no
//! learned weights — a fixed ordered rule list, tested in the order the spec
//! prescribes (more specific phrasing first).

use regex::Regex;
use std::sync::OnceLock;

use crate::intent::FileTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedPurpose {
    /// update / create
    CreateFile,
    /// access / read
    ReadFile,
    /// discover / search_semantic
    SearchSemantic,
    /// remove / delete_file
    DeleteFile,
}

#[derive(Debug, Clone)]
pub struct NlParseResult {
    pub purpose: ParsedPurpose,
    pub confidence: f64,
    pub target: FileTarget,
    pub content: Option<String>,
}

fn file_named_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"file (?:called|named)\s+"?([\w./-]+)"?"#).unwrap())
}

fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([\w.-]+\.\w+)\b").unwrap())
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).unwrap())
}

fn with_content_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:with|containing|content)\s+"([^"]+)""#).unwrap())
}

/// Target extraction, in order: `file (called|named) X`, then a `\w+\.\w+`
/// extension, then a quoted filename, else the whole query as a semantic query.
fn extract_target(query: &str) -> FileTarget {
    if let Some(caps) = file_named_re().captures(query) {
        return FileTarget::from_path(caps[1].to_string());
    }
    if let Some(caps) = extension_re().captures(query) {
        return FileTarget::from_path(caps[1].to_string());
    }
    if let Some(caps) = quoted_re().captures(query) {
        let quoted = caps.get(1).or_else(|| caps.get(2)).unwrap().as_str();
        return FileTarget::from_path(quoted.to_string());
    }
    FileTarget { semantic_query: Some(query.to_string()), ..Default::default() }
}

/// Content extraction: `(with|containing|content) "…"`, else any quoted string
/// that wasn't already consumed as the filename target.
fn extract_content(query: &str, target: &FileTarget) -> Option<String> {
    if let Some(caps) = with_content_re().captures(query) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = quoted_re().captures(query) {
        let quoted = caps.get(1).or_else(|| caps.get(2)).unwrap().as_str();
        if target.path.as_deref() != Some(quoted) {
            return Some(quoted.to_string());
        }
    }
    None
}

/// Parse a free-text query into a purpose, confidence, target, and optional content.
pub fn parse(query: &str) -> NlParseResult {
    let lower = query.to_lowercase();
    let target = extract_target(&lower);
    let content = extract_content(&lower, &target);

    // Ordering matters: "write/create/save" is tested before "read/show/content"
    // because e.g. "create a file with content" is more specific than the generic
    // "content" match.
    let (purpose, confidence) = if lower.contains("write") || lower.contains("create") || lower.contains("save")
    {
        (ParsedPurpose::CreateFile, 0.7)
    } else if (lower.contains("read") || lower.contains("show") || lower.contains("content"))
        && !lower.contains("with")
    {
        (ParsedPurpose::ReadFile, 0.8)
    } else if lower.contains("find") || lower.contains("search") || lower.contains("look for") {
        (ParsedPurpose::SearchSemantic, 0.75)
    } else if lower.contains("delete") || lower.contains("remove") || lower.contains("rm") {
        (ParsedPurpose::DeleteFile, 0.9)
    } else {
        (ParsedPurpose::ReadFile, 0.3)
    };

    NlParseResult { purpose, confidence, target, content }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_query_has_high_confidence() {
        let parsed = parse("delete notes.md");
        assert_eq!(parsed.purpose, ParsedPurpose::DeleteFile);
        assert!(parsed.confidence >= 0.9);
        assert_eq!(parsed.target.path.as_deref(), Some("notes.md"));
    }

    #[test]
    fn create_beats_read_when_both_present() {
        // "content" alone would match the read rule, but "create ... with content"
        // should be recognized as a create intent first.
        let parsed = parse(r#"create a file named notes.md with content "hello""#);
        assert_eq!(parsed.purpose, ParsedPurpose::CreateFile);
        assert_eq!(parsed.target.path.as_deref(), Some("notes.md"));
        assert_eq!(parsed.content.as_deref(), Some("hello"));
    }

    #[test]
    fn search_query_uses_semantic_discover() {
        let parsed = parse("find files about authentication");
        assert_eq!(parsed.purpose, ParsedPurpose::SearchSemantic);
    }

    #[test]
    fn unrecognized_query_defaults_low_confidence_read() {
        let parsed = parse("blah blah blah");
        assert_eq!(parsed.purpose, ParsedPurpose::ReadFile);
        assert_eq!(parsed.confidence, 0.3);
    }

    #[test]
    fn extension_extracted_without_quotes() {
        let parsed = parse("read main.rs");
        assert_eq!(parsed.target.path.as_deref(), Some("main.rs"));
    }
}
