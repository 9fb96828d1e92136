//! Retrieval engine (spec §4.5): path, glob, criteria, keyword, semantic, and
//! integrated search over the index, plus scoring and ranking.

use regex::RegexBuilder;

use crate::clock::iso8601_to_millis;
use crate::index_store::{IndexEntry, SemanticIndex};
use crate::intent::{Criteria, FileTarget};

pub const DEFAULT_MAX_RESULTS: usize = 100;

/// A path with an associated relevance score, used by the scored search modes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub path: String,
    pub relevance: f64,
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// ---------------------------------------------------------------------------
// Glob pattern matching
// ---------------------------------------------------------------------------

/// Translate a glob-style pattern to a case-insensitive regex, per spec §4.5:
/// escape `.`, turn `*` into `.*`, `?` into `.`. A pattern that fails to compile
/// falls back to a case-insensitive substring match with `*` stripped.
pub fn glob_matches<'a>(index: &'a SemanticIndex, pattern: &str) -> Vec<&'a str> {
    if pattern == "*" || pattern == "**" || pattern == "*.*" {
        return index.entries.keys().map(|s| s.as_str()).collect();
    }

    let escaped = pattern.replace('.', "\\.");
    let translated = escaped.replace('*', ".*").replace('?', ".");
    let anchored = format!("^{translated}$");

    match RegexBuilder::new(&anchored).case_insensitive(true).build() {
        Ok(re) => index.entries.keys().filter(|p| re.is_match(p)).map(|s| s.as_str()).collect(),
        Err(_) => {
            let needle = pattern.replace('*', "").to_lowercase();
            index
                .entries
                .keys()
                .filter(|p| p.to_lowercase().contains(&needle))
                .map(|s| s.as_str())
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria matching
// ---------------------------------------------------------------------------

pub fn matches_criteria(entry: &IndexEntry, criteria: &Criteria) -> bool {
    if let Some(name) = &criteria.name {
        if !basename(&entry.path).to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(content) = &criteria.content {
        let needle = content.to_lowercase();
        let in_keywords = entry.keywords.iter().any(|k| k.contains(&needle));
        let in_preview = entry.preview.to_lowercase().contains(&needle);
        if !in_keywords && !in_preview {
            return false;
        }
    }
    if let Some(min) = criteria.size_min {
        if entry.size < min {
            return false;
        }
    }
    if let Some(max) = criteria.size_max {
        if entry.size > max {
            return false;
        }
    }
    if let Some(after) = criteria.modified_after {
        if entry.mtime < after {
            return false;
        }
    }
    if let Some(before) = criteria.modified_before {
        if entry.mtime > before {
            return false;
        }
    }
    if let Some(types) = &criteria.file_type {
        let ext = basename(&entry.path).rsplit_once('.').map(|(_, e)| e).unwrap_or("");
        if !types.iter().any(|t| t.eq_ignore_ascii_case(ext)) {
            return false;
        }
    }
    true
}

pub fn find_by_criteria<'a>(index: &'a SemanticIndex, criteria: &Criteria) -> Vec<&'a str> {
    index
        .entries
        .values()
        .filter(|e| matches_criteria(e, criteria))
        .map(|e| e.path.as_str())
        .collect()
}

/// `modified.after`/`modified.before` in criteria accept ISO-8601 strings from
/// callers; convert before constructing a [`Criteria`].
pub fn parse_criteria_timestamp(s: &str) -> Option<i64> {
    iso8601_to_millis(s)
}

// ---------------------------------------------------------------------------
// Content (keyword/preview substring) search
// ---------------------------------------------------------------------------

pub fn content_matches(entry: &IndexEntry, query: &str) -> bool {
    let needle = query.to_lowercase();
    entry.keywords.iter().any(|k| k.contains(&needle)) || entry.preview.to_lowercase().contains(&needle)
}

pub fn find_by_content<'a>(index: &'a SemanticIndex, query: &str) -> Vec<&'a str> {
    index
        .entries
        .values()
        .filter(|e| content_matches(e, query))
        .map(|e| e.path.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Semantic scoring (spec §4.5 — deterministic surrogate, not a true embedding)
// ---------------------------------------------------------------------------

pub fn semantic_score(query: &str, entry: &IndexEntry) -> f64 {
    let tokens: Vec<String> = query.split_whitespace().map(|t| t.to_lowercase()).collect();
    let filename = basename(&entry.path).to_lowercase();
    let preview_lower = entry.preview.to_lowercase();

    let mut score = 0.0;
    for token in &tokens {
        if entry.keywords.iter().any(|k| k.contains(token.as_str())) {
            score += 2.0;
        }
        if filename.contains(token.as_str()) {
            score += 3.0;
        }
        if preview_lower.contains(token.as_str()) {
            score += 1.0;
        }
    }

    let query_lower = query.to_lowercase();
    if query_lower.contains("readme") && filename.contains("readme") {
        score += 10.0;
    }
    if query_lower.contains("config") && filename.contains("config") {
        score += 10.0;
    }

    score
}

pub fn find_by_semantic(index: &SemanticIndex, query: &str, max_results: usize) -> Vec<ScoredMatch> {
    let mut scored: Vec<ScoredMatch> = index
        .entries
        .values()
        .map(|e| ScoredMatch { path: e.path.clone(), relevance: semantic_score(query, e) })
        .filter(|m| m.relevance > 0.0)
        .collect();
    scored.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap());
    scored.truncate(max_results);
    scored
}

// ---------------------------------------------------------------------------
// Integrated search (content ∪ semantic, relevance-boosted)
// ---------------------------------------------------------------------------

pub fn find_integrated(index: &SemanticIndex, query: &str, max_results: usize) -> Vec<ScoredMatch> {
    let content_hits: Vec<String> = find_by_content(index, query).into_iter().map(String::from).collect();
    let semantic_hits = find_by_semantic(index, query, usize::MAX);
    let total_semantic = semantic_hits.len();

    let mut combined: Vec<ScoredMatch> = Vec::new();
    let content_set: std::collections::HashSet<&String> = content_hits.iter().collect();
    let mut semantic_seen: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for (rank, hit) in semantic_hits.iter().enumerate() {
        semantic_seen.insert(hit.path.as_str());
        let relevance = if content_set.contains(&hit.path) {
            0.9
        } else {
            1.0 - (rank as f64 / total_semantic.max(1) as f64)
        };
        combined.push(ScoredMatch { path: hit.path.clone(), relevance });
    }
    for path in &content_hits {
        if !semantic_seen.contains(path.as_str()) {
            combined.push(ScoredMatch { path: path.clone(), relevance: 0.6 });
        }
    }

    combined.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap());
    combined.truncate(max_results);
    combined
}

// ---------------------------------------------------------------------------
// Target resolution (union of whichever mechanisms the target carries)
// ---------------------------------------------------------------------------

/// Resolve a [`FileTarget`] to a set of (existing, indexed) relative paths by
/// unioning the outputs of whichever mechanisms are present. `path` is resolved
/// by exact indexed membership — callers needing existence-on-disk for a path
/// that may not yet be indexed should check separately.
pub fn find_by_target(index: &SemanticIndex, target: &FileTarget, max_results: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    if let Some(path) = &target.path {
        let normalized = path.trim_start_matches('/');
        if index.entries.contains_key(normalized) && seen.insert(normalized.to_string()) {
            out.push(normalized.to_string());
        }
    }
    if let Some(pattern) = &target.pattern {
        for p in glob_matches(index, pattern) {
            if seen.insert(p.to_string()) {
                out.push(p.to_string());
            }
        }
    }
    if let Some(query) = &target.semantic_query {
        for m in find_by_semantic(index, query, max_results) {
            if seen.insert(m.path.clone()) {
                out.push(m.path);
            }
        }
    }
    if let Some(criteria) = &target.criteria {
        for p in find_by_criteria(index, criteria) {
            if seen.insert(p.to_string()) {
                out.push(p.to_string());
            }
        }
    }

    if out.len() > max_results {
        out.truncate(max_results);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_store::IndexEntry;

    fn entry(path: &str, keywords: &[&str], preview: &str) -> IndexEntry {
        IndexEntry {
            path: path.to_string(),
            content_hash: "x".to_string(),
            mtime: 0,
            size: 10,
            mime_type: "text/plain".to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            preview: preview.to_string(),
            semantic_signature: keywords.join("|"),
            last_indexed: "now".to_string(),
        }
    }

    fn sample_index() -> SemanticIndex {
        let mut idx = SemanticIndex::empty();
        idx.upsert_entry(entry("docs/readme.md", &["project", "documentation"], "Project documentation here"));
        idx.upsert_entry(entry("src/main.js", &["console", "log"], "console.log stuff"));
        idx
    }

    #[test]
    fn semantic_search_ranks_readme_top() {
        let idx = sample_index();
        let results = find_by_semantic(&idx, "documentation", DEFAULT_MAX_RESULTS);
        assert!(!results.is_empty());
        assert!(results[0].path.contains("readme"));
    }

    #[test]
    fn glob_star_matches_all() {
        let idx = sample_index();
        let matches = glob_matches(&idx, "*");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn glob_extension_pattern() {
        let idx = sample_index();
        let matches = glob_matches(&idx, "*.md");
        assert_eq!(matches, vec!["docs/readme.md"]);
    }

    #[test]
    fn criteria_type_filters_by_extension() {
        let idx = sample_index();
        let criteria = Criteria { file_type: Some(vec!["js".to_string()]), ..Default::default() };
        let matches = find_by_criteria(&idx, &criteria);
        assert_eq!(matches, vec!["src/main.js"]);
    }

    #[test]
    fn integrated_search_boosts_both_hits() {
        let idx = sample_index();
        let results = find_integrated(&idx, "documentation", DEFAULT_MAX_RESULTS);
        let top = results.iter().find(|r| r.path.contains("readme")).unwrap();
        assert_eq!(top.relevance, 0.9);
    }
}
