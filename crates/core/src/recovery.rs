//! Error-recovery advisor (spec §4.9): on a not-found or empty-result outcome,
//! produce ranked suggestions drawn from five strategies. Never errors itself —
//! a strategy that can't run (e.g. parent doesn't exist either) just contributes
//! nothing.

use std::path::Path;

use serde::Serialize;

use crate::path::{is_excluded_name, MAX_DEPTH};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub confidence: f64,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    DirectoryListing,
    SimilarFiles,
    SearchResults,
    ParentDirectory,
    AlternativePath,
}

const ALTERNATIVE_EXTENSIONS: &[&str] = &["md", "ts", "js", "txt", "json", "yaml", "yml"];
const SEARCH_DEPTH_LIMIT: usize = 3;

/// Build up to 5 ranked suggestions for a not-found `requested` path (relative to
/// `base`, forward-slash normalized, no leading slash).
pub async fn suggest(base: &Path, requested: &str) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    suggestions.extend(directory_listing(base, requested).await);
    suggestions.extend(similar_files(base, requested).await);
    suggestions.extend(search_results(base, requested).await);
    suggestions.extend(parent_directory(base, requested).await);
    suggestions.extend(alternative_path(base, requested).await);

    suggestions.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    suggestions.truncate(5);
    suggestions
}

fn parent_rel(requested: &str) -> Option<&str> {
    requested.rsplit_once('/').map(|(dir, _)| dir)
}

fn file_name(requested: &str) -> &str {
    requested.rsplit('/').next().unwrap_or(requested)
}

async fn directory_listing(base: &Path, requested: &str) -> Option<Suggestion> {
    let parent_rel = parent_rel(requested).unwrap_or("");
    let parent_abs = base.join(parent_rel);
    let mut entries = tokio::fs::read_dir(&parent_abs).await.ok()?;
    let mut names = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if names.len() >= 20 {
            break;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_excluded_name(&name) {
            continue;
        }
        names.push(name);
    }
    if names.is_empty() {
        return None;
    }
    Some(Suggestion {
        kind: SuggestionKind::DirectoryListing,
        confidence: 0.9,
        detail: format!("contents of '{parent_rel}': {}", names.join(", ")),
    })
}

fn name_similarity_score(candidate: &str, target: &str) -> f64 {
    if candidate == target {
        100.0
    } else if candidate.starts_with(target) {
        80.0
    } else if candidate.contains(target) {
        60.0
    } else {
        let dist = strsim::normalized_levenshtein(candidate, target);
        (40.0 - dist * 40.0).max(0.0)
    }
}

async fn similar_files(base: &Path, requested: &str) -> Option<Suggestion> {
    let target = file_name(requested);
    let parent_rel = parent_rel(requested).unwrap_or("");
    let parent_abs = base.join(parent_rel);
    let mut entries = tokio::fs::read_dir(&parent_abs).await.ok()?;

    let mut scored: Vec<(String, f64)> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        if is_excluded_name(&name) || name == target {
            continue;
        }
        let score = name_similarity_score(&name, target);
        if score > 30.0 {
            scored.push((name, score));
        }
    }
    if scored.is_empty() {
        return None;
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    let names: Vec<String> = scored.into_iter().map(|(n, _)| n).collect();
    Some(Suggestion {
        kind: SuggestionKind::SimilarFiles,
        confidence: 0.8,
        detail: format!("similar names in '{parent_rel}': {}", names.join(", ")),
    })
}

async fn search_results(base: &Path, requested: &str) -> Option<Suggestion> {
    let target = file_name(requested).to_lowercase();
    let mut hits = Vec::new();
    let mut stack = vec![(base.to_path_buf(), 0usize)];
    while let Some((dir, depth)) = stack.pop() {
        if depth > SEARCH_DEPTH_LIMIT {
            continue;
        }
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else { continue };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_excluded_name(&name) {
                continue;
            }
            let path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                stack.push((path.clone(), depth + 1));
            }
            if name.to_lowercase().contains(&target) {
                if let Ok(rel) = path.strip_prefix(base) {
                    hits.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
            if hits.len() >= 20 {
                break;
            }
        }
    }
    if hits.is_empty() {
        return None;
    }
    Some(Suggestion {
        kind: SuggestionKind::SearchResults,
        confidence: 0.7,
        detail: format!("found elsewhere: {}", hits.join(", ")),
    })
}

async fn parent_directory(base: &Path, requested: &str) -> Option<Suggestion> {
    let mut parts: Vec<&str> = requested.split('/').collect();
    parts.pop();
    while !parts.is_empty() {
        let candidate = parts.join("/");
        if tokio::fs::metadata(base.join(&candidate)).await.is_ok() {
            return Some(Suggestion {
                kind: SuggestionKind::ParentDirectory,
                confidence: 0.6,
                detail: format!("nearest existing ancestor: '{candidate}'"),
            });
        }
        parts.pop();
    }
    if tokio::fs::metadata(base).await.is_ok() {
        return Some(Suggestion {
            kind: SuggestionKind::ParentDirectory,
            confidence: 0.6,
            detail: "nearest existing ancestor: '' (base directory)".to_string(),
        });
    }
    None
}

async fn alternative_path(base: &Path, requested: &str) -> Option<Suggestion> {
    let mut candidates = Vec::new();

    if let Some((stem, _ext)) = requested.rsplit_once('.') {
        for ext in ALTERNATIVE_EXTENSIONS {
            candidates.push(format!("{stem}.{ext}"));
        }
        candidates.push(stem.to_string());
    }

    let parent = parent_rel(requested).unwrap_or("");
    let join = |p: &str, f: &str| if p.is_empty() { f.to_string() } else { format!("{p}/{f}") };
    candidates.push(join(parent, "index.md"));
    candidates.push(join(parent, "README.md"));

    let mut found = Vec::new();
    for candidate in candidates {
        if candidate == requested {
            continue;
        }
        if tokio::fs::metadata(base.join(&candidate)).await.is_ok() && !found.contains(&candidate) {
            found.push(candidate);
        }
    }

    if found.is_empty() {
        return None;
    }
    Some(Suggestion {
        kind: SuggestionKind::AlternativePath,
        confidence: 0.85,
        detail: format!("alternative paths that exist: {}", found.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_listing_suggests_siblings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::write(dir.path().join("b.txt"), "y").unwrap();
        let suggestions = suggest(dir.path(), "missing.txt").await;
        assert!(suggestions.iter().any(|s| s.kind == SuggestionKind::DirectoryListing));
    }

    #[tokio::test]
    async fn similar_files_finds_near_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), "x").unwrap();
        let suggestions = suggest(dir.path(), "readme.md.bak").await;
        assert!(suggestions.iter().any(|s| s.kind == SuggestionKind::SimilarFiles));
    }

    #[tokio::test]
    async fn alternative_extension_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        let suggestions = suggest(dir.path(), "notes.ts").await;
        assert!(suggestions.iter().any(|s| s.kind == SuggestionKind::AlternativePath));
    }

    #[test]
    fn scoring_matches_spec_bands() {
        assert_eq!(name_similarity_score("foo", "foo"), 100.0);
        assert_eq!(name_similarity_score("foobar", "foo"), 80.0);
        assert_eq!(name_similarity_score("xfooy", "foo"), 60.0);
    }
}
