//! Walks the base tree, detects additions/modifications by content hash, and keeps
//! the semantic index (spec §4.3) in sync with disk: keyword extraction, preview
//! generation, the cheap semantic signature, and mime-type lookup.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::clock::{iso8601_to_millis, now_iso8601, system_time_to_millis};
use crate::error::{PackfsError, Result};
use crate::index_store::{IndexEntry, SemanticIndex};
use crate::path::{is_excluded_name, MAX_DEPTH};

/// Files larger than this are skipped entirely (spec §4.3 step 1).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Extensions treated as binary — content indexing is skipped (spec §4.3 step 2).
/// No entry is created for these: without read content there is nothing stable to
/// hash, and the spec scopes binary content out of indexing entirely (§1 Non-goals).
pub const BINARY_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "pdf", "zip", "tar", "gz", "exe", "bin"];

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "will", "would", "could", "should", "have", "has", "had", "this", "that",
    "these", "those", "not", "from", "into", "through", "during", "before", "after", "above",
    "below", "between", "among",
];

const MAX_KEYWORDS: usize = 15;
const SIGNATURE_KEYWORDS: usize = 5;
const PREVIEW_MAX_CHARS: usize = 300;
const PREVIEW_MAX_LINES: usize = 3;
const PREVIEW_MIN_LINE_LEN: usize = 10;

/// Derive a mime type from an extension lookup table (spec: "derived from extension
/// lookup table").
pub fn mime_type_for(ext: &str) -> String {
    let mime = match ext {
        "md" | "markdown" => "text/markdown",
        "txt" => "text/plain",
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/x-yaml",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" | "cjs" => "text/javascript",
        "ts" | "tsx" => "application/typescript",
        "jsx" => "text/jsx",
        "rs" => "text/x-rust",
        "py" => "text/x-python",
        "go" => "text/x-go",
        "java" => "text/x-java",
        "c" | "h" => "text/x-c",
        "cpp" | "cc" | "cxx" | "hpp" => "text/x-c++",
        "sh" | "bash" => "application/x-sh",
        "csv" => "text/csv",
        "sql" => "application/sql",
        "" => "application/octet-stream",
        _ => "text/plain",
    };
    mime.to_string()
}

/// Folded 32-bit accumulator hash, base-36 encoded (spec §4.3 step 3). Weak by
/// design — collisions only cost a missed skip-unchanged optimization, never
/// correctness (spec §9).
pub fn content_hash(bytes: &[u8]) -> String {
    let mut h: u32 = 0;
    for &b in bytes {
        h = h.wrapping_mul(33) ^ (b as u32);
    }
    to_base36(h)
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap()
}

/// Tokenize to lowercase word runs, drop length <= 3 and stop-words, rank by
/// frequency (ties broken alphabetically for determinism), keep the top 15.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        if token.len() <= 3 {
            continue;
        }
        let lower = token.to_lowercase();
        if STOP_WORDS.contains(&lower.as_str()) {
            continue;
        }
        *freq.entry(lower).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(MAX_KEYWORDS).map(|(word, _)| word).collect()
}

/// First 3 non-empty lines longer than 10 chars, newline-joined, capped at 300 chars.
pub fn build_preview(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| l.len() > PREVIEW_MIN_LINE_LEN)
        .take(PREVIEW_MAX_LINES)
        .collect();
    let joined = lines.join("\n");
    if joined.chars().count() > PREVIEW_MAX_CHARS {
        joined.chars().take(PREVIEW_MAX_CHARS).collect()
    } else {
        joined
    }
}

/// Sorted `|`-join of the top-5 keywords.
pub fn semantic_signature(keywords: &[String]) -> String {
    let mut top: Vec<String> = keywords.iter().take(SIGNATURE_KEYWORDS).cloned().collect();
    top.sort();
    top.join("|")
}

/// Synchronous tree walk (run inside `spawn_blocking`): exclusion rules, depth cap,
/// and symlink-cycle detection via a canonical-directory visited set (spec §4.1).
fn collect_candidate_files(base: &Path) -> Vec<(String, PathBuf)> {
    let visited: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));
    let visited_filter = Arc::clone(&visited);

    let mut builder = ignore::WalkBuilder::new(base);
    builder
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(true)
        .max_depth(Some(MAX_DEPTH))
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_excluded_name(&name) {
                return false;
            }
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                let canonical =
                    entry.path().canonicalize().unwrap_or_else(|_| entry.path().to_path_buf());
                return visited_filter.lock().unwrap().insert(canonical);
            }
            true
        });

    let mut results = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry during indexing");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let abs = entry.path().to_path_buf();
        let rel = abs.strip_prefix(base).unwrap_or(&abs).to_string_lossy().replace('\\', "/");
        results.push((rel, abs));
    }
    results
}

async fn candidate_files(base: &Path) -> Result<Vec<(String, PathBuf)>> {
    let base_owned = base.to_path_buf();
    tokio::task::spawn_blocking(move || collect_candidate_files(&base_owned))
        .await
        .map_err(|e| PackfsError::backend_io(e.to_string()))
}

/// Re-index a single file after a write/move/copy. Public wrapper around
/// [`update_file_index`] for the operation engine to call after a mutating op.
pub async fn reindex_single(index: &mut SemanticIndex, rel_path: &str, abs_path: &Path) {
    update_file_index(index, rel_path, abs_path).await;
}

/// `updateFileIndex` (spec §4.3): re-read, re-hash, and upsert a single file's entry
/// if its content changed. Silently skips files that vanished mid-walk, exceed the
/// size cap, look binary, or aren't valid UTF-8 — all logged, never fatal to the
/// surrounding traversal.
async fn update_file_index(index: &mut SemanticIndex, rel_path: &str, abs_path: &Path) {
    let metadata = match tokio::fs::metadata(abs_path).await {
        Ok(m) => m,
        Err(_) => return,
    };
    if metadata.len() > MAX_FILE_SIZE {
        return;
    }
    let ext = abs_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if BINARY_EXTENSIONS.contains(&ext.as_str()) {
        return;
    }

    let bytes = match tokio::fs::read(abs_path).await {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %rel_path, error = %e, "failed to read file during indexing");
            return;
        }
    };
    let text = match String::from_utf8(bytes) {
        Ok(t) => t,
        Err(_) => return,
    };

    let hash = content_hash(text.as_bytes());
    if let Some(existing) = index.entries.get(rel_path) {
        if existing.content_hash == hash {
            return;
        }
    }

    let keywords = extract_keywords(&text);
    let preview = build_preview(&text);
    let signature = semantic_signature(&keywords);
    let mtime = metadata.modified().map(system_time_to_millis).unwrap_or(0);

    index.upsert_entry(IndexEntry {
        path: rel_path.to_string(),
        content_hash: hash,
        mtime,
        size: metadata.len(),
        mime_type: mime_type_for(&ext),
        keywords,
        preview,
        semantic_signature: signature,
        last_indexed: now_iso8601(),
    });
}

/// Full traversal: walk `base`, upsert every still-extant, within-size, text file.
/// Does not remove entries for files no longer present — callers that need
/// deletion reconciliation should use [`update_index_if_needed`].
pub async fn reindex_into(base: &Path, index: &mut SemanticIndex) -> Result<()> {
    let files = candidate_files(base).await?;
    for (rel, abs) in &files {
        update_file_index(index, rel, abs).await;
    }
    index.touch();
    Ok(())
}

pub async fn full_reindex(base: &Path) -> Result<SemanticIndex> {
    let mut index = SemanticIndex::empty();
    reindex_into(base, &mut index).await?;
    Ok(index)
}

/// `updateIndexIfNeeded` (spec §4.3), extended per REDESIGN FLAG #4: in addition to
/// re-running indexing when any file's mtime is newer than `index.lastUpdated`,
/// always reconciles deletions — entries whose on-disk file is gone are dropped on
/// every incremental pass, not just on a full rebuild. Returns whether anything
/// changed.
pub async fn update_index_if_needed(base: &Path, index: &mut SemanticIndex) -> Result<bool> {
    let files = candidate_files(base).await?;
    let last_updated_millis = iso8601_to_millis(&index.last_updated).unwrap_or(0);

    let mut current_paths: HashSet<String> = HashSet::with_capacity(files.len());
    let mut any_modified = false;
    for (rel, abs) in &files {
        current_paths.insert(rel.clone());
        if let Ok(meta) = tokio::fs::metadata(abs).await {
            if let Ok(modified) = meta.modified() {
                if system_time_to_millis(modified) > last_updated_millis {
                    any_modified = true;
                }
            }
        }
    }

    let stale: Vec<String> =
        index.entries.keys().filter(|p| !current_paths.contains(*p)).cloned().collect();
    let mut changed = !stale.is_empty();
    for path in stale {
        index.remove_entry(&path);
    }

    if any_modified {
        changed = true;
        for (rel, abs) in &files {
            update_file_index(index, rel, abs).await;
        }
    }

    if changed {
        index.touch();
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_extraction_drops_short_and_stop_words() {
        let text = "The quick brown fox jumps over the lazy dog repeatedly repeatedly";
        let keywords = extract_keywords(text);
        assert!(keywords.contains(&"quick".to_string()));
        assert!(keywords.contains(&"repeatedly".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"dog".to_string())); // length 3, dropped
    }

    #[test]
    fn preview_respects_line_and_length_rules() {
        let text = "short\nThis line is long enough\nAnother long enough line here\nand a fourth";
        let preview = build_preview(text);
        assert!(preview.contains("This line is long enough"));
        assert!(!preview.contains("short"));
        assert!(!preview.contains("fourth"));
    }

    #[test]
    fn same_content_same_hash() {
        assert_eq!(content_hash(b"hello world"), content_hash(b"hello world"));
        assert_ne!(content_hash(b"hello world"), content_hash(b"hello there"));
    }

    #[tokio::test]
    async fn unchanged_content_hash_leaves_index_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Hello there, this is a test document").unwrap();
        let mut index = full_reindex(dir.path()).await.unwrap();
        let before = index.entries.get("a.md").cloned().unwrap();
        reindex_into(dir.path(), &mut index).await.unwrap();
        let after = index.entries.get("a.md").cloned().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn excluded_directories_never_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "module.exports = 1;").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('hello there world')").unwrap();
        let index = full_reindex(dir.path()).await.unwrap();
        assert!(index.entries.contains_key("app.js"));
        assert!(!index.entries.keys().any(|p| p.contains("node_modules")));
    }

    #[tokio::test]
    async fn reconciliation_drops_deleted_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "some reasonably long content line here").unwrap();
        let mut index = full_reindex(dir.path()).await.unwrap();
        assert!(index.entries.contains_key("a.md"));
        std::fs::remove_file(dir.path().join("a.md")).unwrap();
        let changed = update_index_if_needed(dir.path(), &mut index).await.unwrap();
        assert!(changed);
        assert!(!index.entries.contains_key("a.md"));
    }
}
