//! The persistent semantic index (spec §4.2, §6): entries keyed by relative path,
//! plus an inverted keyword map. Responsible for the on-disk JSON shape, self-healing
//! a corrupted `keywordMap` on load (invariant 4), and atomic-ish save via a sibling
//! temp file + rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::now_iso8601;
use crate::error::Result;
use crate::path::INDEX_DIR_NAME;

pub const CURRENT_VERSION: &str = "1.0.0";
pub const INDEX_FILE_NAME: &str = "semantic-index.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub path: String,
    pub content_hash: String,
    pub mtime: i64,
    pub size: u64,
    pub mime_type: String,
    pub keywords: Vec<String>,
    pub preview: String,
    pub semantic_signature: String,
    pub last_indexed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticIndex {
    pub version: String,
    pub created: String,
    pub last_updated: String,
    pub entries: BTreeMap<String, IndexEntry>,
    pub keyword_map: BTreeMap<String, Vec<String>>,
}

impl SemanticIndex {
    pub fn empty() -> Self {
        let now = now_iso8601();
        Self {
            version: CURRENT_VERSION.to_string(),
            created: now.clone(),
            last_updated: now,
            entries: BTreeMap::new(),
            keyword_map: BTreeMap::new(),
        }
    }

    /// Insert or replace an entry, keeping the keyword map consistent (invariant 2):
    /// remove the old entry's keywords first, then add the new ones.
    pub fn upsert_entry(&mut self, entry: IndexEntry) {
        if let Some(old) = self.entries.remove(&entry.path) {
            self.remove_keywords_for(&old.path, &old.keywords);
        }
        for kw in &entry.keywords {
            let paths = self.keyword_map.entry(kw.clone()).or_default();
            if !paths.contains(&entry.path) {
                paths.push(entry.path.clone());
            }
        }
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Remove an entry and purge its keywords from the map (used by remove/move).
    pub fn remove_entry(&mut self, rel_path: &str) -> Option<IndexEntry> {
        let removed = self.entries.remove(rel_path)?;
        self.remove_keywords_for(rel_path, &removed.keywords);
        Some(removed)
    }

    fn remove_keywords_for(&mut self, rel_path: &str, keywords: &[String]) {
        for kw in keywords {
            if let Some(paths) = self.keyword_map.get_mut(kw) {
                paths.retain(|p| p != rel_path);
                if paths.is_empty() {
                    self.keyword_map.remove(kw);
                }
            }
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = now_iso8601();
    }

    /// Self-heal invariant 4: any `keywordMap` value that isn't a sequence of paths
    /// becomes an empty sequence. Operates on the raw JSON before typed deserialization
    /// so a malformed shape (e.g. a string instead of an array) can't fail the parse.
    fn self_heal(raw: &mut serde_json::Value) {
        let Some(keyword_map) = raw.get_mut("keywordMap").and_then(|v| v.as_object_mut()) else {
            return;
        };
        for (_key, value) in keyword_map.iter_mut() {
            let is_valid_sequence = value
                .as_array()
                .map(|arr| arr.iter().all(|v| v.is_string()))
                .unwrap_or(false);
            if !is_valid_sequence {
                *value = serde_json::Value::Array(Vec::new());
            }
        }
    }
}

pub struct IndexStore {
    index_path: PathBuf,
}

impl IndexStore {
    pub fn new(base_dir: &Path) -> Self {
        Self { index_path: base_dir.join(INDEX_DIR_NAME).join(INDEX_FILE_NAME) }
    }

    pub fn index_dir(base_dir: &Path) -> PathBuf {
        base_dir.join(INDEX_DIR_NAME)
    }

    /// Load the index file. Returns `Ok(None)` when the file is absent, unreadable,
    /// malformed beyond self-healing, or at a different `version` — in every such
    /// case the caller is expected to rebuild from scratch (spec §4.2).
    pub async fn load(&self) -> Result<Option<SemanticIndex>> {
        let raw = match tokio::fs::read_to_string(&self.index_path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(error = %e, "index file unreadable, will rebuild");
                return Ok(None);
            }
        };

        let mut value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "index file is not valid JSON, will rebuild");
                return Ok(None);
            }
        };

        SemanticIndex::self_heal(&mut value);

        let version_ok = value.get("version").and_then(|v| v.as_str()) == Some(CURRENT_VERSION);
        if !version_ok {
            debug!("index version mismatch, will rebuild");
            return Ok(None);
        }

        match serde_json::from_value::<SemanticIndex>(value) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                warn!(error = %e, "index file shape invalid after self-heal, will rebuild");
                Ok(None)
            }
        }
    }

    /// Persist the index. Writes a sibling temp file and renames over the target —
    /// atomic within a single process, not claimed across processes (spec §5).
    pub async fn save(&self, index: &SemanticIndex) -> Result<()> {
        if let Some(parent) = self.index_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_string_pretty(index)
            .map_err(|e| crate::error::PackfsError::backend_io(e.to_string()))?;
        let tmp_path = self.index_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, serialized).await?;
        tokio::fs::rename(&tmp_path, &self.index_path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(path: &str, keywords: &[&str]) -> IndexEntry {
        IndexEntry {
            path: path.to_string(),
            content_hash: "abc123".to_string(),
            mtime: 0,
            size: 10,
            mime_type: "text/plain".to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            preview: "preview".to_string(),
            semantic_signature: keywords.join("|"),
            last_indexed: now_iso8601(),
        }
    }

    #[test]
    fn upsert_keeps_keyword_map_consistent() {
        let mut idx = SemanticIndex::empty();
        idx.upsert_entry(sample_entry("a.md", &["alpha", "beta"]));
        assert_eq!(idx.keyword_map["alpha"], vec!["a.md".to_string()]);
        idx.upsert_entry(sample_entry("a.md", &["gamma"]));
        assert!(!idx.keyword_map.contains_key("alpha"));
        assert_eq!(idx.keyword_map["gamma"], vec!["a.md".to_string()]);
    }

    #[test]
    fn remove_entry_purges_keywords() {
        let mut idx = SemanticIndex::empty();
        idx.upsert_entry(sample_entry("a.md", &["alpha"]));
        idx.remove_entry("a.md");
        assert!(idx.entries.is_empty());
        assert!(idx.keyword_map.is_empty());
    }

    #[test]
    fn self_heal_replaces_non_array_keyword_value() {
        let mut value = serde_json::json!({
            "version": CURRENT_VERSION,
            "created": "2024-01-01T00:00:00Z",
            "lastUpdated": "2024-01-01T00:00:00Z",
            "entries": {},
            "keywordMap": { "foo": "not-an-array", "bar": ["ok.md"] }
        });
        SemanticIndex::self_heal(&mut value);
        assert_eq!(value["keywordMap"]["foo"], serde_json::json!([]));
        assert_eq!(value["keywordMap"]["bar"], serde_json::json!(["ok.md"]));
        let parsed: SemanticIndex = serde_json::from_value(value).unwrap();
        assert!(parsed.keyword_map["foo"].is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let mut idx = SemanticIndex::empty();
        idx.upsert_entry(sample_entry("a.md", &["alpha"]));
        store.save(&idx).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.keyword_map["alpha"], vec!["a.md".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn version_mismatch_triggers_rebuild_signal() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        tokio::fs::create_dir_all(IndexStore::index_dir(dir.path())).await.unwrap();
        tokio::fs::write(
            IndexStore::index_dir(dir.path()).join(INDEX_FILE_NAME),
            r#"{"version":"0.0.1","created":"x","lastUpdated":"x","entries":{},"keywordMap":{}}"#,
        )
        .await
        .unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
