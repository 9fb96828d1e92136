//! The operation engine (spec §4.6): the five intent handlers
//! (`accessFile`, `updateContent`, `organizeFiles`, `discoverFiles`, `removeFiles`),
//! each validated then dispatched against the live index and the sandboxed disk.
//!
//! Every handler honors an `options.workingDirectory` override (spec §4.6, §4.10):
//! when present it replaces the engine's base directory for that one call and the
//! persistent index is neither consulted nor mutated — the operation becomes a
//! plain sandboxed disk operation. Because the index can't be consulted, an
//! override combined with a target that has no `path` (pattern/semanticQuery/
//! criteria, all of which only make sense against an indexed corpus) is rejected
//! as an invalid intent rather than silently returning nothing.

use std::path::{Path, PathBuf};

use crate::clock::now_millis;
use crate::engine::PackfsEngine;
use crate::error::{PackfsError, Result};
use crate::intent::{
    AccessPurpose, DiscoverEntry, DiscoverPurpose, DiscoverResult, FileAccessIntent,
    FileDiscoverIntent, FileMetadata, FileOrganizeIntent, FileRemoveIntent, FileUpdateIntent,
    Group, OrganizePurpose, OrganizeResult, RemoveResult, UpdatePurpose, UpdateResult,
};
use crate::intent::{validate_access, validate_discover, validate_organize, validate_remove, validate_update};
use crate::path::ResolvedPath;
use crate::recovery::suggest;
use crate::retrieval::{find_by_content, find_by_semantic, find_by_target, find_integrated};

fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

async fn dir_size(path: &Path) -> u64 {
    let mut total = 0u64;
    let mut stack = vec![path.to_path_buf()];
    while let Some(p) = stack.pop() {
        if let Ok(mut rd) = tokio::fs::read_dir(&p).await {
            while let Ok(Some(entry)) = rd.next_entry().await {
                if let Ok(meta) = entry.metadata().await {
                    if meta.is_dir() {
                        stack.push(entry.path());
                    } else {
                        total += meta.len();
                    }
                }
            }
        }
    }
    total
}

impl PackfsEngine {
    /// Resolve the base directory for one operation: the engine's sandbox root, or
    /// the caller's `workingDirectory` override when present. Overrides must be
    /// absolute and must already exist on disk.
    pub(crate) fn effective_base(&self, override_wd: Option<&str>) -> Result<PathBuf> {
        match override_wd {
            Some(wd) => {
                let candidate = PathBuf::from(wd);
                if !candidate.is_absolute() {
                    return Err(PackfsError::invalid_intent(
                        "options.workingDirectory override must be an absolute path",
                    ));
                }
                candidate
                    .canonicalize()
                    .map_err(|_| PackfsError::backend_io(format!("working directory '{wd}' not found")))
            }
            None => Ok(self.base.clone()),
        }
    }

    async fn reindex_path(&mut self, rel_path: &str, abs_path: &Path) {
        crate::indexer::reindex_single(&mut self.index, rel_path, abs_path).await;
    }

    pub(crate) async fn persist_index(&self) -> Result<()> {
        self.store.save(&self.index).await
    }

    async fn file_metadata(&self, resolved: &ResolvedPath) -> Result<FileMetadata> {
        let meta = tokio::fs::metadata(&resolved.absolute).await?;
        let ext = resolved.relative.rsplit_once('.').map(|(_, e)| e).unwrap_or("").to_lowercase();
        Ok(FileMetadata {
            path: resolved.relative.clone(),
            size: meta.len(),
            mime_type: crate::indexer::mime_type_for(&ext),
            mtime: meta.modified().map(crate::clock::system_time_to_millis).unwrap_or(0),
        })
    }

    // -----------------------------------------------------------------------
    // accessFile
    // -----------------------------------------------------------------------

    pub async fn access_file(&mut self, intent: &FileAccessIntent) -> Result<crate::intent::AccessResult> {
        use crate::intent::AccessResult;

        validate_access(intent)?;
        let override_wd = intent.options.working_directory.as_deref();
        let base = self.effective_base(override_wd)?;
        let use_index = override_wd.is_none();

        let resolved = if let Some(path) = &intent.target.path {
            Some(crate::path::resolve(&base, path)?)
        } else if use_index {
            let matches = find_by_target(&self.index, &intent.target, 1);
            match matches.into_iter().next() {
                Some(rel) => Some(crate::path::resolve(&base, &rel)?),
                None => None,
            }
        } else {
            return Err(PackfsError::invalid_intent(
                "access under a working-directory override requires target.path",
            ));
        };

        let Some(resolved) = resolved else {
            if intent.purpose == AccessPurpose::VerifyExists {
                return Ok(AccessResult { success: true, exists: false, ..Default::default() });
            }
            return Ok(AccessResult {
                success: false,
                exists: false,
                message: Some("no matching file found".to_string()),
                ..Default::default()
            });
        };

        let exists = tokio::fs::metadata(&resolved.absolute).await.is_ok();

        if intent.purpose == AccessPurpose::VerifyExists {
            return Ok(AccessResult { success: true, exists, ..Default::default() });
        }

        if !exists {
            if intent.purpose == AccessPurpose::CreateOrGet {
                if let Some(parent) = resolved.absolute.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&resolved.absolute, b"").await?;
                if use_index {
                    self.reindex_path(&resolved.relative, &resolved.absolute).await;
                    self.persist_index().await?;
                }
                return Ok(AccessResult {
                    success: true,
                    exists: true,
                    content: Some(String::new()),
                    ..Default::default()
                });
            }
            let suggestions = suggest(&base, &resolved.relative).await;
            return Ok(AccessResult {
                success: false,
                exists: false,
                message: Some(format!("'{}' not found", resolved.relative)),
                suggestions,
                ..Default::default()
            });
        }

        match intent.purpose {
            AccessPurpose::Read | AccessPurpose::CreateOrGet => {
                let bytes = tokio::fs::read(&resolved.absolute).await?;
                let content = String::from_utf8_lossy(&bytes).into_owned();
                let metadata = if intent.preferences.include_metadata {
                    Some(self.file_metadata(&resolved).await?)
                } else {
                    None
                };
                Ok(AccessResult { success: true, exists: true, content: Some(content), metadata, ..Default::default() })
            }
            AccessPurpose::Preview => {
                let indexed_preview = if use_index {
                    self.index.entries.get(&resolved.relative).map(|e| e.preview.clone())
                } else {
                    None
                };
                let preview = match indexed_preview {
                    Some(p) if !p.is_empty() => p,
                    _ => {
                        let bytes = tokio::fs::read(&resolved.absolute).await.unwrap_or_default();
                        crate::indexer::build_preview(&String::from_utf8_lossy(&bytes))
                    }
                };
                Ok(AccessResult { success: true, exists: true, preview: Some(preview), ..Default::default() })
            }
            AccessPurpose::Metadata => {
                let metadata = self.file_metadata(&resolved).await?;
                Ok(AccessResult { success: true, exists: true, metadata: Some(metadata), ..Default::default() })
            }
            AccessPurpose::VerifyExists => unreachable!("handled above"),
        }
    }

    // -----------------------------------------------------------------------
    // updateContent
    // -----------------------------------------------------------------------

    pub async fn update_content(&mut self, intent: &FileUpdateIntent) -> Result<UpdateResult> {
        validate_update(intent)?;
        let override_wd = intent.options.working_directory.as_deref();
        let base = self.effective_base(override_wd)?;
        let use_index = override_wd.is_none();

        let path = intent
            .target
            .path
            .clone()
            .ok_or_else(|| PackfsError::invalid_intent("update requires target.path"))?;
        let resolved = crate::path::resolve(&base, &path)?;
        let exists = tokio::fs::metadata(&resolved.absolute).await.is_ok();
        let content = intent.content.clone().unwrap_or_default();

        match intent.purpose {
            UpdatePurpose::Create if exists && !intent.options.create_path => {
                return Err(PackfsError::conflict(format!("'{}' already exists", resolved.relative)));
            }
            UpdatePurpose::Append if !exists => {
                return Err(PackfsError::conflict(format!("'{}' does not exist", resolved.relative)));
            }
            _ => {}
        }

        if let Some(parent) = resolved.absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let final_bytes: Vec<u8> = match intent.purpose {
            UpdatePurpose::Create | UpdatePurpose::Overwrite | UpdatePurpose::Patch => content.into_bytes(),
            UpdatePurpose::Append => {
                let mut existing = tokio::fs::read(&resolved.absolute).await?;
                existing.extend_from_slice(content.as_bytes());
                existing
            }
            UpdatePurpose::Merge => {
                if exists {
                    let mut existing = tokio::fs::read(&resolved.absolute).await?;
                    if !existing.is_empty() {
                        existing.push(b'\n');
                    }
                    existing.extend_from_slice(content.as_bytes());
                    existing
                } else {
                    content.into_bytes()
                }
            }
        };

        let created = !exists;
        let bytes_written = final_bytes.len() as u64;
        tokio::fs::write(&resolved.absolute, &final_bytes).await?;

        if use_index {
            self.reindex_path(&resolved.relative, &resolved.absolute).await;
            self.persist_index().await?;
        }

        Ok(UpdateResult { success: true, created, bytes_written, message: None })
    }

    // -----------------------------------------------------------------------
    // organizeFiles
    // -----------------------------------------------------------------------

    pub async fn organize_files(&mut self, intent: &FileOrganizeIntent) -> Result<OrganizeResult> {
        validate_organize(intent)?;
        let override_wd = intent.options.working_directory.as_deref();
        let base = self.effective_base(override_wd)?;
        let use_index = override_wd.is_none();

        match intent.purpose {
            OrganizePurpose::CreateDirectory => {
                let dest_path = intent.destination.as_ref().unwrap().path.as_ref().unwrap();
                let resolved = crate::path::resolve(&base, dest_path)?;
                if intent.options.recursive {
                    tokio::fs::create_dir_all(&resolved.absolute).await?;
                } else {
                    tokio::fs::create_dir(&resolved.absolute).await?;
                }
                Ok(OrganizeResult {
                    success: true,
                    files_affected: 1,
                    new_paths: vec![resolved.relative],
                    ..Default::default()
                })
            }
            OrganizePurpose::Move | OrganizePurpose::Copy => {
                let source_target = intent.source.as_ref().unwrap();
                let dest_path = intent.destination.as_ref().unwrap().path.as_ref().unwrap().clone();

                let source_paths: Vec<String> = if let Some(p) = &source_target.path {
                    vec![crate::path::normalize_relative(p)?]
                } else if use_index {
                    find_by_target(&self.index, source_target, self.config.default_max_results)
                } else {
                    return Err(PackfsError::invalid_intent(
                        "organize under a working-directory override requires source.path",
                    ));
                };

                if source_paths.is_empty() {
                    return Ok(OrganizeResult {
                        success: false,
                        message: Some("no source files matched".to_string()),
                        ..Default::default()
                    });
                }

                let dest_resolved = crate::path::resolve(&base, &dest_path)?;
                let dest_is_dir =
                    tokio::fs::metadata(&dest_resolved.absolute).await.map(|m| m.is_dir()).unwrap_or(false);

                // REDESIGN FLAG: refuse fanning multiple sources into one
                // non-directory destination instead of silently clobbering it
                // with the last source processed.
                if source_paths.len() > 1 && !dest_is_dir {
                    return Err(PackfsError::invalid_intent(
                        "multiple source files cannot be moved or copied onto a single non-directory destination",
                    ));
                }

                let mut new_paths = Vec::with_capacity(source_paths.len());
                for src_rel in &source_paths {
                    let src_resolved = crate::path::resolve(&base, src_rel)?;
                    let target_resolved = if dest_is_dir {
                        let file_name = src_resolved
                            .absolute
                            .file_name()
                            .ok_or_else(|| PackfsError::invalid_intent("source has no file name"))?
                            .to_string_lossy()
                            .into_owned();
                        let rel = if dest_resolved.relative.is_empty() {
                            file_name
                        } else {
                            format!("{}/{}", dest_resolved.relative, file_name)
                        };
                        crate::path::resolve(&base, &rel)?
                    } else {
                        dest_resolved.clone()
                    };

                    if let Some(parent) = target_resolved.absolute.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }

                    match intent.purpose {
                        OrganizePurpose::Move => {
                            tokio::fs::rename(&src_resolved.absolute, &target_resolved.absolute).await?;
                            if use_index {
                                if let Some(mut entry) = self.index.remove_entry(&src_resolved.relative) {
                                    entry.path = target_resolved.relative.clone();
                                    self.index.upsert_entry(entry);
                                } else {
                                    self.reindex_path(&target_resolved.relative, &target_resolved.absolute).await;
                                }
                            }
                        }
                        OrganizePurpose::Copy => {
                            tokio::fs::copy(&src_resolved.absolute, &target_resolved.absolute).await?;
                            if use_index {
                                self.reindex_path(&target_resolved.relative, &target_resolved.absolute).await;
                            }
                        }
                        _ => unreachable!(),
                    }
                    new_paths.push(target_resolved.relative);
                }

                if use_index {
                    self.persist_index().await?;
                }

                Ok(OrganizeResult { success: true, files_affected: new_paths.len(), new_paths, ..Default::default() })
            }
            OrganizePurpose::GroupKeywords => {
                let groups: Vec<Group> = self
                    .index
                    .keyword_map
                    .iter()
                    .map(|(key, paths)| Group { key: key.clone(), paths: paths.clone() })
                    .collect();
                Ok(OrganizeResult { success: true, groups: Some(groups), ..Default::default() })
            }
            OrganizePurpose::GroupSemantic => {
                let mut grouped: std::collections::BTreeMap<String, Vec<String>> = std::collections::BTreeMap::new();
                for entry in self.index.entries.values() {
                    grouped.entry(entry.semantic_signature.clone()).or_default().push(entry.path.clone());
                }
                let groups: Vec<Group> = grouped.into_iter().map(|(key, paths)| Group { key, paths }).collect();
                Ok(OrganizeResult { success: true, groups: Some(groups), ..Default::default() })
            }
        }
    }

    // -----------------------------------------------------------------------
    // discoverFiles
    // -----------------------------------------------------------------------

    pub async fn discover_files(&mut self, intent: &FileDiscoverIntent) -> Result<DiscoverResult> {
        validate_discover(intent)?;
        let start = std::time::Instant::now();
        let override_wd = intent.options.working_directory.as_deref();
        let base = self.effective_base(override_wd)?;
        let use_index = override_wd.is_none();
        // REDESIGN FLAG: `list` applies the same result cap as every other
        // discover purpose instead of returning an unbounded directory dump.
        let max_results = intent.options.max_results.unwrap_or(self.config.default_max_results);

        match intent.purpose {
            DiscoverPurpose::List => self.discover_list(&base, intent, max_results, start).await,
            DiscoverPurpose::Find => {
                if !use_index {
                    return Err(PackfsError::invalid_intent(
                        "find requires the persistent index (no working-directory override)",
                    ));
                }
                self.discover_find(&base, intent, max_results, start).await
            }
            DiscoverPurpose::SearchContent => {
                if !use_index {
                    return Err(PackfsError::invalid_intent(
                        "search_content requires the persistent index (no working-directory override)",
                    ));
                }
                let query = intent
                    .target
                    .semantic_query
                    .clone()
                    .or_else(|| intent.target.pattern.clone())
                    .ok_or_else(|| PackfsError::invalid_intent("search_content requires target.semanticQuery"))?;
                let mut matches: Vec<String> = find_by_content(&self.index, &query).into_iter().map(String::from).collect();
                matches.truncate(max_results);
                self.finish_discover(&base, matches, &query, start).await
            }
            DiscoverPurpose::SearchSemantic => {
                if !use_index {
                    return Err(PackfsError::invalid_intent(
                        "search_semantic requires the persistent index (no working-directory override)",
                    ));
                }
                let query = intent
                    .target
                    .semantic_query
                    .clone()
                    .ok_or_else(|| PackfsError::invalid_intent("search_semantic requires target.semanticQuery"))?;
                let scored = find_by_semantic(&self.index, &query, max_results);
                self.finish_discover_scored(&base, scored, &query, start).await
            }
            DiscoverPurpose::SearchIntegrated => {
                if !use_index {
                    return Err(PackfsError::invalid_intent(
                        "search_integrated requires the persistent index (no working-directory override)",
                    ));
                }
                let query = intent
                    .target
                    .semantic_query
                    .clone()
                    .or_else(|| intent.target.pattern.clone())
                    .ok_or_else(|| PackfsError::invalid_intent("search_integrated requires target.semanticQuery"))?;
                let scored = find_integrated(&self.index, &query, max_results);
                self.finish_discover_scored(&base, scored, &query, start).await
            }
        }
    }

    async fn discover_list(
        &self,
        base: &Path,
        intent: &FileDiscoverIntent,
        max_results: usize,
        start: std::time::Instant,
    ) -> Result<DiscoverResult> {
        let rel_dir = intent.target.path.clone().unwrap();
        let resolved = crate::path::resolve(base, &rel_dir)?;

        let mut read_dir = match tokio::fs::read_dir(&resolved.absolute).await {
            Ok(rd) => rd,
            Err(e) => {
                let suggestions = suggest(base, &resolved.relative).await;
                return Ok(DiscoverResult {
                    success: false,
                    message: Some(e.to_string()),
                    suggestions,
                    search_time_ms: elapsed_ms(start),
                    ..Default::default()
                });
            }
        };

        let mut files = Vec::new();
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            // `list` only ever hides the index's own directory, not the broader
            // indexing exclusion set (spec: that set governs indexing/recursive
            // scan, not a plain single-level directory listing).
            if name.starts_with(crate::path::INDEX_DIR_NAME) {
                continue;
            }
            let meta = entry.metadata().await.ok();
            let is_dir = meta.as_ref().map(|m| m.is_dir()).unwrap_or(false);
            let rel_path =
                if resolved.relative.is_empty() { name.clone() } else { format!("{}/{name}", resolved.relative) };
            let content = if intent.options.include_content && !is_dir {
                tokio::fs::read_to_string(entry.path()).await.ok()
            } else {
                None
            };
            files.push(DiscoverEntry { path: rel_path, is_dir, size: meta.map(|m| m.len()), content, relevance: None });
            if files.len() >= max_results {
                break;
            }
        }

        let total_found = files.len();
        Ok(DiscoverResult { success: true, files, total_found, search_time_ms: elapsed_ms(start), ..Default::default() })
    }

    async fn discover_find(
        &self,
        base: &Path,
        intent: &FileDiscoverIntent,
        max_results: usize,
        start: std::time::Instant,
    ) -> Result<DiscoverResult> {
        // REDESIGN FLAG: a named target that isn't indexed is reported as
        // not-found (with suggestions); only an unnamed query (pattern/
        // criteria/semantic) that matches nothing is a zero-result success.
        if let Some(path) = &intent.target.path {
            let normalized = crate::path::normalize_relative(path)?;
            return match self.index.entries.get(&normalized) {
                Some(entry) => Ok(DiscoverResult {
                    success: true,
                    files: vec![DiscoverEntry {
                        path: normalized,
                        is_dir: false,
                        size: Some(entry.size),
                        content: None,
                        relevance: None,
                    }],
                    total_found: 1,
                    search_time_ms: elapsed_ms(start),
                    ..Default::default()
                }),
                None => {
                    let suggestions = suggest(base, &normalized).await;
                    Ok(DiscoverResult {
                        success: false,
                        message: Some(format!("'{normalized}' not found")),
                        suggestions,
                        search_time_ms: elapsed_ms(start),
                        ..Default::default()
                    })
                }
            };
        }

        let matches = find_by_target(&self.index, &intent.target, max_results);
        let probe =
            intent.target.semantic_query.clone().or_else(|| intent.target.pattern.clone()).unwrap_or_default();
        self.finish_discover(base, matches, &probe, start).await
    }

    async fn finish_discover(
        &self,
        base: &Path,
        matches: Vec<String>,
        probe: &str,
        start: std::time::Instant,
    ) -> Result<DiscoverResult> {
        let files: Vec<DiscoverEntry> = matches
            .iter()
            .map(|p| DiscoverEntry {
                path: p.clone(),
                is_dir: false,
                size: self.index.entries.get(p).map(|e| e.size),
                content: None,
                relevance: None,
            })
            .collect();
        let total_found = files.len();
        let suggestions = if total_found == 0 && !probe.is_empty() { suggest(base, probe).await } else { Vec::new() };
        Ok(DiscoverResult {
            success: true,
            files,
            total_found,
            search_time_ms: elapsed_ms(start),
            suggestions,
            ..Default::default()
        })
    }

    async fn finish_discover_scored(
        &self,
        base: &Path,
        scored: Vec<crate::retrieval::ScoredMatch>,
        probe: &str,
        start: std::time::Instant,
    ) -> Result<DiscoverResult> {
        let files: Vec<DiscoverEntry> = scored
            .iter()
            .map(|m| DiscoverEntry {
                path: m.path.clone(),
                is_dir: false,
                size: self.index.entries.get(&m.path).map(|e| e.size),
                content: None,
                relevance: Some(m.relevance),
            })
            .collect();
        let total_found = files.len();
        let suggestions = if total_found == 0 { suggest(base, probe).await } else { Vec::new() };
        Ok(DiscoverResult {
            success: true,
            files,
            total_found,
            search_time_ms: elapsed_ms(start),
            suggestions,
            ..Default::default()
        })
    }

    // -----------------------------------------------------------------------
    // removeFiles
    // -----------------------------------------------------------------------

    pub async fn remove_files(&mut self, intent: &FileRemoveIntent) -> Result<RemoveResult> {
        validate_remove(intent)?;
        let override_wd = intent.options.working_directory.as_deref();
        let base = self.effective_base(override_wd)?;
        let use_index = override_wd.is_none();

        let targets: Vec<String> = if let Some(p) = &intent.target.path {
            vec![crate::path::normalize_relative(p)?]
        } else if use_index {
            find_by_target(&self.index, &intent.target, self.config.default_max_results)
        } else {
            return Err(PackfsError::invalid_intent(
                "remove under a working-directory override requires target.path",
            ));
        };

        let mut plan: Vec<(String, PathBuf, bool, u64)> = Vec::with_capacity(targets.len());
        for rel in &targets {
            let resolved = crate::path::resolve(&base, rel)?;
            let meta = match tokio::fs::metadata(&resolved.absolute).await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let is_dir = meta.is_dir();
            let size = if is_dir { dir_size(&resolved.absolute).await } else { meta.len() };
            plan.push((resolved.relative, resolved.absolute, is_dir, size));
        }

        if intent.options.dry_run {
            let files_deleted = plan.iter().filter(|(_, _, is_dir, _)| !*is_dir).count();
            let directories_deleted = plan.len() - files_deleted;
            let freed_space = plan.iter().map(|(_, _, _, s)| s).sum();
            let deleted_paths = plan.into_iter().map(|(rel, ..)| rel).collect();
            return Ok(RemoveResult { success: true, files_deleted, directories_deleted, freed_space, deleted_paths, message: None });
        }

        let mut deleted_paths = Vec::new();
        let mut freed_space = 0u64;
        let mut files_deleted = 0usize;
        let mut directories_deleted = 0usize;

        for (rel, abs, is_dir, size) in plan {
            let outcome = if intent.options.move_to_trash {
                let trashed = format!("{}.deleted.{}", abs.to_string_lossy(), now_millis());
                tokio::fs::rename(&abs, &trashed).await
            } else if is_dir {
                tokio::fs::remove_dir_all(&abs).await
            } else {
                tokio::fs::remove_file(&abs).await
            };

            if let Err(e) = outcome {
                tracing::warn!(path = %rel, error = %e, "failed to remove path, skipping");
                continue;
            }

            if use_index {
                self.purge_index_prefix(&rel, is_dir);
            }

            freed_space += size;
            if is_dir {
                directories_deleted += 1;
            } else {
                files_deleted += 1;
            }
            deleted_paths.push(rel);
        }

        if use_index {
            self.persist_index().await?;
        }

        Ok(RemoveResult { success: true, files_deleted, directories_deleted, freed_space, deleted_paths, message: None })
    }

    fn purge_index_prefix(&mut self, rel: &str, is_dir: bool) {
        if !is_dir {
            self.index.remove_entry(rel);
            return;
        }
        let prefix = format!("{rel}/");
        let stale: Vec<String> =
            self.index.entries.keys().filter(|p| p.as_str() == rel || p.starts_with(&prefix)).cloned().collect();
        for path in stale {
            self.index.remove_entry(&path);
        }
    }
}
