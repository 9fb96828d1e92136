//! The compatibility facade (spec §4.10): a conventional POSIX-flavored surface
//! — `read_file`/`write_file`/`exists`/`stat`/`readdir`/`mkdir`/`remove`/`copy`/
//! `move_path` — for callers migrating from a plain filesystem API who don't want
//! to construct intents by hand. Every method is a thin, direct mapping onto one
//! of the five intent handlers; none of them go through the NL parser.

use crate::engine::PackfsEngine;
use crate::error::{PackfsError, Result};
use crate::intent::{
    AccessPreferences, AccessPurpose, DiscoverEntry, DiscoverPurpose, FileAccessIntent, FileDiscoverIntent,
    FileMetadata, FileOrganizeIntent, FileRemoveIntent, FileTarget, FileUpdateIntent, OperationOptions,
    OrganizePurpose, RemovePurpose, UpdatePurpose,
};

impl PackfsEngine {
    pub async fn read_file(&mut self, path: &str) -> Result<String> {
        let intent = FileAccessIntent {
            purpose: AccessPurpose::Read,
            target: FileTarget::from_path(path),
            preferences: AccessPreferences::default(),
            options: OperationOptions::default(),
        };
        let result = self.access_file(&intent).await?;
        if result.success {
            Ok(result.content.unwrap_or_default())
        } else {
            Err(PackfsError::not_found_with(
                result.message.unwrap_or_else(|| format!("'{path}' not found")),
                result.suggestions,
            ))
        }
    }

    pub async fn write_file(&mut self, path: &str, content: &str) -> Result<()> {
        let intent = FileUpdateIntent {
            purpose: UpdatePurpose::Overwrite,
            target: FileTarget::from_path(path),
            content: Some(content.to_string()),
            options: OperationOptions { create_path: true, ..Default::default() },
        };
        self.update_content(&intent).await?;
        Ok(())
    }

    pub async fn exists(&mut self, path: &str) -> Result<bool> {
        let intent = FileAccessIntent {
            purpose: AccessPurpose::VerifyExists,
            target: FileTarget::from_path(path),
            preferences: AccessPreferences::default(),
            options: OperationOptions::default(),
        };
        Ok(self.access_file(&intent).await?.exists)
    }

    pub async fn stat(&mut self, path: &str) -> Result<FileMetadata> {
        let intent = FileAccessIntent {
            purpose: AccessPurpose::Metadata,
            target: FileTarget::from_path(path),
            preferences: AccessPreferences { include_metadata: true, ..Default::default() },
            options: OperationOptions::default(),
        };
        let result = self.access_file(&intent).await?;
        result.metadata.ok_or_else(|| PackfsError::not_found(format!("'{path}' not found")))
    }

    pub async fn readdir(&mut self, path: &str) -> Result<Vec<DiscoverEntry>> {
        let intent = FileDiscoverIntent {
            purpose: DiscoverPurpose::List,
            target: FileTarget::from_path(path),
            options: OperationOptions::default(),
        };
        let result = self.discover_files(&intent).await?;
        if result.success {
            Ok(result.files)
        } else {
            Err(PackfsError::not_found_with(
                result.message.unwrap_or_else(|| format!("'{path}' not found")),
                result.suggestions,
            ))
        }
    }

    pub async fn mkdir(&mut self, path: &str, recursive: bool) -> Result<()> {
        let intent = FileOrganizeIntent {
            purpose: OrganizePurpose::CreateDirectory,
            source: None,
            destination: Some(FileTarget::from_path(path)),
            options: OperationOptions { recursive, ..Default::default() },
        };
        self.organize_files(&intent).await?;
        Ok(())
    }

    pub async fn remove(&mut self, path: &str) -> Result<()> {
        let intent = FileRemoveIntent {
            purpose: RemovePurpose::DeleteFile,
            target: FileTarget::from_path(path),
            options: OperationOptions::default(),
        };
        self.remove_files(&intent).await?;
        Ok(())
    }

    pub async fn copy(&mut self, from: &str, to: &str) -> Result<()> {
        let intent = FileOrganizeIntent {
            purpose: OrganizePurpose::Copy,
            source: Some(FileTarget::from_path(from)),
            destination: Some(FileTarget::from_path(to)),
            options: OperationOptions::default(),
        };
        self.organize_files(&intent).await?;
        Ok(())
    }

    /// Named `move_path` rather than `move` — the latter is a reserved keyword.
    pub async fn move_path(&mut self, from: &str, to: &str) -> Result<()> {
        let intent = FileOrganizeIntent {
            purpose: OrganizePurpose::Move,
            source: Some(FileTarget::from_path(from)),
            destination: Some(FileTarget::from_path(to)),
            options: OperationOptions::default(),
        };
        self.organize_files(&intent).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        engine.write_file("notes/todo.md", "buy milk").await.unwrap();
        assert_eq!(engine.read_file("notes/todo.md").await.unwrap(), "buy milk");
        assert!(engine.exists("notes/todo.md").await.unwrap());
    }

    #[tokio::test]
    async fn mkdir_then_readdir_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        engine.mkdir("sub", false).await.unwrap();
        engine.write_file("sub/a.txt", "x").await.unwrap();
        let entries = engine.readdir("sub").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "sub/a.txt");
    }

    #[tokio::test]
    async fn copy_then_move_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        engine.write_file("a.txt", "content").await.unwrap();
        engine.copy("a.txt", "b.txt").await.unwrap();
        assert_eq!(engine.read_file("b.txt").await.unwrap(), "content");
        engine.move_path("b.txt", "c.txt").await.unwrap();
        assert!(!engine.exists("b.txt").await.unwrap());
        assert!(engine.exists("c.txt").await.unwrap());
        engine.remove("c.txt").await.unwrap();
        assert!(!engine.exists("c.txt").await.unwrap());
    }
}
