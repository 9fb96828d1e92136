//! Typed intent shapes and purposes (spec §4.4): one struct per category, a closed
//! enum of purposes per category, and the validator that enforces required fields
//! before an intent is dispatched.

use serde::{Deserialize, Serialize};

use crate::error::{PackfsError, Result};
use crate::recovery::Suggestion;

// ---------------------------------------------------------------------------
// Purposes (closed enumerations)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPurpose {
    Read,
    Preview,
    Metadata,
    VerifyExists,
    CreateOrGet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePurpose {
    Create,
    Append,
    Overwrite,
    Merge,
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizePurpose {
    CreateDirectory,
    Move,
    Copy,
    GroupSemantic,
    GroupKeywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverPurpose {
    List,
    Find,
    SearchContent,
    SearchSemantic,
    SearchIntegrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovePurpose {
    DeleteFile,
    DeleteDirectory,
    DeleteByCriteria,
}

// ---------------------------------------------------------------------------
// Targets & criteria
// ---------------------------------------------------------------------------

/// A target may carry any subset of its members; it is valid iff at least one is
/// present (spec §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Criteria>,
}

impl FileTarget {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self { path: Some(path.into()), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.pattern.is_none()
            && self.semantic_query.is_none()
            && self.criteria.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_before: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default)]
    pub include_metadata: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub create_path: bool,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub include_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub move_to_trash: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAccessIntent {
    pub purpose: AccessPurpose,
    pub target: FileTarget,
    #[serde(default)]
    pub preferences: AccessPreferences,
    #[serde(default)]
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpdateIntent {
    pub purpose: UpdatePurpose,
    pub target: FileTarget,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOrganizeIntent {
    pub purpose: OrganizePurpose,
    #[serde(default)]
    pub source: Option<FileTarget>,
    #[serde(default)]
    pub destination: Option<FileTarget>,
    #[serde(default)]
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiscoverIntent {
    pub purpose: DiscoverPurpose,
    pub target: FileTarget,
    #[serde(default)]
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRemoveIntent {
    pub purpose: RemovePurpose,
    pub target: FileTarget,
    #[serde(default)]
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Intent {
    Access(FileAccessIntent),
    Update(FileUpdateIntent),
    Organize(FileOrganizeIntent),
    Discover(FileDiscoverIntent),
    Remove(FileRemoveIntent),
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub path: String,
    pub size: u64,
    pub mime_type: String,
    pub mtime: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    pub success: bool,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub success: bool,
    pub created: bool,
    pub bytes_written: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub key: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeResult {
    pub success: bool,
    pub files_affected: usize,
    pub new_paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverEntry {
    pub path: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverResult {
    pub success: bool,
    pub files: Vec<DiscoverEntry>,
    pub total_found: usize,
    pub search_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResult {
    pub success: bool,
    pub files_deleted: usize,
    pub directories_deleted: usize,
    pub freed_space: u64,
    pub deleted_paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IntentResult {
    Access(AccessResult),
    Update(UpdateResult),
    Organize(OrganizeResult),
    Discover(DiscoverResult),
    Remove(RemoveResult),
}

impl IntentResult {
    pub fn success(&self) -> bool {
        match self {
            IntentResult::Access(r) => r.success,
            IntentResult::Update(r) => r.success,
            IntentResult::Organize(r) => r.success,
            IntentResult::Discover(r) => r.success,
            IntentResult::Remove(r) => r.success,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn require_target(target: &FileTarget, context: &str) -> Result<()> {
    if target.is_empty() {
        return Err(PackfsError::invalid_intent(format!(
            "{context}: target must carry at least one of path/pattern/semanticQuery/criteria"
        )));
    }
    Ok(())
}

pub fn validate_access(intent: &FileAccessIntent) -> Result<()> {
    match intent.purpose {
        AccessPurpose::CreateOrGet => {
            if intent.target.path.is_none() {
                return Err(PackfsError::invalid_intent("create_or_get requires target.path"));
            }
        }
        _ => require_target(&intent.target, "access")?,
    }
    Ok(())
}

pub fn validate_update(intent: &FileUpdateIntent) -> Result<()> {
    require_target(&intent.target, "update")?;
    if intent.purpose != UpdatePurpose::Create && intent.content.is_none() {
        return Err(PackfsError::invalid_intent(format!(
            "update/{:?} requires content",
            intent.purpose
        )));
    }
    Ok(())
}

pub fn validate_organize(intent: &FileOrganizeIntent) -> Result<()> {
    match intent.purpose {
        OrganizePurpose::CreateDirectory => {
            let dest = intent.destination.as_ref().ok_or_else(|| {
                PackfsError::invalid_intent("create_directory requires destination.path")
            })?;
            if dest.path.is_none() {
                return Err(PackfsError::invalid_intent("create_directory requires destination.path"));
            }
        }
        OrganizePurpose::Move | OrganizePurpose::Copy => {
            let source = intent
                .source
                .as_ref()
                .ok_or_else(|| PackfsError::invalid_intent(format!("{:?} requires source", intent.purpose)))?;
            require_target(source, "organize.source")?;
            let dest = intent
                .destination
                .as_ref()
                .ok_or_else(|| PackfsError::invalid_intent(format!("{:?} requires destination", intent.purpose)))?;
            if dest.path.is_none() {
                return Err(PackfsError::invalid_intent(format!(
                    "{:?} requires destination.path",
                    intent.purpose
                )));
            }
        }
        OrganizePurpose::GroupSemantic | OrganizePurpose::GroupKeywords => {}
    }
    Ok(())
}

pub fn validate_discover(intent: &FileDiscoverIntent) -> Result<()> {
    match intent.purpose {
        DiscoverPurpose::List => {
            if intent.target.path.is_none() {
                return Err(PackfsError::invalid_intent("list requires target.path"));
            }
        }
        _ => require_target(&intent.target, "discover")?,
    }
    Ok(())
}

pub fn validate_remove(intent: &FileRemoveIntent) -> Result<()> {
    require_target(&intent.target, "remove")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_target_rejected() {
        let intent = FileAccessIntent {
            purpose: AccessPurpose::Read,
            target: FileTarget::default(),
            preferences: AccessPreferences::default(),
            options: OperationOptions::default(),
        };
        assert!(validate_access(&intent).is_err());
    }

    #[test]
    fn create_or_get_requires_path() {
        let intent = FileAccessIntent {
            purpose: AccessPurpose::CreateOrGet,
            target: FileTarget { pattern: Some("*.md".into()), ..Default::default() },
            preferences: AccessPreferences::default(),
            options: OperationOptions::default(),
        };
        assert!(validate_access(&intent).is_err());
    }

    #[test]
    fn append_requires_content() {
        let intent = FileUpdateIntent {
            purpose: UpdatePurpose::Append,
            target: FileTarget::from_path("a.txt"),
            content: None,
            options: OperationOptions::default(),
        };
        assert!(validate_update(&intent).is_err());
    }

    #[test]
    fn create_does_not_require_content() {
        let intent = FileUpdateIntent {
            purpose: UpdatePurpose::Create,
            target: FileTarget::from_path("a.txt"),
            content: None,
            options: OperationOptions::default(),
        };
        assert!(validate_update(&intent).is_ok());
    }

    #[test]
    fn move_requires_source_and_destination() {
        let intent = FileOrganizeIntent {
            purpose: OrganizePurpose::Move,
            source: None,
            destination: Some(FileTarget::from_path("b.txt")),
            options: OperationOptions::default(),
        };
        assert!(validate_organize(&intent).is_err());
    }
}
