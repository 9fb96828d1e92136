//! `packfs-core`: a semantic filesystem layer — intent-based file operations
//! over a sandboxed directory tree, backed by a persistent keyword/content
//! index instead of raw path lookups. See [`engine::PackfsEngine`] for the
//! entry point.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod facade;
pub mod index_store;
pub mod indexer;
pub mod intent;
pub mod nl;
pub mod operations;
pub mod path;
pub mod recovery;
pub mod retrieval;
pub mod workflow;

pub use engine::PackfsEngine;
pub use error::{PackfsError, Result};
pub use intent::{
    AccessPurpose, DiscoverPurpose, FileAccessIntent, FileDiscoverIntent, FileOrganizeIntent, FileRemoveIntent,
    FileTarget, FileUpdateIntent, Intent, IntentResult, OrganizePurpose, RemovePurpose, UpdatePurpose,
};
pub use workflow::{Workflow, WorkflowResult};
