//! The single error type threaded through every public engine method.
//!
//! Mirrors the error kinds enumerated in the design: `NotFound`, `SandboxViolation`,
//! `Conflict`, `InvalidIntent`, `BackendIO`, `Timeout`, `Cancelled`. `IndexCorruption`
//! exists so internal index-loading code has a uniform `Result` type, but it never
//! escapes [`crate::index_store::IndexStore::load`] — corruption is handled by a
//! rebuild, not reported to callers.

use std::fmt;
use std::path::PathBuf;

use crate::recovery::Suggestion;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PackfsError>;

#[derive(Debug)]
pub enum PackfsError {
    /// The requested target does not exist. Carries ranked suggestions (§4.9).
    NotFound { message: String, suggestions: Vec<Suggestion> },
    /// A resolved path escaped the sandbox base directory.
    SandboxViolation { path: String },
    /// `create` on an existing file without `createPath`, or `append` to a missing file.
    Conflict { message: String },
    /// The intent failed validation (missing purpose, missing content, ...).
    InvalidIntent { message: String },
    /// The underlying OS call failed (permissions, space, locked file, ...).
    BackendIO { message: String, source: Option<std::io::Error> },
    /// Index file exists but its shape could not be trusted; only used internally.
    IndexCorruption { message: String },
    /// A caller-supplied operation timeout elapsed.
    Timeout,
    /// A host-issued cancellation signal fired before the operation completed.
    Cancelled,
}

impl PackfsError {
    pub fn not_found(message: impl Into<String>) -> Self {
        PackfsError::NotFound { message: message.into(), suggestions: Vec::new() }
    }

    pub fn not_found_with(message: impl Into<String>, suggestions: Vec<Suggestion>) -> Self {
        PackfsError::NotFound { message: message.into(), suggestions }
    }

    pub fn sandbox_violation(path: impl Into<String>) -> Self {
        PackfsError::SandboxViolation { path: path.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PackfsError::Conflict { message: message.into() }
    }

    pub fn invalid_intent(message: impl Into<String>) -> Self {
        PackfsError::InvalidIntent { message: message.into() }
    }

    pub fn backend_io(message: impl Into<String>) -> Self {
        PackfsError::BackendIO { message: message.into(), source: None }
    }

    /// A human-readable message suitable for an `IntentResult.message` field.
    pub fn message(&self) -> String {
        match self {
            PackfsError::NotFound { message, .. } => message.clone(),
            PackfsError::SandboxViolation { path } => {
                format!("path '{path}' escapes the sandbox base directory")
            }
            PackfsError::Conflict { message } => message.clone(),
            PackfsError::InvalidIntent { message } => message.clone(),
            PackfsError::BackendIO { message, .. } => message.clone(),
            PackfsError::IndexCorruption { message } => message.clone(),
            PackfsError::Timeout => "operation timed out".to_string(),
            PackfsError::Cancelled => "operation was cancelled".to_string(),
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            PackfsError::NotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

impl fmt::Display for PackfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PackfsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackfsError::BackendIO { source: Some(e), .. } => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PackfsError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            PackfsError::not_found(err.to_string())
        } else {
            PackfsError::BackendIO { message: err.to_string(), source: Some(err) }
        }
    }
}

/// Helper for constructing a sandbox-violation error with a path rendered for display.
pub fn sandbox_violation(path: &PathBuf) -> PackfsError {
    PackfsError::sandbox_violation(path.to_string_lossy().to_string())
}
