//! Engine configuration (spec §6): result-size defaults, the semantic-match threshold,
//! NL-parser enablement, and chunking parameters reserved for future chunked retrieval.
//!
//! Loadable from an optional `.packfs.toml` at the base directory root, following the
//! teacher's `.codescope.toml` convention (`init.rs`/`parse_repos_toml`). A missing
//! file is not an error — defaults apply.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Chunking parameters, reserved for a future chunked-retrieval pass over large files.
/// Not exercised by the core operations in this engine, but part of the external
/// configuration surface (spec §6) and validated on load.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub overlap_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chunk_size: 512, overlap_size: 64 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_max_results: usize,
    pub semantic_threshold: f64,
    pub enable_natural_language: bool,
    pub chunking_config: ChunkingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_results: 100,
            semantic_threshold: 0.7,
            enable_natural_language: true,
            chunking_config: ChunkingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load `<base>/.packfs.toml` if present, falling back to defaults for anything
    /// the file omits (`#[serde(default)]` on every field) and to plain `Default` if
    /// the file does not exist at all.
    pub async fn load(base_dir: &Path) -> Result<Self> {
        let config_path = base_dir.join(".packfs.toml");
        match tokio::fs::read_to_string(&config_path).await {
            Ok(raw) => {
                let cfg: EngineConfig = toml::from_str(&raw).map_err(|e| {
                    crate::error::PackfsError::backend_io(format!(
                        "failed to parse {}: {e}",
                        config_path.display()
                    ))
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EngineConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_apply_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig::load(dir.path()).await.unwrap();
        assert_eq!(cfg.default_max_results, 100);
        assert_eq!(cfg.chunking_config.max_chunk_size, 512);
    }

    #[tokio::test]
    async fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".packfs.toml"), "default_max_results = 25\n").unwrap();
        let cfg = EngineConfig::load(dir.path()).await.unwrap();
        assert_eq!(cfg.default_max_results, 25);
        assert_eq!(cfg.semantic_threshold, 0.7);
    }
}
