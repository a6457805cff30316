use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::EngineError;
use crate::search::tt::DEFAULT_HASH_MB;
use crate::search::SearchParams;

/// Engine settings as read from a JSON file or assembled from the command line.
/// Missing fields fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub movetime_ms: Option<u64>,
    #[serde(default = "default_hash_mb")]
    pub hash_mb: usize,
    #[serde(default = "one")]
    pub threads: usize,
}

fn default_hash_mb() -> usize {
    DEFAULT_HASH_MB
}

fn one() -> usize {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { depth: None, movetime_ms: None, hash_mb: DEFAULT_HASH_MB, threads: 1 }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|e| match e {
            EngineError::Config(msg) => EngineError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.hash_mb == 0 { return Err(EngineError::Config("hash_mb must be at least 1".into())); }
        if self.threads == 0 { return Err(EngineError::Config("threads must be at least 1".into())); }
        if self.depth == Some(0) { return Err(EngineError::Config("depth must be at least 1".into())); }
        Ok(())
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            depth: self.depth,
            movetime: self.movetime_ms.map(Duration::from_millis),
            use_tt: true,
            threads: self.threads.max(1),
            max_nodes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn fields_map_onto_search_params() {
        let cfg = EngineConfig::from_json(r#"{"depth": 5, "movetime_ms": 250, "threads": 2}"#).unwrap();
        let p = cfg.search_params();
        assert_eq!(p.depth, Some(5));
        assert_eq!(p.movetime, Some(Duration::from_millis(250)));
        assert_eq!(p.threads, 2);
        assert_eq!(cfg.hash_mb, DEFAULT_HASH_MB);
    }

    #[test]
    fn rejects_unknown_and_zero_fields() {
        assert!(matches!(EngineConfig::from_json(r#"{"nodes": 5}"#), Err(EngineError::Config(_))));
        assert!(matches!(EngineConfig::from_json(r#"{"hash_mb": 0}"#), Err(EngineError::Config(_))));
        assert!(matches!(EngineConfig::from_json(r#"{"depth": 0}"#), Err(EngineError::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(EngineConfig::load("/nonexistent/pawnstorm.json"), Err(EngineError::Io(_))));
    }
}
