//! Configuration file support for pamwatch.
//!
//! Loads the JSON config naming the groups whose membership is treated
//! as privileged. Missing or malformed config is fatal: no partial or
//! defaulted config is ever used, and no external command runs first.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AuditError;

/// Default config location when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./check_pam_config.json";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct PamConfig {
    /// Group display names under privileged-access monitoring
    pub admingroups: Vec<String>,
}

impl PamConfig {
    /// Load config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AuditError::ConfigMissing(format!("{}: {}", path.display(), e)))?;

        let config: PamConfig = serde_json::from_str(&content).map_err(|e| {
            AuditError::ConfigMalformed(format!(
                "{} doesn't appear to be JSON with an 'admingroups' key: {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }
}
