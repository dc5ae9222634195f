use crate::config::types::Heuristics;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads heuristic overrides from a TOML tuning file
///
/// Fields absent from the file keep their built-in defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML tuning file
///
/// # Returns
///
/// * `Ok(Heuristics)` - Successfully loaded and merged thresholds
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_heuristics(path: &Path) -> Result<Heuristics, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let heuristics: Heuristics = toml::from_str(&content)?;
    Ok(heuristics)
}

/// Computes a SHA-256 hash of the tuning file content
///
/// Used to record which threshold set produced a given corpus.
pub fn compute_tuning_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a tuning file and returns both the thresholds and their hash
pub fn load_heuristics_with_hash(path: &Path) -> Result<(Heuristics, String), ConfigError> {
    let heuristics = load_heuristics(path)?;
    let hash = compute_tuning_hash(path)?;
    Ok((heuristics, hash))
}
