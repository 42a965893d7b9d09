use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the persisted run state, relative to the save directory
pub const RUN_STATE_FILE: &str = "run_state.json";

/// State remembered between runs
///
/// Stores the last targets file used and the content hash of the target set
/// it produced. The report merger compares the stored hash against the
/// current one to decide whether to extend or supersede the existing report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Path of the targets spreadsheet used in the previous run
    pub last_targets_file: Option<String>,

    /// Content hash of the target set from the previous run
    pub last_target_hash: Option<String>,
}

impl RunState {
    fn file_path(save_dir: &Path) -> PathBuf {
        save_dir.join(RUN_STATE_FILE)
    }

    /// Loads the run state from the save directory
    ///
    /// A missing file is not an error: the first run starts from a default
    /// (empty) state. A present but unreadable file is.
    pub fn load(save_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::file_path(save_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let state = serde_json::from_str(&content)?;
        Ok(state)
    }

    /// Writes the run state into the save directory
    pub fn save(&self, save_dir: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::file_path(save_dir), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_default_state() {
        let dir = TempDir::new().unwrap();
        let state = RunState::load(dir.path()).unwrap();
        assert_eq!(state, RunState::default());
    }

    #[test]
    fn test_round_trips_through_save_dir() {
        let dir = TempDir::new().unwrap();
        let state = RunState {
            last_targets_file: Some("targets.xlsx".to_string()),
            last_target_hash: Some("abc123".to_string()),
        };

        state.save(dir.path()).unwrap();
        let loaded = RunState::load(dir.path()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RUN_STATE_FILE), "{not json").unwrap();

        let result = RunState::load(dir.path());
        assert!(matches!(result, Err(ConfigError::RunState(_))));
    }
}
