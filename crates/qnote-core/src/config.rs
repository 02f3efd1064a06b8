//! Configuration for qnote (stored in ~/.config/qnote/config.toml)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encoding::{DEFAULT_MAX_STRING_LEN, MAX_STRING_LEN_LIMIT};
use crate::error::{QnoteError, Result};

const CONFIG_DIR: &str = "qnote";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "QNOTE_CONFIG_DIR";

/// Default book used when a note arrives without one
pub const DEFAULT_BOOK: &str = "General";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Book used by commands that need a working book
    #[serde(default = "default_book")]
    pub default_book: String,

    /// Directory holding `notes.db` (optional; defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Import pipeline tuning
    #[serde(default)]
    pub import: ImportConfig,
}

/// Queue capacities and worker count for the import pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Worker threads for JSON imports
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the JSON task queue between the decoder and the workers
    #[serde(default = "default_task_queue")]
    pub task_queue: usize,

    /// Capacity of the results queue between the workers and the aggregator
    #[serde(default = "default_result_queue")]
    pub result_queue: usize,

    /// Capacity of the queue between the QNOT decoder thread and the importer
    #[serde(default = "default_decode_queue")]
    pub decode_queue: usize,

    /// Largest string (in bytes) the QNOT decoder accepts
    #[serde(default = "default_max_string_len")]
    pub max_string_len: u64,
}

fn default_book() -> String {
    DEFAULT_BOOK.to_string()
}

fn default_workers() -> usize {
    16
}

fn default_task_queue() -> usize {
    1024
}

fn default_result_queue() -> usize {
    2048
}

fn default_decode_queue() -> usize {
    1024
}

fn default_max_string_len() -> u64 {
    DEFAULT_MAX_STRING_LEN
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_book: default_book(),
            data_dir: None,
            import: ImportConfig::default(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            task_queue: default_task_queue(),
            result_queue: default_result_queue(),
            decode_queue: default_decode_queue(),
            max_string_len: default_max_string_len(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        // Allow environment variable override for testing
        let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    QnoteError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Load the user config, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            QnoteError::Other(format!(
                "failed to read config from {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| QnoteError::Other("invalid config path".to_string()))?;

        fs::create_dir_all(config_dir).map_err(|e| {
            QnoteError::io_operation("create config directory", config_dir.display(), e)
        })?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| QnoteError::Other(format!("failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| QnoteError::io_operation("write config to", path.display(), e))?;

        Ok(())
    }

    /// Resolve the data directory: explicit override, then config, then platform default
    pub fn resolve_data_dir(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(CONFIG_DIR))
            .ok_or_else(|| QnoteError::Other("unable to determine data directory".to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.import.workers == 0 {
            crate::bail_invalid!("import.workers", "0 (must be at least 1)");
        }
        if self.import.task_queue == 0 || self.import.result_queue == 0 {
            crate::bail_invalid!("import queue capacity", "0 (must be at least 1)");
        }
        if self.import.max_string_len == 0 || self.import.max_string_len > MAX_STRING_LEN_LIMIT {
            crate::bail_invalid!(
                "import.max_string_len",
                format!(
                    "{} (must be between 1 and {})",
                    self.import.max_string_len, MAX_STRING_LEN_LIMIT
                )
            );
        }
        if self.default_book.trim().is_empty() {
            crate::bail_invalid!("default_book", "empty name");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_book, "General");
        assert_eq!(config.import.workers, 16);
        assert_eq!(config.import.task_queue, 1024);
        assert_eq!(config.import.result_queue, 2048);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.import.decode_queue, 1024);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.default_book = "Work".to_string();
        config.import.workers = 4;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_book, "Work");
        assert_eq!(loaded.import.workers, 4);
        assert_eq!(loaded.import.result_queue, 2048);
    }

    #[test]
    fn test_partial_import_section_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[import]\nworkers = 2\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.import.workers, 2);
        assert_eq!(loaded.import.task_queue, 1024);
        assert_eq!(loaded.default_book, "General");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[import]\nworkers = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(QnoteError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_huge_string_limit_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[import]\nmax_string_len = 4398046511104\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("import.max_string_len"));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let mut config = Config::default();
        config.data_dir = Some(PathBuf::from("/from/config"));

        let resolved = config
            .resolve_data_dir(Some(Path::new("/from/flag")))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/from/flag"));

        let resolved = config.resolve_data_dir(None).unwrap();
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }
}
