//! User configuration stored as TOML in the platform config directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::history::RECENT_VERSE_LIMIT;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "WORSHIP_PROJECTOR_CONFIG";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "worship-projector.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Terminal device the projection is drawn into, e.g. `/dev/pts/3`.
    pub output: Option<PathBuf>,
    pub columns: u16,
    pub rows: u16,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            output: None,
            columns: 80,
            rows: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: Option<PathBuf>,
    /// Where exported service histories land. Defaults to the data directory.
    pub export_dir: Option<PathBuf>,
    pub log_level: String,
    pub projector: ProjectorConfig,
    /// Bible versions offered in the lookup, as `CODE - Name`.
    pub bible_versions: Vec<String>,
    pub service_types: Vec<String>,
    pub recent_verse_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            export_dir: None,
            log_level: "info".to_string(),
            projector: ProjectorConfig::default(),
            bible_versions: vec![
                "ARC - Almeida Revista e Corrigida".to_string(),
                "ARA - Almeida Revista e Atualizada".to_string(),
                "NVI - Nova Versão Internacional".to_string(),
                "NTLH - Nova Tradução na Linguagem de Hoje".to_string(),
            ],
            service_types: vec![
                "Regular".to_string(),
                "Conference".to_string(),
                "Communion".to_string(),
                "Sunday".to_string(),
            ],
            recent_verse_limit: RECENT_VERSE_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load the config from `path`, the env override, or the platform config
    /// dir, in that order. A missing file yields defaults; a malformed one is
    /// an error so typos do not silently disable the projector.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(contents)?;
        if config.bible_versions.is_empty() {
            config.bible_versions = AppConfig::default().bible_versions;
        }
        if config.service_types.is_empty() {
            config.service_types = AppConfig::default().service_types;
        }
        Ok(config)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }

    pub fn export_dir(&self) -> Result<PathBuf> {
        match &self.export_dir {
            Some(path) => Ok(path.clone()),
            None => data_dir(),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(data_dir()?.join(LOG_FILE_NAME))
    }

    /// Version codes only (`ARC`, `NVI`, ...), in display order.
    pub fn version_codes(&self) -> Vec<String> {
        self.bible_versions
            .iter()
            .map(|entry| version_code(entry))
            .collect()
    }
}

/// `"ARC - Almeida ..."` → `"ARC"`. Entries without a dash are already codes.
pub fn version_code(entry: &str) -> String {
    entry
        .split(" - ")
        .next()
        .unwrap_or(entry)
        .trim()
        .to_string()
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "worship-projector", "worship-projector")
        .ok_or_else(|| anyhow!("could not locate home directory"))
}

fn config_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.recent_verse_limit, 20);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [projector]
            output = "/dev/pts/7"
            columns = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.projector.output, Some(PathBuf::from("/dev/pts/7")));
        assert_eq!(config.projector.columns, 120);
        assert_eq!(config.projector.rows, 24);
        assert_eq!(config.service_types.len(), 4);
    }

    #[test]
    fn empty_lists_fall_back_to_defaults() {
        let config = AppConfig::from_toml("bible_versions = []").unwrap();
        assert_eq!(config.version_codes(), vec!["ARC", "ARA", "NVI", "NTLH"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "projector = 3").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn version_code_strips_names() {
        assert_eq!(version_code("NTLH - Nova Tradução"), "NTLH");
        assert_eq!(version_code("KJV"), "KJV");
    }
}
