use super::types::ScanConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATHS: &[&str] = &["./config.yaml", "./config/config.yaml"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, trying `custom_path` first.
    ///
    /// An explicitly given path that does not exist is an error; a missing
    /// default file is not.
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<ScanConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {:?}", path);
            }
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        for path in Self::candidate_paths() {
            if path.exists() {
                let config = Self::load_from_file(&path)?;
                tracing::info!("Loaded configuration from: {:?}", path);
                return Ok(config);
            }
        }

        tracing::warn!("Config file not found. Using defaults.");
        Ok(ScanConfig::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect();
        if let Some(dirs) = ProjectDirs::from("io", "arachnid", "arachnid") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }
        paths
    }

    fn load_from_file(path: &Path) -> Result<ScanConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        // An empty document means "all defaults".
        let config: ScanConfig = if content.trim().is_empty() {
            ScanConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {:?}", path))?
        };

        Self::validate_config(&config)?;

        Ok(config)
    }

    fn validate_config(config: &ScanConfig) -> Result<()> {
        if config.global.workers == Some(0) {
            anyhow::bail!("global.workers must be greater than 0");
        }

        for kind in crate::core::models::StageKind::ALL {
            if config.section(kind).timeout == Some(0) {
                anyhow::bail!("{}.timeout must be greater than 0", kind);
            }
        }

        Ok(())
    }
}
