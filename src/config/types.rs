use crate::core::models::StageKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_WORDLIST: &str = "wordlists/raft-medium-directories.txt";
pub const DEFAULT_EXTENSIONS: &str = "php,html,php3,htm,txt,zip";
pub const DEFAULT_DIRBUSTER_RATE_LIMIT: u32 = 10;

/// Scan configuration, loaded once and shared read-only by every stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub global: GlobalSection,
    pub subfinder: StageSection,
    pub httpx: StageSection,
    pub dirbuster: StageSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalSection {
    pub output_dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StageSection {
    pub command: Option<String>,
    pub wordlist: Option<PathBuf>,
    pub extensions: Option<Extensions>,
    pub timeout: Option<u64>,
    pub rate_limit: Option<u32>,
}

/// File extensions, written either as `"php,html"` or as a YAML list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Extensions {
    Csv(String),
    List(Vec<String>),
}

impl Extensions {
    pub fn to_arg(&self) -> String {
        match self {
            Extensions::Csv(csv) => csv.trim().to_string(),
            Extensions::List(items) => items
                .iter()
                .map(|e| e.trim().trim_start_matches('.'))
                .filter(|e| !e.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// A stage section with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSettings {
    pub command: String,
    pub wordlist: Option<PathBuf>,
    pub extensions: Option<String>,
    pub timeout: Duration,
    pub rate_limit: Option<u32>,
}

impl ScanConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.global
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn workers(&self) -> usize {
        self.global.workers.unwrap_or(DEFAULT_WORKERS).max(1)
    }

    pub fn section(&self, kind: StageKind) -> &StageSection {
        match kind {
            StageKind::Subfinder => &self.subfinder,
            StageKind::Httpx => &self.httpx,
            StageKind::Dirbuster => &self.dirbuster,
        }
    }

    pub fn stage(&self, kind: StageKind) -> StageSettings {
        let section = self.section(kind);
        let timeout = Duration::from_secs(section.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let command = section
            .command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| kind.default_command().to_string());

        match kind {
            StageKind::Dirbuster => StageSettings {
                command,
                wordlist: Some(
                    section
                        .wordlist
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORDLIST)),
                ),
                extensions: Some(
                    section
                        .extensions
                        .as_ref()
                        .map(Extensions::to_arg)
                        .unwrap_or_else(|| DEFAULT_EXTENSIONS.to_string()),
                ),
                timeout,
                rate_limit: Some(section.rate_limit.unwrap_or(DEFAULT_DIRBUSTER_RATE_LIMIT))
                    .filter(|r| *r > 0),
            },
            StageKind::Subfinder | StageKind::Httpx => StageSettings {
                command,
                wordlist: section.wordlist.clone(),
                extensions: section.extensions.as_ref().map(Extensions::to_arg),
                timeout,
                rate_limit: section.rate_limit.filter(|r| *r > 0),
            },
        }
    }
}
