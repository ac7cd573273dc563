use crate::core::session::{SessionContext, SessionResults};
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub name: String,
    pub target: Option<String>,
    pub user_agent: Option<String>,
    pub saved_at: DateTime<Utc>,
    pub results: SessionResults,
}

impl SavedSession {
    /// Rebuild a live session from this snapshot.
    pub fn into_context(self) -> Result<SessionContext> {
        let mut session = SessionContext::new();
        if let Some(target) = &self.target {
            session
                .set_target(target)
                .with_context(|| format!("Saved session '{}' has an invalid target", self.name))?;
        }
        session.set_user_agent(self.user_agent);
        session.replace_results(self.results);
        Ok(session)
    }
}

/// Named snapshots of session state, one JSON document per name.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Per-user data directory, or `./.arachnid/sessions` when none is available.
    pub fn default_location() -> PathBuf {
        ProjectDirs::from("io", "arachnid", "arachnid")
            .map(|dirs| dirs.data_dir().join("sessions"))
            .unwrap_or_else(|| PathBuf::from(".arachnid").join("sessions"))
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !name.starts_with('.');
        if !valid {
            anyhow::bail!("Invalid session name '{}': use letters, digits, '-', '_' or '.'", name);
        }
        Ok(self.root.join(format!("{}.json", name)))
    }

    pub fn save(&self, name: &str, session: &SessionContext) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        let snapshot = SavedSession {
            name: name.trim().to_string(),
            target: session.target().map(|t| t.raw.clone()),
            user_agent: session.user_agent().map(str::to_string),
            saved_at: Utc::now(),
            results: session.results().clone(),
        };

        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize session")?;
        atomic_write(&path, json.as_bytes())?;

        tracing::info!("Saved session '{}' to {}", snapshot.name, path.display());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<SavedSession> {
        let path = self.path_for(name)?;
        if !path.exists() {
            anyhow::bail!("No saved session named '{}'", name.trim());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        let snapshot: SavedSession = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))?;

        Ok(snapshot)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list sessions in {}", self.root.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
