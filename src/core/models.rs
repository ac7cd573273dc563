use crate::core::errors::ScanError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scan subject with both derived representations computed once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub raw: String,
    pub domain: String, // no scheme, no port, no path
    pub url: String,    // scheme defaulted to https
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScanError::InvalidTarget(raw.to_string()));
        }

        let url = canonical_url(trimmed);
        let domain = url::Url::parse(&url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ScanError::InvalidTarget(raw.to_string()))?;

        Ok(Self {
            raw: trimmed.to_string(),
            domain,
            url,
        })
    }
}

fn canonical_url(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

/// Which representation of the [`Target`] a stage consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputForm {
    Domain,
    Url,
}

/// Static descriptor for each stage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Subfinder,
    Httpx,
    Dirbuster,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [StageKind::Subfinder, StageKind::Httpx, StageKind::Dirbuster];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Subfinder => "subfinder",
            StageKind::Httpx => "httpx",
            StageKind::Dirbuster => "dirbuster",
        }
    }

    pub fn input_form(self) -> InputForm {
        match self {
            StageKind::Subfinder => InputForm::Domain,
            StageKind::Httpx | StageKind::Dirbuster => InputForm::Url,
        }
    }

    /// Stages whose output is handed to a later stage as a plain list.
    pub fn feeds_downstream(self) -> bool {
        !matches!(self, StageKind::Dirbuster)
    }

    pub fn default_command(self) -> &'static str {
        match self {
            StageKind::Subfinder => "subfinder",
            StageKind::Httpx => "httpx",
            StageKind::Dirbuster => "feroxbuster",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can be written as one line of a downstream input list.
pub trait Identified {
    fn identity(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdomain {
    pub domain: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveHost {
    pub url: String,
    pub status_code: u16,
    pub title: String,
    pub content_length: u64,
    pub technologies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPath {
    pub url: String,
    pub status_code: Option<u16>,
}

impl Identified for Subdomain {
    fn identity(&self) -> &str {
        &self.domain
    }
}

impl Identified for LiveHost {
    fn identity(&self) -> &str {
        &self.url
    }
}

impl Identified for DiscoveredPath {
    fn identity(&self) -> &str {
        &self.url
    }
}

/// Result of one stage in one run, as stored in the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageOutcome {
    Subdomains { records: Vec<Subdomain> },
    LiveHosts { records: Vec<LiveHost> },
    Paths { hosts: BTreeMap<String, Vec<DiscoveredPath>> },
    Failed { error: String },
}

impl StageOutcome {
    pub fn empty(kind: StageKind) -> Self {
        match kind {
            StageKind::Subfinder => StageOutcome::Subdomains { records: Vec::new() },
            StageKind::Httpx => StageOutcome::LiveHosts { records: Vec::new() },
            StageKind::Dirbuster => StageOutcome::Paths { hosts: BTreeMap::new() },
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            StageOutcome::Subdomains { records } => records.len(),
            StageOutcome::LiveHosts { records } => records.len(),
            StageOutcome::Paths { hosts } => hosts.values().map(Vec::len).sum(),
            StageOutcome::Failed { .. } => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed { .. })
    }
}
