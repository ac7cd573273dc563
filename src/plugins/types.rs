use crate::config::ScanConfig;
use crate::core::errors::ScanError;
use crate::core::models::{InputForm, StageKind, StageOutcome, Target};
use crate::executors::ProcessRunner;
use crate::reporters::ArtifactWriter;
use crate::utils::fs::read_list;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where a stage gets its targets from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageInput {
    /// First stage of a category: use the scan target directly.
    Target,
    /// Plain list written by the previous stage.
    List(PathBuf),
    /// The previous stage produced nothing this run.
    NoUpstream,
}

/// Everything a stage needs for one invocation.
pub struct StageContext<'a> {
    pub target: &'a Target,
    pub user_agent: Option<&'a str>,
    pub config: &'a ScanConfig,
    pub runner: &'a dyn ProcessRunner,
    pub writer: &'a ArtifactWriter,
    pub input: StageInput,
}

/// What a stage hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub outcome: StageOutcome,
    pub list: Option<PathBuf>,
}

impl StageReport {
    pub fn empty(kind: StageKind) -> Self {
        Self {
            outcome: StageOutcome::empty(kind),
            list: None,
        }
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    /// Run the stage. Expected failures (missing input, timeouts, tool
    /// errors) come back as an empty report; `Err` is reserved for faults
    /// such as an unwritable output directory.
    async fn run(&self, ctx: &StageContext<'_>) -> Result<StageReport>;
}

/// Log a downgraded failure in a uniform shape.
pub fn downgrade(kind: StageKind, subject: &str, err: &ScanError) {
    tracing::warn!("[{}] {}: {}", kind, subject, err);
}

impl StageContext<'_> {
    /// The target in the representation `kind` consumes.
    pub fn target_for(&self, kind: StageKind) -> &str {
        match kind.input_form() {
            InputForm::Domain => &self.target.domain,
            InputForm::Url => &self.target.url,
        }
    }

    /// Resolve this stage's target list, or `None` when there is nothing to do.
    pub fn resolve_targets(&self, kind: StageKind) -> Option<Vec<String>> {
        match &self.input {
            StageInput::Target => Some(vec![self.target_for(kind).to_string()]),
            StageInput::NoUpstream => {
                tracing::warn!("[{}] No input from the previous stage; skipping", kind);
                None
            }
            StageInput::List(path) => match read_list(path) {
                Ok(Some(items)) if !items.is_empty() => Some(items),
                Ok(Some(_)) => {
                    tracing::warn!("[{}] Input file {:?} is empty; skipping", kind, path);
                    None
                }
                Ok(None) => {
                    downgrade(kind, "input", &ScanError::InputMissing(path.clone()));
                    None
                }
                Err(e) => {
                    tracing::warn!("[{}] Could not read input {:?}: {:#}", kind, path, e);
                    None
                }
            },
        }
    }

    pub fn user_agent_header(&self) -> Option<String> {
        self.user_agent
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .map(|ua| format!("User-Agent: {}", ua))
    }
}
