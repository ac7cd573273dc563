use super::models::StageKind;

/// Progress notifications emitted by the pipeline while a category runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CategoryStarted { category: String, stages: usize },
    StageStarted(StageKind),
    StageCompleted(StageKind, usize), // stage, item count
    StageFailed(StageKind, String),
    CategoryCompleted(String),
}
