use super::errors::ScanError;
use super::events::Event;
use super::models::{StageOutcome, Target};
use super::session::SessionResults;
use crate::config::ScanConfig;
use crate::executors::ProcessRunner;
use crate::plugins::registry::{self, StageRegistry};
use crate::plugins::types::{StageContext, StageInput};
use crate::reporters::ArtifactWriter;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Runs a category's stages in order, handing each stage's list artifact to
/// the next and isolating every stage's failure from the rest.
pub struct Pipeline {
    config: Arc<ScanConfig>,
    runner: Arc<dyn ProcessRunner>,
    registry: StageRegistry,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl Pipeline {
    pub fn new(config: Arc<ScanConfig>, runner: Arc<dyn ProcessRunner>) -> Self {
        let registry = StageRegistry::default();
        registry.log_summary();
        Self {
            config,
            runner,
            registry,
            events: None,
        }
    }

    pub fn with_registry(mut self, registry: StageRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_events(mut self, sender: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(sender);
        self
    }

    fn emit(&self, event: Event) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }

    pub async fn run_category(
        &self,
        category: &str,
        target: &Target,
        user_agent: Option<&str>,
    ) -> Result<SessionResults, ScanError> {
        let stages = registry::stages_for(category)
            .ok_or_else(|| ScanError::UnknownCategory(category.trim().to_string()))?;

        tracing::info!("Starting scan: {} against {}", category.to_uppercase(), target.raw);
        self.emit(Event::CategoryStarted {
            category: category.to_string(),
            stages: stages.len(),
        });

        let writer = ArtifactWriter::new(self.config.output_dir());
        let mut results = SessionResults::new();
        let mut upstream: Option<StageInput> = None;

        for (index, &kind) in stages.iter().enumerate() {
            let input = if index == 0 {
                StageInput::Target
            } else {
                upstream.take().unwrap_or(StageInput::NoUpstream)
            };

            tracing::info!("Running {}...", kind);
            self.emit(Event::StageStarted(kind));

            let outcome = match self.registry.get(kind) {
                None => StageOutcome::Failed {
                    error: format!("no adapter registered for {}", kind),
                },
                Some(stage) => {
                    let ctx = StageContext {
                        target,
                        user_agent,
                        config: &self.config,
                        runner: self.runner.as_ref(),
                        writer: &writer,
                        input,
                    };

                    match AssertUnwindSafe(stage.run(&ctx)).catch_unwind().await {
                        Ok(Ok(report)) => {
                            upstream = report.list.map(StageInput::List);
                            report.outcome
                        }
                        Ok(Err(e)) => StageOutcome::Failed {
                            error: format!("{:#}", e),
                        },
                        Err(panic) => StageOutcome::Failed {
                            error: format!("stage panicked: {}", panic_message(panic.as_ref())),
                        },
                    }
                }
            };

            match &outcome {
                StageOutcome::Failed { error } => {
                    tracing::warn!("[{}] failed: {}", kind, error);
                    self.emit(Event::StageFailed(kind, error.clone()));
                }
                done => self.emit(Event::StageCompleted(kind, done.item_count())),
            }

            results.insert(kind.name().to_string(), outcome);
        }

        tracing::info!("{} scan completed", category.to_uppercase());
        for (name, outcome) in &results {
            if outcome.is_failed() {
                tracing::info!("  {}: failed", name);
            } else {
                tracing::info!("  {}: {} items", name, outcome.item_count());
            }
        }
        self.emit(Event::CategoryCompleted(category.to_string()));

        Ok(results)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
