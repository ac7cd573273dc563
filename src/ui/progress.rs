use crate::core::events::Event;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle on the spinner task.
pub struct Progress {
    task: JoinHandle<()>,
    settled: Arc<Notify>,
}

impl Progress {
    /// Wait until the spinner has rendered the end of the current category,
    /// so callers can print without interleaving with it.
    pub async fn settled(&self) {
        if tokio::time::timeout(SETTLE_TIMEOUT, self.settled.notified())
            .await
            .is_err()
        {
            tracing::debug!("progress display did not settle in time");
        }
    }

    /// Wait for the task to exit once every sender is dropped.
    pub async fn finish(self) {
        let _ = self.task.await;
    }
}

/// Render pipeline events as a spinner until the sender side is dropped.
pub fn spawn(mut events: mpsc::UnboundedReceiver<Event>) -> Progress {
    let settled = Arc::new(Notify::new());
    let notify = Arc::clone(&settled);

    let task = tokio::spawn(async move {
        let mut spinner: Option<ProgressBar> = None;

        while let Some(event) = events.recv().await {
            match event {
                Event::CategoryStarted { category, stages } => {
                    println!(
                        "{} Starting scan: {} ({} stages)",
                        "[+]".green().bold(),
                        category.to_uppercase().bold(),
                        stages
                    );
                }
                Event::StageStarted(kind) => {
                    let bar = ProgressBar::new_spinner();
                    bar.set_style(
                        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                    bar.enable_steady_tick(Duration::from_millis(120));
                    bar.set_message(format!("Running {}...", kind));
                    spinner = Some(bar);
                }
                Event::StageCompleted(kind, count) => {
                    if let Some(bar) = spinner.take() {
                        bar.finish_with_message(format!("{} {}: {} items", "✓".green(), kind, count));
                    }
                }
                Event::StageFailed(kind, error) => {
                    if let Some(bar) = spinner.take() {
                        bar.finish_with_message(format!("{} {} failed: {}", "✗".red(), kind, error));
                    }
                }
                Event::CategoryCompleted(_) => {
                    if let Some(bar) = spinner.take() {
                        bar.finish_and_clear();
                    }
                    notify.notify_one();
                }
            }
        }
    });

    Progress { task, settled }
}
