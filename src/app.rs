use crate::{
    cli::{args::Cli, commands::Shell},
    config::ConfigLoader,
    core::{Pipeline, SessionContext},
    executors::{toolchain, SystemRunner},
    storage::SessionStore,
    ui::{printer, progress::{self, Progress}},
    utils::logging,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn run(cli: Cli) -> Result<()> {
    let level = logging::level_from_cli(&cli);
    logging::init(level)?;

    let mut config = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.global.output_dir = Some(dir.clone());
    }
    tracing::info!(
        "Configuration loaded: output to {:?}, {} dirbuster workers",
        config.output_dir(),
        config.workers()
    );

    toolchain::warn_missing(&config);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let ui = progress::spawn(events_rx);

    let pipeline = Pipeline::new(Arc::new(config), Arc::new(SystemRunner)).with_events(events_tx);
    let store = SessionStore::new(
        cli.sessions_dir
            .clone()
            .unwrap_or_else(SessionStore::default_location),
    );

    let mut session = SessionContext::new();
    if let Some(target) = &cli.target {
        session
            .set_target(target)
            .with_context(|| format!("Cannot use target '{}'", target))?;
    }
    session.set_user_agent(cli.user_agent.clone());

    let outcome = match &cli.category {
        Some(category) => run_once(&pipeline, &store, &ui, session, category, cli.save.as_deref()).await,
        None => Shell::new(&pipeline, &store, session)
            .with_progress(&ui)
            .run()
            .await
            .map(|_| ()),
    };

    // dropping the pipeline closes the event channel and ends the spinner task
    drop(pipeline);
    ui.finish().await;

    outcome
}

async fn run_once(
    pipeline: &Pipeline,
    store: &SessionStore,
    progress: &Progress,
    mut session: SessionContext,
    category: &str,
    save: Option<&str>,
) -> Result<()> {
    if session.target().is_none() {
        anyhow::bail!("--category needs a --target");
    }

    let delta = session.run(pipeline, category).await?;
    progress.settled().await;
    printer::print_summary(category, &delta);

    if let Some(name) = save {
        let path = store.save(name, &session)?;
        printer::print_info(format!("Session saved as '{}' ({})", name, path.display()));
    }

    Ok(())
}
