use crate::core::errors::ScanError;
use crate::core::models::{DiscoveredPath, StageKind, StageOutcome};
use crate::executors::CommandSpec;
use crate::parsers::parse_discovered;
use crate::plugins::types::{downgrade, Stage, StageContext, StageReport};
use crate::reporters::{ArtifactKey, ArtifactWriter};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeMap;
use tokio::sync::Semaphore;

/// Directory brute-forcing with feroxbuster, one invocation per live host.
#[derive(Clone, Debug, Default)]
pub struct DirbusterStage;

impl DirbusterStage {
    fn command(&self, ctx: &StageContext<'_>, host: &str) -> CommandSpec {
        let settings = ctx.config.stage(StageKind::Dirbuster);

        let mut spec = CommandSpec::new(settings.command, settings.timeout).args(["-u", host]);

        if let Some(wordlist) = &settings.wordlist {
            spec = spec.arg("-w").arg(wordlist.to_string_lossy());
        }
        if let Some(extensions) = settings.extensions.filter(|e| !e.is_empty()) {
            spec = spec.arg("-x").arg(extensions);
        }

        spec = spec.args(["-k", "--silent"]);

        if let Some(header) = ctx.user_agent_header() {
            spec = spec.arg("-H").arg(header);
        }
        if let Some(rate) = settings.rate_limit {
            spec = spec.arg("--rate-limit").arg(rate.to_string());
        }

        spec
    }

    async fn scan_host(
        &self,
        ctx: &StageContext<'_>,
        writer: &ArtifactWriter,
        host: &str,
    ) -> Option<Vec<DiscoveredPath>> {
        let kind = self.kind();
        tracing::info!("[{}] Scanning {}", kind, host);

        let spec = self.command(ctx, host);
        let output = match ctx
            .runner
            .run(spec.clone())
            .await
            .and_then(|out| out.require_success(&spec.program))
        {
            Ok(output) => output,
            Err(e) => {
                downgrade(kind, host, &e);
                return None;
            }
        };

        let found = parse_discovered(&output.stdout);
        if found.is_empty() {
            tracing::info!("[{}] No directories found for {}", kind, host);
            return None;
        }

        match writer.write(&ArtifactKey::new(host, kind.name()), &found, kind.feeds_downstream()) {
            Ok(paths) => tracing::info!(
                "[{}] Found {} paths on {}, saved to {:?}",
                kind,
                found.len(),
                host,
                paths.json
            ),
            Err(e) => tracing::warn!("[{}] {}: could not save results: {:#}", kind, host, e),
        }

        Some(found)
    }
}

#[async_trait]
impl Stage for DirbusterStage {
    fn kind(&self) -> StageKind {
        StageKind::Dirbuster
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<StageReport> {
        let kind = self.kind();
        let Some(hosts) = ctx.resolve_targets(kind) else {
            return Ok(StageReport::empty(kind));
        };

        let settings = ctx.config.stage(kind);
        if let Some(wordlist) = settings.wordlist.as_ref().filter(|w| !w.exists()) {
            downgrade(kind, "wordlist", &ScanError::InputMissing(wordlist.clone()));
            return Ok(StageReport::empty(kind));
        }

        let workers = ctx.config.workers().min(hosts.len());
        tracing::info!(
            "[{}] Brute-forcing directories on {} hosts ({} at a time)",
            kind,
            hosts.len(),
            workers
        );

        let writer = ArtifactWriter::new(ctx.writer.root().join(kind.name()));
        let sem = Semaphore::new(workers);

        let scans = hosts.iter().map(|host| {
            let sem = &sem;
            let writer = &writer;
            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return (host.clone(), None);
                };
                (host.clone(), self.scan_host(ctx, writer, host).await)
            }
        });

        let mut results = BTreeMap::new();
        for (host, found) in join_all(scans).await {
            if let Some(found) = found {
                results.insert(host, found);
            }
        }

        Ok(StageReport {
            outcome: StageOutcome::Paths { hosts: results },
            list: None,
        })
    }
}
