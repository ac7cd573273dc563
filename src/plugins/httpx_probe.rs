use crate::core::models::{StageKind, StageOutcome};
use crate::executors::CommandSpec;
use crate::parsers::parse_live_hosts;
use crate::plugins::types::{downgrade, Stage, StageContext, StageReport};
use crate::reporters::ArtifactKey;
use anyhow::Result;
use async_trait::async_trait;

/// Live-host probing with ProjectDiscovery's httpx, targets fed on stdin.
#[derive(Clone, Debug, Default)]
pub struct HttpxProbe;

impl HttpxProbe {
    fn command(&self, ctx: &StageContext<'_>, targets: &[String]) -> CommandSpec {
        let settings = ctx.config.stage(StageKind::Httpx);

        let mut spec = CommandSpec::new(settings.command, settings.timeout).args([
            "-silent",
            "-json",
            "-sc",
            "-title",
            "-cl",
            "-td",
            "-tls-probe",
        ]);

        if let Some(header) = ctx.user_agent_header() {
            spec = spec.arg("-H").arg(header);
        }

        if let Some(rate) = settings.rate_limit {
            spec = spec.arg("-rl").arg(rate.to_string());
        }

        spec.stdin(targets.join("\n"))
    }
}

#[async_trait]
impl Stage for HttpxProbe {
    fn kind(&self) -> StageKind {
        StageKind::Httpx
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<StageReport> {
        let kind = self.kind();
        let Some(targets) = ctx.resolve_targets(kind) else {
            return Ok(StageReport::empty(kind));
        };

        tracing::info!("[{}] Probing {} targets", kind, targets.len());

        let spec = self.command(ctx, &targets);
        let output = match ctx
            .runner
            .run(spec.clone())
            .await
            .and_then(|out| out.require_success(&spec.program))
        {
            Ok(output) => output,
            Err(e) => {
                downgrade(kind, &ctx.target.domain, &e);
                return Ok(StageReport::empty(kind));
            }
        };

        let records = parse_live_hosts(&output.stdout);
        if records.is_empty() {
            tracing::warn!("[{}] No live hosts found", kind);
            return Ok(StageReport::empty(kind));
        }

        let paths = ctx
            .writer
            .write(&ArtifactKey::new(&ctx.target.domain, kind.name()), &records, true)?;

        tracing::info!(
            "[{}] Found {} live hosts, saved to {:?}",
            kind,
            records.len(),
            paths.json
        );

        Ok(StageReport {
            outcome: StageOutcome::LiveHosts { records },
            list: paths.list,
        })
    }
}
