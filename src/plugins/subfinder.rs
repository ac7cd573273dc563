use crate::core::models::{StageKind, StageOutcome};
use crate::executors::CommandSpec;
use crate::parsers::parse_subdomains;
use crate::plugins::types::{downgrade, Stage, StageContext, StageInput, StageReport};
use crate::reporters::ArtifactKey;
use anyhow::Result;
use async_trait::async_trait;

/// Passive subdomain enumeration with ProjectDiscovery's subfinder.
#[derive(Clone, Debug, Default)]
pub struct SubfinderStage;

impl SubfinderStage {
    fn command(&self, ctx: &StageContext<'_>, domain: &str) -> CommandSpec {
        let settings = ctx.config.stage(StageKind::Subfinder);
        // subfinder talks to passive sources, not the target, so no user agent.
        CommandSpec::new(settings.command, settings.timeout).args(["-d", domain, "-silent"])
    }
}

#[async_trait]
impl Stage for SubfinderStage {
    fn kind(&self) -> StageKind {
        StageKind::Subfinder
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<StageReport> {
        let kind = self.kind();
        if ctx.input != StageInput::Target {
            tracing::debug!("[{}] ignoring upstream input; enumerating the target domain", kind);
        }

        let domain = ctx.target_for(kind).to_string();
        tracing::info!("[{}] Scanning domain: {}", kind, domain);

        let spec = self.command(ctx, &domain);
        let output = match ctx
            .runner
            .run(spec.clone())
            .await
            .and_then(|out| out.require_success(&spec.program))
        {
            Ok(output) => output,
            Err(e) => {
                downgrade(kind, &domain, &e);
                return Ok(StageReport::empty(kind));
            }
        };

        let records = parse_subdomains(&output.stdout);
        if records.is_empty() {
            tracing::warn!("[{}] No valid subdomains found for {}", kind, domain);
            return Ok(StageReport::empty(kind));
        }

        let paths = ctx
            .writer
            .write(&ArtifactKey::new(&domain, kind.name()), &records, true)?;

        tracing::info!(
            "[{}] Found {} subdomains, saved to {:?}",
            kind,
            records.len(),
            paths.json
        );

        Ok(StageReport {
            outcome: StageOutcome::Subdomains { records },
            list: paths.list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ScanError;
    use crate::executors::command::testing::FakeRunner;
    use crate::executors::CommandOutput;
    use crate::plugins::testing::Fixture;
    use std::fs;

    #[tokio::test]
    async fn test_enumerates_and_writes_list() {
        let fx = Fixture::new("https://example.com/app");
        let runner = FakeRunner::new();
        runner.push_stdout("www.example.com\nnoise line\napi.example.com\n");

        let report = SubfinderStage
            .run(&fx.ctx(&runner, StageInput::Target))
            .await
            .unwrap();

        assert_eq!(report.outcome.item_count(), 2);
        let list = fs::read_to_string(report.list.unwrap()).unwrap();
        assert_eq!(list, "www.example.com\napi.example.com\n");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "subfinder");
        assert_eq!(calls[0].args, vec!["-d", "example.com", "-silent"]);
    }

    #[tokio::test]
    async fn test_non_zero_exit_yields_empty() {
        let fx = Fixture::new("example.com");
        let runner = FakeRunner::new();
        runner.push(Ok(CommandOutput {
            exit_code: Some(1),
            stdout: "www.example.com\n".into(),
            stderr: "rate limited".into(),
            ..Default::default()
        }));

        let report = SubfinderStage
            .run(&fx.ctx(&runner, StageInput::Target))
            .await
            .unwrap();
        assert_eq!(report, StageReport::empty(StageKind::Subfinder));
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_without_artifacts() {
        let fx = Fixture::new("example.com");
        let runner = FakeRunner::new();
        runner.push(Err(ScanError::Timeout { tool: "subfinder".into(), secs: 300 }));

        let report = SubfinderStage
            .run(&fx.ctx(&runner, StageInput::Target))
            .await
            .unwrap();
        assert_eq!(report.outcome.item_count(), 0);
        assert!(!fx.output_dir().exists() || fs::read_dir(fx.output_dir()).unwrap().next().is_none());
    }
}
