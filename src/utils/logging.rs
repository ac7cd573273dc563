use crate::cli::args::Cli;
use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `-d` beats `-v`; without either only warnings reach the terminal.
pub fn level_from_cli(cli: &Cli) -> Level {
    match (cli.debug, cli.verbose) {
        (true, _) => Level::DEBUG,
        (false, true) => Level::INFO,
        _ => Level::WARN,
    }
}

/// Build the log filter. A non-empty `RUST_LOG` is taken as-is and the CLI
/// flags are ignored; otherwise our own modules log at `level` and
/// dependencies stay at warn.
pub fn build_filter(level: Level, rust_log: Option<&str>) -> Result<EnvFilter> {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid RUST_LOG value: {}", directives)),
        None => {
            let own = level.to_string().to_lowercase();
            EnvFilter::try_new(format!("warn,arachnid={}", own)).context("Invalid log filter")
        }
    }
}

pub fn init(level: Level) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, rust_log.as_deref())?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(level == Level::DEBUG),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_map_to_levels() {
        let level = |args: &[&str]| level_from_cli(&Cli::try_parse_from(args).unwrap());
        assert_eq!(level(&["arachnid"]), Level::WARN);
        assert_eq!(level(&["arachnid", "-v"]), Level::INFO);
        assert_eq!(level(&["arachnid", "-v", "-d"]), Level::DEBUG);
    }

    #[test]
    fn test_flags_scope_to_own_modules() {
        let filter = build_filter(Level::DEBUG, None).unwrap().to_string();
        assert!(filter.contains("arachnid=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_rust_log_replaces_flags() {
        let filter = build_filter(Level::DEBUG, Some("arachnid::executors=trace")).unwrap().to_string();
        assert!(filter.contains("arachnid::executors=trace"));
        assert!(!filter.contains("arachnid=debug"));

        let blank = build_filter(Level::INFO, Some("  ")).unwrap().to_string();
        assert!(blank.contains("arachnid=info"));
    }

    #[test]
    fn test_rejects_malformed_rust_log() {
        assert!(build_filter(Level::WARN, Some("arachnid=loud")).is_err());
    }
}
