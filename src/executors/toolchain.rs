use crate::config::ScanConfig;
use crate::core::models::StageKind;
use which::which;

/// Report which stage executables cannot be found on `PATH`.
///
/// Missing tools are not fatal: the affected stage will downgrade to an empty
/// result with a launch-failure diagnostic when it runs.
pub fn missing_tools(config: &ScanConfig) -> Vec<(StageKind, String)> {
    let mut missing = Vec::new();

    for kind in StageKind::ALL {
        let command = config.stage(kind).command;
        match which(&command) {
            Ok(path) => {
                tracing::debug!("Found {}: {:?}", command, path);
            }
            Err(_) => {
                missing.push((kind, command));
            }
        }
    }

    missing
}

pub fn warn_missing(config: &ScanConfig) {
    let missing = missing_tools(config);
    if missing.is_empty() {
        tracing::info!("All stage tools found");
        return;
    }

    for (kind, command) in &missing {
        tracing::warn!("{} stage: '{}' not found on PATH; it will yield no results", kind, command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::StageSection;

    #[test]
    fn test_reports_unresolvable_command() {
        let mut config = ScanConfig::default();
        config.httpx = StageSection {
            command: Some("arachnid-definitely-missing-httpx".to_string()),
            ..Default::default()
        };

        let missing = missing_tools(&config);
        assert!(missing
            .iter()
            .any(|(kind, cmd)| *kind == StageKind::Httpx && cmd == "arachnid-definitely-missing-httpx"));
    }
}
