use crate::core::models::LiveHost;
use serde::Deserialize;

pub const ACCEPTED_STATUS: [u16; 5] = [200, 301, 302, 307, 401];

/// The subset of an httpx `-json` line we care about. Every field tolerates
/// both a missing key and an explicit `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeLine {
    url: Option<String>,
    status_code: Option<u16>,
    title: Option<String>,
    content_length: Option<u64>,
    tech: Option<Vec<String>>,
    technologies: Option<Vec<String>>,
}

/// Parse httpx JSON-lines output into live hosts with an accepted status.
///
/// Each line is decoded on its own; undecodable lines are skipped.
pub fn parse_live_hosts(stdout: &str) -> Vec<LiveHost> {
    let mut hosts = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let probe: ProbeLine = match serde_json::from_str(line) {
            Ok(probe) => probe,
            Err(e) => {
                tracing::trace!("Skipping undecodable httpx line ({}): {}", e, line);
                continue;
            }
        };

        let Some(status_code) = probe.status_code.filter(|c| ACCEPTED_STATUS.contains(c)) else {
            continue;
        };
        let Some(url) = probe.url.filter(|u| !u.trim().is_empty()) else {
            continue;
        };

        hosts.push(LiveHost {
            url,
            status_code,
            title: probe.title.unwrap_or_default(),
            content_length: probe.content_length.unwrap_or_default(),
            technologies: probe.tech.or(probe.technologies).unwrap_or_default(),
        });
    }

    hosts
}
