use crate::core::models::DiscoveredPath;

pub const STATUS_TOKENS: [&str; 5] = ["200", "301", "302", "307", "401"];

/// Parse feroxbuster's tabular report into discovered URLs.
///
/// A line qualifies when any accepted status token appears in it. The URL is
/// taken from the third column; rows in the wider `status method lines words
/// chars url` layout fall back to the last HTTP-looking column, provided the
/// row starts with an accepted status.
pub fn parse_discovered(stdout: &str) -> Vec<DiscoveredPath> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<DiscoveredPath> {
    if !STATUS_TOKENS.iter().any(|code| line.contains(code)) {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let status_code = tokens.first().and_then(|t| leading_status(t));

    let url = match tokens.get(2).filter(|t| is_http(t)) {
        Some(url) => url,
        // counters such as `200c` also pass the substring check
        None => {
            status_code?;
            tokens.iter().rev().find(|t| is_http(t))?
        }
    };

    Some(DiscoveredPath {
        url: (*url).to_string(),
        status_code,
    })
}

fn leading_status(token: &str) -> Option<u16> {
    STATUS_TOKENS
        .contains(&token)
        .then(|| token.parse().ok())
        .flatten()
}

fn is_http(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}
