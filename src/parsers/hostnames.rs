use crate::core::models::Subdomain;
use regex::Regex;
use std::sync::LazyLock;

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9][a-z0-9.-]*\.[a-z]{2,}$").expect("hostname pattern is valid")
});

pub fn is_valid_hostname(candidate: &str) -> bool {
    HOSTNAME.is_match(candidate)
}

/// Parse subdomain-enumeration output: one hostname per line, noise dropped.
pub fn parse_subdomains(stdout: &str) -> Vec<Subdomain> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let ok = is_valid_hostname(line);
            if !ok {
                tracing::trace!("Skipping non-hostname line: {}", line);
            }
            ok
        })
        .map(|line| Subdomain {
            domain: line.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sub.example.com", true)]
    #[case("example.com", true)]
    #[case("A-1.Example.CO", true)]
    #[case("xn--bcher-kva.example.org", true)]
    #[case("not a host", false)]
    #[case("*.example.com", false)]
    #[case("localhost", false)]
    #[case("192.168.1.1", false)]
    #[case("example.c0m", false)]
    #[case("example.c", false)]
    #[case("-bad.example.com", false)]
    fn test_hostname_grammar(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_hostname(input), expected);
    }

    #[test]
    fn test_parse_drops_noise_and_blanks() {
        let out = "\n[INF] Enumerating subdomains for example.com\nwww.example.com\n  api.example.com  \n\n*.example.com\n";
        let subs: Vec<String> = parse_subdomains(out).into_iter().map(|s| s.domain).collect();
        assert_eq!(subs, vec!["www.example.com", "api.example.com"]);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_subdomains("").is_empty());
    }
}
