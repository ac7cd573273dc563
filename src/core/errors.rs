use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("required input missing: {0}")]
    InputMissing(PathBuf),

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("failed to launch {tool}: {source}")]
    LaunchFailure {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {}: {stderr_tail}", exit_label(.exit_code))]
    ToolNonZeroExit {
        tool: String,
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("invalid target '{0}'")]
    InvalidTarget(String),

    #[error("no target set")]
    NoTarget,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "signal".to_string(),
    }
}

impl ScanError {
    /// Keep only the last lines of a tool's stderr for diagnostics.
    pub fn stderr_tail(stderr: &str) -> String {
        let lines: Vec<&str> = stderr.trim().lines().collect();
        let start = lines.len().saturating_sub(10);
        lines[start..].join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail_keeps_last_ten_lines() {
        let stderr: String = (1..=15).map(|i| format!("line {}\n", i)).collect();
        let tail = ScanError::stderr_tail(&stderr);
        assert!(tail.starts_with("line 6"));
        assert!(tail.ends_with("line 15"));
    }

    #[test]
    fn test_non_zero_exit_display() {
        let err = ScanError::ToolNonZeroExit {
            tool: "httpx".to_string(),
            exit_code: Some(2),
            stderr_tail: "bad flag".to_string(),
        };
        assert_eq!(err.to_string(), "httpx exited with code 2: bad flag");
    }
}
