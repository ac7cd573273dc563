use crate::core::errors::ScanError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// One external invocation: program, ordered args, optional stdin, time bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process. A non-zero exit is data, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u128,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convert a non-zero exit into [`ScanError::ToolNonZeroExit`].
    pub fn require_success(self, tool: &str) -> Result<Self, ScanError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ScanError::ToolNonZeroExit {
                tool: tool.to_string(),
                exit_code: self.exit_code,
                stderr_tail: ScanError::stderr_tail(&self.stderr),
            })
        }
    }
}

/// Seam between stage adapters and the operating system.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ScanError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ScanError> {
        execute(&spec).await
    }
}

pub async fn execute(spec: &CommandSpec) -> Result<CommandOutput, ScanError> {
    let start = Instant::now();

    tracing::debug!("Executing: {}", spec.display());

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ScanError::LaunchFailure {
        tool: spec.program.clone(),
        source,
    })?;

    // stdin is written concurrently with draining stdout/stderr
    if let (Some(input), Some(mut stdin)) = (spec.stdin.clone(), child.stdin.take()) {
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                tracing::debug!("stdin write ended early: {}", e);
            }
            // dropping stdin closes the pipe so the child sees EOF
        });
    }

    // On timeout the future owning `child` is dropped; kill_on_drop reaps it.
    let output = match timeout(spec.timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ScanError::Timeout {
                tool: spec.program.clone(),
                secs: spec.timeout.as_secs(),
            });
        }
    };

    let duration_ms = start.elapsed().as_millis();
    let result = CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms,
    };

    tracing::debug!(
        "{} finished with {:?} in {}ms",
        spec.program,
        result.exit_code,
        duration_ms
    );

    Ok(result)
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted runner: pops one canned response per call and records every spec.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: Mutex<VecDeque<Result<CommandOutput, ScanError>>>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_stdout(&self, stdout: &str) -> &Self {
            self.push(Ok(CommandOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                ..Default::default()
            }))
        }

        pub fn push(&self, response: Result<CommandOutput, ScanError>) -> &Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ScanError> {
            self.calls.lock().unwrap().push(spec);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(CommandOutput { exit_code: Some(0), ..Default::default() }))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spec(program: &str, args: &[&str], secs: u64) -> CommandSpec {
        CommandSpec::new(program, Duration::from_secs(secs)).args(args.iter().copied())
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let out = execute(&spec("sh", &["-c", "echo out; echo err >&2"], 5))
            .await
            .unwrap();
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_data() {
        let out = execute(&spec("sh", &["-c", "echo nope >&2; exit 3"], 5))
            .await
            .unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());

        let err = out.require_success("sh").unwrap_err();
        assert!(matches!(err, ScanError::ToolNonZeroExit { exit_code: Some(3), .. }));
    }

    #[tokio::test]
    async fn test_pipes_stdin() {
        let out = execute(&spec("cat", &[], 5).stdin("a.example.com\nb.example.com"))
            .await
            .unwrap();
        assert_eq!(out.stdout, "a.example.com\nb.example.com");
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let script = format!("sleep 2; touch '{}'", marker.display());

        let started = Instant::now();
        let err = execute(&spec("sh", &["-c", script.as_str()], 1)).await.unwrap_err();
        assert!(matches!(err, ScanError::Timeout { secs: 1, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));

        // a child left running would create the marker once its sleep ends
        let deadline = started + Duration::from_millis(3500);
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let err = execute(&spec("arachnid-no-such-binary", &[], 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::LaunchFailure { .. }));
    }
}
