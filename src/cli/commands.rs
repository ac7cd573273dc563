use crate::core::{Pipeline, SessionContext};
use crate::plugins::registry::category_names;
use crate::storage::SessionStore;
use crate::ui::printer::{print_error, print_info, print_session, print_summary};
use crate::ui::progress::Progress;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetUrl(String),
    SetUa(String),
    Scan(String),
    Show,
    Save(String),
    Load(String),
    Sessions,
    Clear,
    Help,
    Exit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let words = shell_words::split(line).map_err(|e| format!("Could not parse input: {}", e))?;
        let Some((head, rest)) = words.split_first() else {
            return Ok(Command::Empty);
        };

        let single = |usage: &str| -> Result<String, String> {
            match rest {
                [one] => Ok(one.clone()),
                _ => Err(format!("Usage: {}", usage)),
            }
        };

        match head.to_lowercase().as_str() {
            "seturl" => single("seturl <url>").map(Command::SetUrl),
            "setua" if !rest.is_empty() => Ok(Command::SetUa(rest.join(" "))),
            "setua" => Err("Usage: setua <user-agent>".to_string()),
            "scan" => single("scan <category>").map(|c| Command::Scan(c.to_lowercase())),
            "show" => Ok(Command::Show),
            "save" => single("save <session_name>").map(Command::Save),
            "load" => single("load <session_name>").map(Command::Load),
            "sessions" => Ok(Command::Sessions),
            "clear" => Ok(Command::Clear),
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            _ => Err("Unknown command. Type 'help' to see options.".to_string()),
        }
    }
}

pub fn help_text() -> String {
    let categories = category_names().collect::<Vec<_>>().join(" | ");
    format!(
        "
Commands:
  seturl <url>            Set the target URL or domain (e.g. example.com)
  setua <user-agent>      Set a custom User-Agent header for HTTP requests
  scan <category>         Run a scan category: {}
  show                    Show results collected in this session
  save <name>             Save current session
  load <name>             Load a saved session
  sessions                List saved sessions
  clear                   Clear current session data
  help                    Show this help menu
  exit                    Exit arachnid
",
        categories
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive front end over an explicit session.
pub struct Shell<'a> {
    pub pipeline: &'a Pipeline,
    pub store: &'a SessionStore,
    pub session: SessionContext,
    progress: Option<&'a Progress>,
}

impl<'a> Shell<'a> {
    pub fn new(pipeline: &'a Pipeline, store: &'a SessionStore, session: SessionContext) -> Self {
        Self {
            pipeline,
            store,
            session,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::Help => println!("{}", help_text()),
            Command::SetUrl(raw) => match self.session.set_target(&raw) {
                Ok(target) => print_info(format!(
                    "Target set to: {} (domain {}, url {})",
                    target.raw, target.domain, target.url
                )),
                Err(e) => print_error(e),
            },
            Command::SetUa(ua) => {
                self.session.set_user_agent(Some(ua));
                match self.session.user_agent() {
                    Some(ua) => print_info(format!("Custom User-Agent set to: {}", ua)),
                    None => print_error("User-Agent cannot be blank"),
                }
            }
            Command::Scan(category) => match self.session.run(self.pipeline, &category).await {
                Ok(delta) => {
                    if let Some(progress) = self.progress {
                        progress.settled().await;
                    }
                    print_summary(&category, &delta);
                }
                Err(crate::core::ScanError::NoTarget) => {
                    print_error("No URL set. Use 'seturl <url>' first.")
                }
                Err(e) => print_error(format!("{}. Type 'help' to see options.", e)),
            },
            Command::Show => print_session(self.session.results()),
            Command::Save(name) => match self.store.save(&name, &self.session) {
                Ok(path) => print_info(format!("Session saved as '{}' ({})", name, path.display())),
                Err(e) => print_error(format!("{:#}", e)),
            },
            Command::Load(name) => {
                match self.store.load(&name).and_then(|saved| saved.into_context()) {
                    Ok(session) => {
                        self.session = session;
                        print_info(format!("Session '{}' loaded.", name));
                    }
                    Err(e) => print_error(format!("{:#}", e)),
                }
            }
            Command::Sessions => match self.store.list() {
                Ok(names) if names.is_empty() => print_info("No saved sessions."),
                Ok(names) => names.iter().for_each(|n| println!("  {}", n)),
                Err(e) => print_error(format!("{:#}", e)),
            },
            Command::Clear => {
                self.session.clear();
                print_info("Session data cleared.");
            }
            Command::Exit => {
                println!("Exiting arachnid.");
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    pub async fn run(mut self) -> Result<SessionContext> {
        println!("Type 'help' to see options.\n");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("arachnid > ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    print_error(message);
                    continue;
                }
            };

            if self.handle(command).await == Flow::Exit {
                break;
            }
        }

        Ok(self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::executors::command::testing::FakeRunner;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case("seturl example.com", Ok(Command::SetUrl("example.com".into())))]
    #[case("SETURL https://a.example.com", Ok(Command::SetUrl("https://a.example.com".into())))]
    #[case("setua Mozilla/5.0 (X11; Linux)", Ok(Command::SetUa("Mozilla/5.0 (X11; Linux)".into())))]
    #[case("setua \"quoted agent\"", Ok(Command::SetUa("quoted agent".into())))]
    #[case("scan RECON", Ok(Command::Scan("recon".into())))]
    #[case("   ", Ok(Command::Empty))]
    #[case("quit", Ok(Command::Exit))]
    #[case("scan", Err("Usage: scan <category>".into()))]
    #[case("seturl", Err("Usage: seturl <url>".into()))]
    #[case("frobnicate", Err("Unknown command. Type 'help' to see options.".into()))]
    fn test_parse(#[case] line: &str, #[case] expected: Result<Command, String>) {
        assert_eq!(Command::parse(line), expected);
    }

    #[test]
    fn test_unbalanced_quotes_are_reported() {
        assert!(Command::parse("setua \"oops").is_err());
    }

    #[tokio::test]
    async fn test_shell_session_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScanConfig::default();
        config.global.output_dir = Some(dir.path().join("out"));
        let runner = Arc::new(FakeRunner::new());
        let pipeline = Pipeline::new(Arc::new(config), runner.clone());
        let store = SessionStore::new(dir.path().join("sessions"));
        let mut shell = Shell::new(&pipeline, &store, SessionContext::new());

        // scanning before a target is set runs nothing
        assert_eq!(shell.handle(Command::Scan("recon".into())).await, Flow::Continue);
        assert!(runner.calls().is_empty());

        shell.handle(Command::SetUrl("example.com".into())).await;
        shell.handle(Command::Scan("bogus".into())).await;
        assert!(runner.calls().is_empty());
        assert!(shell.session.results().is_empty());

        shell.handle(Command::Scan("subdomains".into())).await;
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(shell.session.results().len(), 2);

        shell.handle(Command::Save("s1".into())).await;
        shell.handle(Command::Clear).await;
        assert!(shell.session.results().is_empty());

        shell.handle(Command::Load("s1".into())).await;
        assert_eq!(shell.session.results().len(), 2);
        assert_eq!(shell.session.target().unwrap().domain, "example.com");

        assert_eq!(shell.handle(Command::Exit).await, Flow::Exit);
    }
}
