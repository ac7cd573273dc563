use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "arachnid", version, about = "Chained web reconnaissance: subdomains, live hosts, content discovery")]
pub struct Cli {
    /// Target domain or URL (e.g. example.com or https://example.com)
    #[arg(short = 't', long = "target")]
    pub target: Option<String>,

    /// Run one category and exit instead of starting the interactive shell
    #[arg(short = 'c', long = "category")]
    pub category: Option<String>,

    /// Custom User-Agent sent by every HTTP-facing stage
    #[arg(short = 'u', long = "user-agent")]
    pub user_agent: Option<String>,

    /// Path to a YAML configuration file
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Override global.output_dir from the configuration
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Directory for saved sessions
    #[arg(long = "sessions-dir")]
    pub sessions_dir: Option<PathBuf>,

    /// Save the one-shot run under this session name
    #[arg(long = "save", requires = "category")]
    pub save: Option<String>,

    /// Verbose human output
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Debug logs (implies verbose)
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}
