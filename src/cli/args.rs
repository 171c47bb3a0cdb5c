use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }
}

/// CLI argument parsing with environment variable support.
///
/// Environment variables follow the pattern `RULEGATE_*` and are overridden
/// by CLI flags. Example: `RULEGATE_FORMAT=json` is overridden by
/// `--format text`.
#[derive(Parser, Debug)]
#[command(name = "rulegate")]
#[command(about = "Evaluate AI code-generation requests against declarative guardrail rules")]
#[command(version)]
pub struct Args {
    /// Directory containing rule documents (.mdc, .md, .toml)
    pub rules_dir: PathBuf,

    /// Request text to evaluate
    #[arg(short, long, env = "RULEGATE_REQUEST")]
    pub request: Option<String>,

    /// Read the request text from a file instead
    #[arg(long, conflicts_with = "request")]
    pub request_file: Option<PathBuf>,

    /// Code snippet/diff to evaluate content patterns against
    #[arg(long, env = "RULEGATE_CONTENT")]
    pub content: Option<String>,

    /// Read the content snippet from a file instead
    #[arg(long, conflicts_with = "content")]
    pub content_file: Option<PathBuf>,

    /// Report format
    #[arg(short, long, env = "RULEGATE_FORMAT")]
    pub format: Option<ReportFormat>,

    /// Abort evaluation after this many milliseconds, returning partial results
    #[arg(long, env = "RULEGATE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Config file path
    #[arg(short, long, default_value = "rulegate.toml", env = "RULEGATE_CONFIG")]
    pub config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the report; only the exit code signals the result
    #[arg(short)]
    pub quiet: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
