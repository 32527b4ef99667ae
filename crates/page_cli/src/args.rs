use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;
use crate::logging::{LogDestination, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "page-extract")]
#[command(about = "Fetch one page and print its title, description, links and text as JSON")]
#[command(version)]
pub struct Args {
    /// URL of the page to extract
    pub url: String,

    /// RON settings file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Connect timeout in seconds (default: none)
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum number of redirects to follow
    #[arg(long)]
    pub redirect_limit: Option<usize>,

    /// User-Agent header sent with the request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Resolve relative links against the final page URL
    #[arg(long)]
    pub resolve_links: bool,

    /// Maximum characters of page text to keep
    #[arg(long)]
    pub max_text_chars: Option<usize>,

    /// Print single-line JSON instead of pretty output
    #[arg(long)]
    pub compact: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Minimum level written to the log
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Args {
    /// Layers command-line overrides on top of a loaded config.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(secs) = self.connect_timeout {
            config.fetch.connect_timeout_secs = Some(secs);
        }
        if let Some(secs) = self.timeout {
            config.fetch.timeout_secs = Some(secs);
        }
        if let Some(limit) = self.redirect_limit {
            config.fetch.redirect_limit = limit;
        }
        if let Some(agent) = &self.user_agent {
            config.fetch.user_agent = Some(agent.clone());
        }
        if self.resolve_links {
            config.extract.resolve_links = true;
        }
        if let Some(max) = self.max_text_chars {
            config.extract.max_text_chars = max;
        }
        config
    }
}
