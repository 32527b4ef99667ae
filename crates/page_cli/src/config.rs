use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use page_engine::{ExtractSettings, FetchSettings, DEFAULT_MAX_TEXT_CHARS, DEFAULT_REDIRECT_LIMIT};
use pipeline_logging::pipeline_info;
use serde::{Deserialize, Serialize};

/// Transport section of the RON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Seconds allowed for establishing the connection; unset means no limit.
    pub connect_timeout_secs: Option<u64>,
    /// Seconds allowed for the whole request; unset means no limit.
    pub timeout_secs: Option<u64>,
    pub redirect_limit: usize,
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            timeout_secs: None,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub max_text_chars: usize,
    pub resolve_links: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            resolve_links: false,
        }
    }
}

/// Settings file layout, e.g.
///
/// ```ron
/// (
///     fetch: (timeout_secs: Some(30), user_agent: Some("page-extract/0.1")),
///     extract: (resolve_links: true),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = ron::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        pipeline_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: self.fetch.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: self.fetch.timeout_secs.map(Duration::from_secs),
            redirect_limit: self.fetch.redirect_limit,
            user_agent: self.fetch.user_agent.clone(),
        }
    }

    pub fn extract_settings(&self) -> ExtractSettings {
        ExtractSettings {
            max_text_chars: self.extract.max_text_chars,
            resolve_links: self.extract.resolve_links,
        }
    }
}
