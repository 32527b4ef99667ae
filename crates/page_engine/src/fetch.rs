use std::error::Error as StdError;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use pipeline_logging::{pipeline_debug, pipeline_info, pipeline_warn};
use reqwest::header::CONTENT_TYPE;

use crate::{Document, FailureKind, FetchError, FetchMetadata, FetchResult};

/// Redirect limit reqwest applies when left alone.
pub const DEFAULT_REDIRECT_LIMIT: usize = 10;

/// Transport knobs. The defaults leave reqwest's own behaviour untouched:
/// no timeouts and its usual redirect limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub redirect_limit: usize,
    pub user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            request_timeout: None,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            user_agent: None,
        }
    }
}

/// First pipeline stage: turns a URL into raw document bytes or a [`FetchError`].
///
/// Implementations must never panic on transport failures; every failure is
/// reported through the returned value.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestRetriever {
    settings: FetchSettings,
}

impl ReqwestRetriever {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    // Built per call; runs never share a connection pool or cookie store.
    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count > redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder().redirect(policy);
        if let Some(timeout) = self.settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = self.settings.user_agent.as_deref() {
            builder = builder.user_agent(agent);
        }

        builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, describe(&err)))
    }

    async fn try_fetch(&self, url: &str) -> FetchResult {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?
            .error_for_status()
            .map_err(map_reqwest_error)?;

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response.bytes().await.map_err(|err| {
            let mut mapped = map_reqwest_error(err);
            if mapped.kind == FailureKind::Network {
                mapped.kind = FailureKind::Body;
            }
            mapped
        })?;

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
            byte_len: body.len() as u64,
        };

        Ok(Document {
            content: body.to_vec(),
            metadata,
        })
    }
}

#[async_trait::async_trait]
impl Retriever for ReqwestRetriever {
    async fn fetch(&self, url: &str) -> FetchResult {
        pipeline_info!("GET {}", url);
        let result = self.try_fetch(url).await;
        match &result {
            Ok(document) => pipeline_debug!(
                "fetched {} bytes from {} ({} redirects)",
                document.metadata.byte_len,
                document.metadata.final_url,
                document.metadata.redirect_count
            ),
            Err(err) => pipeline_warn!("fetch of {} failed ({}): {}", url, err.kind, err.message),
        }
        result
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let message = describe(&err);
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, message);
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, message);
    }
    if let Some(status) = err.status() {
        return FetchError::new(FailureKind::HttpStatus(status.as_u16()), message);
    }
    FetchError::new(FailureKind::Network, message)
}

/// Renders an error with its `source()` chain so root causes such as
/// "connection refused" survive into the message.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let detail = inner.to_string();
        if !text.contains(&detail) {
            text.push_str(": ");
            text.push_str(&detail);
        }
        source = inner.source();
    }
    text
}
