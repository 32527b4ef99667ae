use std::fmt;

use serde::Serialize;

pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No Description";

/// Pipeline state machine. A run moves strictly forward:
/// `Idle -> Fetching -> {Fetched, FetchFailed} -> Extracting -> {Extracted, ExtractFailed}
/// -> Normalizing -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Fetching,
    Fetched,
    FetchFailed,
    Extracting,
    Extracted,
    ExtractFailed,
    Normalizing,
    Done,
}

impl Stage {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Fetched)
                | (Fetching, FetchFailed)
                | (Fetched, Extracting)
                | (FetchFailed, Extracting)
                | (Extracting, Extracted)
                | (Extracting, ExtractFailed)
                | (Extracted, Normalizing)
                | (ExtractFailed, Normalizing)
                | (Normalizing, Done)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// Raw response body of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: Vec<u8>,
    pub metadata: FetchMetadata,
}

impl Document {
    /// Builds a document from in-memory markup, e.g. a saved page.
    pub fn from_markup(url: impl Into<String>, markup: impl Into<String>) -> Self {
        let url = url.into();
        let content = markup.into().into_bytes();
        Self {
            metadata: FetchMetadata {
                original_url: url.clone(),
                final_url: url,
                redirect_count: 0,
                content_type: Some("text/html; charset=utf-8".to_string()),
                byte_len: content.len() as u64,
            },
            content,
        }
    }
}

pub type FetchResult = Result<Document, FetchError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error fetching URL: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    Body,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Body => write!(f, "unreadable response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error parsing HTML: {message}")]
pub struct ExtractionError {
    pub message: String,
}

impl ExtractionError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Either terminal failure a run can end in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub title: String,
    pub description: String,
    pub links: Vec<String>,
    pub body_text: String,
}

/// Display shape handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationRecord {
    #[serde(rename = "Page Title")]
    pub page_title: String,
    #[serde(rename = "Meta Description")]
    pub meta_description: String,
    #[serde(rename = "Links Found")]
    pub links_found: Vec<String>,
    #[serde(rename = "Page Text (truncated)")]
    pub page_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// Terminal output of one run: a presentation record or a single-key error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PipelineOutput {
    Record(PresentationRecord),
    Error(ErrorPayload),
}

impl PipelineOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, PipelineOutput::Error(_))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_transitions_only_move_forward() {
        assert!(Stage::Idle.can_advance_to(Stage::Fetching));
        assert!(Stage::FetchFailed.can_advance_to(Stage::Extracting));
        assert!(Stage::ExtractFailed.can_advance_to(Stage::Normalizing));
        assert!(!Stage::Extracting.can_advance_to(Stage::Fetching));
        assert!(!Stage::Done.can_advance_to(Stage::Idle));
        assert!(!Stage::Fetched.can_advance_to(Stage::Normalizing));
    }

    #[test]
    fn error_messages_carry_stage_prefix() {
        let fetch = FetchError::new(FailureKind::Network, "connection refused");
        assert_eq!(fetch.to_string(), "Error fetching URL: connection refused");

        let parse = ExtractionError::new("bad markup");
        assert_eq!(parse.to_string(), "Error parsing HTML: bad markup");

        let wrapped: PipelineError = parse.into();
        assert_eq!(wrapped.to_string(), "Error parsing HTML: bad markup");
    }

    #[test]
    fn error_output_serializes_as_single_key() {
        let output = PipelineOutput::Error(ErrorPayload {
            error: "Error fetching URL: boom".to_string(),
        });
        assert_eq!(
            output.to_json().unwrap(),
            r#"{"error":"Error fetching URL: boom"}"#
        );
    }
}
