//! Page engine: single-URL fetch -> extract -> normalize pipeline.
mod decode;
mod extract;
mod fetch;
mod normalize;
mod pipeline;
mod types;

pub use decode::{decode_html, DecodedHtml};
pub use extract::{ExtractSettings, Extractor, MarkupExtractor, DEFAULT_MAX_TEXT_CHARS};
pub use fetch::{FetchSettings, ReqwestRetriever, Retriever, DEFAULT_REDIRECT_LIMIT};
pub use normalize::normalize;
pub use pipeline::{extract_stage, LogSink, NoopSink, Pipeline, ProgressSink};
pub use types::{
    Document, ErrorPayload, ExtractedRecord, ExtractionError, FailureKind, FetchError,
    FetchMetadata, FetchResult, PipelineError, PipelineOutput, PresentationRecord, Stage,
    NO_DESCRIPTION, NO_TITLE,
};
