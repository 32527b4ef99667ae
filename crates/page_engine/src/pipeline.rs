use pipeline_logging::{pipeline_debug, pipeline_info};

use crate::extract::{ExtractSettings, Extractor, MarkupExtractor};
use crate::fetch::{FetchSettings, ReqwestRetriever, Retriever};
use crate::normalize::normalize;
use crate::{ExtractedRecord, FetchResult, PipelineError, PipelineOutput, Stage};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, stage: Stage);
}

/// Discards every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _stage: Stage) {}
}

/// Writes every transition to the debug log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, stage: Stage) {
        pipeline_debug!("stage -> {:?}", stage);
    }
}

/// Extraction stage over a fetch result. A fetch failure is carried forward
/// unchanged; its message is never parsed as markup.
pub fn extract_stage<E: Extractor + ?Sized>(
    extractor: &E,
    fetched: FetchResult,
) -> Result<ExtractedRecord, PipelineError> {
    let document = fetched?;
    Ok(extractor.extract(&document)?)
}

/// Retriever -> Extractor -> Normalizer, run once per call in fixed order.
///
/// A `Pipeline` holds only immutable settings, so one value can serve any
/// number of independent runs.
#[derive(Debug, Clone)]
pub struct Pipeline<R = ReqwestRetriever, E = MarkupExtractor> {
    retriever: R,
    extractor: E,
}

impl Pipeline {
    pub fn from_settings(fetch: FetchSettings, extract: ExtractSettings) -> Self {
        Self::new(ReqwestRetriever::new(fetch), MarkupExtractor::new(extract))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_settings(FetchSettings::default(), ExtractSettings::default())
    }
}

impl<R: Retriever, E: Extractor> Pipeline<R, E> {
    pub fn new(retriever: R, extractor: E) -> Self {
        Self {
            retriever,
            extractor,
        }
    }

    pub async fn run(&self, url: &str) -> PipelineOutput {
        self.run_with_sink(url, &NoopSink).await
    }

    pub async fn run_with_sink(&self, url: &str, sink: &dyn ProgressSink) -> PipelineOutput {
        let mut stages = StageTracker::new(sink);

        stages.advance(Stage::Fetching);
        let fetched = self.retriever.fetch(url).await;
        stages.advance(if fetched.is_ok() {
            Stage::Fetched
        } else {
            Stage::FetchFailed
        });

        stages.advance(Stage::Extracting);
        let extracted = extract_stage(&self.extractor, fetched);
        stages.advance(if extracted.is_ok() {
            Stage::Extracted
        } else {
            Stage::ExtractFailed
        });

        stages.advance(Stage::Normalizing);
        let output = normalize(extracted);
        stages.advance(Stage::Done);

        pipeline_info!(
            "run for {} finished with {}",
            url,
            if output.is_error() { "an error" } else { "a record" }
        );
        output
    }

    /// Runs on a private current-thread runtime, blocking the caller until the
    /// single request completes. Must not be called from inside a tokio runtime.
    pub fn run_blocking(&self, url: &str) -> std::io::Result<PipelineOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.run_with_sink(url, &LogSink)))
    }
}

struct StageTracker<'a> {
    current: Stage,
    sink: &'a dyn ProgressSink,
}

impl<'a> StageTracker<'a> {
    fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            current: Stage::Idle,
            sink,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.current.can_advance_to(next),
            "illegal stage transition {:?} -> {:?}",
            self.current,
            next
        );
        self.current = next;
        self.sink.emit(next);
    }
}
