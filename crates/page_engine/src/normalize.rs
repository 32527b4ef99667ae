use crate::{ErrorPayload, ExtractedRecord, PipelineError, PipelineOutput, PresentationRecord};

impl From<ExtractedRecord> for PresentationRecord {
    fn from(record: ExtractedRecord) -> Self {
        Self {
            page_title: record.title,
            meta_description: record.description,
            links_found: record.links,
            page_text: record.body_text,
        }
    }
}

/// Final stage: re-keys a record for display, or passes an upstream error
/// through as `{"error": message}` without further wrapping.
pub fn normalize(input: Result<ExtractedRecord, PipelineError>) -> PipelineOutput {
    match input {
        Ok(record) => PipelineOutput::Record(record.into()),
        Err(err) => PipelineOutput::Error(ErrorPayload {
            error: err.to_string(),
        }),
    }
}
