use ego_tree::NodeRef;
use pipeline_logging::pipeline_debug;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::decode::decode_html;
use crate::{Document, ExtractedRecord, ExtractionError, NO_DESCRIPTION, NO_TITLE};

pub const DEFAULT_MAX_TEXT_CHARS: usize = 1000;

/// Elements whose text never reaches the rendered page. `noscript` fallback text
/// counts as visible.
const HIDDEN_ELEMENTS: &[&str] = &["head", "title", "script", "style", "template"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    /// Hard cut applied to the normalized body text, in characters.
    pub max_text_chars: usize,
    /// Join relative hrefs against the document's final URL.
    pub resolve_links: bool,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            resolve_links: false,
        }
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<ExtractedRecord, ExtractionError>;
}

/// Pulls title, meta description, anchor hrefs and visible text out of HTML.
///
/// Parsing is tolerant: missing or misnested tags fall back to the
/// `No Title` / `No Description` placeholders instead of failing, and bytes
/// that are malformed for the detected encoding come through as U+FFFD.
#[derive(Debug, Clone, Default)]
pub struct MarkupExtractor {
    settings: ExtractSettings,
}

impl MarkupExtractor {
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractSettings {
        &self.settings
    }

    /// Extracts from already-decoded markup. `base_url` is only consulted when
    /// link resolution is enabled.
    pub fn extract_html(
        &self,
        html: &str,
        base_url: Option<&str>,
    ) -> Result<ExtractedRecord, ExtractionError> {
        let doc = Html::parse_document(html);
        let base = base_url
            .filter(|_| self.settings.resolve_links)
            .and_then(|raw| Url::parse(raw).ok());

        let record = ExtractedRecord {
            title: extract_title(&doc)?,
            description: extract_description(&doc)?,
            links: extract_links(&doc, base.as_ref())?,
            body_text: truncate_chars(visible_text(&doc), self.settings.max_text_chars),
        };
        pipeline_debug!(
            "extracted title={:?} links={} text_chars={}",
            record.title,
            record.links.len(),
            record.body_text.chars().count()
        );
        Ok(record)
    }
}

impl Extractor for MarkupExtractor {
    fn extract(&self, document: &Document) -> Result<ExtractedRecord, ExtractionError> {
        let decoded = decode_html(&document.content, document.metadata.content_type.as_deref());
        pipeline_debug!(
            "decoded {} bytes as {} (lossy: {})",
            document.metadata.byte_len,
            decoded.encoding_label,
            decoded.had_errors
        );
        self.extract_html(&decoded.html, Some(&document.metadata.final_url))
    }
}

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|err| ExtractionError::new(format!("selector {css:?}: {err}")))
}

fn extract_title(doc: &Html) -> Result<String, ExtractionError> {
    let title_sel = selector("title")?;
    let title = doc
        .select(&title_sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    Ok(title.unwrap_or_else(|| NO_TITLE.to_string()))
}

fn extract_description(doc: &Html) -> Result<String, ExtractionError> {
    let meta_sel = selector("meta[name]")?;
    // Attribute value compared as authored; CSS matching could fold case.
    let description = doc
        .select(&meta_sel)
        .find(|meta| meta.value().attr("name") == Some("description"))
        .and_then(|meta| meta.value().attr("content"));
    Ok(description.unwrap_or(NO_DESCRIPTION).to_string())
}

fn extract_links(doc: &Html, base: Option<&Url>) -> Result<Vec<String>, ExtractionError> {
    let anchor_sel = selector("a[href]")?;
    let links = doc
        .select(&anchor_sel)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(|href| match base {
            Some(base) => resolve_href(href, base),
            None => href.to_string(),
        })
        .collect();
    Ok(links)
}

fn resolve_href(href: &str, base: &Url) -> String {
    base.join(href.trim())
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

fn visible_text(doc: &Html) -> String {
    let mut collector = TextCollector::default();
    for node in doc.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            if !is_hidden(node) {
                collector.push(text);
            }
        }
    }
    collector.text
}

fn is_hidden(node: NodeRef<'_, Node>) -> bool {
    node.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|element| HIDDEN_ELEMENTS.contains(&element.value().name()))
}

/// Joins text fragments with single spaces, collapsing whitespace inside each
/// fragment and dropping fragments that are whitespace only.
#[derive(Default)]
struct TextCollector {
    text: String,
}

impl TextCollector {
    fn push(&mut self, fragment: &str) {
        for word in fragment.split_whitespace() {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(word);
        }
    }
}

/// Cuts `text` to at most `max_chars` characters. Not word-boundary aware.
pub(crate) fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text,
    }
}
