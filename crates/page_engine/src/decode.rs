use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use pipeline_logging::pipeline_warn;

/// How far into the document a `<meta charset>` declaration is looked for.
const META_PRESCAN_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> `<meta>` charset
/// -> chardetng fallback. Malformed input never fails; it is replaced with U+FFFD.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> DecodedHtml {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    if let Some(encoding) = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    // Meta-declared UTF-16 and `replacement` fall back to UTF-8.
    if let Some(encoding) = charset_from_meta(bytes)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding.output_encoding());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
            .filter(|label| !label.is_empty())
    })
}

fn charset_from_meta(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(meta_at) = rest.find("<meta") {
        let tag = &rest[meta_at..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(charset_at) = tag.find("charset=") {
            let value = tag[charset_at + "charset=".len()..].trim_start_matches(['"', '\'', ' ']);
            let end = value
                .find(|c: char| c == '"' || c == '\'' || c == ';' || c == '/' || c.is_whitespace())
                .unwrap_or(value.len());
            if end > 0 {
                return Some(value[..end].to_string());
            }
        }
        rest = &rest[meta_at + "<meta".len()..];
    }
    None
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> DecodedHtml {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        pipeline_warn!(
            "malformed {} input at byte {}; replaced with U+FFFD",
            encoding.name(),
            first_malformed_offset(bytes, encoding)
        );
    }
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
        had_errors,
    }
}

fn first_malformed_offset(bytes: &[u8], encoding: &'static Encoding) -> usize {
    if encoding == encoding_rs::UTF_8 {
        if let Err(err) = std::str::from_utf8(bytes) {
            return err.valid_up_to();
        }
    }
    0
}
