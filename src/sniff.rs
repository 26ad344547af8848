//! Content-type detection from an entry's leading bytes.
//!
//! Follows the WHATWG MIME sniffing rules for the signatures a static
//! site commonly carries. At most [`SNIFF_SIZE`] bytes are examined.

/// Number of leading bytes content-type detection looks at.
pub const SNIFF_SIZE: usize = 512;

pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Tags that identify HTML when they open the document, compared case-insensitively.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const EXACT: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_PLAIN),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
    (b"wOFF", "font/woff"),
    (b"wOF2", "font/woff2"),
];

/// Classify `data`, returning a MIME type with charset where applicable.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_SIZE)];
    let content = skip_whitespace(data);

    if HTML_TAGS.iter().any(|tag| is_html_tag(content, tag)) {
        return TEXT_HTML;
    }
    if starts_with_ignore_case(content, b"<?XML") {
        return "text/xml; charset=utf-8";
    }
    if let Some(&(_, mime)) = EXACT.iter().find(|(sig, _)| data.starts_with(sig)) {
        return mime;
    }
    if data.len() >= 14 && &data[0..4] == b"RIFF" && &data[8..14] == b"WEBPVP" {
        return "image/webp";
    }
    if !data.iter().copied().any(is_binary_byte) {
        return TEXT_PLAIN;
    }
    OCTET_STREAM
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], pattern: &[u8]) -> bool {
    data.len() >= pattern.len()
        && data
            .iter()
            .zip(pattern)
            .all(|(d, p)| d.to_ascii_uppercase() == *p)
}

/// A tag matches only when followed by a space or `>`.
fn is_html_tag(data: &[u8], tag: &[u8]) -> bool {
    starts_with_ignore_case(data, tag) && matches!(data.get(tag.len()), Some(b' ' | b'>'))
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_html() {
        assert_eq!(detect_content_type(b"<html><body></body></html>"), TEXT_HTML);
        assert_eq!(detect_content_type(b"\n  <!doctype html>\n<p>hi</p>"), TEXT_HTML);
        assert_eq!(detect_content_type(b"<P>paragraph</P>"), TEXT_HTML);
        // a tag prefix alone is not enough
        assert_eq!(detect_content_type(b"<htmlish"), TEXT_PLAIN);
    }

    #[test]
    fn detects_text_and_binary() {
        assert_eq!(detect_content_type(b"World"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b""), TEXT_PLAIN);
        assert_eq!(detect_content_type(&b"\x01\x02\x03".repeat(100)), OCTET_STREAM);
    }

    #[test]
    fn detects_signatures() {
        assert_eq!(detect_content_type(b"%PDF-1.7 ..."), "application/pdf");
        assert_eq!(
            detect_content_type(b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00"),
            "image/png"
        );
        assert_eq!(detect_content_type(b"<?xml version=\"1.0\"?>"), "text/xml; charset=utf-8");
        assert_eq!(
            detect_content_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            "image/webp"
        );
    }

    #[test]
    fn only_examines_sniff_window() {
        let mut data = vec![b'a'; SNIFF_SIZE];
        data.push(0x00);
        assert_eq!(detect_content_type(&data), TEXT_PLAIN);
    }
}
