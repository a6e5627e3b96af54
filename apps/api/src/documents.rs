//! Resume text extraction for uploaded PDF and DOCX files.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

static DOCX_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:p[ >].*?</w:p>|<w:p/>").expect("paragraph pattern is valid")
});

static DOCX_TEXT_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").expect("text run pattern is valid")
});

static XML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(lt|gt|quot|apos|amp|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});")
        .expect("entity pattern is valid")
});

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type '{0}'. Use PDF or DOCX.")]
    UnsupportedType(String),

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to read DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from the resume.")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detects the document kind from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, DocumentError> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(DocumentKind::Docx)
        } else {
            Err(DocumentError::UnsupportedType(filename.to_string()))
        }
    }
}

/// Extracts plain text from an uploaded resume. A document with no readable text is an error.
pub fn extract_text_from_resume(filename: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let text = match DocumentKind::from_filename(filename)? {
        DocumentKind::Pdf => extract_text_from_pdf(bytes)?,
        DocumentKind::Docx => extract_text_from_docx(bytes)?,
    };
    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}

fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Pdf(e.to_string()))
}

/// Reads `word/document.xml` and joins the text of every non-blank paragraph.
fn extract_text_from_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| DocumentError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| DocumentError::Docx(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    DOCX_PARAGRAPH
        .find_iter(xml)
        .map(|paragraph| {
            DOCX_TEXT_RUN
                .captures_iter(paragraph.as_str())
                .filter_map(|caps| caps.get(1))
                .map(|run| decode_xml_entities(run.as_str()))
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes the predefined XML entities and numeric character references in one pass,
/// so `&amp;lt;` stays `&lt;`. Unknown or invalid references are kept verbatim.
fn decode_xml_entities(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    /// Builds a minimal DOCX container with one paragraph per entry.
    pub(crate) fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("cv.pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("CV.DOCX").unwrap(), DocumentKind::Docx);
        assert!(matches!(
            DocumentKind::from_filename("cv.doc"),
            Err(DocumentError::UnsupportedType(_))
        ));
        assert!(DocumentKind::from_filename("pdf").is_err());
    }

    #[test]
    fn test_unsupported_type_message() {
        let err = extract_text_from_resume("resume.txt", b"hello").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file type 'resume.txt'. Use PDF or DOCX."
        );
    }

    #[test]
    fn test_docx_paragraphs_are_joined() {
        let bytes = docx_with_paragraphs(&["John Doe", "   ", "john@example.com", "R&amp;D lead"]);
        let text = extract_text_from_resume("resume.docx", &bytes).unwrap();
        assert_eq!(text, "John Doe\njohn@example.com\nR&D lead");
    }

    #[test]
    fn test_docx_runs_in_one_paragraph_concatenate() {
        let xml = r#"<w:body><w:p><w:pPr/><w:r><w:t>Senior </w:t></w:r><w:r><w:t xml:space="preserve">Engineer</w:t></w:r></w:p><w:p/><w:p><w:r><w:tab/><w:t>Rust</w:t></w:r></w:p></w:body>"#;
        assert_eq!(docx_xml_to_text(xml), "Senior Engineer\nRust");
    }

    #[test]
    fn test_numeric_character_references_are_decoded() {
        assert_eq!(
            decode_xml_entities("I&#8217;m a R&amp;D lead &#x2014; caf&#xE9; &#X41;"),
            "I\u{2019}m a R&D lead \u{2014} caf\u{e9} A"
        );
    }

    #[test]
    fn test_entity_decoding_is_single_pass_and_keeps_unknowns() {
        assert_eq!(decode_xml_entities("&amp;lt; &nbsp; &#xD800; &#99999999;"), "&lt; &nbsp; &#xD800; &#99999999;");
    }

    #[test]
    fn test_docx_without_text_is_empty_error() {
        let bytes = docx_with_paragraphs(&["   ", ""]);
        let err = extract_text_from_resume("resume.docx", &bytes).unwrap_err();
        assert!(matches!(err, DocumentError::Empty));
        assert_eq!(err.to_string(), "No text could be extracted from the resume.");
    }

    #[test]
    fn test_docx_garbage_is_docx_error() {
        let err = extract_text_from_resume("resume.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, DocumentError::Docx(_)));
    }

    #[test]
    fn test_docx_without_body_is_docx_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_text_from_resume("resume.docx", &bytes).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_pdf_garbage_is_pdf_error() {
        let err = extract_text_from_resume("resume.pdf", b"%PDF-broken").unwrap_err();
        assert!(matches!(err, DocumentError::Pdf(_)));
    }
}
