//! Text extraction from uploaded résumé files.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

use crate::models::Document;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format '{0}'. Please upload a PDF, DOCX, TXT or MD file.")]
    UnsupportedFormat(String),

    #[error("Could not extract text from the file.")]
    NoText,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to read DOCX: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Detects the format from the file extension.
    pub fn detect(document: &Document) -> Result<Self, ExtractError> {
        match document.extension().as_deref() {
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some("docx") => Ok(DocumentFormat::Docx),
            Some("txt") | Some("md") => Ok(DocumentFormat::PlainText),
            Some(other) => Err(ExtractError::UnsupportedFormat(other.to_string())),
            None => Err(ExtractError::UnsupportedFormat(document.file_name.clone())),
        }
    }
}

/// Extracts the plain text of `document`. CPU-bound for PDF and DOCX; call
/// from `spawn_blocking` in async contexts.
pub fn extract_text(document: &Document) -> Result<String, ExtractError> {
    let text = match DocumentFormat::detect(document)? {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(&document.bytes)
            .map_err(|e| ExtractError::Pdf(format!("{e:?}")))?,
        DocumentFormat::Docx => docx_text(&document.bytes)?,
        DocumentFormat::PlainText => String::from_utf8_lossy(&document.bytes).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// DOCX
// ────────────────────────────────────────────────────────────────────────────

const DOCX_BODY: &str = "word/document.xml";

/// Text of a DOCX body: one line per `<w:p>`, built from its `<w:t>` runs.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(docx_err)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(docx_err)?
        .read_to_string(&mut xml)
        .map_err(docx_err)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event().map_err(docx_err)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape().map_err(docx_err)?),
            Event::Eof => break,
            _ => {}
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}

fn docx_err(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Docx(e.to_string())
}

/// A minimal DOCX archive holding one `<w:p>` per entry of `paragraphs`.
#[cfg(test)]
pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(DOCX_BODY, zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
