use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use lopdf::Document;
use tracing::{debug, error, warn};
use unicode_normalization::UnicodeNormalization;

use crate::logging::EXTRACTION;

pub fn load_pdf<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    Document::load(path).with_context(|| format!("Failed to load PDF {}", path.display()))
}

/// Extracted text per page, keyed by page number. Pages that produced no
/// text are absent.
#[derive(Debug, Default)]
pub struct PdfText {
    pub pages: BTreeMap<u32, String>,
    pub empty_pages: Vec<u32>,
}

impl PdfText {
    /// All page texts in page order, each followed by a newline.
    pub fn joined(&self) -> String {
        let mut text = String::new();
        for page in self.pages.values() {
            text.push_str(page);
            text.push('\n');
        }
        text
    }
}

pub fn get_pdf_text(doc: &Document) -> PdfText {
    let mut pdf_text = PdfText::default();

    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(target: EXTRACTION, page = page_num, chars = text.len(), "Extracted page");
                pdf_text.pages.insert(*page_num, text.nfc().collect());
            }
            Ok(_) => {
                warn!(target: EXTRACTION, page = page_num, "Page did not return text");
                pdf_text.empty_pages.push(*page_num);
            }
            Err(e) => {
                warn!(target: EXTRACTION, page = page_num, "Failed to extract page text: {e}");
                pdf_text.empty_pages.push(*page_num);
            }
        }
    }

    pdf_text
}

/// Loads a questionnaire and returns its full text. A document that cannot
/// be opened yields an empty string so the remaining stages still run.
pub fn extract_text_from_pdf<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    match load_pdf(path) {
        Ok(doc) => get_pdf_text(&doc).joined(),
        Err(e) => {
            error!(target: EXTRACTION, "Error reading {}: {e:#}", path.display());
            String::new()
        }
    }
}
