//! PDF loader backed by lopdf
//!
//! Pure Rust extraction: no external PDF toolkit is spawned. Text quality
//! is whatever the document's font encodings allow.

use super::{Document, DocumentLoader, Page};
use crate::LoadError;
use log::{debug, info};
use rayon::prelude::*;

/// How far into the file to look for the `%PDF-` header.
///
/// PDF allows junk before the header; real-world files put it within the
/// first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Check for the PDF header near the start of the buffer
fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Loads PDFs with lopdf and extracts one text string per page
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, bytes: &[u8]) -> std::result::Result<Document, LoadError> {
        if !has_pdf_header(bytes) {
            return Err(LoadError::NotAPdf);
        }

        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| LoadError::CorruptDocument(e.to_string()))?;

        // get_pages returns a BTreeMap, so the numbers come out sorted
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        debug!("Extracting text from {} pages", page_numbers.len());

        // Pages extract on the rayon pool; collect keeps the results in
        // page-number order, not completion order.
        let pages = page_numbers
            .par_iter()
            .map(|&number| {
                let text = doc
                    .extract_text(&[number])
                    .map_err(|_| LoadError::RenderFailure(number))?;
                Ok(Page {
                    index: number,
                    text,
                })
            })
            .collect::<std::result::Result<Vec<_>, LoadError>>()?;

        info!("Loaded PDF with {} pages", pages.len());
        Ok(Document { pages })
    }
}
