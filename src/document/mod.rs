//! Document model and loading
//!
//! A [`Document`] is the extracted text of one loaded PDF, one [`Page`] per
//! PDF page in page order. Rasterizing pages to images is the job of the UI
//! layer; this crate only carries the text.

pub mod pdf;

pub use pdf::PdfLoader;

use crate::LoadError;
use serde::Serialize;

/// One page of extracted text
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-based page number
    pub index: u32,

    /// Raw extracted text, exactly as the loader produced it
    pub text: String,
}

/// Extracted text of a loaded document
///
/// Produced once per load and replaced wholesale on the next load; there is
/// no incremental update.
#[derive(Debug, Default, Serialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page texts in page order, for segmentation
    pub fn page_texts(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Turns raw file bytes into a [`Document`]
///
/// Implementations must keep the page sequence in page-number order
/// regardless of how extraction is scheduled internally.
pub trait DocumentLoader {
    fn load(&self, bytes: &[u8]) -> std::result::Result<Document, LoadError>;
}
