//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use crate::detect::PdfVersion;
use crate::error::{Error, Result};
use crate::model::PageWords;

use super::backend::{LopdfBackend, PdfBackend, WordSource};
use super::options::{ErrorMode, ParseOptions};
use super::words::WordExtractor;

/// PDF document parser producing per-page word boxes.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_file(path)?;
        Ok(Self { backend, options })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self { backend, options })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_reader(reader)?;
        Ok(Self { backend, options })
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Get PDF version.
    pub fn version(&self) -> PdfVersion {
        self.backend.version()
    }

    /// Extract the words of a single page.
    pub fn extract_page(&self, page_num: u32) -> Result<PageWords> {
        WordExtractor::new(&self.backend, &self.options).extract_page(page_num)
    }

    /// Extract every page, honoring the error mode.
    pub fn extract_pages(&self) -> Result<Vec<PageWords>> {
        collect_pages(self, self.options.error_mode)
    }
}

impl WordSource for PdfParser {
    fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    fn page_words(&self, page: u32) -> Result<PageWords> {
        self.extract_page(page)
    }
}

/// Pull every page from a word source.
///
/// In lenient mode a failing page is logged and skipped; in strict mode the
/// first failure is returned. A document whose every page fails is an
/// extraction failure in either mode.
pub fn collect_pages<S: WordSource + ?Sized>(source: &S, mode: ErrorMode) -> Result<Vec<PageWords>> {
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total as usize);

    for page_num in 1..=total {
        match source.page_words(page_num) {
            Ok(page) => pages.push(page),
            Err(e) if mode == ErrorMode::Lenient => {
                log::warn!("Skipping page {} of {}: {}", page_num, total, e);
            }
            Err(e) => return Err(e),
        }
    }

    if total > 0 && pages.is_empty() {
        return Err(Error::TextExtract(format!(
            "no page of {} could be extracted",
            total
        )));
    }

    Ok(pages)
}
