//! # sopdown
//!
//! Layout reconstruction and Markdown synthesis for procedure-style PDFs.
//!
//! Words and their positions are pulled from each page, regrouped into
//! lines, stripped of running headers and legal banners, and then split
//! into a metadata header, a title, numbered headings, paragraphs and
//! process-step tables. The result renders as one normalized Markdown
//! document (or as JSON).
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> sopdown::Result<()> {
//!     let markdown = sopdown::to_markdown("procedure.pdf")?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! For repeated conversions build an [`Engine`] once and reuse it:
//!
//! ```no_run
//! use sopdown::{Engine, Input, LayoutConfig, RenderOptions};
//!
//! let engine = Engine::new(LayoutConfig::default().with_process_section("5"))?
//!     .with_render_options(RenderOptions::new().with_frontmatter(true));
//! let doc = engine.analyze(Input::Path("procedure.pdf".into()), None)?;
//! println!("{:?} {:?}", doc.title, doc.metadata.rev);
//! # Ok::<(), sopdown::Error>(())
//! ```

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use config::LayoutConfig;
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfVersion};
pub use engine::{Engine, Input};
pub use error::{Error, Result};
pub use layout::LayoutRules;
pub use model::{
    Block, Document, HeaderField, HeaderMetadata, Line, Page, PageWords, Table, TableRow, Word,
};
pub use parser::{ErrorMode, ParseOptions, PdfParser, WordSource};
pub use render::{JsonFormat, RenderOptions};

use std::io::Read;
use std::path::Path;

/// Convert a PDF file to Markdown with the default configuration.
///
/// The file stem serves as the fallback title.
///
/// # Example
///
/// ```no_run
/// let markdown = sopdown::to_markdown("procedure.pdf").unwrap();
/// std::fs::write("procedure.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let input = Input::Path(path.as_ref().to_path_buf());
    let name = input.file_stem().map(str::to_string);
    Engine::new(LayoutConfig::default())?.convert(input, name.as_deref())
}

/// Convert PDF bytes to Markdown with the default configuration.
pub fn to_markdown_bytes(data: &[u8], logical_name: Option<&str>) -> Result<String> {
    Engine::new(LayoutConfig::default())?.convert(Input::from(data), logical_name)
}

/// Convert a PDF stream to Markdown with the default configuration.
pub fn to_markdown_reader<R: Read + Send + 'static>(
    reader: R,
    logical_name: Option<&str>,
) -> Result<String> {
    Engine::new(LayoutConfig::default())?.convert(Input::reader(reader), logical_name)
}

/// Parse a PDF file into a structured document.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let input = Input::Path(path.as_ref().to_path_buf());
    let name = input.file_stem().map(str::to_string);
    Engine::new(LayoutConfig::default())?.analyze(input, name.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_markdown_bytes_empty_data() {
        assert!(matches!(to_markdown_bytes(&[], None), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_to_markdown_bytes_unknown_magic() {
        let data = b"<!DOCTYPE html><html></html>";
        assert!(matches!(to_markdown_bytes(data, None), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_to_markdown_bytes_bad_version() {
        let data = b"%PDF-9.9\n%test";
        assert!(matches!(
            to_markdown_bytes(data, None),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_to_markdown_reader_truncated() {
        let data = std::io::Cursor::new(b"%PDF-1.7\n".to_vec());
        assert!(to_markdown_reader(data, Some("x")).is_err());
    }

    #[test]
    fn test_to_markdown_missing_file() {
        assert!(matches!(
            to_markdown("/nonexistent/procedure.pdf"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\ntest"));
        assert!(!is_pdf_bytes(b"Not a PDF file"));
        assert!(!is_pdf_bytes(b""));
    }
}
