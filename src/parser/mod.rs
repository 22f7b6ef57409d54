//! PDF parsing module.

mod backend;
mod options;
mod pdf_parser;
mod words;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, FormXObject, LopdfBackend, PageId, PdfBackend,
    PdfValue, WordSource,
};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::{collect_pages, PdfParser};
pub use words::{normalize_text, WordExtractor};
