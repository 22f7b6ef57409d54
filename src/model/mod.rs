//! Document model types.
//!
//! Geometry types carry extractor output through line building; document
//! types carry the classified blocks to the renderers.

mod document;
mod geometry;
mod metadata;
mod table;

pub use document::{Block, Document};
pub use geometry::{Line, Page, PageWords, Word};
pub use metadata::{HeaderField, HeaderMetadata};
pub use table::{Table, TableRow};
