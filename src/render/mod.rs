//! Rendering of reconstructed documents to Markdown and JSON.

mod json;
mod markdown;
mod options;

pub use json::{to_json, JsonFormat};
pub use markdown::{escape_markdown, to_markdown, MarkdownRenderer};
pub use options::{RenderOptions, DEFAULT_FALLBACK_TITLE};
