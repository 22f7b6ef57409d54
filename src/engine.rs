//! Conversion engine: word extraction, layout reconstruction and rendering.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::layout::LayoutRules;
use crate::model::Document;
use crate::parser::{collect_pages, ParseOptions, PdfParser, WordSource};
use crate::render::{self, JsonFormat, RenderOptions};

/// Where a PDF comes from.
pub enum Input {
    /// A file on disk
    Path(PathBuf),
    /// An in-memory buffer
    Bytes(Vec<u8>),
    /// Any byte stream; read to the end before parsing
    Reader(Box<dyn Read + Send>),
}

impl Input {
    /// Wrap a reader.
    pub fn reader<R: Read + Send + 'static>(reader: R) -> Self {
        Input::Reader(Box::new(reader))
    }

    /// File stem of a path input, used as the default logical name.
    pub fn file_stem(&self) -> Option<&str> {
        match self {
            Input::Path(path) => path.file_stem().and_then(|s| s.to_str()),
            _ => None,
        }
    }

    fn open(self, options: ParseOptions) -> Result<PdfParser> {
        match self {
            Input::Path(path) => PdfParser::open_with_options(path, options),
            Input::Bytes(data) => PdfParser::from_bytes_with_options(&data, options),
            Input::Reader(reader) => PdfParser::from_reader_with_options(reader, options),
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Input::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Input::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Input::Path(path)
    }
}

impl From<&Path> for Input {
    fn from(path: &Path) -> Self {
        Input::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for Input {
    fn from(data: Vec<u8>) -> Self {
        Input::Bytes(data)
    }
}

impl From<&[u8]> for Input {
    fn from(data: &[u8]) -> Self {
        Input::Bytes(data.to_vec())
    }
}

/// Converts procedure PDFs to Markdown.
///
/// Holds only compiled, immutable rules and options, so one engine can be
/// shared across threads and reused for any number of documents.
///
/// # Example
///
/// ```no_run
/// use sopdown::{Engine, Input, LayoutConfig};
///
/// let engine = Engine::new(LayoutConfig::default())?;
/// let markdown = engine.convert(Input::Path("procedure.pdf".into()), Some("procedure"))?;
/// println!("{}", markdown);
/// # Ok::<(), sopdown::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    rules: LayoutRules,
    parse: ParseOptions,
    render: RenderOptions,
}

impl Engine {
    /// Compile a layout configuration into an engine.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Ok(Self {
            rules: LayoutRules::compile(config)?,
            parse: ParseOptions::default(),
            render: RenderOptions::default(),
        })
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    pub fn rules(&self) -> &LayoutRules {
        &self.rules
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    /// Reconstruct a document from any word source.
    pub fn analyze_source<S: WordSource + ?Sized>(
        &self,
        source: &S,
        logical_name: Option<&str>,
    ) -> Result<Document> {
        let pages = collect_pages(source, self.parse.error_mode)?;
        Ok(self.rules.analyze(&pages, logical_name))
    }

    /// Parse a PDF and reconstruct its document structure.
    pub fn analyze(&self, input: Input, logical_name: Option<&str>) -> Result<Document> {
        log::debug!("Analyzing {:?}", input);
        let parser = input.open(self.parse.clone())?;
        self.analyze_source(&parser, logical_name)
    }

    /// Convert a PDF to Markdown.
    pub fn convert(&self, input: Input, logical_name: Option<&str>) -> Result<String> {
        let doc = self.analyze(input, logical_name)?;
        render::to_markdown(&doc, &self.render)
    }

    /// Convert a PDF to JSON.
    pub fn convert_json(
        &self,
        input: Input,
        logical_name: Option<&str>,
        format: JsonFormat,
    ) -> Result<String> {
        let doc = self.analyze(input, logical_name)?;
        render::to_json(&doc, format)
    }

    /// Convert many files in parallel, using each file stem as its logical name.
    ///
    /// Results keep the order of `paths`; one failure does not stop the others.
    pub fn convert_batch<P>(&self, paths: &[P]) -> Vec<(PathBuf, Result<String>)>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref().to_path_buf();
                let input = Input::Path(path.clone());
                let name = input.file_stem().map(str::to_string);
                let result = self.convert(input, name.as_deref());
                if let Err(e) = &result {
                    log::warn!("Failed to convert {}: {}", path.display(), e);
                }
                (path, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{PageWords, Word};
    use crate::parser::ErrorMode;

    fn line_words(y: f32, text: &str) -> Vec<Word> {
        let mut left = 72.0;
        text.split_whitespace()
            .map(|token| {
                let right = left + token.len() as f32 * 5.0;
                let word = Word::new(token, left, right, y);
                left = right + 3.0;
                word
            })
            .collect()
    }

    fn pages() -> Vec<PageWords> {
        let mut words = line_words(750.0, "1.0 Purpose");
        words.extend(line_words(736.0, "Keep the gym safe."));
        vec![PageWords::new(1, 792.0, words)]
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_analyze_source() {
        let engine = Engine::new(LayoutConfig::default()).unwrap();
        let doc = engine.analyze_source(&pages(), Some("gym")).unwrap();
        assert_eq!(doc.display_title(), Some("gym"));
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = LayoutConfig::default().with_noise_pattern("(unclosed");
        assert!(matches!(Engine::new(config), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn test_convert_rejects_non_pdf() {
        let engine = Engine::new(LayoutConfig::default()).unwrap();
        let result = engine.convert(Input::from(&b"hello world"[..]), None);
        assert!(matches!(result, Err(Error::UnknownFormat)));

        let result = engine.convert(Input::reader(std::io::Cursor::new(Vec::new())), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_builders() {
        let engine = Engine::new(LayoutConfig::default())
            .unwrap()
            .with_parse_options(ParseOptions::new().strict())
            .with_render_options(RenderOptions::new().with_frontmatter(true));
        assert_eq!(engine.parse_options().error_mode, ErrorMode::Strict);
        assert!(engine.render_options().include_frontmatter);
    }

    #[test]
    fn test_input_file_stem() {
        let input = Input::from(PathBuf::from("/tmp/CLG-EN-PR-0175.pdf"));
        assert_eq!(input.file_stem(), Some("CLG-EN-PR-0175"));
        assert_eq!(Input::from(vec![1, 2, 3]).file_stem(), None);
        assert_eq!(format!("{:?}", Input::from(vec![1, 2, 3])), "Bytes(3 bytes)");
    }

    #[test]
    fn test_convert_batch_reports_each_file() {
        let engine = Engine::new(LayoutConfig::default()).unwrap();
        let paths = vec![
            PathBuf::from("/nonexistent/a.pdf"),
            PathBuf::from("/nonexistent/b.pdf"),
        ];
        let results = engine.convert_batch(&paths);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, paths[0]);
        assert!(results.iter().all(|(_, r)| r.is_err()));
    }
}
