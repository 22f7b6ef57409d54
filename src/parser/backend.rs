//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from word extraction.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::detect::{sniff_bytes, sniff_path, PdfVersion};
use crate::error::{Error, Result};
use crate::model::PageWords;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Default page size (US Letter) when a page has no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Font information returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// First character code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in thousandths of text space.
    pub widths: Vec<f32>,
    /// Two-byte (Type0) font
    pub composite: bool,
}

impl BackendFontInfo {
    /// Width of a character code in thousandths of text space.
    pub fn glyph_width(&self, code: u32) -> Option<f32> {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
    }
}

/// A Form XObject drawn by the `Do` operator.
#[derive(Debug, Clone, PartialEq)]
pub struct FormXObject {
    /// Scope whose resources the form content uses: the form itself, or the
    /// caller's scope when the form carries no `/Resources`.
    pub scope: PageId,
    /// Form space to the space of the drawing stream (`/Matrix`).
    pub matrix: [f32; 6],
    /// Decompressed content stream.
    pub content: Vec<u8>,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(get_number_from_value)
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font info, content stream
/// decoding, and text decoding without exposing any concrete PDF library types.
///
/// Resource lookups take a scope: a page id, or the object id of a Form
/// XObject returned by [`PdfBackend::form_xobject`].
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page width and height in points.
    fn page_size(&self, page: PageId) -> (f32, f32);

    /// Return font info for a page or form scope.
    fn fonts(&self, scope: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding in the given scope.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, scope: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Resolve a Form XObject named in the resources of `scope`.
    /// Images and other XObject kinds yield `None`.
    fn form_xobject(&self, scope: PageId, name: &[u8]) -> Option<FormXObject>;
}

/// A provider of per-page word boxes.
///
/// This is the whole contract between the layout engine and text
/// extraction: each page yields words with text, left and right edges and
/// a vertical center.
pub trait WordSource {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Words of a 1-indexed page.
    fn page_words(&self, page: u32) -> Result<PageWords>;
}

/// Already-extracted pages.
impl WordSource for [PageWords] {
    fn page_count(&self) -> u32 {
        self.len() as u32
    }

    fn page_words(&self, page: u32) -> Result<PageWords> {
        page.checked_sub(1)
            .and_then(|i| self.get(i as usize))
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.len() as u32))
    }
}

impl WordSource for Vec<PageWords> {
    fn page_count(&self) -> u32 {
        self.as_slice().page_count()
    }

    fn page_words(&self, page: u32) -> Result<PageWords> {
        self.as_slice().page_words(page)
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    version: PdfVersion,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let version = sniff_path(path)?;
        let doc = LopdfDocument::load(path).map_err(load_error)?;
        Self::checked(doc, version)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let version = sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(load_error)?;
        Self::checked(doc, version)
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    fn checked(doc: LopdfDocument, version: PdfVersion) -> Result<Self> {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; extracted text may be unreadable");
        }
        Ok(Self { doc, version })
    }

    /// PDF version from the file header.
    pub fn version(&self) -> PdfVersion {
        self.version
    }

    /// Resolve a reference to the object it points at.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Resource dictionaries of a page (inline and inherited) or of a form.
    fn resource_dicts(&self, scope: PageId) -> Vec<&Dictionary> {
        match self.doc.get_object(scope) {
            Ok(Object::Stream(form)) => form
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_dict().ok())
                .into_iter()
                .collect(),
            _ => match self.doc.get_page_resources(scope) {
                Ok((inline, ids)) => inline
                    .into_iter()
                    .chain(ids.into_iter().filter_map(|id| self.doc.get_dictionary(id).ok()))
                    .collect(),
                Err(_) => Vec::new(),
            },
        }
    }

    /// Font dictionaries by resource name.
    fn font_dicts(&self, scope: PageId) -> Result<BTreeMap<Vec<u8>, &Dictionary>> {
        if !matches!(self.doc.get_object(scope), Ok(Object::Stream(_))) {
            return self
                .doc
                .get_page_fonts(scope)
                .map_err(|e| Error::PdfParse(e.to_string()));
        }

        let mut fonts = BTreeMap::new();
        for resources in self.resource_dicts(scope) {
            let Some(dict) = resources
                .get(b"Font")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_dict().ok())
            else {
                continue;
            };
            for (name, font) in dict.iter() {
                if let Some(font) = self.resolve(font).and_then(|o| o.as_dict().ok()) {
                    fonts.entry(name.clone()).or_insert(font);
                }
            }
        }
        Ok(fonts)
    }

    fn font_info(&self, name: &[u8], font: &Dictionary) -> BackendFontInfo {
        let name_of = |key: &[u8]| {
            font.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
        };

        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| self.resolve(w).and_then(get_number).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(get_number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);

        BackendFontInfo {
            name: name.to_vec(),
            base_font: name_of(b"BaseFont").unwrap_or_else(|| "Unknown".to_string()),
            first_char,
            widths,
            composite: name_of(b"Subtype").as_deref() == Some("Type0"),
        }
    }
}

fn load_error(e: lopdf::Error) -> Error {
    match e {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        _ => Error::from(e),
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> (f32, f32) {
        let media_box = self
            .doc
            .get_dictionary(page)
            .ok()
            .and_then(|d| d.get(b"MediaBox").ok())
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .filter(|arr| arr.len() >= 4)
            .map(|arr| {
                let n = |i: usize| get_number(&arr[i]).unwrap_or(0.0);
                ((n(2) - n(0)).abs(), (n(3) - n(1)).abs())
            });
        match media_box {
            Some((w, h)) if w > 0.0 && h > 0.0 => (w, h),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    fn fonts(&self, scope: PageId) -> Result<Vec<BackendFontInfo>> {
        Ok(self
            .font_dicts(scope)?
            .iter()
            .map(|(name, font_dict)| self.font_info(name, font_dict))
            .collect())
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => {
                    Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone()))
                }
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, scope: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.font_dicts(scope) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn form_xobject(&self, scope: PageId, name: &[u8]) -> Option<FormXObject> {
        let id = self.resource_dicts(scope).into_iter().find_map(|resources| {
            resources
                .get(b"XObject")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_dict().ok())
                .and_then(|xobjects| xobjects.get(name).ok())
                .and_then(|o| o.as_reference().ok())
        })?;
        let stream = self.doc.get_object(id).ok()?.as_stream().ok()?;
        if stream.dict.get(b"Subtype").and_then(|o| o.as_name()).ok() != Some(b"Form".as_slice()) {
            return None;
        }

        let mut matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        if let Some(values) = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .filter(|arr| arr.len() == 6)
        {
            for (slot, value) in matrix.iter_mut().zip(values) {
                *slot = get_number(value).unwrap_or(*slot);
            }
        }

        Some(FormXObject {
            scope: if stream.dict.has(b"Resources") { id } else { scope },
            matrix,
            content: stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
        })
    }
}

impl LopdfBackend {
    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
        content
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}
