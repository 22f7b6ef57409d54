//! Word extraction from PDF content streams.
//!
//! Interprets the text operators of a page (`BT`/`ET`, `Tf`, `Tc`, `Tw`,
//! `Tz`, `TL`, `Td`, `TD`, `Tm`, `T*`, `Tj`, `TJ`, `'`, `"`) and turns shown
//! glyphs into word boxes. Positions pass through the current transformation
//! matrix (`q`/`Q`/`cm`), and Form XObjects drawn with `Do` are interpreted
//! in place. Glyph advances come from the font's `/Widths` when present;
//! words break on whitespace and on horizontal gaps.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use super::backend::{
    get_number_from_value, BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue, WordSource,
};
use super::options::ParseOptions;
use crate::error::{Error, Result};
use crate::model::{PageWords, Word};

/// Glyph width used when a font has no usable `/Widths` entry.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Gap, in ems, that separates two words. Matches a TJ adjustment of 200.
const WORD_GAP_EM: f32 = 0.2;

/// Overlap, in ems, tolerated before a glyph is treated as a new word.
const WORD_OVERLAP_EM: f32 = 0.5;

/// Fraction of the font size from the baseline to the vertical center.
const CENTER_RISE: f32 = 0.3;

/// Form XObjects drawn inside forms, counted from the page.
const MAX_FORM_DEPTH: usize = 8;

const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Extracts word boxes from the pages of a backend.
pub struct WordExtractor<'a, B: PdfBackend> {
    backend: &'a B,
    options: &'a ParseOptions,
}

impl<'a, B: PdfBackend> WordExtractor<'a, B> {
    pub fn new(backend: &'a B, options: &'a ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Extract the words of a 1-indexed page.
    pub fn extract_page(&self, page_num: u32) -> Result<PageWords> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let (_, height) = self.backend.page_size(page_id);
        let fonts = self.font_map(page_id)?;

        let content = self.backend.page_content(page_id)?;
        let ops = self
            .backend
            .decode_content(&content)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", page_num, e)))?;

        let mut graphics = Graphics::default();
        let mut builder = WordBuilder::new(self.options.normalize_unicode);
        self.interpret(page_id, &ops, &fonts, &mut graphics, &mut builder, 0);
        builder.finish();

        log::debug!("Page {}: {} words", page_num, builder.words.len());
        Ok(PageWords::new(page_num, height, builder.words))
    }

    fn font_map(&self, scope: PageId) -> Result<HashMap<Vec<u8>, BackendFontInfo>> {
        Ok(self
            .backend
            .fonts(scope)?
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect())
    }

    fn interpret(
        &self,
        scope: PageId,
        ops: &[ContentOp],
        fonts: &HashMap<Vec<u8>, BackendFontInfo>,
        graphics: &mut Graphics,
        builder: &mut WordBuilder,
        depth: usize,
    ) {
        let mut saved: Vec<Graphics> = Vec::new();

        for op in ops {
            let state = &mut graphics.text;
            match op.operator.as_str() {
                "q" => saved.push(graphics.clone()),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        *graphics = previous;
                    }
                }
                "cm" if op.operands.len() >= 6 => {
                    let n = |i: usize| op.number(i).unwrap_or(0.0);
                    let m = TextMatrix::new(n(0), n(1), n(2), n(3), n(4), n(5));
                    graphics.ctm = m.then(&graphics.ctm);
                }
                "Do" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        builder.finish();
                        self.draw_form(scope, name, fonts, graphics, builder, depth);
                    }
                }
                "BT" => {
                    graphics.in_text = true;
                    state.matrix = TextMatrix::default();
                    state.line = TextMatrix::default();
                }
                "ET" => {
                    graphics.in_text = false;
                    builder.finish();
                }
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        state.font = name.clone();
                    }
                    state.size = op.number(1).unwrap_or(12.0);
                }
                "Tc" => state.char_spacing = op.number(0).unwrap_or(0.0),
                "Tw" => state.word_spacing = op.number(0).unwrap_or(0.0),
                "Tz" => state.h_scale = op.number(0).unwrap_or(100.0) / 100.0,
                "TL" => state.leading = op.number(0).unwrap_or(0.0),
                "Td" | "TD" => {
                    let tx = op.number(0).unwrap_or(0.0);
                    let ty = op.number(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                "Tm" => {
                    let n = |i: usize, default: f32| op.number(i).unwrap_or(default);
                    state.line.set(
                        n(0, 1.0),
                        n(1, 0.0),
                        n(2, 0.0),
                        n(3, 1.0),
                        n(4, 0.0),
                        n(5, 0.0),
                    );
                    state.matrix = state.line.clone();
                }
                "T*" => state.next_line(),
                "Tj" if graphics.in_text => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        self.show(scope, bytes, fonts, &graphics.ctm, &mut graphics.text, builder);
                    }
                }
                "TJ" if graphics.in_text => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                PdfValue::Str(bytes) => self.show(
                                    scope,
                                    bytes,
                                    fonts,
                                    &graphics.ctm,
                                    &mut graphics.text,
                                    builder,
                                ),
                                PdfValue::Integer(_) | PdfValue::Real(_) => {
                                    // Positive values move left, negative values move right
                                    let state = &mut graphics.text;
                                    let adjust = get_number_from_value(item).unwrap_or(0.0);
                                    let tx = -adjust / 1000.0 * state.size * state.h_scale;
                                    state.matrix.advance(tx);
                                }
                                _ => {}
                            }
                        }
                    }
                }
                "'" | "\"" => {
                    if op.operator == "\"" {
                        state.word_spacing = op.number(0).unwrap_or(state.word_spacing);
                        state.char_spacing = op.number(1).unwrap_or(state.char_spacing);
                    }
                    state.next_line();
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if graphics.in_text {
                        if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                            self.show(scope, bytes, fonts, &graphics.ctm, &mut graphics.text, builder);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Interpret a Form XObject in its own graphics state.
    fn draw_form(
        &self,
        scope: PageId,
        name: &[u8],
        fonts: &HashMap<Vec<u8>, BackendFontInfo>,
        graphics: &mut Graphics,
        builder: &mut WordBuilder,
        depth: usize,
    ) {
        let label = String::from_utf8_lossy(name);
        if depth >= MAX_FORM_DEPTH {
            log::warn!("Form /{} nested deeper than {}; skipped", label, MAX_FORM_DEPTH);
            return;
        }
        let Some(form) = self.backend.form_xobject(scope, name) else {
            return;
        };

        let own_fonts;
        let fonts = if form.scope == scope {
            fonts
        } else {
            match self.font_map(form.scope) {
                Ok(map) => {
                    own_fonts = map;
                    &own_fonts
                }
                Err(e) => {
                    log::warn!("Form /{}: {}", label, e);
                    return;
                }
            }
        };
        let ops = match self.backend.decode_content(&form.content) {
            Ok(ops) => ops,
            Err(e) => {
                log::warn!("Form /{}: {}", label, e);
                return;
            }
        };

        let [a, b, c, d, e, f] = form.matrix;
        let mut inner = Graphics {
            ctm: TextMatrix::new(a, b, c, d, e, f).then(&graphics.ctm),
            ..graphics.clone()
        };
        self.interpret(form.scope, &ops, fonts, &mut inner, builder, depth + 1);
        builder.finish();
    }

    /// Emit the glyphs of one shown string and advance the text matrix.
    fn show(
        &self,
        scope: PageId,
        bytes: &[u8],
        fonts: &HashMap<Vec<u8>, BackendFontInfo>,
        ctm: &TextMatrix,
        state: &mut TextState,
        builder: &mut WordBuilder,
    ) {
        let font = fonts.get(&state.font);
        let composite = font.is_some_and(|f| f.composite);

        let codes: Vec<u32> = if composite {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
                .collect()
        } else {
            bytes.iter().map(|&b| b as u32).collect()
        };

        let advances: Vec<f32> = codes
            .iter()
            .map(|&code| {
                let width = font
                    .and_then(|f| f.glyph_width(code))
                    .unwrap_or(DEFAULT_GLYPH_WIDTH);
                let mut tx = width / 1000.0 * state.size + state.char_spacing;
                if !composite && code == 32 {
                    tx += state.word_spacing;
                }
                tx * state.h_scale
            })
            .collect();

        let text = self.backend.decode_text(scope, &state.font, bytes);
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            state.matrix.advance(advances.iter().sum());
            return;
        }

        // Encodings that do not map one code to one char share the width evenly
        let one_to_one = advances.len() == chars.len();
        let even = advances.iter().sum::<f32>() / chars.len() as f32;
        let size = state.size * state.matrix.then(ctm).scale();

        for (i, ch) in chars.into_iter().enumerate() {
            let advance = if one_to_one { advances[i] } else { even };
            let (left, baseline) = ctm.transform(state.matrix.position());
            state.matrix.advance(advance);
            let (right, _) = ctm.transform(state.matrix.position());
            builder.glyph(ch, left.min(right), left.max(right), baseline + size * CENTER_RISE, size);
        }
    }
}

impl<B: PdfBackend> WordSource for WordExtractor<'_, B> {
    fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    fn page_words(&self, page: u32) -> Result<PageWords> {
        self.extract_page(page)
    }
}

/// Graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone, Default)]
struct Graphics {
    /// User space to page space
    ctm: TextMatrix,
    text: TextState,
    in_text: bool,
}

/// Text state carried between operators.
#[derive(Debug, Clone)]
struct TextState {
    matrix: TextMatrix,
    line: TextMatrix,
    font: Vec<u8>,
    size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            line: TextMatrix::default(),
            font: Vec::new(),
            size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line.translate(tx, ty);
        self.matrix = self.line.clone();
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    /// Move along the baseline by `tx` text-space units.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Product `self × next`: apply `self`, then `next`.
    fn then(&self, next: &TextMatrix) -> TextMatrix {
        TextMatrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    fn transform(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (x * self.a + y * self.c + self.e, x * self.b + y * self.d + self.f)
    }

    /// Vertical scale factor
    fn scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// A word being assembled from glyphs.
#[derive(Debug)]
struct PendingWord {
    text: String,
    left: f32,
    right: f32,
    y: f32,
}

/// Groups glyphs into words.
#[derive(Debug)]
struct WordBuilder {
    normalize: bool,
    current: Option<PendingWord>,
    words: Vec<Word>,
}

impl WordBuilder {
    fn new(normalize: bool) -> Self {
        Self {
            normalize,
            current: None,
            words: Vec::new(),
        }
    }

    fn glyph(&mut self, ch: char, left: f32, right: f32, y: f32, size: f32) {
        if ch.is_whitespace() || ch.is_control() {
            self.finish();
            return;
        }

        if let Some(pending) = self.current.as_mut() {
            let gap = left - pending.right;
            let same_line = (pending.y - y).abs() < size * WORD_GAP_EM;
            if same_line && gap < size * WORD_GAP_EM && gap > -size * WORD_OVERLAP_EM {
                pending.text.push(ch);
                pending.right = pending.right.max(right);
                return;
            }
            self.finish();
        }

        self.current = Some(PendingWord {
            text: ch.to_string(),
            left,
            right,
            y,
        });
    }

    fn finish(&mut self) {
        let Some(pending) = self.current.take() else {
            return;
        };
        let text = if self.normalize {
            normalize_text(&pending.text)
        } else {
            pending.text
        };
        if !text.trim().is_empty() {
            self.words
                .push(Word::new(text, pending.left, pending.right, pending.y));
        }
    }
}

/// NFC normalization plus ligature expansion.
pub fn normalize_text(text: &str) -> String {
    let mut result: String = text.nfc().collect();
    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }
    result
}
