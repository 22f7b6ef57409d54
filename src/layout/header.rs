//! Header grid and title recovery from the first page.
//!
//! Procedure documents open with a banner and a key/value grid:
//!
//! ```text
//! Integrated Management System
//! Standard Operating Procedure
//! Document No.:
//! CLG-EN-PR-0175
//! Fitness Center Access
//! Effective Date:
//! 06/08/2023 G
//! ```
//!
//! Values sit either inline after the key or on the following line. The
//! title is whatever title-shaped text sits between the document number
//! and the effective date. Every field is optional; a grid that does not
//! look like this yields empty metadata and no title.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{HeaderField, HeaderMetadata, Line};

/// A row label in the header grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridKey {
    Field(HeaderField),
    /// "Page:" rows carry no metadata but bound value scans.
    Page,
}

impl GridKey {
    const ALL: [GridKey; 7] = [
        GridKey::Field(HeaderField::Doc),
        GridKey::Field(HeaderField::Eff),
        GridKey::Field(HeaderField::Rev),
        GridKey::Field(HeaderField::Org),
        GridKey::Field(HeaderField::Appr),
        GridKey::Field(HeaderField::Src),
        GridKey::Page,
    ];

    fn label(self) -> &'static str {
        match self {
            GridKey::Field(field) => field.label(),
            GridKey::Page => "Page",
        }
    }
}

/// Compiled header patterns.
#[derive(Debug, Clone)]
pub struct HeaderPatterns {
    keys: Vec<(GridKey, Regex)>,
    section: Regex,
    doc: Regex,
    date: Regex,
    revision: Regex,
    date_code: Regex,
    org: Regex,
    name: Regex,
    name_tail: Regex,
    title: Regex,
    letter: Regex,
}

impl HeaderPatterns {
    pub fn new() -> Result<Self> {
        let keys = GridKey::ALL
            .iter()
            .map(|key| -> Result<(GridKey, Regex)> {
                let pattern = format!(r"(?i)^{}\s*:\s*(.*)$", regex::escape(key.label()));
                Ok((*key, Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let name = r"[A-Z][a-z]+(?:-[A-Z][a-z]+)?(?:\s+[A-Z]\.?)?\s+[A-Z][A-Za-z'\-]+";

        Ok(Self {
            keys,
            section: Regex::new(r"^\d+(?:\.\d+)*\.?\s+\p{L}")?,
            doc: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/\- ]{0,63}$")?,
            date: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$")?,
            revision: Regex::new(r"^[A-Za-z0-9]{1,3}$")?,
            date_code: Regex::new(r"^(\d{1,2}/\d{1,2}/\d{4})\s*([A-Za-z0-9]{1,3})$")?,
            org: Regex::new(r"^[\p{L}\d][\p{L}\d\s&,.()/'\-]*$")?,
            name: Regex::new(&format!("^{name}$"))?,
            name_tail: Regex::new(&format!(r"^(.+?)\s+({name})$"))?,
            title: Regex::new(r"^[\w\s\-,()/:]+$")?,
            letter: Regex::new(r"\p{L}")?,
        })
    }

    /// Match a key row, returning the key and the inline value after the colon.
    fn key_row<'t>(&self, text: &'t str) -> Option<(GridKey, &'t str)> {
        self.keys.iter().find_map(|(key, re)| {
            re.captures(text).map(|caps| {
                let value = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                (*key, value)
            })
        })
    }

    /// Whether a value is really another key label.
    fn looks_like_key(&self, value: &str) -> bool {
        let value = value.trim();
        value.ends_with(':') || self.key_row(value).is_some()
    }

    /// Field-specific validation.
    fn accepts(&self, field: HeaderField, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.looks_like_key(value) {
            return false;
        }
        match field {
            HeaderField::Doc => self.doc.is_match(value),
            HeaderField::Eff => self.date.is_match(value),
            HeaderField::Rev => self.revision.is_match(value),
            HeaderField::Org => value.chars().count() <= 150 && self.org.is_match(value),
            HeaderField::Appr => self.name.is_match(value),
            HeaderField::Src => value.chars().count() <= 200,
        }
    }

    /// Split a combined "date revision" cell.
    ///
    /// Tries a double-space gap (a wide gap between words, see
    /// [`Line::gapped_text`]), then a date followed by a short code, then
    /// splits the tokens in half.
    fn split_date_revision(&self, value: &str) -> (String, Option<String>) {
        let value = value.trim();

        if let Some(pos) = value.find("  ") {
            let (date, rest) = value.split_at(pos);
            return (date.trim().to_string(), Some(rest.trim().to_string()));
        }

        if let Some(caps) = self.date_code.captures(value) {
            return (caps[1].to_string(), Some(caps[2].to_string()));
        }

        let tokens: Vec<&str> = value.split_whitespace().collect();
        if tokens.len() < 2 {
            return (value.to_string(), None);
        }
        let mid = tokens.len() / 2;
        (tokens[..mid].join(" "), Some(tokens[mid..].join(" ")))
    }

    fn fill_date_revision(&self, meta: &mut HeaderMetadata, value: &str) {
        let (date, revision) = self.split_date_revision(value);
        if self.accepts(HeaderField::Eff, &date) {
            meta.fill(HeaderField::Eff, date);
        }
        if let Some(revision) = revision {
            if self.accepts(HeaderField::Rev, &revision) {
                meta.fill(HeaderField::Rev, revision);
            }
        }
    }

    fn is_title_line(&self, text: &str, config: &LayoutConfig) -> bool {
        let len = text.chars().count();
        len >= config.title_min_len
            && len <= config.title_max_len
            && self.title.is_match(text)
            && self.letter.is_match(text)
            && !config
                .header_banners
                .iter()
                .any(|b| b.trim().eq_ignore_ascii_case(text))
    }
}

/// Result of header parsing.
#[derive(Debug, Clone, Default)]
pub struct HeaderResult {
    pub metadata: HeaderMetadata,
    pub title: Option<String>,
    /// Lower-cased texts of lines that must not reach the body
    pub excluded: HashSet<String>,
}

impl HeaderResult {
    /// Whether a body line was consumed by the header.
    pub fn excludes(&self, text: &str) -> bool {
        self.excluded.contains(&text.trim().to_lowercase())
    }
}

/// First-page lines annotated with their key rows.
struct Grid<'a> {
    patterns: &'a HeaderPatterns,
    texts: Vec<&'a str>,
    keys: Vec<Option<(GridKey, &'a str)>>,
}

impl<'a> Grid<'a> {
    fn new(texts: Vec<&'a str>, patterns: &'a HeaderPatterns) -> Self {
        let keys = texts.iter().map(|&t| patterns.key_row(t)).collect();
        Self {
            patterns,
            texts,
            keys,
        }
    }

    fn is_key_row(&self, index: usize) -> bool {
        self.keys.get(index).is_some_and(Option::is_some)
    }

    fn key_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.texts.len()).filter(|&i| self.is_key_row(i))
    }

    /// Index of the first row labelled `key`.
    fn find(&self, key: GridKey) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| matches!(k, Some((found, _)) if *found == key))
    }

    fn find_field(&self, field: HeaderField) -> Option<usize> {
        self.find(GridKey::Field(field))
    }

    fn next_key_row(&self, after: usize) -> Option<usize> {
        (after + 1..self.texts.len()).find(|&i| self.is_key_row(i))
    }

    /// Value of the key row at `index` and the row it was read from.
    ///
    /// Inline values win. A key-only row takes the next non-blank line
    /// unless that line is another key row or a section heading.
    fn value(&self, index: usize) -> Option<(usize, &'a str)> {
        let (_, inline) = self.keys.get(index).copied().flatten()?;
        if !inline.is_empty() && !self.patterns.looks_like_key(inline) {
            return Some((index, inline));
        }

        let next = (index + 1..self.texts.len()).find(|&i| !self.texts[i].is_empty())?;
        let text = self.texts[next];
        if self.is_key_row(next)
            || self.patterns.looks_like_key(text)
            || self.patterns.section.is_match(text)
        {
            return None;
        }
        Some((next, text))
    }

    fn field_value(&self, field: HeaderField) -> Option<&'a str> {
        self.find_field(field)
            .and_then(|i| self.value(i))
            .map(|(_, v)| v)
    }
}

/// Value text of a grid row with wide word gaps kept as double spaces.
///
/// An inline value is whatever follows the first colon of its key row.
fn gapped_value(line: &Line, inline: bool, min_gap: f32) -> Option<String> {
    let text = line.gapped_text(min_gap);
    let value = if inline {
        text.split_once(':')?.1
    } else {
        text.as_str()
    };
    Some(value.trim().to_string())
}

/// Parse the header grid of the first page.
pub fn parse_header(
    lines: &[Line],
    config: &LayoutConfig,
    patterns: &HeaderPatterns,
) -> HeaderResult {
    let texts: Vec<&str> = lines
        .iter()
        .take(config.header_scan_lines)
        .map(Line::trimmed)
        .collect();
    let grid = Grid::new(texts, patterns);

    let mut metadata = HeaderMetadata::default();
    let mut consumed: BTreeSet<usize> = BTreeSet::new();

    // Key rows and the value rows they absorb never reach the body.
    for key_row in grid.key_rows() {
        consumed.insert(key_row);
        if let Some((row, _)) = grid.value(key_row) {
            consumed.insert(row);
        }
    }

    let mut title = None;
    if let Some(doc_row) = grid.find_field(HeaderField::Doc) {
        let value = grid.value(doc_row);
        if let Some((_, doc)) = value {
            if patterns.accepts(HeaderField::Doc, doc) {
                metadata.fill(HeaderField::Doc, doc);
            }
        }

        let start = value.map(|(row, _)| row).unwrap_or(doc_row);
        let end = grid
            .find_field(HeaderField::Eff)
            .filter(|&eff| eff > start)
            .or_else(|| grid.next_key_row(start))
            .unwrap_or(grid.texts.len());

        let title_rows: Vec<usize> = (start + 1..end)
            .filter(|&i| !grid.is_key_row(i) && patterns.is_title_line(grid.texts[i], config))
            .collect();
        if !title_rows.is_empty() {
            let joined = title_rows
                .iter()
                .map(|&i| grid.texts[i])
                .collect::<Vec<_>>()
                .join(" ");
            consumed.extend(title_rows);
            title = Some(joined);
        }
    }

    if let Some(eff_row) = grid.find_field(HeaderField::Eff) {
        if let Some((row, value)) = grid.value(eff_row) {
            let gapped = gapped_value(&lines[row], row == eff_row, config.column_gap);
            patterns.fill_date_revision(&mut metadata, gapped.as_deref().unwrap_or(value));
        }
    }
    if !metadata.has(HeaderField::Rev) {
        if let Some(value) = grid.field_value(HeaderField::Rev) {
            if patterns.accepts(HeaderField::Rev, value) {
                metadata.fill(HeaderField::Rev, value);
            }
        }
    }

    if let Some(value) = grid.field_value(HeaderField::Org) {
        let split = patterns.name_tail.captures(value).and_then(|caps| {
            let org = caps.get(1)?.as_str().trim();
            let name = caps.get(2)?.as_str();
            patterns
                .accepts(HeaderField::Org, org)
                .then(|| (org.to_string(), name.to_string()))
        });
        match split {
            Some((org, name)) => {
                metadata.fill(HeaderField::Org, org);
                metadata.fill(HeaderField::Appr, name);
            }
            None if patterns.accepts(HeaderField::Org, value) => {
                metadata.fill(HeaderField::Org, value);
            }
            None => {}
        }
    }
    for field in [HeaderField::Appr, HeaderField::Src] {
        if metadata.has(field) {
            continue;
        }
        if let Some(value) = grid.field_value(field) {
            if patterns.accepts(field, value) {
                metadata.fill(field, value);
            }
        }
    }

    // Inline "Key: value" rows anywhere on the page fill what is left.
    for line in lines {
        let Some((GridKey::Field(field), value)) = patterns.key_row(line.trimmed()) else {
            continue;
        };
        if metadata.has(field) || value.is_empty() {
            continue;
        }
        if field == HeaderField::Eff {
            let gapped = gapped_value(line, true, config.column_gap);
            patterns.fill_date_revision(&mut metadata, gapped.as_deref().unwrap_or(value));
        } else if patterns.accepts(field, value) {
            metadata.fill(field, value);
        }
    }

    let mut excluded: HashSet<String> = consumed
        .iter()
        .map(|&i| grid.texts[i].to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    excluded.extend(
        config
            .header_banners
            .iter()
            .map(|b| b.trim().to_lowercase()),
    );

    log::debug!(
        "Header: title={:?}, {} fields, {} excluded lines",
        title,
        HeaderField::ALL.iter().filter(|f| metadata.has(**f)).count(),
        excluded.len()
    );

    HeaderResult {
        metadata,
        title,
        excluded,
    }
}
