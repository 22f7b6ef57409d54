//! Block segmentation of the cleaned line stream.
//!
//! A small state machine walks the lines in reading order. Headings flush
//! the paragraph buffer and select the state; inside the process section a
//! table header hands control to the [`TableExtractor`]; everything else is
//! paragraph text. The buffer survives page boundaries.

use regex::Regex;

use super::table::TableExtractor;
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{Block, Line};

/// Segmenter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentState {
    /// Ordinary body text
    #[default]
    Default,
    /// After a heading in the process section; table headers are live
    InProcessSection,
}

/// A recognized numbered heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    /// Top-level number token, e.g. "6" for "6.1.2"
    pub section: String,
}

/// Compiled line classification rules.
#[derive(Debug, Clone)]
pub struct SegmentRules {
    heading: Regex,
    list_start: Regex,
    process_section: String,
}

impl SegmentRules {
    pub fn new(config: &LayoutConfig) -> Result<Self> {
        Ok(Self {
            heading: Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+\p{L}")?,
            list_start: Regex::new(r"^(\d+(\.\d+)*\b|[A-Za-z]\.|[A-Za-z]\)|[-•])")?,
            process_section: config.process_section.trim().to_string(),
        })
    }

    /// Classify a numbered heading.
    ///
    /// The level is two plus the number of dots, ignoring trailing `.0`
    /// segments, capped at 6.
    pub fn heading(&self, text: &str) -> Option<Heading> {
        let caps = self.heading.captures(text)?;
        let mut segments: Vec<&str> = caps.get(1)?.as_str().split('.').collect();
        while segments.len() > 1 && segments.last().is_some_and(|s| s.bytes().all(|b| b == b'0')) {
            segments.pop();
        }
        let level = (segments.len() + 1).min(6) as u8;
        Some(Heading {
            level,
            section: segments[0].to_string(),
        })
    }

    fn state_after(&self, heading: &Heading) -> SegmentState {
        if heading.section == self.process_section {
            SegmentState::InProcessSection
        } else {
            SegmentState::Default
        }
    }

    /// Whether `next` continues the paragraph ending with `current`.
    pub fn merges(&self, current: &str, next: &str) -> bool {
        if self.list_start.is_match(next) {
            return false;
        }
        if current.ends_with(['.', '!', '?', ':', ';']) {
            return false;
        }
        next.chars().next().is_some_and(char::is_lowercase)
    }
}

/// Walks lines and emits blocks.
pub struct Segmenter<'a> {
    rules: &'a SegmentRules,
    tables: &'a TableExtractor,
    state: SegmentState,
    buffer: String,
    blocks: Vec<Block>,
}

impl<'a> Segmenter<'a> {
    pub fn new(rules: &'a SegmentRules, tables: &'a TableExtractor) -> Self {
        Self {
            rules,
            tables,
            state: SegmentState::Default,
            buffer: String::new(),
            blocks: Vec::new(),
        }
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Segment a whole line stream.
    pub fn run(mut self, lines: &[Line]) -> Vec<Block> {
        let mut index = 0;
        while index < lines.len() {
            index += self.step(lines, index);
        }
        self.flush();
        self.blocks
    }

    /// Process the line at `index`; returns the number of lines consumed.
    fn step(&mut self, lines: &[Line], index: usize) -> usize {
        let line = &lines[index];
        let text = line.trimmed();

        if let Some(heading) = self.rules.heading(text) {
            self.flush();
            self.blocks.push(Block::heading(heading.level, text));
            self.state = self.rules.state_after(&heading);
            return 1;
        }

        if self.state == SegmentState::InProcessSection && self.tables.is_header(line) {
            if let Some(found) = self.tables.extract(lines, index) {
                self.flush();
                self.blocks.push(Block::Table(found.table));
                return found.consumed;
            }
        }

        self.push_text(text);
        let merge = lines
            .get(index + 1)
            .is_some_and(|next| self.rules.merges(text, next.trimmed()));
        if !merge {
            self.flush();
        }
        1
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
    }

    /// Emit the buffered paragraph, if any.
    fn flush(&mut self) {
        let text = std::mem::take(&mut self.buffer);
        let text = text.trim();
        if !text.is_empty() {
            self.blocks.push(Block::paragraph(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, TableRow, Word};

    fn rules() -> SegmentRules {
        SegmentRules::new(&LayoutConfig::default()).unwrap()
    }

    /// Lines with one word per whitespace token at fixed column offsets.
    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let y = 700.0 - i as f32 * 14.0;
                let words = t
                    .split_whitespace()
                    .enumerate()
                    .map(|(j, w)| {
                        let left = [72.0, 120.0, 260.0, 320.0, 380.0][j.min(4)] + j.saturating_sub(4) as f32 * 40.0;
                        Word::new(w, left, left + w.len() as f32 * 5.0, y)
                    })
                    .collect();
                Line::from_words(y, words)
            })
            .collect()
    }

    fn segment(texts: &[&str]) -> Vec<Block> {
        let config = LayoutConfig::default();
        let rules = SegmentRules::new(&config).unwrap();
        let tables = TableExtractor::new(&config).unwrap();
        Segmenter::new(&rules, &tables).run(&lines(texts))
    }

    #[test]
    fn test_heading_levels() {
        let rules = rules();
        assert_eq!(rules.heading("6.0 Procedure").unwrap().level, 2);
        assert_eq!(rules.heading("6 Procedure").unwrap().level, 2);
        assert_eq!(rules.heading("6.1 Inspect equipment").unwrap().level, 3);
        assert_eq!(rules.heading("6.1.2 X").unwrap().level, 4);
        assert_eq!(rules.heading("1.2.3.4.5.6 Deep").unwrap().level, 6);
        assert_eq!(rules.heading("6.1.2 X").unwrap().section, "6");
        assert!(rules.heading("06/08/2023 G").is_none());
        assert!(rules.heading("12 345").is_none());
        assert!(rules.heading("Procedure").is_none());
    }

    #[test]
    fn test_merge_rule() {
        let rules = rules();
        assert!(rules.merges("The operator shall", "inspect the unit"));
        assert!(!rules.merges("The operator shall.", "inspect the unit"));
        assert!(!rules.merges("The operator shall", "Inspect the unit"));
        assert!(!rules.merges("The operator shall", "6.1 Inspect"));
        assert!(!rules.merges("Items:", "a) first"));
        assert!(!rules.merges("Items", "- first"));
        assert!(!rules.merges("Items", "• first"));
    }

    #[test]
    fn test_lowercase_continuation_merges() {
        let blocks = segment(&["Operators must wear gloves while", "handling the equipment."]);
        assert_eq!(
            blocks,
            vec![Block::paragraph(
                "Operators must wear gloves while handling the equipment."
            )]
        );
    }

    #[test]
    fn test_numbered_line_starts_heading() {
        let blocks = segment(&["Operators must wear gloves while", "6.1 Inspect equipment"]);
        assert_eq!(
            blocks,
            vec![
                Block::paragraph("Operators must wear gloves while"),
                Block::heading(3, "6.1 Inspect equipment"),
            ]
        );
    }

    #[test]
    fn test_capitalized_next_line_ends_paragraph() {
        let blocks = segment(&["First thought", "Second thought"]);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_procedure_table() {
        let blocks = segment(&[
            "6.0 Procedure",
            "Step Responsibility Action",
            "1 Tech Inspect the unit",
            "2 Tech Record results",
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::heading(2, "6.0 Procedure"));
        assert_eq!(
            blocks[1],
            Block::Table(Table::new(vec![
                TableRow::from_cells(["Step", "Responsibility", "Action"]),
                TableRow::from_cells(["1", "Tech", "Inspect the unit"]),
                TableRow::from_cells(["2", "Tech", "Record results"]),
            ]))
        );
    }

    #[test]
    fn test_table_header_outside_process_section_is_text() {
        let blocks = segment(&[
            "5.0 Responsibilities",
            "Step Responsibility Action",
            "1 Tech Inspect the unit",
            "2 Tech Record results",
        ]);
        assert!(blocks.iter().all(|b| !matches!(b, Block::Table(_))));
        assert_eq!(blocks[1], Block::paragraph("Step Responsibility Action"));
    }

    #[test]
    fn test_rejected_table_falls_back_to_text() {
        let blocks = segment(&["6.0 Procedure", "Step Responsibility Action", "Done."]);
        assert_eq!(
            blocks,
            vec![
                Block::heading(2, "6.0 Procedure"),
                Block::paragraph("Step Responsibility Action"),
                Block::paragraph("Done."),
            ]
        );
    }

    #[test]
    fn test_state_follows_top_level_number() {
        let config = LayoutConfig::default();
        let rules = SegmentRules::new(&config).unwrap();
        let tables = TableExtractor::new(&config).unwrap();

        let mut segmenter = Segmenter::new(&rules, &tables);
        let input = lines(&["6.0 Procedure", "6.1 Prepare", "7.0 Records"]);
        assert_eq!(segmenter.state(), SegmentState::Default);
        segmenter.step(&input, 0);
        assert_eq!(segmenter.state(), SegmentState::InProcessSection);
        segmenter.step(&input, 1);
        assert_eq!(segmenter.state(), SegmentState::InProcessSection);
        segmenter.step(&input, 2);
        assert_eq!(segmenter.state(), SegmentState::Default);
    }
}
