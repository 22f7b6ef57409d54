//! Positioned text: words, lines and pages.
//!
//! Coordinates are PDF user space: `x` grows to the right and `y` grows
//! upward, so the top of a page has the largest `y`.

use serde::{Deserialize, Serialize};

/// A word box produced by the word extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text, never containing whitespace.
    pub text: String,
    /// Left edge
    pub left: f32,
    /// Right edge
    pub right: f32,
    /// Vertical center
    pub y: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, left: f32, right: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            left,
            right,
            y,
        }
    }
}

/// Words sharing approximately the same vertical position, left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Vertical position of the line
    pub y: f32,
    /// Words ordered by ascending `left`
    pub words: Vec<Word>,
    /// Words joined by single spaces
    pub text: String,
}

impl Line {
    /// Build a line, ordering the words by their left edge.
    pub fn from_words(y: f32, mut words: Vec<Word>) -> Self {
        words.sort_by(|a, b| a.left.total_cmp(&b.left));
        let text = words
            .iter()
            .map(|w| w.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self { y, words, text }
    }

    /// Text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Text where horizontal gaps of at least `min_gap` become two spaces.
    ///
    /// Keeps cell boundaries of a grid row visible after joining.
    pub fn gapped_text(&self, min_gap: f32) -> String {
        let mut text = String::new();
        let mut previous: Option<&Word> = None;
        for word in &self.words {
            let token = word.text.trim();
            if token.is_empty() {
                continue;
            }
            if let Some(prev) = previous {
                text.push_str(if word.left - prev.right >= min_gap { "  " } else { " " });
            }
            text.push_str(token);
            previous = Some(word);
        }
        text
    }
}

/// Raw extractor output for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageWords {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page height in points
    pub height: f32,
    /// Words in content-stream order
    pub words: Vec<Word>,
}

impl PageWords {
    pub fn new(number: u32, height: f32, words: Vec<Word>) -> Self {
        Self {
            number,
            height,
            words,
        }
    }
}

/// A page after line building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page height in points
    pub height: f32,
    /// Lines ordered top to bottom; never whitespace-only
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(number: u32, height: f32, lines: Vec<Line>) -> Self {
        Self {
            number,
            height,
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_orders_words_by_left_edge() {
        let line = Line::from_words(
            700.0,
            vec![
                Word::new("world", 60.0, 90.0, 700.0),
                Word::new("Hello", 10.0, 40.0, 700.0),
            ],
        );
        assert_eq!(line.text, "Hello world");
        assert_eq!(line.words[0].text, "Hello");
    }

    #[test]
    fn test_line_skips_blank_words_in_text() {
        let line = Line::from_words(
            10.0,
            vec![Word::new(" ", 0.0, 2.0, 10.0), Word::new("A", 5.0, 9.0, 10.0)],
        );
        assert_eq!(line.text, "A");
    }

    #[test]
    fn test_gapped_text_marks_wide_gaps() {
        let line = Line::from_words(
            700.0,
            vec![
                Word::new("06/08/2023", 72.0, 122.0, 700.0),
                Word::new("Rev", 200.0, 215.0, 700.0),
                Word::new("B", 220.0, 225.0, 700.0),
            ],
        );
        assert_eq!(line.text, "06/08/2023 Rev B");
        assert_eq!(line.gapped_text(22.0), "06/08/2023  Rev B");
        assert_eq!(line.gapped_text(100.0), line.text);
    }
}
