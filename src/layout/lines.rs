//! Line building: grouping word boxes into text lines.

use std::collections::BTreeMap;

use crate::model::{Line, Page, PageWords, Word};

/// Group a page's words into lines ordered top to bottom.
///
/// Words whose vertical center rounds to the same point on a grid of
/// `tolerance` units share a line.
pub fn build_lines(words: &[Word], tolerance: f32) -> Vec<Line> {
    let mut groups: BTreeMap<i64, Vec<Word>> = BTreeMap::new();
    for word in words {
        if word.text.trim().is_empty() {
            continue;
        }
        let key = (word.y / tolerance).round() as i64;
        groups.entry(key).or_default().push(word.clone());
    }

    groups
        .into_values()
        .rev()
        .filter_map(|group| {
            let y = group.iter().map(|w| w.y).sum::<f32>() / group.len() as f32;
            let line = Line::from_words(y, group);
            if line.trimmed().is_empty() {
                None
            } else {
                Some(line)
            }
        })
        .collect()
}

/// Build the line view of one extracted page.
pub fn build_page(page: &PageWords, tolerance: f32) -> Page {
    Page::new(page.number, page.height, build_lines(&page.words, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, left: f32, y: f32) -> Word {
        Word::new(text, left, left + text.len() as f32 * 5.0, y)
    }

    #[test]
    fn test_groups_by_vertical_position() {
        let words = vec![
            word("second", 10.0, 680.0),
            word("world", 60.0, 700.3),
            word("Hello", 10.0, 699.8),
        ];
        let lines = build_lines(&words, 2.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[1].text, "second");
        assert!(lines[0].y > lines[1].y);
    }

    #[test]
    fn test_words_ordered_left_to_right() {
        let words = vec![
            word("C", 300.0, 500.0),
            word("A", 10.0, 500.0),
            word("B", 150.0, 500.0),
        ];
        let lines = build_lines(&words, 2.0);
        assert_eq!(lines.len(), 1);
        let lefts: Vec<f32> = lines[0].words.iter().map(|w| w.left).collect();
        assert_eq!(lefts, vec![10.0, 150.0, 300.0]);
        assert_eq!(lines[0].text, "A B C");
    }

    #[test]
    fn test_whitespace_words_are_dropped() {
        let words = vec![word("  ", 10.0, 500.0), word("Body", 10.0, 400.0)];
        let lines = build_lines(&words, 2.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Body");
    }

    #[test]
    fn test_empty_input() {
        assert!(build_lines(&[], 2.0).is_empty());
    }

    #[test]
    fn test_build_page_keeps_number_and_height() {
        let page = PageWords::new(3, 792.0, vec![word("Text", 72.0, 700.0)]);
        let built = build_page(&page, 2.0);
        assert_eq!(built.number, 3);
        assert_eq!(built.height, 792.0);
        assert_eq!(built.lines.len(), 1);
    }
}
