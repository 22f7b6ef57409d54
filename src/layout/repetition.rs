//! Running header/footer detection.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::Page;

/// Lower-cased texts of lines that repeat at the edges of most pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boilerplate {
    texts: HashSet<String>,
}

impl Boilerplate {
    /// Whether a line text (compared trimmed, case-insensitively) is boilerplate.
    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(&text.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Minimum number of pages a line must appear on to count as boilerplate.
pub fn min_hits(page_count: usize, threshold: f32) -> usize {
    // Absorb float error so 5 pages at 0.6 need 3 hits, not 4.
    (page_count as f32 * threshold - 1e-4).max(1.0).ceil() as usize
}

/// Find lines that recur within the first and last `edge_lines` of the pages.
///
/// Each text counts at most once per page. Documents with fewer than
/// `min_pages` pages have no boilerplate.
pub fn detect_boilerplate(
    pages: &[Page],
    edge_lines: usize,
    threshold: f32,
    min_pages: usize,
) -> Boilerplate {
    if pages.is_empty() || pages.len() < min_pages {
        return Boilerplate::default();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for page in pages {
        let n = page.lines.len();
        let head = 0..edge_lines.min(n);
        let tail = n.saturating_sub(edge_lines)..n;

        let seen: BTreeSet<String> = head
            .chain(tail)
            .map(|i| page.lines[i].trimmed().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        for text in seen {
            *counts.entry(text).or_insert(0) += 1;
        }
    }

    let needed = min_hits(pages.len(), threshold);
    let texts: HashSet<String> = counts
        .into_iter()
        .filter(|(_, count)| *count >= needed)
        .map(|(text, _)| text)
        .collect();

    log::debug!(
        "Repetition: {} boilerplate lines over {} pages (min hits {})",
        texts.len(),
        pages.len(),
        needed
    );

    Boilerplate { texts }
}
