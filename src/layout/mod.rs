//! Layout reconstruction.
//!
//! Turns per-page word boxes into a [`Document`]: lines are built per page,
//! running headers/footers, banners and header-grid rows are removed, and
//! the remaining lines are segmented into headings, paragraphs and tables.

mod header;
mod lines;
mod noise;
mod repetition;
mod segmenter;
mod table;

pub use header::{parse_header, HeaderPatterns, HeaderResult};
pub use lines::{build_lines, build_page};
pub use noise::NoiseFilter;
pub use repetition::{detect_boilerplate, min_hits, Boilerplate};
pub use segmenter::{Heading, SegmentRules, SegmentState, Segmenter};
pub use table::{ExtractedTable, TableExtractor};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{Document, Line, Page, PageWords};

/// A layout configuration compiled for reuse.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone)]
pub struct LayoutRules {
    config: LayoutConfig,
    noise: NoiseFilter,
    header: HeaderPatterns,
    segment: SegmentRules,
    tables: TableExtractor,
}

impl LayoutRules {
    /// Validate a configuration and compile its patterns.
    pub fn compile(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            noise: NoiseFilter::new(&config.banner_phrases, &config.noise_patterns)?,
            header: HeaderPatterns::new()?,
            segment: SegmentRules::new(&config)?,
            tables: TableExtractor::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    /// Build the line view of every page.
    pub fn build_pages(&self, pages: &[PageWords]) -> Vec<Page> {
        pages
            .iter()
            .map(|p| build_page(p, self.config.line_tolerance))
            .collect()
    }

    /// Reconstruct a document from extracted word pages.
    pub fn analyze(&self, pages: &[PageWords], logical_name: Option<&str>) -> Document {
        let pages = self.build_pages(pages);

        let boilerplate = detect_boilerplate(
            &pages,
            self.config.repeat_edge_lines,
            self.config.repeat_threshold,
            self.config.min_pages_for_repetition,
        );

        let header = pages
            .first()
            .map(|p| parse_header(&p.lines, &self.config, &self.header))
            .unwrap_or_default();

        let body: Vec<Line> = pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|line| {
                let text = line.trimmed();
                !boilerplate.contains(text) && !self.noise.is_noise(text) && !header.excludes(text)
            })
            .cloned()
            .collect();

        log::debug!(
            "Layout: {} pages, {} body lines, {} boilerplate texts",
            pages.len(),
            body.len(),
            boilerplate.len()
        );

        let blocks = Segmenter::new(&self.segment, &self.tables).run(&body);

        Document {
            title: header.title,
            logical_name: logical_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            metadata: header.metadata,
            blocks,
            page_count: pages.len() as u32,
        }
    }
}
