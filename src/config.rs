//! Layout heuristics configuration.
//!
//! Every threshold and rule table used by the layout pipeline lives here.
//! The defaults are tuned for one family of procedure templates; override
//! them per corpus rather than treating them as format constants.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Phrases that open legal or distribution banners.
const DEFAULT_BANNER_PHRASES: &[&str] = &[
    "This document is the property of",
    "This document contains proprietary",
    "The information contained in this document",
    "Printed copies are uncontrolled",
    "Uncontrolled when printed",
    "Uncontrolled copy",
    "Controlled Unclassified Information",
    "Confidential and proprietary",
    "Export controlled",
];

/// Regexes for noise lines. Matched case-insensitively against trimmed text.
const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    // page-of-page markers
    r"^page\s+\d+\s*(of|/)\s*\d+$",
    r"^\d+\s+of\s+\d+$",
    // revision-code lines
    r"^rev(ision)?\.?\s*:?\s*[a-z0-9]{1,3}$",
    // restricted-data banners
    r"\bproprietary\s+(and|&)\s+confidential\b",
    r"\bproprietary\s+(information|data|document)\b",
    r"\bunauthori[sz]ed\s+(use|disclosure|reproduction|distribution)\b",
    r"\bcontrolled\s+unclassified\s+information\b",
    r"^\(?cui\)?$",
    r"^cui\s*//",
    r"\bexport[-\s]controlled\b",
    // "Page: N of M" anywhere in the line
    r"page\s*:\s*\d+\s*of\s*\d+",
];

/// Banner lines printed above the metadata grid.
const DEFAULT_HEADER_BANNERS: &[&str] = &["Integrated Management System", "Standard Operating Procedure"];

/// Tokens that must all appear in a process-table header line.
const DEFAULT_TABLE_HEADER_TOKENS: &[&str] = &["Step", "Responsibility", "Action"];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Heuristic configuration for the layout pipeline.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical grid size used to group words into lines
    pub line_tolerance: f32,

    /// Fraction of pages a head/tail line must appear on to be boilerplate
    pub repeat_threshold: f32,

    /// Number of lines scanned at the top and bottom of each page
    pub repeat_edge_lines: usize,

    /// Documents with fewer pages skip repetition detection
    pub min_pages_for_repetition: usize,

    /// Number of first-page lines searched for the metadata grid
    pub header_scan_lines: usize,

    /// Minimum length of a title line
    pub title_min_len: usize,

    /// Maximum length of a title line
    pub title_max_len: usize,

    /// Lines examined when clustering table column anchors
    pub table_lookahead: usize,

    /// Horizontal gap that starts a new column candidate
    pub column_gap: f32,

    /// Distance within which column candidates are merged
    pub anchor_tolerance: f32,

    /// Maximum number of table columns
    pub max_columns: usize,

    /// Top-level section number that holds the process table
    pub process_section: String,

    /// Words that identify a process-table header line
    pub table_header_tokens: Vec<String>,

    /// Banner lines always removed from the body
    pub header_banners: Vec<String>,

    /// Banner-opening phrases (case-insensitive prefix match)
    pub banner_phrases: Vec<String>,

    /// Noise regexes (case-insensitive)
    pub noise_patterns: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            repeat_threshold: 0.6,
            repeat_edge_lines: 4,
            min_pages_for_repetition: 2,
            header_scan_lines: 50,
            title_min_len: 3,
            title_max_len: 150,
            table_lookahead: 8,
            column_gap: 22.0,
            anchor_tolerance: 16.0,
            max_columns: 3,
            process_section: "6".to_string(),
            table_header_tokens: to_strings(DEFAULT_TABLE_HEADER_TOKENS),
            header_banners: to_strings(DEFAULT_HEADER_BANNERS),
            banner_phrases: to_strings(DEFAULT_BANNER_PHRASES),
            noise_patterns: to_strings(DEFAULT_NOISE_PATTERNS),
        }
    }
}

impl LayoutConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the line grouping tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the repeating-line threshold.
    pub fn with_repeat_threshold(mut self, threshold: f32) -> Self {
        self.repeat_threshold = threshold;
        self
    }

    /// Set the table lookahead window.
    pub fn with_table_lookahead(mut self, lines: usize) -> Self {
        self.table_lookahead = lines;
        self
    }

    /// Set the large-gap threshold for column detection.
    pub fn with_column_gap(mut self, gap: f32) -> Self {
        self.column_gap = gap;
        self
    }

    /// Set the anchor merge tolerance.
    pub fn with_anchor_tolerance(mut self, tolerance: f32) -> Self {
        self.anchor_tolerance = tolerance;
        self
    }

    /// Set the process section number.
    pub fn with_process_section(mut self, section: impl Into<String>) -> Self {
        self.process_section = section.into();
        self
    }

    /// Add a banner-opening phrase.
    pub fn with_banner_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.banner_phrases.push(phrase.into());
        self
    }

    /// Add a noise regex.
    pub fn with_noise_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.noise_patterns.push(pattern.into());
        self
    }

    /// Check value ranges. Regexes are checked when the rules are compiled.
    pub fn validate(&self) -> Result<()> {
        if self.line_tolerance.is_nan() || self.line_tolerance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "line_tolerance must be positive, got {}",
                self.line_tolerance
            )));
        }
        if self.repeat_threshold.is_nan()
            || self.repeat_threshold <= 0.0
            || self.repeat_threshold > 1.0
        {
            return Err(Error::InvalidConfig(format!(
                "repeat_threshold must be in (0, 1], got {}",
                self.repeat_threshold
            )));
        }
        if self.table_lookahead == 0 {
            return Err(Error::InvalidConfig(
                "table_lookahead must be at least 1".to_string(),
            ));
        }
        if self.max_columns == 0 {
            return Err(Error::InvalidConfig(
                "max_columns must be at least 1".to_string(),
            ));
        }
        if self.column_gap < 0.0 || self.anchor_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "column_gap and anchor_tolerance must not be negative".to_string(),
            ));
        }
        if self.table_header_tokens.is_empty() {
            return Err(Error::InvalidConfig(
                "table_header_tokens must not be empty".to_string(),
            ));
        }
        if self.title_min_len > self.title_max_len {
            return Err(Error::InvalidConfig(format!(
                "title_min_len ({}) exceeds title_max_len ({})",
                self.title_min_len, self.title_max_len
            )));
        }
        Ok(())
    }
}
