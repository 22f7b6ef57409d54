//! Process-table recovery from positioned lines.
//!
//! Tables are found by their "Step / Responsibility / Action" header rather
//! than by ruling lines. Column anchors come from the header words when all
//! of them are present, or from left edges that follow large horizontal gaps
//! in the lines below the header.

use regex::Regex;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{Line, Table, TableRow};

/// Minimum anchors for a genuine table.
const MIN_ANCHORS: usize = 3;

/// Lines after the header that must populate at least two columns.
const PROBE_LINES: usize = 2;

/// Minimum filled columns in each probe line.
const MIN_PROBE_FILLED: usize = 2;

/// Minimum data rows after continuation merging.
const MIN_DATA_ROWS: usize = 2;

/// A table recovered from the line stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub table: Table,
    /// Lines consumed, header included
    pub consumed: usize,
}

/// Detects and slices process tables.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    header_tokens: Vec<String>,
    lookahead: usize,
    column_gap: f32,
    anchor_tolerance: f32,
    max_columns: usize,
    section_heading: Regex,
    heading: Regex,
}

impl TableExtractor {
    pub fn new(config: &LayoutConfig) -> Result<Self> {
        Ok(Self {
            header_tokens: config
                .table_header_tokens
                .iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
            lookahead: config.table_lookahead,
            column_gap: config.column_gap,
            anchor_tolerance: config.anchor_tolerance,
            max_columns: config.max_columns,
            section_heading: Regex::new(r"^\d+\.\d+(?:\.\d+)*\.?\s+\p{L}")?,
            heading: Regex::new(r"^\d+(?:\.\d+)*\.?\s+\p{L}")?,
        })
    }

    /// Whether a line contains every header token (case-insensitive).
    pub fn is_header(&self, line: &Line) -> bool {
        let lower = line.text.to_lowercase();
        self.header_tokens.iter().all(|t| lower.contains(t.as_str()))
    }

    /// Column anchors for the table whose header is `lines[start]`.
    pub fn anchors(&self, lines: &[Line], start: usize) -> Vec<f32> {
        let Some(header) = lines.get(start) else {
            return Vec::new();
        };

        let exact = self.header_anchors(header);
        if exact.len() == self.header_tokens.len() && exact.len() <= self.max_columns {
            log::debug!("Table: anchors from header words {:?}", exact);
            return exact;
        }

        let end = (start + self.lookahead).min(lines.len());
        let clustered = self.cluster_anchors(&lines[start..end]);
        log::debug!("Table: anchors from gap clustering {:?}", clustered);
        clustered
    }

    /// Left edges of the header token words, deduplicated and sorted.
    fn header_anchors(&self, header: &Line) -> Vec<f32> {
        let mut anchors: Vec<f32> = self
            .header_tokens
            .iter()
            .filter_map(|token| {
                header
                    .words
                    .iter()
                    .find(|w| {
                        w.text
                            .trim_matches(|c: char| !c.is_alphanumeric())
                            .eq_ignore_ascii_case(token)
                    })
                    .map(|w| w.left)
            })
            .collect();
        anchors.sort_by(f32::total_cmp);
        anchors.dedup_by(|a, b| (*a - *b).abs() < f32::EPSILON);
        anchors
    }

    /// Gap clustering over a window of lines.
    fn cluster_anchors(&self, window: &[Line]) -> Vec<f32> {
        let mut points: Vec<f32> = Vec::new();
        for line in window {
            let Some(first) = line.words.first() else {
                continue;
            };
            points.push(first.left);
            for pair in line.words.windows(2) {
                if pair[1].left - pair[0].right >= self.column_gap {
                    points.push(pair[1].left);
                }
            }
        }
        points.sort_by(f32::total_cmp);

        // (sum, count) per cluster
        let mut clusters: Vec<(f32, usize)> = Vec::new();
        for point in points {
            match clusters.last_mut() {
                Some((sum, count)) if point - *sum / *count as f32 <= self.anchor_tolerance => {
                    *sum += point;
                    *count += 1;
                }
                _ => clusters.push((point, 1)),
            }
        }

        clusters
            .into_iter()
            .take(self.max_columns)
            .map(|(sum, count)| sum / count as f32)
            .collect()
    }

    /// Slice a line into cells by nearest anchor.
    pub fn slice(&self, line: &Line, anchors: &[f32]) -> TableRow {
        let mut row = TableRow::empty(anchors.len());
        for word in &line.words {
            if let Some(column) = nearest(anchors, word.left) {
                row.append(column, word.text.trim());
            }
        }
        row
    }

    /// Whether the lines after a header look like table rows.
    pub fn is_genuine(&self, lines: &[Line], start: usize, anchors: &[f32]) -> bool {
        if anchors.len() < MIN_ANCHORS {
            return false;
        }
        let probes = lines.iter().skip(start + 1).take(PROBE_LINES);
        probes.len() == PROBE_LINES
            && probes.clone().all(|l| self.slice(l, anchors).filled() >= MIN_PROBE_FILLED)
    }

    /// Detect and extract the table whose header is `lines[start]`.
    ///
    /// Returns `None` when the header is not followed by a genuine table;
    /// the caller then treats the header as ordinary text.
    pub fn extract(&self, lines: &[Line], start: usize) -> Option<ExtractedTable> {
        let header = lines.get(start)?;
        let anchors = self.anchors(lines, start);
        if !self.is_genuine(lines, start, &anchors) {
            log::debug!(
                "Table: header {:?} rejected ({} anchors)",
                header.text,
                anchors.len()
            );
            return None;
        }

        let arity = anchors.len();
        let action = arity - 1;
        let responsibility = 1.min(action);

        let mut rows = vec![self.slice(header, &anchors)];
        let mut end = start + 1;
        while let Some(line) = lines.get(end) {
            if self.section_heading.is_match(line.trimmed()) {
                break;
            }
            let row = self.slice(line, &anchors);
            if row.filled() == 0 {
                break;
            }
            // "7 Records" lands in one column; a step row fills two or more
            if row.filled() < MIN_PROBE_FILLED && self.heading.is_match(line.trimmed()) {
                break;
            }
            end += 1;

            // Header repeated after a page break
            if self.is_header(line) {
                continue;
            }

            if row.cell(0).is_empty() && rows.len() > 1 {
                let text = row.plain_text();
                if let Some(previous) = rows.last_mut() {
                    let target = if previous.cell(action).is_empty() {
                        responsibility
                    } else {
                        action
                    };
                    previous.append(target, &text);
                }
                continue;
            }
            rows.push(row);
        }

        let data_rows = rows.len() - 1;
        if data_rows < MIN_DATA_ROWS {
            log::debug!(
                "Table: header {:?} rejected ({} data rows)",
                header.text,
                data_rows
            );
            return None;
        }

        log::debug!(
            "Table: {} columns, {} data rows, {} lines",
            arity,
            data_rows,
            end - start
        );

        Some(ExtractedTable {
            table: Table::new(rows),
            consumed: end - start,
        })
    }
}

/// Index of the anchor closest to `x`; ties go to the leftmost.
fn nearest(anchors: &[f32], x: f32) -> Option<usize> {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
        .map(|(i, _)| i)
}
