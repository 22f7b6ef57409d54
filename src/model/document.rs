//! Document-level types.

use super::{HeaderMetadata, Table};
use serde::{Deserialize, Serialize};

/// A content block in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A numbered section heading (level 2-6 for body headings)
    Heading { level: u8, text: String },
    /// Merged paragraph text
    Paragraph { text: String },
    /// A process-step table
    Table(Table),
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }
}

/// A reconstructed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Title recovered from the header grid
    pub title: Option<String>,

    /// Fallback name supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_name: Option<String>,

    /// Header metadata
    pub metadata: HeaderMetadata,

    /// Body blocks in reading order
    pub blocks: Vec<Block>,

    /// Number of pages that produced words
    pub page_count: u32,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title to display: header title, then document number, then logical name.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.metadata.doc.as_deref())
            .or(self.logical_name.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn headings(&self) -> impl Iterator<Item = (u8, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_fallback_order() {
        let mut doc = Document::new();
        assert_eq!(doc.display_title(), None);

        doc.logical_name = Some("fitness.pdf".to_string());
        assert_eq!(doc.display_title(), Some("fitness.pdf"));

        doc.metadata.doc = Some("CLG-EN-PR-0175".to_string());
        assert_eq!(doc.display_title(), Some("CLG-EN-PR-0175"));

        doc.title = Some("Fitness Center Access".to_string());
        assert_eq!(doc.display_title(), Some("Fitness Center Access"));
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(
            Block::heading(9, "Deep"),
            Block::Heading {
                level: 6,
                text: "Deep".to_string()
            }
        );
    }

    #[test]
    fn test_block_json_shape() {
        let json = serde_json::to_string(&Block::paragraph("Hi")).unwrap();
        assert_eq!(json, r#"{"type":"paragraph","text":"Hi"}"#);
    }
}
