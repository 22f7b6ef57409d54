//! Markdown rendering for reconstructed documents.

use crate::error::Result;
use crate::model::{Block, Document, Table};

use super::RenderOptions;

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
///
/// Emits one level-1 title heading followed by the body blocks in order.
/// The output is trimmed and ends with a single newline.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter(doc.display_title()));
            output.push('\n');
        }

        let title = doc
            .display_title()
            .map(str::trim)
            .unwrap_or(self.options.fallback_title.as_str());
        output.push_str("# ");
        output.push_str(&escape_markdown(title));
        output.push_str("\n\n");

        for block in &doc.blocks {
            self.render_block(&mut output, block);
        }

        let mut result = output.trim().to_string();
        result.push('\n');
        Ok(result)
    }

    fn render_block(&self, output: &mut String, block: &Block) {
        match block {
            Block::Heading { level, text } => {
                // Level 1 is reserved for the document title.
                let level = (*level).clamp(2, 6) as usize;
                output.push_str(&"#".repeat(level));
                output.push(' ');
                output.push_str(&escape_markdown(text.trim()));
                output.push_str("\n\n");
            }
            Block::Paragraph { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                output.push_str(&escape_markdown(text));
                output.push_str("\n\n");
            }
            Block::Table(table) => self.render_table(output, table),
        }
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        let col_count = table.column_count();
        if col_count == 0 {
            return;
        }

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for col in 0..col_count {
                let content = row.cell(col).replace('\n', " ");
                output.push_str(&format!(" {} |", escape_markdown(content.trim())));
            }
            output.push('\n');

            if i == 0 {
                output.push('|');
                output.push_str(&" --- |".repeat(col_count));
                output.push('\n');
            }
        }

        output.push('\n');
    }
}

/// Escape the characters that would break a pipe table or start emphasis.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '|' | '*' | '_') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
