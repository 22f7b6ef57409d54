//! Rendering options and configuration.

/// Title used when neither the header grid nor the caller names the document.
pub const DEFAULT_FALLBACK_TITLE: &str = "Untitled Document";

/// Options for rendering document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Include YAML frontmatter with the header metadata
    pub include_frontmatter: bool,

    /// Level-1 heading used when the document has no display title
    pub fallback_title: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the title used when nothing better is known.
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
        }
    }
}
