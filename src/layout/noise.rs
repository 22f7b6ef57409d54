//! Legal banner and page-marker removal.

use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// Compiled noise rules.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    prefixes: Vec<String>,
    patterns: Vec<Regex>,
}

impl NoiseFilter {
    /// Compile banner phrases and noise regexes.
    ///
    /// Fails with `Error::InvalidPattern` if any regex does not compile.
    pub fn new<P, R>(phrases: &[P], patterns: &[R]) -> Result<Self>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let prefixes = phrases
            .iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        let patterns = patterns
            .iter()
            .map(|p| RegexBuilder::new(p.as_ref()).case_insensitive(true).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { prefixes, patterns })
    }

    /// Whether a line is a banner or page marker.
    pub fn is_noise(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }

        let lower = trimmed.to_lowercase();
        if self.prefixes.iter().any(|p| lower.starts_with(p.as_str())) {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(trimmed))
    }
}
