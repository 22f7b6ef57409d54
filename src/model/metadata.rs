//! Header metadata recovered from the first page's key/value grid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A recognized header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    /// Document No.
    Doc,
    /// Effective Date
    Eff,
    /// Revision
    Rev,
    /// Accountable Organization
    Org,
    /// Management Approval
    Appr,
    /// Source
    Src,
}

impl HeaderField {
    pub const ALL: [HeaderField; 6] = [
        HeaderField::Doc,
        HeaderField::Eff,
        HeaderField::Rev,
        HeaderField::Org,
        HeaderField::Appr,
        HeaderField::Src,
    ];

    /// Short key used in serialized metadata.
    pub fn key(self) -> &'static str {
        match self {
            HeaderField::Doc => "doc",
            HeaderField::Eff => "eff",
            HeaderField::Rev => "rev",
            HeaderField::Org => "org",
            HeaderField::Appr => "appr",
            HeaderField::Src => "src",
        }
    }

    /// Row label as printed in the header grid, without the colon.
    pub fn label(self) -> &'static str {
        match self {
            HeaderField::Doc => "Document No.",
            HeaderField::Eff => "Effective Date",
            HeaderField::Rev => "Revision",
            HeaderField::Org => "Accountable Organization",
            HeaderField::Appr => "Management Approval",
            HeaderField::Src => "Source",
        }
    }
}

/// Structured metadata; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl HeaderMetadata {
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        match field {
            HeaderField::Doc => self.doc.as_deref(),
            HeaderField::Eff => self.eff.as_deref(),
            HeaderField::Rev => self.rev.as_deref(),
            HeaderField::Org => self.org.as_deref(),
            HeaderField::Appr => self.appr.as_deref(),
            HeaderField::Src => self.src.as_deref(),
        }
    }

    fn slot(&mut self, field: HeaderField) -> &mut Option<String> {
        match field {
            HeaderField::Doc => &mut self.doc,
            HeaderField::Eff => &mut self.eff,
            HeaderField::Rev => &mut self.rev,
            HeaderField::Org => &mut self.org,
            HeaderField::Appr => &mut self.appr,
            HeaderField::Src => &mut self.src,
        }
    }

    pub fn has(&self, field: HeaderField) -> bool {
        self.get(field).is_some()
    }

    /// Set a field unless it is already populated. Returns whether it was set.
    pub fn fill(&mut self, field: HeaderField, value: impl Into<String>) -> bool {
        let slot = self.slot(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.into());
        true
    }

    pub fn is_empty(&self) -> bool {
        HeaderField::ALL.iter().all(|f| !self.has(*f))
    }

    /// Effective date parsed as day/month/year.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.eff
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok())
    }

    /// Render populated fields as YAML frontmatter.
    pub fn to_yaml_frontmatter(&self, title: Option<&str>) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(title) = title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        for field in HeaderField::ALL {
            if field == HeaderField::Eff {
                continue;
            }
            if let Some(value) = self.get(field) {
                lines.push(format!("{}: \"{}\"", field.key(), escape_yaml(value)));
            }
        }
        match (self.effective_date(), self.eff.as_deref()) {
            (Some(date), _) => lines.push(format!("eff: {}", date.format("%Y-%m-%d"))),
            (None, Some(raw)) => lines.push(format!("eff: \"{}\"", escape_yaml(raw))),
            (None, None) => {}
        }

        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
