//! Paper data model decoded from the arXiv Atom feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A link attached to an arXiv entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperLink {
    /// Target URL.
    pub href: String,

    /// Label, e.g. `pdf` or `doi`.
    #[serde(default)]
    pub title: Option<String>,
}

impl PaperLink {
    /// Create a link without a title.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into(), title: None }
    }

    /// Create a titled link.
    #[must_use]
    pub fn titled(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self { href: href.into(), title: Some(title.into()) }
    }

    /// The title if it is present and not blank.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// One arXiv search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArxivPaper {
    /// Canonical abstract-page URL, e.g. `http://arxiv.org/abs/2403.01234v1`.
    pub entry_id: String,

    /// Paper title as published (may contain line breaks).
    pub title: String,

    /// Abstract (may contain line breaks).
    pub summary: String,

    /// Author names in order.
    pub authors: Vec<String>,

    /// First-version publication timestamp.
    pub published: DateTime<Utc>,

    /// PDF URL.
    pub pdf_url: Option<String>,

    /// DOI, without the `https://doi.org/` prefix.
    pub doi: Option<String>,

    /// Every link on the entry, in feed order.
    pub links: Vec<PaperLink>,
}

impl ArxivPaper {
    /// Title with line breaks and runs of whitespace collapsed to single spaces.
    #[must_use]
    pub fn display_title(&self) -> String {
        self.title.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Abstract with every newline replaced by a single space, trimmed.
    #[must_use]
    pub fn flattened_summary(&self) -> String {
        self.summary.replace("\r\n", " ").replace('\n', " ").trim().to_string()
    }

    /// The short arXiv id (`2403.01234v1`) if the entry id is an abs URL.
    #[must_use]
    pub fn short_id(&self) -> Option<&str> {
        self.entry_id.split_once("/abs/").map(|(_, id)| id).filter(|id| !id.is_empty())
    }
}
