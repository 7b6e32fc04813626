//! Markdown output formatting for issue bodies.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use url::Url;

use crate::models::{ArxivPaper, PaperLink, RenderedIssue};

/// First line of every issue body.
pub const SUMMARY_HEADING: &str = "# Summary (DeepL訳)";

const LINKS_MARKER: &str = "\n\n## Links\n";
const AUTHORS_MARKER: &str = "\n\n## Authors\n";
const PUBLISHED_MARKER: &str = "\n\n## Published\n";

/// Sections of an issue body, as plain strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSections {
    /// Translated abstract.
    pub summary: String,
    /// Links block.
    pub links: String,
    /// Authors line.
    pub authors: String,
    /// Publication date, `YYYY/MM/DD`.
    pub published: String,
}

/// Join author names with `", "`.
#[must_use]
pub fn format_authors(authors: &[String]) -> String {
    authors.join(", ")
}

/// ar5iv rendering of an arXiv abstract URL.
///
/// Only the host is rewritten (`arxiv.org` → `ar5iv.org`).
#[must_use]
pub fn ar5iv_url(entry_id: &str) -> String {
    let Ok(mut url) = Url::parse(entry_id) else {
        return entry_id.replace("arxiv", "ar5iv");
    };

    let Some(host) = url.host_str().map(|h| h.replace("arxiv", "ar5iv")) else {
        return entry_id.to_string();
    };

    if url.set_host(Some(&host)).is_err() {
        return entry_id.to_string();
    }

    url.to_string()
}

/// A `doi`-titled link that only repeats the paper's DOI.
fn is_redundant_doi(link: &PaperLink, doi: Option<&str>) -> bool {
    match doi {
        Some(doi) => link.title.as_deref() == Some("doi") && link.href.contains(doi),
        None => false,
    }
}

fn link_markdown(link: &PaperLink) -> String {
    match link.label() {
        Some(title) => format!("[{title}]({})", link.href),
        None => link.href.clone(),
    }
}

/// Format the links block of a paper.
///
/// The abstract URL leads, followed by the ar5iv, PDF and remaining entry
/// links in parentheses. A DOI adds its own line. No URL is shown twice.
#[must_use]
pub fn format_links(paper: &ArxivPaper) -> String {
    let abs_url = paper.entry_id.as_str();
    let doi = paper.doi.as_deref().filter(|d| !d.trim().is_empty());
    let doi_url = doi.map(|d| format!("https://doi.org/{d}"));

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(abs_url.to_string());
    if let Some(url) = &doi_url {
        seen.insert(url.clone());
    }

    let mut extras = Vec::new();

    let alternate = ar5iv_url(abs_url);
    if seen.insert(alternate.clone()) {
        extras.push(format!("[ar5iv]({alternate})"));
    }

    if let Some(pdf) = paper.pdf_url.as_deref().filter(|p| !p.is_empty()) {
        if seen.insert(pdf.to_string()) {
            extras.push(format!("[pdf]({pdf})"));
        }
    }

    for link in &paper.links {
        if link.href.is_empty() || is_redundant_doi(link, doi) {
            continue;
        }
        if seen.insert(link.href.clone()) {
            extras.push(link_markdown(link));
        }
    }

    let mut output = abs_url.to_string();
    if !extras.is_empty() {
        output.push_str(&format!(" ({})", extras.join(", ")));
    }

    if let (Some(doi), Some(url)) = (doi, doi_url) {
        output.push_str(&format!("\n[doi:{doi}]({url})"));
    }

    output
}

/// Format a publication date as `YYYY/MM/DD`.
#[must_use]
pub fn format_published(published: &DateTime<Utc>) -> String {
    published.format("%Y/%m/%d").to_string()
}

/// Assemble an issue body from its four sections.
#[must_use]
pub fn compose_body(
    summary_ja: &str,
    links: &str,
    authors: &str,
    published: &DateTime<Utc>,
) -> String {
    format!(
        "{SUMMARY_HEADING}\n{summary_ja}{LINKS_MARKER}{links}{AUTHORS_MARKER}{authors}{PUBLISHED_MARKER}{}",
        format_published(published)
    )
}

/// Render the issue for a paper and its translated abstract.
#[must_use]
pub fn render_issue(paper: &ArxivPaper, summary_ja: &str) -> RenderedIssue {
    let links = format_links(paper);
    let authors = format_authors(&paper.authors);

    RenderedIssue {
        title: paper.display_title(),
        body: compose_body(summary_ja, &links, &authors, &paper.published),
    }
}

/// Split a body produced by [`compose_body`] back into its sections.
///
/// Markers are matched from the end so the summary may contain anything.
#[must_use]
pub fn parse_body(body: &str) -> Option<IssueSections> {
    let rest = body.strip_prefix(SUMMARY_HEADING)?.strip_prefix('\n')?;
    let (rest, published) = rest.rsplit_once(PUBLISHED_MARKER)?;
    let (rest, authors) = rest.rsplit_once(AUTHORS_MARKER)?;
    let (summary, links) = rest.rsplit_once(LINKS_MARKER)?;

    Some(IssueSections {
        summary: summary.to_string(),
        links: links.to_string(),
        authors: authors.to_string(),
        published: published.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ar5iv_url_rewrites_host_only() {
        assert_eq!(ar5iv_url("http://arxiv.org/abs/2403.01234v1"), "http://ar5iv.org/abs/2403.01234v1");
        assert_eq!(ar5iv_url("https://export.arxiv.org/abs/1"), "https://export.ar5iv.org/abs/1");
    }

    #[test]
    fn test_ar5iv_url_unparseable_falls_back_to_replace() {
        assert_eq!(ar5iv_url("arxiv:2403.01234"), "arxiv:2403.01234");
        assert_eq!(ar5iv_url("not a url arxiv"), "not a url ar5iv");
    }

    #[test]
    fn test_redundant_doi() {
        let link = PaperLink::titled("http://dx.doi.org/10.1103/PhysRevA.1", "doi");
        assert!(is_redundant_doi(&link, Some("10.1103/PhysRevA.1")));
        assert!(!is_redundant_doi(&link, Some("10.1000/other")));
        assert!(!is_redundant_doi(&link, None));
    }

    #[test]
    fn test_parse_body_rejects_foreign_text() {
        assert!(parse_body("just a comment").is_none());
    }
}
