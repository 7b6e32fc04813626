//! arXiv search client.
//!
//! Talks to the Atom API at `export.arxiv.org/api/query` and decodes each
//! `<entry>` into an [`ArxivPaper`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::{handle_response, http_client, send_error};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{ArxivPaper, PaperLink};

/// Entry ids under this prefix describe a rejected query, not a paper.
const API_ERROR_ID: &str = "arxiv.org/api/errors";

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<DateTime<Utc>>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "arxiv:doi", alias = "doi", default)]
    doi: Option<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
}

// Element text, ignoring namespace attributes.
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

impl AtomEntry {
    /// `None` for an entry without a publication date.
    fn into_paper(self) -> Option<ArxivPaper> {
        let entry_id = self.id.trim().to_string();
        let Some(published) = self.published else {
            tracing::warn!(paper_id = %entry_id, "Skipping entry without a published date");
            return None;
        };

        let links: Vec<PaperLink> = self
            .links
            .into_iter()
            .map(|l| PaperLink { href: l.href.trim().to_string(), title: l.title })
            .collect();

        let pdf_url =
            links.iter().find(|l| l.title.as_deref() == Some("pdf")).map(|l| l.href.clone());

        let doi = self.doi.map(|d| d.value.trim().to_string()).filter(|d| !d.is_empty());

        Some(ArxivPaper {
            entry_id,
            title: self.title.trim().to_string(),
            summary: self.summary,
            authors: self.authors.into_iter().map(|a| a.name.trim().to_string()).collect(),
            published,
            pdf_url,
            doi,
            links,
        })
    }
}

/// Decode an arXiv Atom response.
///
/// An error entry (arXiv answers some malformed queries with `200 OK`) is
/// reported as a bad request. Entries without a publication date are
/// skipped.
pub fn parse_feed(xml: &str) -> ClientResult<Vec<ArxivPaper>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml)?;

    let mut papers = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        if entry.id.contains(API_ERROR_ID) {
            return Err(ClientError::bad_request(entry.summary.trim()));
        }
        papers.extend(entry.into_paper());
    }

    Ok(papers)
}

/// arXiv API client.
#[derive(Debug, Clone)]
pub struct ArxivClient {
    /// HTTP client.
    client: Client,

    /// Search endpoint.
    api_url: String,

    /// Entries per request.
    page_size: usize,

    /// Pause between requests.
    page_delay: Duration,

    /// Request timeout, for error reporting.
    request_timeout: Duration,
}

impl ArxivClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            client: http_client(config, HeaderMap::new())?,
            api_url: config.arxiv_api_url.clone(),
            page_size: config.page_size.max(1),
            page_delay: config.page_delay,
            request_timeout: config.request_timeout,
        })
    }

    /// Search for papers, returning at most `max_results`.
    ///
    /// Fewer results than requested is not an error.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search(&self, query: &str, max_results: usize) -> ClientResult<Vec<ArxivPaper>> {
        let mut papers = Vec::new();
        let mut start = 0;

        while papers.len() < max_results {
            if start > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            let limit = (max_results - papers.len()).min(self.page_size);
            let page = self.fetch_page(query, start, limit).await?;
            let count = page.len();

            tracing::debug!(start, count, "Fetched arXiv page");

            papers.extend(page);

            if count < limit {
                break;
            }
            start += count;
        }

        papers.truncate(max_results);
        Ok(papers)
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        limit: usize,
    ) -> ClientResult<Vec<ArxivPaper>> {
        let params = vec![
            ("search_query", query.to_string()),
            ("start", start.to_string()),
            ("max_results", limit.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let response = self
            .client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        let response = handle_response(response).await?;
        let xml = response.text().await.map_err(|e| send_error(e, self.request_timeout))?;

        parse_feed(&xml)
    }
}
