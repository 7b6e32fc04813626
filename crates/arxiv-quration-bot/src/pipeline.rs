//! The fetch → translate → publish run.
//!
//! Each external service sits behind a trait so the loop can be driven by
//! the real clients or by in-memory fakes:
//! 1. [`PaperSource`] finds the papers for the window
//! 2. [`Translator`] turns each abstract into Japanese
//! 3. [`IssuePublisher`] files the rendered issue
//!
//! Papers are processed one at a time, in fetch order.

use std::sync::Arc;

use crate::client::{ArxivClient, DeeplClient, InstallationClient};
use crate::config::FailurePolicy;
use crate::error::{BotError, BotResult, ClientResult, Stage};
use crate::formatters;
use crate::models::{ArxivPaper, CreatedIssue, RenderedIssue, RepoRef};
use crate::query::SearchQuery;

/// Source of papers for a query.
#[async_trait::async_trait]
pub trait PaperSource: Send + Sync {
    /// Return at most `max_results` papers matching `query`.
    async fn search(&self, query: &SearchQuery, max_results: usize)
    -> ClientResult<Vec<ArxivPaper>>;
}

/// Translation into the configured target language.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate one text.
    async fn translate(&self, text: &str) -> ClientResult<String>;
}

/// Destination for rendered issues.
#[async_trait::async_trait]
pub trait IssuePublisher: Send + Sync {
    /// Create one issue in `repo`.
    async fn publish(&self, repo: &RepoRef, issue: &RenderedIssue) -> ClientResult<CreatedIssue>;
}

#[async_trait::async_trait]
impl PaperSource for ArxivClient {
    async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> ClientResult<Vec<ArxivPaper>> {
        Self::search(self, &query.expression(), max_results).await
    }
}

#[async_trait::async_trait]
impl Translator for DeeplClient {
    async fn translate(&self, text: &str) -> ClientResult<String> {
        Self::translate(self, text).await
    }
}

#[async_trait::async_trait]
impl IssuePublisher for InstallationClient {
    async fn publish(&self, repo: &RepoRef, issue: &RenderedIssue) -> ClientResult<CreatedIssue> {
        self.create_issue(repo, issue).await
    }
}

/// Service handles for a run, built once at startup.
#[derive(Clone)]
pub struct BotContext {
    /// Paper search.
    pub papers: Arc<dyn PaperSource>,
    /// Abstract translation.
    pub translator: Arc<dyn Translator>,
    /// Issue creation.
    pub publisher: Arc<dyn IssuePublisher>,
}

impl BotContext {
    /// Create a new context.
    #[must_use]
    pub fn new(
        papers: Arc<dyn PaperSource>,
        translator: Arc<dyn Translator>,
        publisher: Arc<dyn IssuePublisher>,
    ) -> Self {
        Self { papers, translator, publisher }
    }
}

/// Per-run knobs.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Repository that receives the issues.
    pub repo: RepoRef,
    /// Maximum papers processed.
    pub max_results: usize,
    /// Per-paper failure handling.
    pub failure_policy: FailurePolicy,
}

/// A paper that could not be filed.
#[derive(Debug)]
pub struct PaperFailure {
    /// Entry id.
    pub paper_id: String,
    /// Paper title.
    pub title: String,
    /// What went wrong.
    pub error: BotError,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Papers returned by the search.
    pub fetched: usize,
    /// Issues created, in order.
    pub created: Vec<CreatedIssue>,
    /// Papers skipped after a failure.
    pub failures: Vec<PaperFailure>,
}

impl RunSummary {
    /// True when every fetched paper became an issue.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Exit code for the run: 0, or the code of the first failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.failures.first().map_or(0, |f| f.error.exit_code())
    }
}

/// Translate and publish one paper.
async fn process_paper(
    ctx: &BotContext,
    settings: &RunSettings,
    paper: &ArxivPaper,
) -> BotResult<CreatedIssue> {
    let summary_ja = ctx
        .translator
        .translate(&paper.flattened_summary())
        .await
        .map_err(|source| BotError::Translation { paper_id: paper.entry_id.clone(), source })?;

    let issue = formatters::render_issue(paper, &summary_ja);

    ctx.publisher
        .publish(&settings.repo, &issue)
        .await
        .map_err(|source| BotError::Publish { paper_id: paper.entry_id.clone(), source })
}

/// Run the pipeline for one query.
///
/// A fetch failure always aborts. Per-paper failures follow
/// `settings.failure_policy`.
pub async fn run(
    ctx: &BotContext,
    query: &SearchQuery,
    settings: &RunSettings,
) -> BotResult<RunSummary> {
    tracing::info!(query = %query, max_results = settings.max_results, "Searching arXiv");

    let papers = ctx.papers.search(query, settings.max_results).await.map_err(|e| {
        tracing::error!(
            stage = Stage::Fetch.as_str(),
            error = %e,
            transient = e.is_transient(),
            "Search failed"
        );
        BotError::Fetch(e)
    })?;

    tracing::info!(count = papers.len(), "Fetched papers");

    let mut summary = RunSummary { fetched: papers.len(), ..RunSummary::default() };

    for paper in &papers {
        tracing::info!(paper_id = %paper.entry_id, title = %paper.display_title(), "Processing paper");

        match process_paper(ctx, settings, paper).await {
            Ok(created) => {
                tracing::info!(
                    paper_id = %paper.entry_id,
                    issue = created.number,
                    url = %created.html_url,
                    "Created issue"
                );
                summary.created.push(created);
            }
            Err(error) => {
                tracing::error!(
                    paper_id = %paper.entry_id,
                    stage = error.stage().map_or("-", Stage::as_str),
                    error = %error,
                    "Paper failed"
                );

                if settings.failure_policy == FailurePolicy::Abort {
                    return Err(error);
                }

                summary.failures.push(PaperFailure {
                    paper_id: paper.entry_id.clone(),
                    title: paper.display_title(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        fetched = summary.fetched,
        created = summary.created.len(),
        failed = summary.failures.len(),
        "Run finished"
    );

    Ok(summary)
}
