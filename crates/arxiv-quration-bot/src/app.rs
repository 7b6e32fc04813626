//! Startup wiring: credentials → clients → context → run.

use std::sync::Arc;

use crate::client::{ArxivClient, DeeplClient};
use crate::config::{Config, CredentialSources};
use crate::credentials::{self, ResolvedCredentials};
use crate::error::{BotError, BotResult};
use crate::pipeline::{self, BotContext, RunSettings, RunSummary};
use crate::query::SearchQuery;

/// Build every client once. Authentication happens here, before any paper
/// is fetched.
pub async fn build_context(
    config: &Config,
    credentials: ResolvedCredentials,
) -> BotResult<BotContext> {
    let publisher = credentials::connect(config, credentials.app).await?;

    let translator = DeeplClient::new(config, credentials.deepl_auth_key)
        .map_err(|e| BotError::configuration(format!("failed to build DeepL client: {e}")))?;
    tracing::debug!(endpoint = translator.api_url(), "DeepL client ready");

    let papers = ArxivClient::new(config)
        .map_err(|e| BotError::configuration(format!("failed to build arXiv client: {e}")))?;

    Ok(BotContext::new(Arc::new(papers), Arc::new(translator), Arc::new(publisher)))
}

/// Settings for [`pipeline::run`] taken from the configuration.
#[must_use]
pub fn run_settings(config: &Config) -> RunSettings {
    RunSettings {
        repo: config.target_repo.clone(),
        max_results: config.max_results,
        failure_policy: config.failure_policy,
    }
}

/// One complete run for the given query.
pub async fn run_with_query(
    config: &Config,
    sources: &CredentialSources,
    query: &SearchQuery,
) -> BotResult<RunSummary> {
    let credentials = credentials::resolve(sources)?;
    let ctx = build_context(config, credentials).await?;

    pipeline::run(&ctx, query, &run_settings(config)).await
}

/// One complete run for today's window.
pub async fn run(config: &Config, sources: &CredentialSources) -> BotResult<RunSummary> {
    run_with_query(config, sources, &SearchQuery::today()).await
}
