//! arXiv Quration Bot
//!
//! Finds quantum-computing papers submitted to arXiv in a one-day window,
//! translates each abstract into Japanese with DeepL, and files the result
//! as a GitHub issue through a GitHub App installation.
//!
//! # Features
//!
//! - **Fixed window**: the day six to five days before today, `quant-ph` only
//! - **Markdown issues**: abstract translation, deduplicated links, authors, date
//! - **GitHub App auth**: RS256 JWT → installation token, no personal tokens
//! - **Injected services**: every API sits behind a trait in [`pipeline`]
//!
//! # Example
//!
//! ```no_run
//! use arxiv_quration_bot::{app, config::{Config, CredentialSources}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), arxiv_quration_bot::BotError> {
//!     let config = Config::new();
//!     let sources = CredentialSources::from_env();
//!     let summary = app::run(&config, &sources).await?;
//!
//!     println!("created {} issues", summary.created.len());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod formatters;
pub mod models;
pub mod pipeline;
pub mod query;

pub use config::Config;
pub use error::{BotError, ClientError};
pub use pipeline::{BotContext, RunSummary};
pub use query::SearchQuery;
