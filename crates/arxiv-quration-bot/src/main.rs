//! arXiv Quration Bot - Entry Point
//!
//! One invocation is one run; schedule it externally (cron, CI).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use arxiv_quration_bot::app;
use arxiv_quration_bot::config::{Config, CredentialSources, FailurePolicy, api};
use arxiv_quration_bot::error::BotResult;
use arxiv_quration_bot::RunSummary;

#[derive(Parser)]
#[command(name = "arxiv-quration-bot")]
#[command(about = "File new quantum-computing arXiv papers as GitHub issues with Japanese abstracts")]
#[command(version)]
struct Cli {
    /// GitHub App private key in PEM form (falls back to --key-file)
    #[arg(long, env = "GH_APPKEY", hide_env_values = true)]
    app_key: Option<String>,

    /// GitHub App id
    #[arg(long, env = "GH_APPID")]
    app_id: Option<String>,

    /// DeepL auth key (keys ending in ":fx" use the free endpoint)
    #[arg(long, env = "DEEPL_AUTHKEY", hide_env_values = true)]
    deepl_auth_key: Option<String>,

    /// Private key file used when GH_APPKEY is not set
    #[arg(long, default_value = api::PRIVATE_KEY_PATH)]
    key_file: PathBuf,

    /// Repository that receives the issues (owner/name)
    #[arg(long, default_value = api::TARGET_REPO, env = "TARGET_REPO")]
    repo: String,

    /// Maximum papers processed per run
    #[arg(long, default_value_t = api::MAX_RESULTS)]
    max_results: usize,

    /// What to do when one paper fails to translate or publish
    #[arg(long, value_enum, default_value = "skip")]
    failure_policy: FailurePolicy,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

async fn run(cli: Cli) -> BotResult<RunSummary> {
    let config = Config {
        target_repo: cli.repo.parse()?,
        max_results: cli.max_results,
        failure_policy: cli.failure_policy,
        ..Config::new()
    };

    let sources = CredentialSources {
        app_key: cli.app_key,
        app_key_path: cli.key_file,
        app_id: cli.app_id,
        deepl_auth_key: cli.deepl_auth_key,
    };

    tracing::debug!(?config, ?sources, "Resolved configuration");

    app::run(&config, &sources).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads the environment
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting arXiv Quration Bot");

    match run(cli).await {
        Ok(summary) if summary.is_complete() => ExitCode::SUCCESS,
        Ok(summary) => {
            for failure in &summary.failures {
                tracing::warn!(
                    paper_id = %failure.paper_id,
                    title = %failure.title,
                    error = %failure.error,
                    "Not filed"
                );
            }
            eprintln!(
                "{} of {} papers were not filed; rerunning will duplicate the {} issues already created",
                summary.failures.len(),
                summary.fetched,
                summary.created.len()
            );
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "Run aborted");

            let mut message = format!("error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                message.push_str(&format!("\n  caused by: {cause}"));
                source = cause.source();
            }
            eprintln!("{message}");

            ExitCode::from(e.exit_code())
        }
    }
}
