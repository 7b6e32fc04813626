//! Configuration for the bot.

use std::path::PathBuf;
use std::time::Duration;

use crate::models::RepoRef;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// arXiv Atom search endpoint.
    pub const ARXIV_API: &str = "http://export.arxiv.org/api/query";

    /// DeepL endpoint for free-tier keys (suffix `:fx`).
    pub const DEEPL_FREE_API: &str = "https://api-free.deepl.com/v2";

    /// DeepL endpoint for paid keys.
    pub const DEEPL_PRO_API: &str = "https://api.deepl.com/v2";

    /// GitHub REST API.
    pub const GITHUB_API: &str = "https://api.github.com";

    /// GitHub REST API version header value.
    pub const GITHUB_API_VERSION: &str = "2022-11-28";

    /// Request timeout, applied to every external call.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum papers processed per run.
    pub const MAX_RESULTS: usize = 50;

    /// Maximum entries requested per arXiv page.
    pub const PAGE_SIZE: usize = 100;

    /// Delay between arXiv pages (arXiv asks for 3 seconds).
    pub const PAGE_DELAY: Duration = Duration::from_secs(3);

    /// Issue target.
    pub const TARGET_REPO: &str = "arXivQuration/arXivQurationBot";

    /// Fallback location of the GitHub App private key.
    pub const PRIVATE_KEY_PATH: &str = ".secret/arxivqurationbot.2023-07-02.private-key.pem";

    /// DeepL target language.
    pub const TARGET_LANG: &str = "JA";
}

/// What to do when translating or publishing a single paper fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Log the failure, keep going, and report it at the end of the run.
    #[default]
    Skip,
    /// Stop the run at the first failed paper.
    Abort,
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// arXiv search endpoint.
    pub arxiv_api_url: String,

    /// DeepL endpoint override. `None` picks free or pro from the key.
    pub deepl_api_url: Option<String>,

    /// GitHub REST API base URL (for testing with mock servers).
    pub github_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Maximum papers processed per run.
    pub max_results: usize,

    /// Entries per arXiv request.
    pub page_size: usize,

    /// Delay between arXiv requests.
    pub page_delay: Duration,

    /// Repository that receives the issues.
    pub target_repo: RepoRef,

    /// DeepL target language code.
    pub target_lang: String,

    /// Per-paper failure handling.
    pub failure_policy: FailurePolicy,
}

impl Config {
    /// Create the production configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arxiv_api_url: api::ARXIV_API.to_string(),
            deepl_api_url: None,
            github_api_url: api::GITHUB_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_results: api::MAX_RESULTS,
            page_size: api::PAGE_SIZE,
            page_delay: api::PAGE_DELAY,
            target_repo: RepoRef::new("arXivQuration", "arXivQurationBot"),
            target_lang: api::TARGET_LANG.to_string(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Create a test configuration with every service on one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            arxiv_api_url: format!("{}/api/query", base_url),
            deepl_api_url: Some(format!("{}/v2", base_url)),
            github_api_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            page_delay: Duration::from_millis(0), // No delay in tests
            ..Self::new()
        }
    }

    /// DeepL endpoint for the given key.
    #[must_use]
    pub fn deepl_url_for(&self, auth_key: &str) -> String {
        match &self.deepl_api_url {
            Some(url) => url.clone(),
            None if auth_key.ends_with(":fx") => api::DEEPL_FREE_API.to_string(),
            None => api::DEEPL_PRO_API.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw secret inputs, as read from the environment or CLI.
///
/// Nothing here is validated; see [`crate::credentials`].
#[derive(Clone, Default)]
pub struct CredentialSources {
    /// PEM private key content (`GH_APPKEY`).
    pub app_key: Option<String>,

    /// Fallback key file.
    pub app_key_path: PathBuf,

    /// GitHub App id (`GH_APPID`).
    pub app_id: Option<String>,

    /// DeepL auth key (`DEEPL_AUTHKEY`).
    pub deepl_auth_key: Option<String>,
}

impl CredentialSources {
    /// Read credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            app_key: std::env::var("GH_APPKEY").ok(),
            app_key_path: PathBuf::from(api::PRIVATE_KEY_PATH),
            app_id: std::env::var("GH_APPID").ok(),
            deepl_auth_key: std::env::var("DEEPL_AUTHKEY").ok(),
        }
    }
}

impl std::fmt::Debug for CredentialSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSources")
            .field("has_app_key", &self.app_key.is_some())
            .field("app_key_path", &self.app_key_path)
            .field("app_id", &self.app_id)
            .field("has_deepl_auth_key", &self.deepl_auth_key.is_some())
            .finish()
    }
}
