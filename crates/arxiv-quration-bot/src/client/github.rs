//! GitHub REST client acting as a GitHub App.
//!
//! [`GitHubAppClient`] authenticates with a short-lived RS256 JWT and can
//! list installations and mint installation tokens. [`InstallationClient`]
//! carries one installation token and files issues.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, Header};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{handle_response, http_client, send_error};
use crate::config::{Config, api};
use crate::credentials::AppCredentials;
use crate::error::ClientResult;
use crate::models::{CreatedIssue, RenderedIssue, RepoRef};

/// Seconds the JWT issue time is backdated to absorb clock drift.
const JWT_BACKDATE_SECS: i64 = 60;

/// JWT lifetime; GitHub rejects anything over ten minutes.
const JWT_LIFETIME_SECS: i64 = 9 * 60;

/// Largest page GitHub serves for list endpoints.
const INSTALLATIONS_PER_PAGE: usize = 100;

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// A GitHub App installation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Installation {
    /// Installation id.
    pub id: u64,

    /// Account the app is installed on.
    #[serde(default)]
    pub account: Option<InstallationAccount>,
}

impl Installation {
    /// Login of the account the app is installed on.
    #[must_use]
    pub fn login(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.login.as_str())
    }
}

/// Account owning an installation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallationAccount {
    /// User or organization login.
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    token: String,
    #[serde(default)]
    expires_at: Option<String>,
}

fn github_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(api::GITHUB_API_VERSION));
    headers
}

/// Client authenticated as the GitHub App itself.
#[derive(Clone)]
pub struct GitHubAppClient {
    /// HTTP client.
    client: Client,

    /// REST API base URL.
    api_url: String,

    /// App id and signing key.
    credentials: AppCredentials,

    /// Request timeout, for error reporting.
    request_timeout: Duration,
}

impl GitHubAppClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config, credentials: AppCredentials) -> ClientResult<Self> {
        Ok(Self {
            client: http_client(config, github_headers())?,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            credentials,
            request_timeout: config.request_timeout,
        })
    }

    /// Sign a fresh app JWT.
    fn app_jwt(&self) -> ClientResult<String> {
        let now = Utc::now().timestamp();
        let claims = AppClaims {
            iat: now - JWT_BACKDATE_SECS,
            exp: now + JWT_LIFETIME_SECS,
            iss: self.credentials.app_id.to_string(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.credentials.private_key,
        )?;
        Ok(token)
    }

    /// List every installation of the app, a page at a time.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn installations(&self) -> ClientResult<Vec<Installation>> {
        let url = format!("{}/app/installations", self.api_url);
        let jwt = self.app_jwt()?;
        let per_page = INSTALLATIONS_PER_PAGE.to_string();

        let mut installations = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[("per_page", per_page.as_str()), ("page", page.to_string().as_str())])
                .bearer_auth(&jwt)
                .send()
                .await
                .map_err(|e| send_error(e, self.request_timeout))?;

            let response = handle_response(response).await?;
            let value: serde_json::Value =
                response.json().await.map_err(|e| send_error(e, self.request_timeout))?;
            let batch: Vec<Installation> = serde_json::from_value(value)?;
            let count = batch.len();

            tracing::debug!(page, count, "Listed installations");

            installations.extend(batch);

            if count < INSTALLATIONS_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(installations)
    }

    /// Mint an installation token and return a client bound to it.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn installation_client(&self, installation_id: u64) -> ClientResult<InstallationClient> {
        let url = format!("{}/app/installations/{}/access_tokens", self.api_url, installation_id);
        let jwt = self.app_jwt()?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(jwt)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        let response = handle_response(response).await?;
        let value: serde_json::Value =
            response.json().await.map_err(|e| send_error(e, self.request_timeout))?;
        let token: AccessToken = serde_json::from_value(value)?;

        tracing::debug!(
            installation_id,
            expires_at = token.expires_at.as_deref().unwrap_or("unknown"),
            "Obtained installation token"
        );

        Ok(InstallationClient {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            installation_id,
            token: token.token,
            request_timeout: self.request_timeout,
        })
    }
}

impl std::fmt::Debug for GitHubAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAppClient")
            .field("api_url", &self.api_url)
            .field("app_id", &self.credentials.app_id)
            .finish()
    }
}

/// Client bound to one installation's access token.
///
/// The token is not refreshed; it is valid for an hour after minting.
#[derive(Clone)]
pub struct InstallationClient {
    /// HTTP client.
    client: Client,

    /// REST API base URL.
    api_url: String,

    /// Installation the token belongs to.
    installation_id: u64,

    /// Installation access token.
    token: String,

    /// Request timeout, for error reporting.
    request_timeout: Duration,
}

impl InstallationClient {
    /// Installation this client acts for.
    #[must_use]
    pub const fn installation_id(&self) -> u64 {
        self.installation_id
    }

    /// Open an issue.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn create_issue(
        &self,
        repo: &RepoRef,
        issue: &RenderedIssue,
    ) -> ClientResult<CreatedIssue> {
        let url = format!("{}/repos/{}/{}/issues", self.api_url, repo.owner, repo.name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(issue)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        let response = handle_response(response).await?;
        let value: serde_json::Value =
            response.json().await.map_err(|e| send_error(e, self.request_timeout))?;

        Ok(serde_json::from_value(value)?)
    }
}

impl std::fmt::Debug for InstallationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationClient")
            .field("api_url", &self.api_url)
            .field("installation_id", &self.installation_id)
            .finish()
    }
}
