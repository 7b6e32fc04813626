//! Credential resolution and GitHub App installation lookup.

use std::path::Path;

use jsonwebtoken::EncodingKey;

use crate::client::{GitHubAppClient, Installation, InstallationClient};
use crate::config::{Config, CredentialSources};
use crate::error::{BotError, BotResult};

/// GitHub App identity.
#[derive(Clone)]
pub struct AppCredentials {
    /// Numeric app id.
    pub app_id: u64,

    /// RSA signing key.
    pub private_key: EncodingKey,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials").field("app_id", &self.app_id).finish()
    }
}

/// Everything the run needs to authenticate.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    /// GitHub App identity.
    pub app: AppCredentials,

    /// DeepL auth key.
    pub deepl_auth_key: String,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Private key PEM: the given value, else the contents of `path`.
pub fn resolve_private_key(value: Option<&str>, path: &Path) -> BotResult<String> {
    if let Some(key) = present(value) {
        return Ok(key.to_string());
    }

    match std::fs::read_to_string(path) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        Ok(_) => Err(BotError::configuration(format!(
            "GH_APPKEY is not set and {} is empty",
            path.display()
        ))),
        Err(e) => Err(BotError::configuration(format!(
            "GH_APPKEY is not set and {} could not be read: {e}",
            path.display()
        ))),
    }
}

/// Numeric GitHub App id.
pub fn parse_app_id(value: Option<&str>) -> BotResult<u64> {
    let raw = present(value).ok_or_else(|| BotError::configuration("GH_APPID is not set"))?;
    raw.parse()
        .map_err(|_| BotError::configuration(format!("GH_APPID must be numeric, got '{raw}'")))
}

/// Validate every credential before any network call.
pub fn resolve(sources: &CredentialSources) -> BotResult<ResolvedCredentials> {
    let app_id = parse_app_id(sources.app_id.as_deref())?;
    let pem = resolve_private_key(sources.app_key.as_deref(), &sources.app_key_path)?;
    let private_key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
        BotError::configuration(format!("GitHub App private key is not a valid RSA PEM: {e}"))
    })?;

    let deepl_auth_key = present(sources.deepl_auth_key.as_deref())
        .ok_or_else(|| BotError::configuration("DEEPL_AUTHKEY is not set"))?
        .to_string();

    Ok(ResolvedCredentials { app: AppCredentials { app_id, private_key }, deepl_auth_key })
}

/// Pick the installation to act as.
///
/// A single installation is used as is. With several, the one installed on
/// `owner` wins; anything else is an error rather than a guess.
pub fn select_installation<'a>(
    installations: &'a [Installation],
    owner: &str,
) -> BotResult<&'a Installation> {
    match installations {
        [] => Err(BotError::authentication("the GitHub App has no installations")),
        [only] => Ok(only),
        many => many
            .iter()
            .find(|i| i.login().is_some_and(|login| login.eq_ignore_ascii_case(owner)))
            .ok_or_else(|| {
                BotError::authentication(format!(
                    "{} installations found and none belongs to '{owner}'",
                    many.len()
                ))
            }),
    }
}

/// Authenticate as the app and return a client for the target repository's
/// installation.
pub async fn connect(config: &Config, app: AppCredentials) -> BotResult<InstallationClient> {
    let app_id = app.app_id;
    let client = GitHubAppClient::new(config, app)
        .map_err(|e| BotError::authentication_with("failed to build GitHub client", e))?;

    let installations = client
        .installations()
        .await
        .map_err(|e| BotError::authentication_with("failed to list installations", e))?;

    let installation = select_installation(&installations, &config.target_repo.owner)?;

    tracing::info!(
        app_id,
        installation_id = installation.id,
        account = installation.login().unwrap_or("unknown"),
        "Selected GitHub App installation"
    );

    client.installation_client(installation.id).await.map_err(|e| {
        BotError::authentication_with(
            format!("failed to obtain a token for installation {}", installation.id),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::client::InstallationAccount;

    fn installation(id: u64, login: &str) -> Installation {
        Installation { id, account: Some(InstallationAccount { login: login.to_string() }) }
    }

    #[test]
    fn test_env_key_wins_over_file() {
        let key = resolve_private_key(Some("PEM"), Path::new("/nonexistent/key.pem")).unwrap();
        assert_eq!(key, "PEM");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = resolve_private_key(None, Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(matches!(err, BotError::Configuration { .. }));

        let err = resolve_private_key(Some("  "), Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(matches!(err, BotError::Configuration { .. }));
    }

    #[test]
    fn test_parse_app_id() {
        assert_eq!(parse_app_id(Some("352129")).unwrap(), 352_129);
        assert_eq!(parse_app_id(Some(" 42 ")).unwrap(), 42);
        assert!(matches!(parse_app_id(None), Err(BotError::Configuration { .. })));
        assert!(matches!(parse_app_id(Some("abc")), Err(BotError::Configuration { .. })));
    }

    #[test]
    fn test_resolve_rejects_invalid_pem() {
        let sources = CredentialSources {
            app_key: Some("not a key".into()),
            app_key_path: PathBuf::from("/nonexistent"),
            app_id: Some("1".into()),
            deepl_auth_key: Some("k".into()),
        };
        let err = resolve(&sources).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_select_single_installation() {
        let installations = vec![installation(7, "someone-else")];
        assert_eq!(select_installation(&installations, "arXivQuration").unwrap().id, 7);
    }

    #[test]
    fn test_select_no_installation() {
        let err = select_installation(&[], "arXivQuration").unwrap_err();
        assert!(matches!(err, BotError::Authentication { .. }));
    }

    #[test]
    fn test_select_by_owner() {
        let installations = vec![installation(1, "other"), installation(2, "arxivquration")];
        assert_eq!(select_installation(&installations, "arXivQuration").unwrap().id, 2);
    }

    #[test]
    fn test_select_ambiguous() {
        let installations = vec![installation(1, "a"), installation(2, "b")];
        let err = select_installation(&installations, "arXivQuration").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
