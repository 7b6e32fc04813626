//! GitHub issue models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// An issue ready to be filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedIssue {
    /// Issue title.
    pub title: String,

    /// Markdown body.
    pub body: String,
}

/// An issue GitHub accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    /// Issue number within the repository.
    pub number: u64,

    /// Browser URL.
    pub html_url: String,
}

/// A repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Owning user or organization.
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Create a repository reference.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }
}

impl FromStr for RepoRef {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(BotError::configuration(format!(
                "repository must be in owner/name form, got '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
