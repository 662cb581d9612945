//! Repository context for pull-request comments
//!
//! A multi-branch job is identified by the part of `JOB_NAME` before the
//! first `/`. Its active SCM source decides which provider describes the
//! repository to the bridge.

pub mod bitbucket;
pub mod github;
pub mod gitlab;
pub mod provider;
pub mod registry;
pub mod source;

pub use provider::ScmProvider;
pub use registry::ScmRegistry;
pub use source::{ScmCatalog, ScmOwner, ScmOwnerLookup, ScmSource, ScmSourceType};

use crate::codes::{self, ErrorCode};
use crate::proxy::EnvVars;
use thiserror::Error;
use tracing::{debug, warn};

pub const CHANGE_ID: &str = "CHANGE_ID";
pub const JOB_NAME: &str = "JOB_NAME";
pub const BRANCH_NAME: &str = "BRANCH_NAME";
pub const GIT_URL: &str = "GIT_URL";

#[derive(Debug, Error)]
pub enum ScmError {
    #[error("No {0} token found")]
    MissingToken(&'static str),

    #[error("Invalid {0} repository URL: '{1}'")]
    InvalidRepositoryUrl(&'static str, String),

    #[error("PR comments require a GitHub, GitLab or Bitbucket multi-branch job")]
    Unsupported,
}

impl ScmError {
    pub fn exit_code(&self) -> ErrorCode {
        match self {
            ScmError::MissingToken("Bitbucket") => codes::NO_BITBUCKET_TOKEN_FOUND,
            ScmError::MissingToken("GitLab") => codes::NO_GITLAB_TOKEN_FOUND,
            ScmError::MissingToken(_) => codes::NO_GITHUB_TOKEN_FOUND,
            ScmError::InvalidRepositoryUrl("GitLab", _) => codes::INVALID_GITLAB_URL,
            ScmError::InvalidRepositoryUrl(_, _) => codes::INVALID_GITHUB_URL,
            ScmError::Unsupported => codes::SCM_PROVIDER_NOT_SUPPORTED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScmRepositoryContext {
    pub source_type: ScmSourceType,
    pub owner: Option<String>,
    pub repository_name: Option<String>,
    pub branch_name: Option<String>,
    pub repository_url: Option<String>,
    pub server_url: Option<String>,
    pub pull_request_number: Option<u32>,
}

/// Top-level job name, or `None` for jobs that are not multi-branch
pub fn top_level_job_name(job_full_name: &str) -> Option<&str> {
    job_full_name
        .split_once('/')
        .map(|(top, _)| top)
        .filter(|top| !top.is_empty())
}

/// Pull request number from `CHANGE_ID`; unparsable values are ignored
pub fn pull_request_number(env: &EnvVars) -> Option<u32> {
    let raw = provider::env_value(env, CHANGE_ID)?;
    match raw.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!("Ignoring non-numeric {} '{}'", CHANGE_ID, raw);
            None
        }
    }
}

/// Repository context for the job named `job_full_name`.
///
/// Returns `None` when the job is not multi-branch, its owner is unknown, it
/// has no active source, or the source type has no registered provider.
pub fn resolve(
    job_full_name: &str,
    env: &EnvVars,
    lookup: &dyn ScmOwnerLookup,
    registry: &ScmRegistry,
) -> Option<ScmRepositoryContext> {
    let job_name = top_level_job_name(job_full_name)?;
    let owner = lookup.find_owner(job_name)?;
    let source = owner.active_source()?;

    let Some(provider) = registry.get(&source.source_type) else {
        debug!("No SCM provider for source type '{}'", source.source_type);
        return None;
    };

    let context = provider.extract_repository_context(source, env, pull_request_number(env));
    debug!(
        "Resolved {} repository {:?} for job '{}'",
        provider.name(),
        context.repository_name,
        job_name
    );
    Some(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ScmCatalog {
        serde_yaml::from_str(
            r#"
owners:
  - name: payments
    sources:
      - id: gh
        type: github
        repo_owner: acme
        repository: payments
    active: [gh]
  - name: mirror
    sources:
      - id: gitea
        type: gitea
    active: [gitea]
"#,
        )
        .unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> EnvVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_top_level_job_name() {
        assert_eq!(top_level_job_name("payments/PR-7"), Some("payments"));
        assert_eq!(top_level_job_name("payments/feature/x"), Some("payments"));
        assert_eq!(top_level_job_name("freestyle-job"), None);
        assert_eq!(top_level_job_name("/PR-7"), None);
    }

    #[test]
    fn test_resolve_github_context() {
        let env = env(&[
            (CHANGE_ID, "7"),
            (BRANCH_NAME, "PR-7"),
            (GIT_URL, "https://github.com/acme/payments.git"),
        ]);

        let ctx = resolve("payments/PR-7", &env, &catalog(), &ScmRegistry::with_defaults()).unwrap();

        assert_eq!(ctx.source_type, ScmSourceType::Github);
        assert_eq!(ctx.owner.as_deref(), Some("acme"));
        assert_eq!(ctx.pull_request_number, Some(7));
    }

    #[test]
    fn test_resolve_without_multibranch_job() {
        let registry = ScmRegistry::with_defaults();
        assert!(resolve("payments", &EnvVars::new(), &catalog(), &registry).is_none());
        assert!(resolve("unknown/PR-1", &EnvVars::new(), &catalog(), &registry).is_none());
    }

    #[test]
    fn test_resolve_unsupported_source_type() {
        let registry = ScmRegistry::with_defaults();
        assert!(resolve("mirror/main", &EnvVars::new(), &catalog(), &registry).is_none());
    }

    #[test]
    fn test_non_numeric_change_id_is_ignored() {
        assert_eq!(pull_request_number(&env(&[(CHANGE_ID, "abc")])), None);
        assert_eq!(pull_request_number(&env(&[(CHANGE_ID, " 42 ")])), Some(42));
        assert_eq!(pull_request_number(&EnvVars::new()), None);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ScmError::MissingToken("Bitbucket").exit_code(),
            codes::NO_BITBUCKET_TOKEN_FOUND
        );
        assert_eq!(
            ScmError::InvalidRepositoryUrl("GitLab", String::new()).exit_code(),
            codes::INVALID_GITLAB_URL
        );
        assert_eq!(ScmError::Unsupported.exit_code(), codes::SCM_PROVIDER_NOT_SUPPORTED);
    }
}
