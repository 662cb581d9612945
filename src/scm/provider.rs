use super::{ScmError, ScmRepositoryContext, ScmSource};
use crate::params::{RawParameters, ScmSection};
use crate::proxy::EnvVars;
use reqwest::Url;

/// A repository host the bridge can comment on.
///
/// Providers turn the active SCM source plus the job environment into a
/// repository context, and the context plus the configured token into the
/// bridge's SCM section.
pub trait ScmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract_repository_context(
        &self,
        source: &ScmSource,
        env: &EnvVars,
        pull_request_number: Option<u32>,
    ) -> ScmRepositoryContext;

    fn bridge_section(
        &self,
        context: &ScmRepositoryContext,
        raw: &RawParameters,
    ) -> Result<ScmSection, ScmError>;
}

/// Value of `key` from the job environment, ignoring blanks
pub(crate) fn env_value(env: &EnvVars, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Origin of an http(s) URL (scheme, host and any non-default port) plus the
/// repository path without a trailing `.git`
pub(crate) fn split_repository_url(url: &str) -> Option<(String, String)> {
    let url = Url::parse(url.trim()).ok()?;
    if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let path = segments.join("/");
    let path = path.strip_suffix(".git").unwrap_or(&path);
    if path.is_empty() {
        return None;
    }
    Some((url.origin().ascii_serialization(), path.to_string()))
}
