use super::provider::{env_value, split_repository_url};
use super::{ScmError, ScmProvider, ScmRepositoryContext, ScmSource, BRANCH_NAME, GIT_URL};
use crate::params::keys;
use crate::params::model::{Gitlab, GitlabRepository, Name, PullNumber, Token, Url};
use crate::params::{RawParameters, ScmSection};
use crate::proxy::EnvVars;

/// GitLab sources carry no usable owner or repository name; both come from
/// the clone URL.
pub struct GitlabProvider;

impl ScmProvider for GitlabProvider {
    fn name(&self) -> &'static str {
        "GitLab"
    }

    fn extract_repository_context(
        &self,
        source: &ScmSource,
        env: &EnvVars,
        pull_request_number: Option<u32>,
    ) -> ScmRepositoryContext {
        let repository_url = env_value(env, GIT_URL);
        let path = repository_url
            .as_deref()
            .and_then(split_repository_url)
            .map(|(_, path)| path);
        let owner = path
            .as_deref()
            .and_then(|p| p.rsplit_once('/'))
            .map(|(owner, _)| owner.to_string());

        ScmRepositoryContext {
            source_type: source.source_type.clone(),
            owner,
            repository_name: path,
            branch_name: env_value(env, BRANCH_NAME),
            repository_url,
            server_url: source.server_url.clone(),
            pull_request_number,
        }
    }

    fn bridge_section(
        &self,
        context: &ScmRepositoryContext,
        raw: &RawParameters,
    ) -> Result<ScmSection, ScmError> {
        let token = raw
            .get_str(keys::GITLAB_TOKEN)
            .ok_or(ScmError::MissingToken("GitLab"))?;

        let repository_url = context.repository_url.clone().unwrap_or_default();
        let (api, full_name) = split_repository_url(&repository_url)
            .ok_or_else(|| ScmError::InvalidRepositoryUrl("GitLab", repository_url.clone()))?;

        Ok(ScmSection::Gitlab(Gitlab {
            api: Some(Url {
                url: Some(format!("{}/", api)),
            }),
            user: Some(Token { token: Some(token) }),
            repository: Some(GitlabRepository {
                name: Some(full_name),
                branch: context.branch_name.clone().map(|name| Name { name: Some(name) }),
                pull: context.pull_request_number.map(|number| PullNumber {
                    number: Some(number),
                }),
            }),
        }))
    }
}
