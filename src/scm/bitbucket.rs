use super::{ScmError, ScmProvider, ScmRepositoryContext, ScmSource};
use crate::params::keys;
use crate::params::model::{Api, Bitbucket, BitbucketProject, BitbucketRepository, PullNumber};
use crate::params::{RawParameters, ScmSection};
use crate::proxy::EnvVars;

/// Bitbucket sources describe everything themselves: server, project key
/// (the repository owner) and repository.
pub struct BitbucketProvider;

impl ScmProvider for BitbucketProvider {
    fn name(&self) -> &'static str {
        "Bitbucket"
    }

    fn extract_repository_context(
        &self,
        source: &ScmSource,
        _env: &EnvVars,
        pull_request_number: Option<u32>,
    ) -> ScmRepositoryContext {
        ScmRepositoryContext {
            source_type: source.source_type.clone(),
            owner: source.repo_owner.clone(),
            repository_name: source.repository.clone(),
            branch_name: None,
            repository_url: None,
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
            .get_str(keys::BITBUCKET_TOKEN)
            .ok_or(ScmError::MissingToken("Bitbucket"))?;

        Ok(ScmSection::Bitbucket(Bitbucket {
            api: Some(Api {
                url: context.server_url.clone(),
                token: Some(token),
            }),
            project: Some(BitbucketProject {
                key: context.owner.clone(),
                repository: Some(BitbucketRepository {
                    name: context.repository_name.clone(),
                    pull: context.pull_request_number.map(|number| PullNumber {
                        number: Some(number),
                    }),
                }),
            }),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::ScmSourceType;

    fn source() -> ScmSource {
        ScmSource {
            id: "bb".to_string(),
            source_type: ScmSourceType::Bitbucket,
            repo_owner: Some("PAY".to_string()),
            repository: Some("ledger".to_string()),
            server_url: Some("https://bitbucket.acme.io".to_string()),
        }
    }

    #[test]
    fn test_bridge_section() {
        let ctx = BitbucketProvider.extract_repository_context(&source(), &EnvVars::new(), Some(3));
        let raw: RawParameters = [(keys::BITBUCKET_TOKEN, "bb-token")].into_iter().collect();

        let ScmSection::Bitbucket(bitbucket) = BitbucketProvider.bridge_section(&ctx, &raw).unwrap()
        else {
            panic!("expected bitbucket section");
        };
        let json = serde_json::to_value(&bitbucket).unwrap();

        assert_eq!(json["api"]["url"], "https://bitbucket.acme.io");
        assert_eq!(json["api"]["token"], "bb-token");
        assert_eq!(json["project"]["key"], "PAY");
        assert_eq!(json["project"]["repository"]["name"], "ledger");
        assert_eq!(json["project"]["repository"]["pull"]["number"], 3);
    }

    #[test]
    fn test_missing_token() {
        let ctx = BitbucketProvider.extract_repository_context(&source(), &EnvVars::new(), None);
        let err = BitbucketProvider
            .bridge_section(&ctx, &RawParameters::new())
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::codes::NO_BITBUCKET_TOKEN_FOUND);
    }
}
