use super::bitbucket::BitbucketProvider;
use super::github::GithubProvider;
use super::gitlab::GitlabProvider;
use super::{ScmProvider, ScmSourceType};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ScmRegistry {
    providers: HashMap<ScmSourceType, Arc<dyn ScmProvider>>,
}

impl ScmRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for id in ScmSourceType::known_variants() {
            let provider: Arc<dyn ScmProvider> = match id {
                ScmSourceType::Github => Arc::new(GithubProvider),
                ScmSourceType::Bitbucket => Arc::new(BitbucketProvider),
                ScmSourceType::Gitlab => Arc::new(GitlabProvider),
                ScmSourceType::Other(_) => continue,
            };
            registry.providers.insert(id.clone(), provider);
        }

        registry
    }

    pub fn register(&mut self, id: ScmSourceType, provider: Arc<dyn ScmProvider>) {
        self.providers.insert(id, provider);
    }

    pub fn get(&self, id: &ScmSourceType) -> Option<&dyn ScmProvider> {
        self.providers.get(id).map(|p| p.as_ref())
    }
}

impl Default for ScmRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_known_types() {
        let registry = ScmRegistry::with_defaults();

        assert_eq!(registry.get(&ScmSourceType::Github).map(|p| p.name()), Some("GitHub"));
        assert_eq!(
            registry.get(&ScmSourceType::Bitbucket).map(|p| p.name()),
            Some("Bitbucket")
        );
        assert_eq!(registry.get(&ScmSourceType::Gitlab).map(|p| p.name()), Some("GitLab"));
        assert!(registry
            .get(&ScmSourceType::Other("gitea".to_string()))
            .is_none());
    }

    #[test]
    fn test_register_custom_provider() {
        let mut registry = ScmRegistry::new();
        registry.register(
            ScmSourceType::Other("github-mirror".to_string()),
            Arc::new(GithubProvider),
        );

        assert!(registry
            .get(&ScmSourceType::Other("github-mirror".to_string()))
            .is_some());
        assert!(registry.get(&ScmSourceType::Github).is_none());
    }
}
