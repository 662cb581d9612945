//! SCM source catalog: which job owns which repository sources

use serde::Deserialize;

crate::define_id_enum! {
    /// Kind of repository host behind a job's SCM source
    ScmSourceType {
        Github => "github" | "github.com" | "ghe",
        Bitbucket => "bitbucket" | "bitbucket-server" | "bitbucket-dc",
        Gitlab => "gitlab" | "gitlab.com",
    }
}

/// One repository source configured on a multi-branch job
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScmSource {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: ScmSourceType,
    #[serde(default)]
    pub repo_owner: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub server_url: Option<String>,
}

/// A top-level job that owns SCM sources
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScmOwner {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<ScmSource>,
    /// Ids of the sources the owner currently reports as active
    #[serde(default)]
    pub active: Vec<String>,
}

impl ScmOwner {
    /// First configured source that the owner reports as active
    pub fn active_source(&self) -> Option<&ScmSource> {
        self.sources
            .iter()
            .find(|source| self.active.iter().any(|id| id == &source.id))
    }
}

/// Lookup of an owning job by its top-level name
pub trait ScmOwnerLookup {
    fn find_owner(&self, name: &str) -> Option<&ScmOwner>;
}

/// Owners declared in the job file's `scm` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScmCatalog {
    #[serde(default)]
    pub owners: Vec<ScmOwner>,
}

impl ScmOwnerLookup for ScmCatalog {
    fn find_owner(&self, name: &str) -> Option<&ScmOwner> {
        self.owners.iter().find(|owner| owner.name == name)
    }
}
