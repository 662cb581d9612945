//! Input document handed to the bridge executable
//!
//! Every field is optional and omitted from the JSON when unset, so a value
//! that was never configured is distinguishable from `false` or `0`.

use serde::Serialize;

/// Returns `None` for a value equal to its default, so empty sections are
/// dropped rather than serialized as `{}`
pub fn non_empty<T: Default + PartialEq>(value: T) -> Option<T> {
    if value == T::default() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Directory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Url {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Path {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Command {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Depth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prcomment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prcomment: Option<bool>,
}

// Black Duck SCA

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Failure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sarif {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severities: Option<Vec<String>>,
    #[serde(rename = "groupSCAIssues", skip_serializing_if = "Option::is_none")]
    pub group_sca_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueTypes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueTypes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reports {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sarif: Option<Sarif>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackDuckSca {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<Scan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation: Option<Prcomment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_scan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<Reports>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Detect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<Directory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Depth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<Path>,
}

// Coverity

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverityUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Policy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CoverityUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<Connect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<Directory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation: Option<Prcomment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_scan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<Command>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<Command>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<Path>,
}

// Polaris

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolarisBranch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Name>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Polaris {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<PolarisBranch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_comment: Option<PrComment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_scan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<Reports>,
}

// Software Risk Manager

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SrmProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SrmBranch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Srm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<SrmProject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<SrmBranch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_scan: Option<bool>,
}

// Shared sections

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_sym_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ssl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<Cert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_all: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_gap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<Ssl>,
}

// SCM sections

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PullNumber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GithubRepository {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Name>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Github {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<GithubRepository>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Api {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BitbucketRepository {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BitbucketProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<BitbucketRepository>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bitbucket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Api>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<BitbucketProject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Token {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GitlabRepository {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Gitlab {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Token>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<GitlabRepository>,
}

/// SCM section produced by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum ScmSection {
    Github(Github),
    Bitbucket(Bitbucket),
    Gitlab(Gitlab),
}

/// Everything under `data` in the bridge input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BridgeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blackducksca: Option<BlackDuckSca>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect: Option<Detect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverity: Option<Coverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polaris: Option<Polaris>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srm: Option<Srm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<Github>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket: Option<Bitbucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<Gitlab>,
}

impl BridgeData {
    pub fn is_empty(&self) -> bool {
        *self == BridgeData::default()
    }

    pub fn set_scm(&mut self, section: ScmSection) {
        match section {
            ScmSection::Github(github) => self.github = Some(github),
            ScmSection::Bitbucket(bitbucket) => self.bitbucket = Some(bitbucket),
            ScmSection::Gitlab(gitlab) => self.gitlab = Some(gitlab),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BridgeInput {
    pub data: BridgeData,
}
