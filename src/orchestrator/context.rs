//! Long-lived dependencies and inputs of one scan run

use crate::bridge::{ArtifactDownloader, BridgeRunner};
use crate::config::GlobalConfig;
use crate::params::{DeprecationLog, JobStep};
use crate::proxy::EnvVars;
use crate::scm::{ScmCatalog, ScmRegistry, JOB_NAME};
use crate::target::ExecutionTarget;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ScanContext {
    /// Node the bridge is installed on
    pub target: Arc<dyn ExecutionTarget>,

    pub downloader: Arc<dyn ArtifactDownloader>,

    pub runner: Arc<dyn BridgeRunner>,

    pub scm_registry: Arc<ScmRegistry>,

    pub step: JobStep,

    pub global: GlobalConfig,

    /// Job environment: `CHANGE_ID`, `BRANCH_NAME`, proxies and the like
    pub env: EnvVars,

    pub scm: ScmCatalog,

    /// Full job name, `<owner>/<branch>` for multi-branch jobs
    pub job_name: String,

    /// Directory the bridge runs in; its input file goes under `.bridge/`
    pub workspace: PathBuf,

    pub deprecations: DeprecationLog,
}

impl ScanContext {
    pub fn new(
        target: Arc<dyn ExecutionTarget>,
        downloader: Arc<dyn ArtifactDownloader>,
        runner: Arc<dyn BridgeRunner>,
        step: JobStep,
        workspace: PathBuf,
    ) -> Self {
        Self {
            target,
            downloader,
            runner,
            scm_registry: Arc::new(ScmRegistry::with_defaults()),
            step,
            global: GlobalConfig::default(),
            env: EnvVars::new(),
            scm: ScmCatalog::default(),
            job_name: String::new(),
            workspace,
            deprecations: DeprecationLog::new(),
        }
    }

    pub fn with_global(mut self, global: GlobalConfig) -> Self {
        self.global = global;
        self
    }

    /// Also takes the job name from `JOB_NAME` unless one was already set
    pub fn with_env(mut self, env: EnvVars) -> Self {
        if self.job_name.is_empty() {
            if let Some(name) = env.get(JOB_NAME) {
                self.job_name = name.trim().to_string();
            }
        }
        self.env = env;
        self
    }

    pub fn with_scm(mut self, scm: ScmCatalog) -> Self {
        self.scm = scm;
        self
    }

    pub fn with_job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = name.into();
        self
    }

    pub fn with_scm_registry(mut self, registry: Arc<ScmRegistry>) -> Self {
        self.scm_registry = registry;
        self
    }
}
