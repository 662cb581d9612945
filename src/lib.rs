//! scanbridge - run CI security scans through the Bridge CLI
//!
//! A job picks one scan product (Black Duck SCA, Coverity, Polaris or SRM)
//! and describes it with flat, namespaced parameters. This library turns
//! that description into something the Bridge CLI can execute:
//!
//! - Acquire the bridge: plan the download URL, version and install folder,
//!   validate them, download through the job's proxy, unzip and rename the
//!   bundle into a stable folder.
//! - Normalize parameters: merge job and global settings, resolve deprecated
//!   names, check mandatory fields and build the bridge input document.
//! - Resolve SCM context for pull request comments on GitHub, GitLab and
//!   Bitbucket multi-branch jobs.
//! - Run the bridge and translate its exit code into a build result.
//!
//! # Example Usage
//!
//! ```ignore
//! use scanbridge::config::{GlobalConfig, JobConfig};
//! use scanbridge::orchestrator::{ScanContext, ScanOrchestrator};
//! use scanbridge::bridge::{HttpDownloader, ProcessRunner};
//! use scanbridge::target::LocalTarget;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let job = JobConfig::load("scan.yml".as_ref())?;
//! let env = job.environment();
//! let context = ScanContext::new(
//!     Arc::new(LocalTarget::new()),
//!     Arc::new(HttpDownloader::new(job.env.clone(), Duration::from_secs(300))),
//!     Arc::new(ProcessRunner),
//!     job.step,
//!     std::env::current_dir()?,
//! )
//! .with_global(GlobalConfig::load(None)?)
//! .with_env(env);
//!
//! let outcome = ScanOrchestrator::new(&context).run();
//! std::process::exit(outcome.process_exit_code());
//! ```
//!
//! # Project Structure
//!
//! - [`target`]: the node the bridge is installed on
//! - [`bridge`]: download planning, installation and invocation
//! - [`params`]: parameter mapping and normalization
//! - [`scm`]: repository context for PR comments
//! - [`orchestrator`]: one scan run end to end

pub mod bridge;
pub mod cli;
pub mod codes;
pub mod config;
pub mod orchestrator;
pub mod params;
pub mod platform;
pub mod proxy;
pub mod scm;
pub mod target;
pub mod util;

pub use codes::{BuildResult, ErrorCode};
pub use config::{ConfigError, GlobalConfig, JobConfig, ScanbridgeConfig};
pub use orchestrator::{ScanContext, ScanError, ScanOrchestrator, ScanOutcome};
pub use params::{DeprecationLog, ScanProduct};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_scanbridge() {
        assert_eq!(NAME, "scanbridge");
    }
}
