//! Configuration for scanbridge
//!
//! Three layers feed a run:
//!
//! - `ScanbridgeConfig`: process settings from `SCANBRIDGE_*` environment
//!   variables with defaults.
//! - `GlobalConfig`: site-wide product URLs, credentials and SCM tokens from
//!   a TOML file. Any field can be overridden by `SCANBRIDGE_GLOBAL_<FIELD>`
//!   (for example `SCANBRIDGE_GLOBAL_BLACKDUCKSCA_TOKEN`).
//! - `JobConfig`: one job's step in YAML, with `mode: pipeline|freestyle`,
//!   an optional `env` map and an optional `scm` catalog.
//!
//! # Environment Variables
//!
//! - `SCANBRIDGE_REQUEST_TIMEOUT`: download connect timeout in seconds, default 300
//! - `SCANBRIDGE_LOG_LEVEL`: trace|debug|info|warn|error, default info
//! - `SCANBRIDGE_GLOBAL_CONFIG`: path of the global TOML file

use crate::params::{keys, FreestyleStep, JobStep, PipelineStep, RawParameters, ScanProduct};
use crate::proxy::EnvVars;
use crate::scm::ScmCatalog;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

pub const REQUEST_TIMEOUT_ENV: &str = "SCANBRIDGE_REQUEST_TIMEOUT";
pub const LOG_LEVEL_ENV: &str = "SCANBRIDGE_LOG_LEVEL";
pub const GLOBAL_CONFIG_ENV: &str = "SCANBRIDGE_GLOBAL_CONFIG";
pub const GLOBAL_OVERRIDE_PREFIX: &str = "SCANBRIDGE_GLOBAL_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Invalid job file: {0}")]
    Job(String),

    #[error("Invalid global configuration: {0}")]
    Global(String),

    #[error("Invalid job mode '{0}'. Valid options: pipeline, freestyle")]
    InvalidMode(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Process-level settings
#[derive(Debug, Clone)]
pub struct ScanbridgeConfig {
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub global_config_path: Option<PathBuf>,
}

impl Default for ScanbridgeConfig {
    fn default() -> Self {
        let request_timeout_secs = env::var(REQUEST_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = env::var(LOG_LEVEL_ENV)
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let global_config_path = env::var(GLOBAL_CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            request_timeout_secs,
            log_level,
            global_config_path,
        }
    }
}

impl ScanbridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 1 hour".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            ))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Display for ScanbridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scanbridge Configuration:")?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        if let Some(path) = &self.global_config_path {
            writeln!(f, "  Global Config: {}", path.display())?;
        }
        Ok(())
    }
}

macro_rules! global_fields {
    ($($field:ident),* $(,)?) => {
        /// Site-wide defaults shared by every job
        #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct GlobalConfig {
            $(pub $field: Option<String>,)*
        }

        impl GlobalConfig {
            /// Replace fields with `SCANBRIDGE_GLOBAL_<FIELD>` values when set
            pub fn apply_env_overrides(&mut self) {
                $(
                    let key = format!("{}{}", GLOBAL_OVERRIDE_PREFIX, stringify!($field).to_uppercase());
                    if let Some(value) = env::var(&key).ok().filter(|v| !v.trim().is_empty()) {
                        debug!("Global {} overridden by {}", stringify!($field), key);
                        self.$field = Some(value);
                    }
                )*
            }
        }
    };
}

global_fields! {
    blackducksca_url,
    blackducksca_token,
    detect_install_directory,
    detect_execution_path,
    coverity_url,
    coverity_user,
    coverity_passphrase,
    coverity_install_directory,
    coverity_execution_path,
    polaris_server_url,
    polaris_access_token,
    srm_url,
    srm_apikey,
    bitbucket_token,
    github_token,
    gitlab_token,
    bridgecli_download_url,
    bridgecli_install_directory,
}

impl GlobalConfig {
    /// Parse `path` if given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Global(e.to_string()))
    }

    /// Global values relevant to `product`, keyed like job parameters.
    ///
    /// The bridge download URL is left out; the download planner consults it
    /// separately, after the job's own URL and before any version.
    pub fn raw_parameters(&self, product: ScanProduct) -> RawParameters {
        let mut map = RawParameters::new();

        match product {
            ScanProduct::BlackDuckSca => {
                map.put_str(keys::BLACKDUCKSCA_URL, self.blackducksca_url.as_ref());
                map.put_str(keys::BLACKDUCKSCA_TOKEN, self.blackducksca_token.as_ref());
                map.put_str(
                    keys::DETECT_INSTALL_DIRECTORY,
                    self.detect_install_directory.as_ref(),
                );
            }
            ScanProduct::Coverity => {
                map.put_str(keys::COVERITY_URL, self.coverity_url.as_ref());
                map.put_str(keys::COVERITY_USER, self.coverity_user.as_ref());
                map.put_str(keys::COVERITY_PASSPHRASE, self.coverity_passphrase.as_ref());
                map.put_str(
                    keys::COVERITY_INSTALL_DIRECTORY,
                    self.coverity_install_directory.as_ref(),
                );
            }
            ScanProduct::Polaris => {
                map.put_str(keys::POLARIS_SERVER_URL, self.polaris_server_url.as_ref());
                map.put_str(keys::POLARIS_ACCESS_TOKEN, self.polaris_access_token.as_ref());
            }
            ScanProduct::Srm => {
                map.put_str(keys::SRM_URL, self.srm_url.as_ref());
                map.put_str(keys::SRM_APIKEY, self.srm_apikey.as_ref());
                map.put_str(keys::DETECT_EXECUTION_PATH, self.detect_execution_path.as_ref());
                map.put_str(
                    keys::COVERITY_EXECUTION_PATH,
                    self.coverity_execution_path.as_ref(),
                );
            }
        }

        map.put_str(keys::BITBUCKET_TOKEN, self.bitbucket_token.as_ref());
        map.put_str(keys::GITHUB_TOKEN, self.github_token.as_ref());
        map.put_str(keys::GITLAB_TOKEN, self.gitlab_token.as_ref());
        map.put_str(
            keys::BRIDGECLI_INSTALL_DIRECTORY,
            self.bridgecli_install_directory.as_ref(),
        );
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    Pipeline,
    Freestyle,
}

impl JobMode {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_lowercase().as_str() {
            "pipeline" => Ok(JobMode::Pipeline),
            "freestyle" => Ok(JobMode::Freestyle),
            _ => Err(ConfigError::InvalidMode(raw.to_string())),
        }
    }
}

/// One job's scan step as read from its YAML file
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub step: JobStep,
    pub env: EnvVars,
    pub scm: ScmCatalog,
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// `mode`, `env` and `scm` are split off; every other key belongs to the
    /// step. A missing `mode` means pipeline.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let mut document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Job(e.to_string()))?;
        if document.is_null() {
            document = serde_yaml::Value::Mapping(Default::default());
        }
        let mapping = document
            .as_mapping_mut()
            .ok_or_else(|| ConfigError::Job("expected a mapping at the top level".to_string()))?;

        let mode = match mapping.remove("mode") {
            Some(value) => JobMode::parse(value.as_str().unwrap_or_default())?,
            None => JobMode::Pipeline,
        };
        let env: EnvVars = match mapping.remove("env") {
            Some(value) => {
                serde_yaml::from_value(value).map_err(|e| ConfigError::Job(format!("env: {}", e)))?
            }
            None => EnvVars::new(),
        };
        let scm: ScmCatalog = match mapping.remove("scm") {
            Some(value) => {
                serde_yaml::from_value(value).map_err(|e| ConfigError::Job(format!("scm: {}", e)))?
            }
            None => ScmCatalog::default(),
        };

        let step = match mode {
            JobMode::Pipeline => JobStep::Pipeline(
                serde_yaml::from_value::<PipelineStep>(document)
                    .map_err(|e| ConfigError::Job(e.to_string()))?,
            ),
            JobMode::Freestyle => JobStep::Freestyle(
                serde_yaml::from_value::<FreestyleStep>(document)
                    .map_err(|e| ConfigError::Job(e.to_string()))?,
            ),
        };

        Ok(Self { step, env, scm })
    }

    /// Process environment overlaid with the job's own `env` entries
    pub fn environment(&self) -> EnvVars {
        let mut merged: EnvVars = env::vars().collect();
        merged.extend(self.env.clone());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn remove(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::remove(REQUEST_TIMEOUT_ENV),
            EnvGuard::remove(LOG_LEVEL_ENV),
            EnvGuard::remove(GLOBAL_CONFIG_ENV),
        ];

        let config = ScanbridgeConfig::default();

        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.global_config_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set(REQUEST_TIMEOUT_ENV, "60"),
            EnvGuard::set(LOG_LEVEL_ENV, "DEBUG"),
            EnvGuard::set(GLOBAL_CONFIG_ENV, "/etc/scanbridge.toml"),
        ];

        let config = ScanbridgeConfig::default();

        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.global_config_path,
            Some(PathBuf::from("/etc/scanbridge.toml"))
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = ScanbridgeConfig {
            request_timeout_secs: 0,
            log_level: "info".to_string(),
            global_config_path: None,
        };
        assert!(config.validate().is_err());

        let config = ScanbridgeConfig {
            request_timeout_secs: 30,
            log_level: "chatty".to_string(),
            global_config_path: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = ScanbridgeConfig {
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            global_config_path: None,
        };
        let display = format!("{}", config);
        assert!(display.contains("Scanbridge Configuration:"));
        assert!(display.contains("30s"));
    }

    #[test]
    #[serial]
    fn test_global_file_with_env_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("global.toml");
        fs::write(
            &path,
            r#"
blackducksca_url = "https://file.blackduck-url"
blackducksca_token = "file-token"
bridgecli_download_url = "https://mirror.example/bridge.zip"
"#,
        )
        .unwrap();
        let _guard = EnvGuard::set("SCANBRIDGE_GLOBAL_BLACKDUCKSCA_TOKEN", "env-token");

        let config = GlobalConfig::load(Some(&path)).unwrap();

        assert_eq!(config.blackducksca_url.as_deref(), Some("https://file.blackduck-url"));
        assert_eq!(config.blackducksca_token.as_deref(), Some("env-token"));
        assert_eq!(
            config.bridgecli_download_url.as_deref(),
            Some("https://mirror.example/bridge.zip")
        );
    }

    #[test]
    fn test_global_unknown_key_is_rejected() {
        let err = GlobalConfig::from_toml_str("blackduck_uri = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Global(_)));
    }

    #[test]
    fn test_global_raw_parameters_are_product_scoped() {
        let config = GlobalConfig {
            blackducksca_url: Some("https://fake.blackduck-url".to_string()),
            coverity_url: Some("https://fake.coverity-url".to_string()),
            github_token: Some("gh".to_string()),
            bridgecli_download_url: Some("https://mirror.example/bridge.zip".to_string()),
            ..Default::default()
        };

        let map = config.raw_parameters(ScanProduct::Coverity);

        assert_eq!(map.len(), 2);
        assert!(map.contains(keys::COVERITY_URL));
        assert!(map.contains(keys::GITHUB_TOKEN));
        assert!(!map.contains(keys::BRIDGECLI_DOWNLOAD_URL));
    }

    #[test]
    fn test_job_file_modes() {
        let job = JobConfig::from_yaml_str(
            r#"
mode: freestyle
product: polaris
polaris_sast_build_command: mvn package
env:
  HTTPS_PROXY: http://proxy.local:3128
"#,
        )
        .unwrap();

        assert!(!job.step.is_pipeline());
        assert_eq!(job.step.scan().product.as_deref(), Some("polaris"));
        assert_eq!(
            job.env.get("HTTPS_PROXY").map(String::as_str),
            Some("http://proxy.local:3128")
        );

        let job = JobConfig::from_yaml_str("product: srm\nreturn_status: true\n").unwrap();
        assert!(job.step.is_pipeline());
    }

    #[test]
    fn test_job_file_scm_catalog() {
        let job = JobConfig::from_yaml_str(
            r#"
product: blackducksca
scm:
  owners:
    - name: payments
      sources:
        - id: gh
          type: github
      active: [gh]
"#,
        )
        .unwrap();

        assert_eq!(job.scm.owners.len(), 1);
        assert_eq!(job.scm.owners[0].name, "payments");
    }

    #[test]
    fn test_invalid_mode() {
        let err = JobConfig::from_yaml_str("mode: matrix\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMode(_)));
    }

    #[test]
    fn test_empty_job_file() {
        let job = JobConfig::from_yaml_str("").unwrap();
        assert!(job.step.scan().product.is_none());
    }

    #[test]
    fn test_missing_job_file() {
        let err = JobConfig::load(Path::new("/nonexistent/job.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
