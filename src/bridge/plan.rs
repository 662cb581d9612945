//! Where the bridge comes from and where it goes

use super::{ARTIFACTORY_URL, BUNDLE_PREFIX, DEFAULT_INSTALL_DIR, INSTALL_ROOT_DIR};
use crate::codes::{self, ErrorCode};
use crate::config::GlobalConfig;
use crate::params::{keys, RawParameters};
use crate::platform::{self, BridgePlatform, LATEST_VERSION};
use crate::target::ExecutionTarget;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Unable to determine the operating system of the target")]
    UnknownPlatform,

    #[error("Failed to fetch the default Bridge CLI installation path: {0}")]
    DefaultPath(String),

    #[error("Invalid Bridge CLI installation path '{path}': {reason}")]
    InstallPath { path: String, reason: String },
}

impl PlanError {
    pub fn exit_code(&self) -> ErrorCode {
        codes::INVALID_BRIDGE_DOWNLOAD_PARAMETERS
    }
}

/// Resolved acquisition plan for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeDownloadParameters {
    pub download_url: String,
    pub download_version: String,
    /// Absolute path of the stable bridge folder on the target
    pub installation_path: PathBuf,
    pub installed_directory_was_explicit: bool,
}

/// `<home>/.blackduck/bridge-cli-bundle` on the target
pub fn default_installation_path(target: &dyn ExecutionTarget) -> Result<PathBuf, PlanError> {
    let home = target
        .home_dir()
        .map_err(|e| PlanError::DefaultPath(e.to_string()))?;
    Ok(home.join(INSTALL_ROOT_DIR).join(DEFAULT_INSTALL_DIR))
}

/// `{prefix}-{platform}-{version}.zip`, or `{prefix}-{platform}.zip` for latest
pub fn bundle_file_name(platform: BridgePlatform, version: &str) -> String {
    if version == LATEST_VERSION {
        format!("{}-{}.zip", BUNDLE_PREFIX, platform)
    } else {
        format!("{}-{}-{}.zip", BUNDLE_PREFIX, platform, version)
    }
}

fn resolve_platform(target: &dyn ExecutionTarget, version: &str) -> Result<BridgePlatform, PlanError> {
    let os = platform::detect_os(target).ok_or(PlanError::UnknownPlatform)?;
    let arch = target.os_arch().unwrap_or_else(|e| {
        warn!("Unable to determine the target architecture: {}", e);
        String::new()
    });
    Ok(BridgePlatform::resolve(os, &arch, version))
}

/// Build the acquisition plan.
///
/// An explicit install directory replaces the default. The download URL is
/// the job's own URL, else the global one, else the canonical URL for the
/// requested version, else the canonical latest URL.
pub fn plan_download(
    target: &dyn ExecutionTarget,
    raw: &RawParameters,
    global: &GlobalConfig,
) -> Result<BridgeDownloadParameters, PlanError> {
    let explicit_path = raw
        .get_str(keys::BRIDGECLI_INSTALL_DIRECTORY)
        .map(|p| p.trim().to_string());
    let installation_path = match &explicit_path {
        Some(path) => PathBuf::from(path),
        None => default_installation_path(target)?,
    };
    let installation_path =
        target
            .absolutize(&installation_path)
            .map_err(|e| PlanError::InstallPath {
                path: installation_path.display().to_string(),
                reason: e.to_string(),
            })?;

    let mut download_version = LATEST_VERSION.to_string();
    let global_url = global
        .bridgecli_download_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    let download_url = if let Some(url) = raw.get_str(keys::BRIDGECLI_DOWNLOAD_URL) {
        url.trim().to_string()
    } else if let Some(url) = global_url {
        url.to_string()
    } else if let Some(version) = raw.get_str(keys::BRIDGECLI_DOWNLOAD_VERSION) {
        let version = version.trim().to_string();
        let platform = resolve_platform(target, &version)?;
        let url = format!(
            "{}/{}/{}",
            ARTIFACTORY_URL,
            version,
            bundle_file_name(platform, &version)
        );
        download_version = version;
        url
    } else {
        let platform = resolve_platform(target, LATEST_VERSION)?;
        format!(
            "{}/{}/{}",
            ARTIFACTORY_URL,
            LATEST_VERSION,
            bundle_file_name(platform, LATEST_VERSION)
        )
    };

    let plan = BridgeDownloadParameters {
        download_url,
        download_version,
        installation_path,
        installed_directory_was_explicit: explicit_path.is_some(),
    };
    debug!("Bridge download plan: {:?}", plan);
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MockTarget;
    use std::path::Path;

    fn raw(pairs: &[(&str, &str)]) -> RawParameters {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_defaults_to_latest_on_linux() {
        let target = MockTarget::new();

        let plan = plan_download(&target, &RawParameters::new(), &GlobalConfig::default()).unwrap();

        assert_eq!(
            plan.download_url,
            format!("{}/latest/bridge-cli-bundle-linux64.zip", ARTIFACTORY_URL)
        );
        assert_eq!(plan.download_version, "latest");
        assert_eq!(
            plan.installation_path,
            Path::new("/home/jenkins/.blackduck/bridge-cli-bundle")
        );
        assert!(!plan.installed_directory_was_explicit);
    }

    #[test]
    fn test_explicit_version_builds_versioned_url() {
        let target = MockTarget::remote("Windows Server 2022", "amd64");

        let plan = plan_download(
            &target,
            &raw(&[(keys::BRIDGECLI_DOWNLOAD_VERSION, "3.1.0")]),
            &GlobalConfig::default(),
        )
        .unwrap();

        assert_eq!(
            plan.download_url,
            format!("{}/3.1.0/bridge-cli-bundle-win64-3.1.0.zip", ARTIFACTORY_URL)
        );
        assert_eq!(plan.download_version, "3.1.0");
    }

    #[test]
    fn test_mac_arm_bundle() {
        let target = MockTarget::remote("Mac OS X", "aarch64");

        let plan = plan_download(&target, &RawParameters::new(), &GlobalConfig::default()).unwrap();

        assert!(plan.download_url.ends_with("/latest/bridge-cli-bundle-mac_arm.zip"));
    }

    #[test]
    fn test_explicit_url_beats_global_and_version() {
        let target = MockTarget::new();
        let global = GlobalConfig {
            bridgecli_download_url: Some("https://global.example/bridge.zip".to_string()),
            ..Default::default()
        };

        let plan = plan_download(
            &target,
            &raw(&[
                (keys::BRIDGECLI_DOWNLOAD_URL, " https://job.example/bridge.zip "),
                (keys::BRIDGECLI_DOWNLOAD_VERSION, "3.1.0"),
            ]),
            &global,
        )
        .unwrap();

        assert_eq!(plan.download_url, "https://job.example/bridge.zip");
        assert_eq!(plan.download_version, "latest");
    }

    #[test]
    fn test_global_url_beats_version() {
        let target = MockTarget::new();
        let global = GlobalConfig {
            bridgecli_download_url: Some("  https://global.example/bridge.zip ".to_string()),
            ..Default::default()
        };

        let plan = plan_download(
            &target,
            &raw(&[(keys::BRIDGECLI_DOWNLOAD_VERSION, "3.1.0")]),
            &global,
        )
        .unwrap();

        assert_eq!(plan.download_url, "https://global.example/bridge.zip");
    }

    #[test]
    fn test_blank_global_url_is_ignored() {
        let target = MockTarget::new();
        let global = GlobalConfig {
            bridgecli_download_url: Some("   ".to_string()),
            ..Default::default()
        };

        let plan = plan_download(&target, &RawParameters::new(), &global).unwrap();

        assert!(plan.download_url.starts_with(ARTIFACTORY_URL));
    }

    #[test]
    fn test_explicit_install_directory_is_absolutized() {
        let target = MockTarget::new();

        let plan = plan_download(
            &target,
            &raw(&[(keys::BRIDGECLI_INSTALL_DIRECTORY, "tools/bridge")]),
            &GlobalConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.installation_path, Path::new("/work/tools/bridge"));
        assert!(plan.installed_directory_was_explicit);
    }

    #[test]
    fn test_unknown_os_fails_when_platform_needed() {
        let target = MockTarget::new().without_os_probe();

        let err = plan_download(&target, &RawParameters::new(), &GlobalConfig::default()).unwrap_err();
        assert!(matches!(err, PlanError::UnknownPlatform));

        let plan = plan_download(
            &target,
            &raw(&[(keys::BRIDGECLI_DOWNLOAD_URL, "https://job.example/bridge.zip")]),
            &GlobalConfig::default(),
        );
        assert!(plan.is_ok());
    }
}
