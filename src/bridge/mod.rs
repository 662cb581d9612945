//! Bridge CLI acquisition and invocation

pub mod download;
pub mod install;
pub mod plan;
pub mod runner;
pub mod validate;

pub use download::{ArtifactDownloader, DownloadError, HttpDownloader};
pub use install::{acquire, ensure_install_root, install, installed_version, InstallError};
pub use plan::{plan_download, BridgeDownloadParameters, PlanError};
pub use runner::{BridgeExit, BridgeInvocation, BridgeRunner, ProcessRunner, RunError};
pub use validate::{perform_validation, validate_installation_path};

pub const ARTIFACTORY_URL: &str =
    "https://repo.blackduck.com/bds-integrations-release/com/blackduck/integration/bridge/binaries/bridge-cli-bundle";

/// Name prefix of bundle archives and of the folder each archive unpacks to
pub const BUNDLE_PREFIX: &str = "bridge-cli-bundle";

pub const BRIDGE_EXECUTABLE: &str = "bridge-cli";
pub const VERSIONS_FILE: &str = "versions.txt";

/// Directory under the target's home holding the default install
pub const INSTALL_ROOT_DIR: &str = ".blackduck";
pub const DEFAULT_INSTALL_DIR: &str = "bridge-cli-bundle";

/// Workspace directory for bridge input files
pub const INPUT_DIR: &str = ".bridge";
