//! Bridge bundle installation on the execution target

use super::download::{ArtifactDownloader, DownloadError};
use super::plan::BridgeDownloadParameters;
use super::{BRIDGE_EXECUTABLE, BUNDLE_PREFIX, VERSIONS_FILE};
use crate::codes::{self, ErrorCode};
use crate::platform::{self, LATEST_VERSION};
use crate::target::{ExecutionTarget, Interrupted};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, error, info, warn};

static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("valid semver regex"));

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Unzipping Bridge CLI zip file failed: {0}")]
    Unzip(String),

    #[error("Bridge CLI installation was interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Failed to prepare Bridge CLI download: {0}")]
    Archive(String),

    #[error("Bridge CLI could not be found in provided path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unable to determine the operating system of the target")]
    UnknownPlatform,

    #[error("Invalid Bridge CLI installation path: {}", .0.display())]
    InvalidPath(PathBuf),
}

impl InstallError {
    pub fn exit_code(&self) -> ErrorCode {
        match self {
            InstallError::Unzip(_) | InstallError::Interrupted(_) => {
                codes::BRIDGE_CLI_UNZIPPING_FAILED
            }
            InstallError::Download(e) => e.exit_code(),
            InstallError::Archive(_) => codes::BRIDGE_CLI_DOWNLOAD_FAILED,
            InstallError::NotFound(_) => codes::BRIDGE_CLI_NOT_FOUND_IN_PROVIDED_PATH,
            InstallError::UnknownPlatform | InstallError::InvalidPath(_) => {
                codes::INVALID_BRIDGE_DOWNLOAD_PARAMETERS
            }
        }
    }
}

fn is_bundle_folder(name: &str) -> bool {
    name.starts_with(&format!("{}-", BUNDLE_PREFIX))
}

/// Extract `archive` into `install_root` and rename the single versioned
/// bundle folder to `target_subfolder`.
///
/// A previous `target_subfolder` is removed first. Zero or several matching
/// folders leave the extracted tree untouched with a warning. The archive is
/// always deleted afterwards; failing to delete it only warns.
pub fn install(
    target: &dyn ExecutionTarget,
    archive: &Path,
    install_root: &Path,
    target_subfolder: &str,
) -> Result<(), InstallError> {
    let result = extract_and_rename(target, archive, install_root, target_subfolder);

    if let Err(e) = target.remove_file(archive) {
        warn!("An exception occurred while deleting the Bridge CLI zip file: {:#}", e);
    }
    result
}

fn extract_and_rename(
    target: &dyn ExecutionTarget,
    archive: &Path,
    install_root: &Path,
    target_subfolder: &str,
) -> Result<(), InstallError> {
    let target_folder = install_root.join(target_subfolder);
    let fail = |e: anyhow::Error| {
        error!("An exception occurred while unzipping Bridge CLI zip file: {:#}", e);
        if e.downcast_ref::<Interrupted>().is_some() {
            InstallError::Interrupted(e.to_string())
        } else {
            InstallError::Unzip(format!("{:#}", e))
        }
    };

    if target.exists(&target_folder) {
        info!("Deleting previous Bridge CLI folder: {}", target_folder.display());
        target.remove_dir_all(&target_folder).map_err(fail)?;
    }

    info!("Unzipping Bridge CLI zip file from: {}", archive.display());
    target.unzip(archive, install_root).map_err(fail)?;
    info!("Bridge CLI installed successfully in: {}", install_root.display());

    let matching: Vec<_> = target
        .list_directories(install_root)
        .map_err(fail)?
        .into_iter()
        .filter(|dir| is_bundle_folder(dir.file_name()))
        .collect();

    match matching.as_slice() {
        [] => warn!("No folders matching '{}-*' pattern found.", BUNDLE_PREFIX),
        [unzipped] => {
            if target.exists(&target_folder) {
                info!(
                    "Target folder already exists, skipping renaming: {}",
                    target_folder.display()
                );
            } else {
                info!(
                    "Renaming folder {} to {}",
                    unzipped.path().display(),
                    target_folder.display()
                );
                target.rename(unzipped.path(), &target_folder).map_err(fail)?;
            }
        }
        _ => warn!("Multiple folders matching '{}-*' pattern found.", BUNDLE_PREFIX),
    }
    Ok(())
}

/// Create the default install root if it does not exist yet
pub fn ensure_install_root(target: &dyn ExecutionTarget, path: &Path) {
    if target.exists(path) {
        return;
    }
    match target.create_dir_all(path) {
        Ok(()) => info!("Created bridge installation directory at: {}", path.display()),
        Err(e) => error!(
            "Failed to create default installation directory {}: {:#}",
            path.display(),
            e
        ),
    }
}

/// First `x.y.z` found in `text`
pub fn parse_version(text: &str) -> Option<String> {
    SEMVER.find(text).map(|m| m.as_str().to_string())
}

/// Version recorded in the bundle's `versions.txt`, if readable
pub fn installed_version(target: &dyn ExecutionTarget, folder: &Path) -> Option<String> {
    let path = folder.join(VERSIONS_FILE);
    if !target.exists(&path) {
        return None;
    }
    match target.read_to_string(&path) {
        Ok(content) => parse_version(&content),
        Err(e) => {
            debug!("Unable to read {}: {:#}", path.display(), e);
            None
        }
    }
}

/// Version the plan will download, when it can be known up front.
///
/// Explicit versions are used as-is; URLs under a `latest` directory ask the
/// server's `versions.txt`; any other URL is searched for a version number.
fn requested_version(
    plan: &BridgeDownloadParameters,
    downloader: &dyn ArtifactDownloader,
) -> Option<String> {
    if plan.download_version != LATEST_VERSION {
        return Some(plan.download_version.clone());
    }

    let marker = format!("/{}/", LATEST_VERSION);
    if let Some(idx) = plan.download_url.find(&marker) {
        let versions_url = format!("{}{}{}", &plan.download_url[..idx], marker, VERSIONS_FILE);
        return match downloader.fetch_text(&versions_url) {
            Ok(text) => parse_version(&text),
            Err(e) => {
                warn!("Unable to determine the latest Bridge CLI version: {}", e);
                None
            }
        };
    }

    parse_version(&plan.download_url)
}

/// Make the bridge available according to `plan` and return its executable.
///
/// In airgap mode nothing is downloaded and the executable must already be
/// present. Otherwise the download is skipped when the installed version
/// equals the requested one.
pub fn acquire(
    target: &dyn ExecutionTarget,
    downloader: &dyn ArtifactDownloader,
    plan: &BridgeDownloadParameters,
    airgap: bool,
) -> Result<PathBuf, InstallError> {
    let os = platform::detect_os(target).ok_or(InstallError::UnknownPlatform)?;
    let folder = &plan.installation_path;
    let executable = folder.join(os.executable_name(BRIDGE_EXECUTABLE));

    if airgap {
        info!("Network air gap is enabled, skipping Bridge CLI download");
        return if target.exists(&executable) {
            Ok(executable)
        } else {
            error!("Bridge CLI could not be found in {}", folder.display());
            Err(InstallError::NotFound(folder.clone()))
        };
    }

    let (Some(install_root), Some(subfolder)) = (
        folder.parent(),
        folder.file_name().and_then(|n| n.to_str()),
    ) else {
        return Err(InstallError::InvalidPath(folder.clone()));
    };

    if target.exists(&executable) {
        let installed = installed_version(target, folder);
        let requested = requested_version(plan, downloader);
        if installed.is_some() && installed == requested {
            info!(
                "Bridge CLI version {} is already installed, skipping download",
                installed.as_deref().unwrap_or_default()
            );
            return Ok(executable);
        }
        debug!("Installed {:?}, requested {:?}", installed, requested);
    }

    if !plan.installed_directory_was_explicit {
        ensure_install_root(target, install_root);
    }

    let archive = install_root.join(format!("{}.zip", BUNDLE_PREFIX));
    let sink = target
        .create_file(&archive)
        .map_err(|e| InstallError::Archive(format!("{:#}", e)))?;
    if let Err(e) = downloader.download(&plan.download_url, sink) {
        error!("Bridge CLI download failed: {}", e);
        if let Err(cleanup) = target.remove_file(&archive) {
            debug!("Partial download not removed: {:#}", cleanup);
        }
        return Err(e.into());
    }

    install(target, &archive, install_root, subfolder)?;

    if target.exists(&executable) {
        Ok(executable)
    } else {
        error!("Bridge CLI executable not found after installation: {}", executable.display());
        Err(InstallError::NotFound(folder.clone()))
    }
}
