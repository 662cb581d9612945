//! Pre-flight checks on a download plan

use super::plan::BridgeDownloadParameters;
use crate::platform::is_valid_version;
use crate::target::ExecutionTarget;
use reqwest::Url;
use std::path::Path;
use tracing::{debug, error, info};

const PROBE_PREFIX: &str = "temp";

pub fn is_valid_url(url: &str) -> bool {
    if url.trim().is_empty() {
        error!("Provided Bridge CLI download URL is empty");
        return false;
    }
    match Url::parse(url) {
        Ok(_) => true,
        Err(e) => {
            error!("Provided Bridge CLI download URL is not valid: {}", e);
            false
        }
    }
}

pub fn is_valid_download_version(version: &str) -> bool {
    let valid = is_valid_version(version);
    if !valid {
        error!("Provided Bridge CLI version not found in artifactory");
    }
    valid
}

/// Whether the bridge can be installed at `path`.
///
/// The parent must exist, be a directory, and accept a new file. Writability
/// is checked by creating and deleting a probe file, never from permission
/// bits.
pub fn validate_installation_path(target: &dyn ExecutionTarget, path: &Path) -> bool {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        error!(
            "The Bridge CLI installation parent path does not exist: {}",
            path.display()
        );
        return false;
    };

    if !target.exists(parent) {
        error!(
            "The Bridge CLI installation parent path does not exist: {}",
            path.display()
        );
        return false;
    }
    if !target.is_dir(parent) {
        error!(
            "The Bridge CLI installation parent path is not a directory: {}",
            parent.display()
        );
        return false;
    }

    let probe = match target.create_temp_file(parent, PROBE_PREFIX) {
        Ok(probe) => probe,
        Err(e) => {
            debug!("Probe file creation failed: {:#}", e);
            error!(
                "The Bridge CLI installation parent path is not writable: {}",
                parent.display()
            );
            return false;
        }
    };
    if let Err(e) = target.remove_file(&probe) {
        debug!("Probe file removal failed: {:#}", e);
        error!(
            "The Bridge CLI installation parent path is not writable: {}",
            parent.display()
        );
        return false;
    }
    true
}

/// All three checks run so every problem is logged; one summary on failure
pub fn perform_validation(target: &dyn ExecutionTarget, plan: &BridgeDownloadParameters) -> bool {
    let valid_url = is_valid_url(&plan.download_url);
    let valid_version = is_valid_download_version(&plan.download_version);
    let valid_path = validate_installation_path(target, &plan.installation_path);

    if valid_url && valid_version && valid_path {
        info!("Bridge download parameters are validated successfully");
        true
    } else {
        error!("Invalid Bridge CLI download parameters");
        false
    }
}
