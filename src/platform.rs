//! Operating system detection for the node executing the job

use crate::target::ExecutionTarget;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::{error, info};

pub const LATEST_VERSION: &str = "latest";

/// First bridge release that ships a native ARM bundle for macOS
const MAC_ARM_MIN_VERSION: (u32, u32, u32) = (2, 1, 0);

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Windows,
    Mac,
    Linux,
}

impl Os {
    /// Substring classification of a raw OS identifier
    pub fn classify(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("win") {
            Os::Windows
        } else if lowered.contains("mac") {
            Os::Mac
        } else {
            Os::Linux
        }
    }

    pub fn separator(&self) -> &'static str {
        match self {
            Os::Windows => "\\",
            _ => "/",
        }
    }

    pub fn executable_name(&self, base: &str) -> String {
        match self {
            Os::Windows => format!("{}.exe", base),
            _ => base.to_string(),
        }
    }
}

/// Probe the OS of the target. `None` means unknown and callers must fail
/// closed rather than assume linux.
pub fn detect_os(target: &dyn ExecutionTarget) -> Option<Os> {
    if target.is_remote() {
        info!("Job is running on agent node remotely");
    } else {
        info!("Job is running on the controller node");
    }

    match target.os_name() {
        Ok(name) => Some(Os::classify(&name)),
        Err(e) => {
            error!(
                "An exception occurred while fetching the OS information for the agent node: {}",
                e
            );
            None
        }
    }
}

/// Directory separator of the target, or `None` if the OS is unknown
pub fn separator(target: &dyn ExecutionTarget) -> Option<&'static str> {
    detect_os(target).map(|os| os.separator())
}

pub fn is_valid_version(version: &str) -> bool {
    version == LATEST_VERSION || VERSION_PATTERN.is_match(version)
}

fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    if !VERSION_PATTERN.is_match(version) {
        return None;
    }
    let mut parts = version.split('.').map(|p| p.parse::<u32>());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch))) => Some((major, minor, patch)),
        _ => None,
    }
}

/// Platform qualifier used in bridge bundle file names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePlatform {
    Win64,
    Mac,
    MacArm,
    Linux64,
}

impl BridgePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgePlatform::Win64 => "win64",
            BridgePlatform::Mac => "mac",
            BridgePlatform::MacArm => "mac_arm",
            BridgePlatform::Linux64 => "linux64",
        }
    }

    /// Pick the bundle flavour for `os`/`arch` and the requested version
    pub fn resolve(os: Os, arch: &str, version: &str) -> Self {
        match os {
            Os::Windows => BridgePlatform::Win64,
            Os::Linux => BridgePlatform::Linux64,
            Os::Mac => {
                let arm = matches!(arch.to_lowercase().as_str(), "aarch64" | "arm64");
                let arm_bundle_available = version == LATEST_VERSION
                    || parse_version(version)
                        .map(|v| v >= MAC_ARM_MIN_VERSION)
                        .unwrap_or(false);
                if arm && arm_bundle_available {
                    BridgePlatform::MacArm
                } else {
                    BridgePlatform::Mac
                }
            }
        }
    }
}

impl fmt::Display for BridgePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
