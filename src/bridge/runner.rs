//! Bridge process invocation

use super::{BRIDGE_EXECUTABLE, INPUT_DIR};
use crate::codes::{self, ErrorCode};
use crate::params::{BridgeInput, ScanProduct};
use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to write bridge input file {}: {reason}", .path.display())]
    Input { path: PathBuf, reason: String },

    #[error("Failed to start {}: {reason}", .executable.display())]
    Spawn { executable: PathBuf, reason: String },

    #[error("Bridge CLI was terminated by a signal")]
    Terminated,
}

impl RunError {
    pub fn exit_code(&self) -> ErrorCode {
        codes::UNDEFINED_PLUGIN_ERROR
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeInvocation {
    pub executable: PathBuf,
    pub stage: String,
    pub input_file: PathBuf,
    pub diagnostics: bool,
    pub working_dir: PathBuf,
}

impl BridgeInvocation {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--stage".to_string(),
            self.stage.clone(),
            "--input".to_string(),
            self.input_file.display().to_string(),
        ];
        if self.diagnostics {
            args.push("--diagnostics".to_string());
        }
        args
    }
}

/// Exit status of one bridge run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeExit {
    pub code: ErrorCode,
    pub message: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait BridgeRunner: Send + Sync {
    fn run(&self, invocation: &BridgeInvocation) -> Result<BridgeExit, RunError>;
}

/// Runs the bridge as a child process with inherited stdio
pub struct ProcessRunner;

impl BridgeRunner for ProcessRunner {
    fn run(&self, invocation: &BridgeInvocation) -> Result<BridgeExit, RunError> {
        let args = invocation.args();
        info!(
            "Executing {} {}",
            invocation.executable.display(),
            args.join(" ")
        );

        let status = Command::new(&invocation.executable)
            .args(&args)
            .current_dir(&invocation.working_dir)
            .status()
            .map_err(|e| RunError::Spawn {
                executable: invocation.executable.clone(),
                reason: e.to_string(),
            })?;

        let code = status.code().ok_or(RunError::Terminated)?;
        debug!("{} exited with {}", BRIDGE_EXECUTABLE, code);
        Ok(BridgeExit {
            code,
            message: format!("{} exited with code {}", BRIDGE_EXECUTABLE, code),
        })
    }
}

/// `<workspace>/.bridge/input_<product>.json`
pub fn input_file_path(workspace: &Path, product: ScanProduct) -> PathBuf {
    workspace
        .join(INPUT_DIR)
        .join(format!("input_{}.json", product.name().to_lowercase()))
}

pub fn write_input(workspace: &Path, product: ScanProduct, input: &BridgeInput) -> Result<PathBuf, RunError> {
    let path = input_file_path(workspace, product);
    let fail = |reason: String| RunError::Input {
        path: path.clone(),
        reason,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(input).map_err(|e| fail(e.to_string()))?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    // Owner-only, the document carries credentials
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(&path).map_err(|e| fail(e.to_string()))?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .map_err(|e| fail(e.to_string()))?;
    file.write_all(json.as_bytes())
        .map_err(|e| fail(e.to_string()))?;
    debug!("Wrote bridge input to {}", path.display());
    Ok(path)
}

/// Remove the input file; it holds credentials
pub fn remove_input(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove bridge input file {}: {}", path.display(), e);
    }
}
