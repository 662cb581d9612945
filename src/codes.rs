//! Exit codes shared with the invoking job framework
//!
//! 0 is success, 1-99 come from the bridge itself, 101-109 are parameter
//! validation failures, 111-119 bridge download/install failures, 121-129
//! SCM failures and 900 is the catch-all plugin error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{info, warn};

pub type ErrorCode = i32;

pub const SCAN_SUCCESSFUL: ErrorCode = 0;

pub const BRIDGE_UNDEFINED_ERROR: ErrorCode = 1;
pub const BRIDGE_ADAPTER_ERROR: ErrorCode = 2;
pub const BRIDGE_SHUTDOWN_FAILED: ErrorCode = 3;
pub const BRIDGE_BUILD_BREAK: ErrorCode = 8;
pub const BRIDGE_STARTUP_FAILED: ErrorCode = 9;

pub const INVALID_SECURITY_PRODUCT: ErrorCode = 101;
pub const INVALID_BLACKDUCKSCA_PARAMETERS: ErrorCode = 102;
pub const INVALID_COVERITY_PARAMETERS: ErrorCode = 103;
pub const INVALID_POLARIS_PARAMETERS: ErrorCode = 104;
pub const INVALID_SRM_PARAMETERS: ErrorCode = 105;
pub const SSL_CONFIG_CONFLICT_ERROR: ErrorCode = 106;

pub const INVALID_BRIDGE_DOWNLOAD_PARAMETERS: ErrorCode = 111;
pub const BRIDGE_CLI_DOWNLOAD_FAILED: ErrorCode = 112;
pub const BRIDGE_CLI_DOWNLOAD_FAILED_AND_WONT_RETRY: ErrorCode = 113;
pub const BRIDGE_CLI_UNZIPPING_FAILED: ErrorCode = 114;
pub const BRIDGE_CLI_NOT_FOUND_IN_PROVIDED_PATH: ErrorCode = 115;

pub const NO_BITBUCKET_TOKEN_FOUND: ErrorCode = 121;
pub const NO_GITHUB_TOKEN_FOUND: ErrorCode = 122;
pub const NO_GITLAB_TOKEN_FOUND: ErrorCode = 123;
pub const INVALID_GITHUB_URL: ErrorCode = 124;
pub const INVALID_GITLAB_URL: ErrorCode = 125;
pub const SCM_PROVIDER_NOT_SUPPORTED: ErrorCode = 126;

pub const UNDEFINED_PLUGIN_ERROR: ErrorCode = 900;

static MESSAGES: LazyLock<BTreeMap<ErrorCode, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        (SCAN_SUCCESSFUL, "Security Scan execution is successful"),
        (BRIDGE_UNDEFINED_ERROR, "Undefined error, check error logs"),
        (BRIDGE_ADAPTER_ERROR, "Error from adapter"),
        (BRIDGE_SHUTDOWN_FAILED, "Failed to shutdown the Bridge"),
        (
            BRIDGE_BUILD_BREAK,
            "The config option 'bridge.break' has been set to true",
        ),
        (BRIDGE_STARTUP_FAILED, "Bridge initialization failed"),
        (INVALID_SECURITY_PRODUCT, "Invalid Security Product"),
        (
            INVALID_BLACKDUCKSCA_PARAMETERS,
            "Invalid Black Duck SCA parameters",
        ),
        (INVALID_COVERITY_PARAMETERS, "Invalid Coverity parameters"),
        (INVALID_POLARIS_PARAMETERS, "Invalid Polaris parameters"),
        (INVALID_SRM_PARAMETERS, "Invalid SRM parameters"),
        (
            SSL_CONFIG_CONFLICT_ERROR,
            "Both network_ssl_cert_file and network_ssl_trustAll are set. Only one of these resources should be set at a time.",
        ),
        (
            INVALID_BRIDGE_DOWNLOAD_PARAMETERS,
            "Bridge download parameters are not valid",
        ),
        (BRIDGE_CLI_DOWNLOAD_FAILED, "Bridge CLI download failed"),
        (
            BRIDGE_CLI_DOWNLOAD_FAILED_AND_WONT_RETRY,
            "Bridge CLI download failed and will not retry to download",
        ),
        (BRIDGE_CLI_UNZIPPING_FAILED, "Bridge CLI unzipping failed"),
        (
            BRIDGE_CLI_NOT_FOUND_IN_PROVIDED_PATH,
            "Bridge CLI could not be found in provided path",
        ),
        (NO_BITBUCKET_TOKEN_FOUND, "No Bitbucket token found"),
        (NO_GITHUB_TOKEN_FOUND, "No GitHub token found"),
        (NO_GITLAB_TOKEN_FOUND, "No GitLab token found"),
        (INVALID_GITHUB_URL, "Invalid GitHub repository URL"),
        (INVALID_GITLAB_URL, "Invalid GitLab repository URL"),
        (
            SCM_PROVIDER_NOT_SUPPORTED,
            "No supported SCM branch source was found for this job",
        ),
        (UNDEFINED_PLUGIN_ERROR, "Undefined plugin error"),
    ])
});

/// Table message for `code`, if the code is known
pub fn message(code: ErrorCode) -> Option<&'static str> {
    MESSAGES.get(&code).copied()
}

/// All known codes with their messages, ordered by code
pub fn entries() -> impl Iterator<Item = (ErrorCode, &'static str)> {
    MESSAGES.iter().map(|(code, msg)| (*code, *msg))
}

/// Human-readable report line for `code`. `undefined_detail` is appended for
/// the catch-all plugin error.
pub fn error_message(code: ErrorCode, undefined_detail: &str) -> Option<String> {
    let text = message(code)?;
    Some(match code {
        SCAN_SUCCESSFUL => text.to_string(),
        UNDEFINED_PLUGIN_ERROR => format!(
            "Workflow failed! Exit code {}: {} - {}",
            code, text, undefined_detail
        ),
        _ => format!("Workflow failed! Exit code {}: {}", code, text),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
}

impl FromStr for BuildResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SUCCESS" => Ok(BuildResult::Success),
            "UNSTABLE" => Ok(BuildResult::Unstable),
            "FAILURE" => Ok(BuildResult::Failure),
            other => Err(format!("Unsupported build status: {}", other)),
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
        };
        write!(f, "{}", s)
    }
}

/// Build result override for the build-break code; `None` for every other
/// code or for an unsupported status such as `ABORTED`
pub fn build_result_if_issues_found(code: ErrorCode, mark_build_status: &str) -> Option<BuildResult> {
    if code != BRIDGE_BUILD_BREAK {
        return None;
    }
    match mark_build_status.parse::<BuildResult>() {
        Ok(result) => {
            info!("Marking build as {} since issues are present", result);
            Some(result)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn test_success_message_has_no_prefix() {
        assert_eq!(
            error_message(SCAN_SUCCESSFUL, "").as_deref(),
            Some("Security Scan execution is successful")
        );
    }

    #[test]
    fn test_failure_message_format() {
        assert_eq!(
            error_message(INVALID_SRM_PARAMETERS, "ignored").as_deref(),
            Some("Workflow failed! Exit code 105: Invalid SRM parameters")
        );
    }

    #[test]
    fn test_undefined_plugin_error_carries_detail() {
        assert_eq!(
            error_message(UNDEFINED_PLUGIN_ERROR, "exit status 137").as_deref(),
            Some("Workflow failed! Exit code 900: Undefined plugin error - exit status 137")
        );
    }

    #[test]
    fn test_unknown_code_has_no_message() {
        assert!(message(42).is_none());
        assert!(error_message(42, "").is_none());
    }

    #[test]
    fn test_codes_stay_in_their_ranges() {
        for (code, _) in entries() {
            assert!(
                code == 0
                    || (1..=99).contains(&code)
                    || (101..=109).contains(&code)
                    || (111..=119).contains(&code)
                    || (121..=129).contains(&code)
                    || code == 900,
                "code {} outside of known ranges",
                code
            );
        }
    }

    #[parameterized(
        failure = { BRIDGE_BUILD_BREAK, "FAILURE", Some(BuildResult::Failure) },
        unstable = { BRIDGE_BUILD_BREAK, "UNSTABLE", Some(BuildResult::Unstable) },
        success = { BRIDGE_BUILD_BREAK, "SUCCESS", Some(BuildResult::Success) },
        lowercase = { BRIDGE_BUILD_BREAK, "unstable", Some(BuildResult::Unstable) },
        aborted = { BRIDGE_BUILD_BREAK, "ABORTED", None },
        other_code = { BRIDGE_ADAPTER_ERROR, "UNSTABLE", None },
    )]
    fn test_build_result_if_issues_found(code: ErrorCode, status: &str, expected: Option<BuildResult>) {
        assert_eq!(build_result_if_issues_found(code, status), expected);
    }
}
