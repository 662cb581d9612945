//! Flat configuration keys understood by the mapping and normalization steps

pub const PRODUCT: &str = "product";

pub const BLACKDUCKSCA_URL: &str = "blackducksca_url";
pub const BLACKDUCKSCA_TOKEN: &str = "blackducksca_token";
pub const BLACKDUCKSCA_SCAN_FULL: &str = "blackducksca_scan_full";
pub const BLACKDUCKSCA_SCAN_FAILURE_SEVERITIES: &str = "blackducksca_scan_failure_severities";
pub const BLACKDUCKSCA_PRCOMMENT_ENABLED: &str = "blackducksca_prComment_enabled";
pub const BLACKDUCKSCA_WAITFORSCAN: &str = "blackducksca_waitForScan";
pub const BLACKDUCKSCA_REPORTS_SARIF_CREATE: &str = "blackducksca_reports_sarif_create";
pub const BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH: &str = "blackducksca_reports_sarif_file_path";
pub const BLACKDUCKSCA_REPORTS_SARIF_SEVERITIES: &str = "blackducksca_reports_sarif_severities";
pub const BLACKDUCKSCA_REPORTS_SARIF_GROUPSCAISSUES: &str =
    "blackducksca_reports_sarif_groupSCAIssues";

pub const DETECT_INSTALL_DIRECTORY: &str = "detect_install_directory";
pub const DETECT_DOWNLOAD_URL: &str = "detect_download_url";
pub const DETECT_SEARCH_DEPTH: &str = "detect_search_depth";
pub const DETECT_CONFIG_PATH: &str = "detect_config_path";
pub const DETECT_ARGS: &str = "detect_args";
pub const DETECT_EXECUTION_PATH: &str = "detect_execution_path";

pub const COVERITY_URL: &str = "coverity_url";
pub const COVERITY_USER: &str = "coverity_user";
pub const COVERITY_PASSPHRASE: &str = "coverity_passphrase";
pub const COVERITY_PROJECT_NAME: &str = "coverity_project_name";
pub const COVERITY_STREAM_NAME: &str = "coverity_stream_name";
pub const COVERITY_POLICY_VIEW: &str = "coverity_policy_view";
pub const COVERITY_INSTALL_DIRECTORY: &str = "coverity_install_directory";
pub const COVERITY_PRCOMMENT_ENABLED: &str = "coverity_prComment_enabled";
pub const COVERITY_VERSION: &str = "coverity_version";
pub const COVERITY_LOCAL: &str = "coverity_local";
pub const COVERITY_WAITFORSCAN: &str = "coverity_waitForScan";
pub const COVERITY_BUILD_COMMAND: &str = "coverity_build_command";
pub const COVERITY_CLEAN_COMMAND: &str = "coverity_clean_command";
pub const COVERITY_CONFIG_PATH: &str = "coverity_config_path";
pub const COVERITY_ARGS: &str = "coverity_args";
pub const COVERITY_EXECUTION_PATH: &str = "coverity_execution_path";

pub const POLARIS_SERVER_URL: &str = "polaris_server_url";
pub const POLARIS_ACCESS_TOKEN: &str = "polaris_access_token";
pub const POLARIS_APPLICATION_NAME: &str = "polaris_application_name";
pub const POLARIS_PROJECT_NAME: &str = "polaris_project_name";
pub const POLARIS_ASSESSMENT_TYPES: &str = "polaris_assessment_types";
pub const POLARIS_ASSESSMENT_MODE: &str = "polaris_assessment_mode";
pub const POLARIS_TRIAGE: &str = "polaris_triage";
pub const POLARIS_BRANCH_NAME: &str = "polaris_branch_name";
pub const POLARIS_BRANCH_PARENT_NAME: &str = "polaris_branch_parent_name";
pub const POLARIS_PRCOMMENT_ENABLED: &str = "polaris_prComment_enabled";
pub const POLARIS_PRCOMMENT_SEVERITIES: &str = "polaris_prComment_severities";
pub const POLARIS_WAITFORSCAN: &str = "polaris_waitForScan";
pub const POLARIS_REPORTS_SARIF_CREATE: &str = "polaris_reports_sarif_create";
pub const POLARIS_REPORTS_SARIF_FILE_PATH: &str = "polaris_reports_sarif_file_path";
pub const POLARIS_REPORTS_SARIF_SEVERITIES: &str = "polaris_reports_sarif_severities";
pub const POLARIS_REPORTS_SARIF_GROUPSCAISSUES: &str = "polaris_reports_sarif_groupSCAIssues";
pub const POLARIS_REPORTS_SARIF_ISSUE_TYPES: &str = "polaris_reports_sarif_issue_types";

pub const SRM_URL: &str = "srm_url";
pub const SRM_APIKEY: &str = "srm_apikey";
pub const SRM_ASSESSMENT_TYPES: &str = "srm_assessment_types";
pub const SRM_PROJECT_NAME: &str = "srm_project_name";
pub const SRM_PROJECT_ID: &str = "srm_project_id";
pub const SRM_BRANCH_NAME: &str = "srm_branch_name";
pub const SRM_BRANCH_PARENT: &str = "srm_branch_parent";
pub const SRM_WAITFORSCAN: &str = "srm_waitForScan";
/// Job-level aliases folded into the detect/coverity execution paths
pub const SRM_SCA_EXECUTION_PATH: &str = "srm_sca_execution_path";
pub const SRM_SAST_EXECUTION_PATH: &str = "srm_sast_execution_path";

pub const PROJECT_DIRECTORY: &str = "project_directory";
pub const PROJECT_SOURCE_ARCHIVE: &str = "project_source_archive";
pub const PROJECT_SOURCE_PRESERVE_SYM_LINKS: &str = "project_source_preserveSymLinks";
pub const PROJECT_SOURCE_EXCLUDES: &str = "project_source_excludes";

pub const BITBUCKET_TOKEN: &str = "bitbucket_token";
pub const GITHUB_TOKEN: &str = "github_token";
pub const GITLAB_TOKEN: &str = "gitlab_token";

pub const BRIDGECLI_DOWNLOAD_URL: &str = "bridgecli_download_url";
pub const BRIDGECLI_DOWNLOAD_VERSION: &str = "bridgecli_download_version";
pub const BRIDGECLI_INSTALL_DIRECTORY: &str = "bridgecli_install_directory";
pub const INCLUDE_DIAGNOSTICS: &str = "include_diagnostics";
pub const NETWORK_AIRGAP: &str = "network_airgap";
pub const NETWORK_SSL_CERT_FILE: &str = "network_ssl_cert_file";
pub const NETWORK_SSL_TRUSTALL: &str = "network_ssl_trustAll";

pub const MARK_BUILD_STATUS: &str = "mark_build_status";
pub const RETURN_STATUS: &str = "return_status";

/// Legacy names still accepted from job files; each use is reported
pub mod legacy {
    pub const PRODUCT: &str = "synopsys_security_product";
    pub const BLACKDUCK_URL: &str = "blackduck_url";
    pub const BLACKDUCK_TOKEN: &str = "blackduck_token";
    pub const BLACKDUCK_INSTALL_DIRECTORY: &str = "blackduck_install_directory";
    pub const BLACKDUCK_SCAN_FULL: &str = "blackduck_scan_full";
    pub const BLACKDUCK_SCAN_FAILURE_SEVERITIES: &str = "blackduck_scan_failure_severities";
    pub const BLACKDUCK_AUTOMATION_PRCOMMENT: &str = "blackduck_automation_prcomment";
    pub const BLACKDUCK_DOWNLOAD_URL: &str = "blackduck_download_url";
    pub const COVERITY_AUTOMATION_PRCOMMENT: &str = "coverity_automation_prcomment";
    pub const BRIDGE_DOWNLOAD_URL: &str = "synopsys_bridge_download_url";
    pub const BRIDGE_DOWNLOAD_VERSION: &str = "synopsys_bridge_download_version";
    pub const BRIDGE_INSTALL_DIRECTORY: &str = "synopsys_bridge_install_directory";
}
