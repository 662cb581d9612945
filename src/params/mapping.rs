//! Job step surfaces flattened into the raw parameter map
//!
//! A pipeline step and a freestyle step expose overlapping but different
//! fields. Both are collapsed here into one `RawParameters`, with job values
//! taking precedence over global configuration and current key names over
//! their deprecated counterparts.

use super::deprecation::DeprecationLog;
use super::keys::{self, legacy};
use super::normalize::ValidationError;
use super::product::{validate_product, ScanProduct};
use super::raw::RawParameters;
use crate::config::GlobalConfig;
use crate::proxy::is_blank;
use serde::Deserialize;
use tracing::debug;

/// Fields shared by both job-trigger modes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanFields {
    pub product: Option<String>,

    pub blackducksca_url: Option<String>,
    pub blackducksca_token: Option<String>,
    pub blackducksca_scan_full: Option<bool>,
    pub blackducksca_scan_failure_severities: Option<String>,
    #[serde(rename = "blackducksca_waitForScan")]
    pub blackducksca_wait_for_scan: Option<bool>,
    pub blackducksca_reports_sarif_create: Option<bool>,
    pub blackducksca_reports_sarif_file_path: Option<String>,
    pub blackducksca_reports_sarif_severities: Option<String>,
    #[serde(rename = "blackducksca_reports_sarif_groupSCAIssues")]
    pub blackducksca_reports_sarif_group_sca_issues: Option<bool>,

    pub detect_install_directory: Option<String>,
    pub detect_download_url: Option<String>,
    pub detect_search_depth: Option<i64>,
    pub detect_config_path: Option<String>,
    pub detect_args: Option<String>,
    pub detect_execution_path: Option<String>,

    pub coverity_url: Option<String>,
    pub coverity_user: Option<String>,
    pub coverity_passphrase: Option<String>,
    pub coverity_project_name: Option<String>,
    pub coverity_stream_name: Option<String>,
    pub coverity_policy_view: Option<String>,
    pub coverity_install_directory: Option<String>,
    pub coverity_version: Option<String>,
    pub coverity_local: Option<bool>,
    #[serde(rename = "coverity_waitForScan")]
    pub coverity_wait_for_scan: Option<bool>,
    pub coverity_build_command: Option<String>,
    pub coverity_clean_command: Option<String>,
    pub coverity_config_path: Option<String>,
    pub coverity_args: Option<String>,
    pub coverity_execution_path: Option<String>,

    pub polaris_server_url: Option<String>,
    pub polaris_access_token: Option<String>,
    pub polaris_application_name: Option<String>,
    pub polaris_project_name: Option<String>,
    pub polaris_assessment_types: Option<String>,
    pub polaris_assessment_mode: Option<String>,
    pub polaris_triage: Option<String>,
    pub polaris_branch_name: Option<String>,
    pub polaris_branch_parent_name: Option<String>,
    #[serde(rename = "polaris_waitForScan")]
    pub polaris_wait_for_scan: Option<bool>,
    pub polaris_reports_sarif_create: Option<bool>,
    pub polaris_reports_sarif_file_path: Option<String>,
    pub polaris_reports_sarif_severities: Option<String>,
    #[serde(rename = "polaris_reports_sarif_groupSCAIssues")]
    pub polaris_reports_sarif_group_sca_issues: Option<bool>,
    pub polaris_reports_sarif_issue_types: Option<String>,

    pub srm_url: Option<String>,
    pub srm_apikey: Option<String>,
    pub srm_assessment_types: Option<String>,
    pub srm_project_name: Option<String>,
    pub srm_project_id: Option<String>,
    pub srm_branch_name: Option<String>,
    pub srm_branch_parent: Option<String>,
    #[serde(rename = "srm_waitForScan")]
    pub srm_wait_for_scan: Option<bool>,
    pub srm_sca_execution_path: Option<String>,
    pub srm_sast_execution_path: Option<String>,

    pub project_directory: Option<String>,
    pub project_source_archive: Option<String>,
    #[serde(rename = "project_source_preserveSymLinks")]
    pub project_source_preserve_sym_links: Option<bool>,
    pub project_source_excludes: Option<String>,

    pub bitbucket_token: Option<String>,
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,

    pub bridgecli_download_url: Option<String>,
    pub bridgecli_download_version: Option<String>,
    pub bridgecli_install_directory: Option<String>,
    pub include_diagnostics: Option<bool>,
    pub network_airgap: Option<bool>,
    pub network_ssl_cert_file: Option<String>,
    #[serde(rename = "network_ssl_trustAll")]
    pub network_ssl_trust_all: Option<bool>,

    pub mark_build_status: Option<String>,
}

/// Deprecated names accepted from pipeline jobs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyFields {
    pub synopsys_security_product: Option<String>,
    pub blackduck_url: Option<String>,
    pub blackduck_token: Option<String>,
    pub blackduck_install_directory: Option<String>,
    pub blackduck_scan_full: Option<bool>,
    pub blackduck_scan_failure_severities: Option<String>,
    pub blackduck_automation_prcomment: Option<bool>,
    pub blackduck_download_url: Option<String>,
    pub coverity_automation_prcomment: Option<bool>,
    pub synopsys_bridge_download_url: Option<String>,
    pub synopsys_bridge_download_version: Option<String>,
    pub synopsys_bridge_install_directory: Option<String>,
}

/// Multi-branch, PR-aware invocation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineStep {
    #[serde(flatten)]
    pub scan: ScanFields,
    #[serde(flatten)]
    pub legacy: LegacyFields,

    #[serde(rename = "blackducksca_prComment_enabled")]
    pub blackducksca_pr_comment_enabled: Option<bool>,
    #[serde(rename = "coverity_prComment_enabled")]
    pub coverity_pr_comment_enabled: Option<bool>,
    #[serde(rename = "polaris_prComment_enabled")]
    pub polaris_pr_comment_enabled: Option<bool>,
    #[serde(rename = "polaris_prComment_severities")]
    pub polaris_pr_comment_severities: Option<String>,

    pub return_status: Option<bool>,
}

/// Direct invocation. Polaris and SRM take their SAST/SCA tool settings from
/// product-prefixed fields instead of the Coverity and Detect ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FreestyleStep {
    #[serde(flatten)]
    pub scan: ScanFields,

    pub polaris_sast_build_command: Option<String>,
    pub polaris_sast_clean_command: Option<String>,
    pub polaris_sast_config_path: Option<String>,
    pub polaris_sast_args: Option<String>,
    pub polaris_sca_search_depth: Option<i64>,
    pub polaris_sca_config_path: Option<String>,
    pub polaris_sca_args: Option<String>,

    pub srm_sast_build_command: Option<String>,
    pub srm_sast_clean_command: Option<String>,
    pub srm_sast_config_path: Option<String>,
    pub srm_sast_args: Option<String>,
    pub srm_sca_search_depth: Option<i64>,
    pub srm_sca_config_path: Option<String>,
    pub srm_sca_args: Option<String>,
}

#[derive(Debug, Clone)]
pub enum JobStep {
    Pipeline(PipelineStep),
    Freestyle(FreestyleStep),
}

struct SastFields<'a> {
    build_command: Option<&'a String>,
    clean_command: Option<&'a String>,
    config_path: Option<&'a String>,
    args: Option<&'a String>,
}

struct ScaFields<'a> {
    search_depth: Option<i64>,
    config_path: Option<&'a String>,
    args: Option<&'a String>,
}

fn put_sast(map: &mut RawParameters, sast: SastFields<'_>) {
    map.put_str(keys::COVERITY_BUILD_COMMAND, sast.build_command);
    map.put_str(keys::COVERITY_CLEAN_COMMAND, sast.clean_command);
    map.put_str(keys::COVERITY_CONFIG_PATH, sast.config_path);
    map.put_str(keys::COVERITY_ARGS, sast.args);
}

fn put_sca(map: &mut RawParameters, sca: ScaFields<'_>) {
    map.put_int(keys::DETECT_SEARCH_DEPTH, sca.search_depth);
    map.put_str(keys::DETECT_CONFIG_PATH, sca.config_path);
    map.put_str(keys::DETECT_ARGS, sca.args);
}

/// Current value if set, otherwise the deprecated one; a set deprecated
/// value is always recorded
fn merged_str(
    current: &Option<String>,
    deprecated: &Option<String>,
    deprecated_key: &str,
    log: &DeprecationLog,
) -> Option<String> {
    let deprecated = deprecated.as_ref().filter(|v| !is_blank(Some(v.as_str())));
    if deprecated.is_some() {
        log.add(deprecated_key);
    }
    current
        .as_ref()
        .filter(|v| !is_blank(Some(v.as_str())))
        .or(deprecated)
        .cloned()
}

fn merged_bool(
    current: Option<bool>,
    deprecated: Option<bool>,
    deprecated_key: &str,
    log: &DeprecationLog,
) -> Option<bool> {
    if deprecated.is_some() {
        log.add(deprecated_key);
    }
    current.or(deprecated)
}

impl JobStep {
    pub fn scan(&self) -> &ScanFields {
        match self {
            JobStep::Pipeline(step) => &step.scan,
            JobStep::Freestyle(step) => &step.scan,
        }
    }

    fn legacy(&self) -> Option<&LegacyFields> {
        match self {
            JobStep::Pipeline(step) => Some(&step.legacy),
            JobStep::Freestyle(_) => None,
        }
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, JobStep::Pipeline(_))
    }

    /// Selected product name as written in the job, if any
    pub fn product_name(&self, log: &DeprecationLog) -> Option<String> {
        let deprecated = self
            .legacy()
            .and_then(|l| l.synopsys_security_product.clone());
        merged_str(&self.scan().product, &deprecated, legacy::PRODUCT, log)
    }

    pub fn blackducksca_parameters(&self, log: &DeprecationLog) -> RawParameters {
        let scan = self.scan();
        let empty = LegacyFields::default();
        let old = self.legacy().unwrap_or(&empty);
        let mut map = RawParameters::new();

        let url = merged_str(&scan.blackducksca_url, &old.blackduck_url, legacy::BLACKDUCK_URL, log);
        map.put_str(keys::BLACKDUCKSCA_URL, url.as_ref());
        let token = merged_str(
            &scan.blackducksca_token,
            &old.blackduck_token,
            legacy::BLACKDUCK_TOKEN,
            log,
        );
        map.put_str(keys::BLACKDUCKSCA_TOKEN, token.as_ref());
        let install_dir = merged_str(
            &scan.detect_install_directory,
            &old.blackduck_install_directory,
            legacy::BLACKDUCK_INSTALL_DIRECTORY,
            log,
        );
        map.put_str(keys::DETECT_INSTALL_DIRECTORY, install_dir.as_ref());
        let scan_full = merged_bool(
            scan.blackducksca_scan_full,
            old.blackduck_scan_full,
            legacy::BLACKDUCK_SCAN_FULL,
            log,
        );
        map.put_bool(keys::BLACKDUCKSCA_SCAN_FULL, scan_full);
        let severities = merged_str(
            &scan.blackducksca_scan_failure_severities,
            &old.blackduck_scan_failure_severities,
            legacy::BLACKDUCK_SCAN_FAILURE_SEVERITIES,
            log,
        );
        map.put_str(keys::BLACKDUCKSCA_SCAN_FAILURE_SEVERITIES, severities.as_ref());
        let download_url = merged_str(
            &scan.detect_download_url,
            &old.blackduck_download_url,
            legacy::BLACKDUCK_DOWNLOAD_URL,
            log,
        );
        map.put_str(keys::DETECT_DOWNLOAD_URL, download_url.as_ref());

        if let JobStep::Pipeline(step) = self {
            let pr_comment = merged_bool(
                step.blackducksca_pr_comment_enabled,
                old.blackduck_automation_prcomment,
                legacy::BLACKDUCK_AUTOMATION_PRCOMMENT,
                log,
            );
            map.put_bool(keys::BLACKDUCKSCA_PRCOMMENT_ENABLED, pr_comment);
        }

        map.put_bool(keys::BLACKDUCKSCA_WAITFORSCAN, scan.blackducksca_wait_for_scan);
        map.put_str(keys::PROJECT_DIRECTORY, scan.project_directory.as_ref());
        put_sca(
            &mut map,
            ScaFields {
                search_depth: scan.detect_search_depth,
                config_path: scan.detect_config_path.as_ref(),
                args: scan.detect_args.as_ref(),
            },
        );
        map.put_str(keys::DETECT_EXECUTION_PATH, scan.detect_execution_path.as_ref());
        map
    }

    pub fn coverity_parameters(&self, log: &DeprecationLog) -> RawParameters {
        let scan = self.scan();
        let mut map = RawParameters::new();

        map.put_str(keys::COVERITY_URL, scan.coverity_url.as_ref());
        map.put_str(keys::COVERITY_USER, scan.coverity_user.as_ref());
        map.put_str(keys::COVERITY_PASSPHRASE, scan.coverity_passphrase.as_ref());
        map.put_str(keys::COVERITY_PROJECT_NAME, scan.coverity_project_name.as_ref());
        map.put_str(keys::COVERITY_STREAM_NAME, scan.coverity_stream_name.as_ref());
        map.put_str(keys::COVERITY_POLICY_VIEW, scan.coverity_policy_view.as_ref());
        map.put_str(
            keys::COVERITY_INSTALL_DIRECTORY,
            scan.coverity_install_directory.as_ref(),
        );

        if let JobStep::Pipeline(step) = self {
            let pr_comment = merged_bool(
                step.coverity_pr_comment_enabled,
                step.legacy.coverity_automation_prcomment,
                legacy::COVERITY_AUTOMATION_PRCOMMENT,
                log,
            );
            map.put_bool(keys::COVERITY_PRCOMMENT_ENABLED, pr_comment);
        }

        map.put_str(keys::COVERITY_VERSION, scan.coverity_version.as_ref());
        map.put_bool(keys::COVERITY_LOCAL, scan.coverity_local);
        map.put_bool(keys::COVERITY_WAITFORSCAN, scan.coverity_wait_for_scan);
        map.put_str(keys::PROJECT_DIRECTORY, scan.project_directory.as_ref());
        put_sast(
            &mut map,
            SastFields {
                build_command: scan.coverity_build_command.as_ref(),
                clean_command: scan.coverity_clean_command.as_ref(),
                config_path: scan.coverity_config_path.as_ref(),
                args: scan.coverity_args.as_ref(),
            },
        );
        map.put_str(keys::COVERITY_EXECUTION_PATH, scan.coverity_execution_path.as_ref());
        map
    }

    pub fn polaris_parameters(&self) -> RawParameters {
        let scan = self.scan();
        let mut map = RawParameters::new();

        map.put_str(keys::POLARIS_SERVER_URL, scan.polaris_server_url.as_ref());
        map.put_str(keys::POLARIS_ACCESS_TOKEN, scan.polaris_access_token.as_ref());
        map.put_str(keys::POLARIS_APPLICATION_NAME, scan.polaris_application_name.as_ref());
        map.put_str(keys::POLARIS_PROJECT_NAME, scan.polaris_project_name.as_ref());
        map.put_str(keys::POLARIS_ASSESSMENT_TYPES, scan.polaris_assessment_types.as_ref());
        map.put_str(keys::POLARIS_TRIAGE, scan.polaris_triage.as_ref());
        map.put_str(keys::POLARIS_BRANCH_NAME, scan.polaris_branch_name.as_ref());
        map.put_str(
            keys::POLARIS_BRANCH_PARENT_NAME,
            scan.polaris_branch_parent_name.as_ref(),
        );
        map.put_bool(keys::POLARIS_WAITFORSCAN, scan.polaris_wait_for_scan);
        map.put_str(keys::POLARIS_ASSESSMENT_MODE, scan.polaris_assessment_mode.as_ref());
        map.put_str(keys::PROJECT_DIRECTORY, scan.project_directory.as_ref());
        map.put_str(keys::PROJECT_SOURCE_ARCHIVE, scan.project_source_archive.as_ref());
        map.put_bool(
            keys::PROJECT_SOURCE_PRESERVE_SYM_LINKS,
            scan.project_source_preserve_sym_links,
        );
        map.put_str(keys::PROJECT_SOURCE_EXCLUDES, scan.project_source_excludes.as_ref());

        match self {
            JobStep::Pipeline(step) => {
                map.put_bool(keys::POLARIS_PRCOMMENT_ENABLED, step.polaris_pr_comment_enabled);
                map.put_str(
                    keys::POLARIS_PRCOMMENT_SEVERITIES,
                    step.polaris_pr_comment_severities.as_ref(),
                );
                self.put_shared_tools(&mut map);
            }
            JobStep::Freestyle(step) => {
                put_sast(
                    &mut map,
                    SastFields {
                        build_command: step.polaris_sast_build_command.as_ref(),
                        clean_command: step.polaris_sast_clean_command.as_ref(),
                        config_path: step.polaris_sast_config_path.as_ref(),
                        args: step.polaris_sast_args.as_ref(),
                    },
                );
                put_sca(
                    &mut map,
                    ScaFields {
                        search_depth: step.polaris_sca_search_depth,
                        config_path: step.polaris_sca_config_path.as_ref(),
                        args: step.polaris_sca_args.as_ref(),
                    },
                );
            }
        }
        map
    }

    pub fn srm_parameters(&self) -> RawParameters {
        let scan = self.scan();
        let mut map = RawParameters::new();

        map.put_str(keys::SRM_URL, scan.srm_url.as_ref());
        map.put_str(keys::SRM_APIKEY, scan.srm_apikey.as_ref());
        map.put_str(keys::SRM_ASSESSMENT_TYPES, scan.srm_assessment_types.as_ref());
        map.put_str(keys::SRM_PROJECT_NAME, scan.srm_project_name.as_ref());
        map.put_str(keys::SRM_PROJECT_ID, scan.srm_project_id.as_ref());
        map.put_str(keys::SRM_BRANCH_NAME, scan.srm_branch_name.as_ref());
        map.put_str(keys::SRM_BRANCH_PARENT, scan.srm_branch_parent.as_ref());
        map.put_bool(keys::SRM_WAITFORSCAN, scan.srm_wait_for_scan);
        map.put_str(keys::PROJECT_DIRECTORY, scan.project_directory.as_ref());
        // SRM-specific tool paths win over the generic ones
        map.put_str(
            keys::DETECT_EXECUTION_PATH,
            scan.srm_sca_execution_path
                .as_ref()
                .or(scan.detect_execution_path.as_ref()),
        );
        map.put_str(
            keys::COVERITY_EXECUTION_PATH,
            scan.srm_sast_execution_path
                .as_ref()
                .or(scan.coverity_execution_path.as_ref()),
        );

        match self {
            JobStep::Pipeline(_) => self.put_shared_tools(&mut map),
            JobStep::Freestyle(step) => {
                put_sast(
                    &mut map,
                    SastFields {
                        build_command: step.srm_sast_build_command.as_ref(),
                        clean_command: step.srm_sast_clean_command.as_ref(),
                        config_path: step.srm_sast_config_path.as_ref(),
                        args: step.srm_sast_args.as_ref(),
                    },
                );
                put_sca(
                    &mut map,
                    ScaFields {
                        search_depth: step.srm_sca_search_depth,
                        config_path: step.srm_sca_config_path.as_ref(),
                        args: step.srm_sca_args.as_ref(),
                    },
                );
            }
        }
        map
    }

    fn put_shared_tools(&self, map: &mut RawParameters) {
        let scan = self.scan();
        put_sast(
            map,
            SastFields {
                build_command: scan.coverity_build_command.as_ref(),
                clean_command: scan.coverity_clean_command.as_ref(),
                config_path: scan.coverity_config_path.as_ref(),
                args: scan.coverity_args.as_ref(),
            },
        );
        put_sca(
            map,
            ScaFields {
                search_depth: scan.detect_search_depth,
                config_path: scan.detect_config_path.as_ref(),
                args: scan.detect_args.as_ref(),
            },
        );
    }

    pub fn sarif_report_parameters(&self, product: ScanProduct) -> RawParameters {
        let scan = self.scan();
        let mut map = RawParameters::new();

        match product {
            ScanProduct::BlackDuckSca => {
                map.put_bool(
                    keys::BLACKDUCKSCA_REPORTS_SARIF_CREATE,
                    scan.blackducksca_reports_sarif_create,
                );
                map.put_str(
                    keys::BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH,
                    scan.blackducksca_reports_sarif_file_path.as_ref(),
                );
                map.put_str(
                    keys::BLACKDUCKSCA_REPORTS_SARIF_SEVERITIES,
                    scan.blackducksca_reports_sarif_severities.as_ref(),
                );
                map.put_bool(
                    keys::BLACKDUCKSCA_REPORTS_SARIF_GROUPSCAISSUES,
                    scan.blackducksca_reports_sarif_group_sca_issues,
                );
            }
            ScanProduct::Polaris => {
                map.put_bool(
                    keys::POLARIS_REPORTS_SARIF_CREATE,
                    scan.polaris_reports_sarif_create,
                );
                map.put_str(
                    keys::POLARIS_REPORTS_SARIF_FILE_PATH,
                    scan.polaris_reports_sarif_file_path.as_ref(),
                );
                map.put_str(
                    keys::POLARIS_REPORTS_SARIF_SEVERITIES,
                    scan.polaris_reports_sarif_severities.as_ref(),
                );
                map.put_bool(
                    keys::POLARIS_REPORTS_SARIF_GROUPSCAISSUES,
                    scan.polaris_reports_sarif_group_sca_issues,
                );
                map.put_str(
                    keys::POLARIS_REPORTS_SARIF_ISSUE_TYPES,
                    scan.polaris_reports_sarif_issue_types.as_ref(),
                );
            }
            ScanProduct::Coverity | ScanProduct::Srm => {}
        }
        map
    }

    /// Bridge acquisition and network settings
    pub fn bridge_parameters(&self, log: &DeprecationLog) -> RawParameters {
        let scan = self.scan();
        let empty = LegacyFields::default();
        let old = self.legacy().unwrap_or(&empty);
        let mut map = RawParameters::new();

        let url = merged_str(
            &scan.bridgecli_download_url,
            &old.synopsys_bridge_download_url,
            legacy::BRIDGE_DOWNLOAD_URL,
            log,
        );
        map.put_str(keys::BRIDGECLI_DOWNLOAD_URL, url.as_ref());
        let version = merged_str(
            &scan.bridgecli_download_version,
            &old.synopsys_bridge_download_version,
            legacy::BRIDGE_DOWNLOAD_VERSION,
            log,
        );
        map.put_str(keys::BRIDGECLI_DOWNLOAD_VERSION, version.as_ref());
        let install_dir = merged_str(
            &scan.bridgecli_install_directory,
            &old.synopsys_bridge_install_directory,
            legacy::BRIDGE_INSTALL_DIRECTORY,
            log,
        );
        map.put_str(keys::BRIDGECLI_INSTALL_DIRECTORY, install_dir.as_ref());

        map.put_bool(keys::INCLUDE_DIAGNOSTICS, scan.include_diagnostics);
        map.put_bool(keys::NETWORK_AIRGAP, scan.network_airgap);
        map.put_str(keys::NETWORK_SSL_CERT_FILE, scan.network_ssl_cert_file.as_ref());
        map.put_bool(keys::NETWORK_SSL_TRUSTALL, scan.network_ssl_trust_all);
        map
    }

    pub fn scm_token_parameters(&self) -> RawParameters {
        let scan = self.scan();
        let mut map = RawParameters::new();
        map.put_str(keys::BITBUCKET_TOKEN, scan.bitbucket_token.as_ref());
        map.put_str(keys::GITHUB_TOKEN, scan.github_token.as_ref());
        map.put_str(keys::GITLAB_TOKEN, scan.gitlab_token.as_ref());
        map
    }

    fn build_status_parameters(&self) -> RawParameters {
        let mut map = RawParameters::new();
        map.put_str(keys::MARK_BUILD_STATUS, self.scan().mark_build_status.as_ref());
        if let JobStep::Pipeline(step) = self {
            map.put_bool(keys::RETURN_STATUS, step.return_status);
        }
        map
    }

    /// Product-specific section of the map
    pub fn product_parameters(&self, product: ScanProduct, log: &DeprecationLog) -> RawParameters {
        match product {
            ScanProduct::BlackDuckSca => self.blackducksca_parameters(log),
            ScanProduct::Coverity => self.coverity_parameters(log),
            ScanProduct::Polaris => self.polaris_parameters(),
            ScanProduct::Srm => self.srm_parameters(),
        }
    }
}

/// Flatten `step` and `global` into the raw map for one invocation.
///
/// Job values replace global ones. The global bridge download URL is not
/// merged; the download planner consults it only when the job sets no URL.
pub fn prepare_parameters(
    step: &JobStep,
    global: &GlobalConfig,
    log: &DeprecationLog,
) -> Result<(ScanProduct, RawParameters), ValidationError> {
    let name = step.product_name(log).unwrap_or_default();
    if !validate_product(&name) {
        return Err(ValidationError::InvalidProduct(name));
    }
    let product = ScanProduct::from_name(&name).ok_or(ValidationError::InvalidProduct(name))?;

    let mut map = global.raw_parameters(product);
    map.insert(keys::PRODUCT, product.name());
    map.extend(step.scm_token_parameters());
    map.extend(step.product_parameters(product, log));
    map.extend(step.sarif_report_parameters(product));
    map.extend(step.bridge_parameters(log));
    map.extend(step.build_status_parameters());

    debug!("Prepared {} parameters for {}", map.len(), product);
    Ok((product, map))
}
