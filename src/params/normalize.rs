//! Raw parameter map to bridge input conversion
//!
//! `prepare` is the pure mapping half: it never fails and emits only what was
//! configured. `normalize` adds the mandatory-field and mutual-exclusion
//! checks in front of it.

use super::keys::*;
use super::model::*;
use super::product::ScanProduct;
use super::raw::RawParameters;
use crate::codes::{self, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The product selector names nothing we can scan with
    #[error("Invalid Security Product '{0}'")]
    InvalidProduct(String),

    /// One or more required parameters are absent; reported as a unit
    #[error("Required parameters for {product} are missing: {}", .missing.join(", "))]
    MissingParameters {
        product: ScanProduct,
        missing: Vec<&'static str>,
    },

    #[error("Both network_ssl_cert_file and network_ssl_trustAll are set. Only one of these resources should be set at a time.")]
    SslConflict,
}

impl ValidationError {
    pub fn exit_code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidProduct(_) => codes::INVALID_SECURITY_PRODUCT,
            ValidationError::MissingParameters { product, .. } => product.invalid_parameters_code(),
            ValidationError::SslConflict => codes::SSL_CONFIG_CONFLICT_ERROR,
        }
    }
}

const BLACKDUCKSCA_MANDATORY: &[&str] = &[BLACKDUCKSCA_URL, BLACKDUCKSCA_TOKEN];
const COVERITY_MANDATORY: &[&str] = &[COVERITY_URL, COVERITY_USER, COVERITY_PASSPHRASE];
const POLARIS_MANDATORY: &[&str] = &[
    POLARIS_SERVER_URL,
    POLARIS_ACCESS_TOKEN,
    POLARIS_ASSESSMENT_TYPES,
];
const SRM_MANDATORY: &[&str] = &[
    SRM_URL,
    SRM_APIKEY,
    SRM_PROJECT_NAME,
    SRM_PROJECT_ID,
    SRM_ASSESSMENT_TYPES,
    SRM_BRANCH_NAME,
    SRM_BRANCH_PARENT,
];

pub fn mandatory_keys(product: ScanProduct) -> &'static [&'static str] {
    match product {
        ScanProduct::BlackDuckSca => BLACKDUCKSCA_MANDATORY,
        ScanProduct::Coverity => COVERITY_MANDATORY,
        ScanProduct::Polaris => POLARIS_MANDATORY,
        ScanProduct::Srm => SRM_MANDATORY,
    }
}

pub fn missing_mandatory(product: ScanProduct, raw: &RawParameters) -> Vec<&'static str> {
    mandatory_keys(product)
        .iter()
        .copied()
        .filter(|key| !raw.contains(key))
        .collect()
}

pub fn has_all_mandatory_params(product: ScanProduct, raw: &RawParameters) -> bool {
    missing_mandatory(product, raw).is_empty()
}

/// Detect sub-object shared by Black Duck SCA and the SCA half of Polaris
/// and SRM scans
pub fn build_detect(raw: &RawParameters) -> Option<Detect> {
    non_empty(Detect {
        install: non_empty(Directory {
            directory: raw.get_str(DETECT_INSTALL_DIRECTORY),
        }),
        download: non_empty(Url {
            url: raw.get_str(DETECT_DOWNLOAD_URL),
        }),
        search: non_empty(Depth {
            depth: raw.get_int(DETECT_SEARCH_DEPTH),
        }),
        config: non_empty(Path {
            path: raw.get_str(DETECT_CONFIG_PATH),
        }),
        args: raw.get_str(DETECT_ARGS),
        execution: non_empty(Path {
            path: raw.get_str(DETECT_EXECUTION_PATH),
        }),
    })
}

/// Build/clean/config/args/execution fields shared by Coverity and the SAST
/// half of Polaris and SRM scans
pub fn apply_coverity_tool(raw: &RawParameters, coverity: &mut Coverity) {
    coverity.build = non_empty(Command {
        command: raw.get_str(COVERITY_BUILD_COMMAND),
    });
    coverity.clean = non_empty(Command {
        command: raw.get_str(COVERITY_CLEAN_COMMAND),
    });
    coverity.config = non_empty(Path {
        path: raw.get_str(COVERITY_CONFIG_PATH),
    });
    coverity.args = raw.get_str(COVERITY_ARGS);
    coverity.execution = non_empty(Path {
        path: raw.get_str(COVERITY_EXECUTION_PATH),
    });
}

fn build_sarif(
    raw: &RawParameters,
    create: &str,
    file_path: &str,
    severities: &str,
    group_sca_issues: &str,
    issue_types: Option<&str>,
) -> Option<Reports> {
    let sarif = non_empty(Sarif {
        create: raw.get_bool(create),
        file: non_empty(Path {
            path: raw.get_str(file_path),
        }),
        severities: raw.get_list(severities),
        group_sca_issues: raw.get_bool(group_sca_issues),
        issue: issue_types.and_then(|key| {
            non_empty(IssueTypes {
                types: raw.get_list(key),
            })
        }),
    });
    non_empty(Reports { sarif })
}

pub fn prepare_blackducksca(raw: &RawParameters) -> BlackDuckSca {
    BlackDuckSca {
        url: raw.get_str(BLACKDUCKSCA_URL),
        token: raw.get_str(BLACKDUCKSCA_TOKEN),
        scan: non_empty(Scan {
            full: raw.get_bool(BLACKDUCKSCA_SCAN_FULL),
            failure: non_empty(Failure {
                severities: raw.get_list(BLACKDUCKSCA_SCAN_FAILURE_SEVERITIES),
            }),
        }),
        automation: non_empty(Prcomment {
            prcomment: raw.get_bool(BLACKDUCKSCA_PRCOMMENT_ENABLED),
        }),
        wait_for_scan: raw.get_bool(BLACKDUCKSCA_WAITFORSCAN),
        reports: build_sarif(
            raw,
            BLACKDUCKSCA_REPORTS_SARIF_CREATE,
            BLACKDUCKSCA_REPORTS_SARIF_FILE_PATH,
            BLACKDUCKSCA_REPORTS_SARIF_SEVERITIES,
            BLACKDUCKSCA_REPORTS_SARIF_GROUPSCAISSUES,
            None,
        ),
    }
}

pub fn prepare_coverity(raw: &RawParameters) -> Coverity {
    let mut coverity = Coverity {
        connect: non_empty(Connect {
            url: raw.get_str(COVERITY_URL),
            user: non_empty(CoverityUser {
                name: raw.get_str(COVERITY_USER),
                password: raw.get_str(COVERITY_PASSPHRASE),
            }),
            project: non_empty(Name {
                name: raw.get_str(COVERITY_PROJECT_NAME),
            }),
            stream: non_empty(Name {
                name: raw.get_str(COVERITY_STREAM_NAME),
            }),
            policy: non_empty(Policy {
                view: raw.get_str(COVERITY_POLICY_VIEW),
            }),
        }),
        install: non_empty(Directory {
            directory: raw.get_str(COVERITY_INSTALL_DIRECTORY),
        }),
        automation: non_empty(Prcomment {
            prcomment: raw.get_bool(COVERITY_PRCOMMENT_ENABLED),
        }),
        version: raw.get_str(COVERITY_VERSION),
        local: raw.get_bool(COVERITY_LOCAL),
        wait_for_scan: raw.get_bool(COVERITY_WAITFORSCAN),
        ..Default::default()
    };
    apply_coverity_tool(raw, &mut coverity);
    coverity
}

pub fn prepare_polaris(raw: &RawParameters) -> Polaris {
    Polaris {
        server_url: raw.get_str(POLARIS_SERVER_URL),
        access_token: raw.get_str(POLARIS_ACCESS_TOKEN),
        application: non_empty(Name {
            name: raw.get_str(POLARIS_APPLICATION_NAME),
        }),
        project: non_empty(Name {
            name: raw.get_str(POLARIS_PROJECT_NAME),
        }),
        assessment: non_empty(Assessment {
            types: raw.get_list(POLARIS_ASSESSMENT_TYPES),
            mode: raw.get_str(POLARIS_ASSESSMENT_MODE),
        }),
        triage: raw.get_str(POLARIS_TRIAGE),
        branch: non_empty(PolarisBranch {
            name: raw.get_str(POLARIS_BRANCH_NAME),
            parent: non_empty(Name {
                name: raw.get_str(POLARIS_BRANCH_PARENT_NAME),
            }),
        }),
        pr_comment: non_empty(PrComment {
            enabled: raw.get_bool(POLARIS_PRCOMMENT_ENABLED),
            severities: raw.get_list(POLARIS_PRCOMMENT_SEVERITIES),
        }),
        wait_for_scan: raw.get_bool(POLARIS_WAITFORSCAN),
        reports: build_sarif(
            raw,
            POLARIS_REPORTS_SARIF_CREATE,
            POLARIS_REPORTS_SARIF_FILE_PATH,
            POLARIS_REPORTS_SARIF_SEVERITIES,
            POLARIS_REPORTS_SARIF_GROUPSCAISSUES,
            Some(POLARIS_REPORTS_SARIF_ISSUE_TYPES),
        ),
    }
}

pub fn prepare_srm(raw: &RawParameters) -> Srm {
    Srm {
        url: raw.get_str(SRM_URL),
        apikey: raw.get_str(SRM_APIKEY),
        project: non_empty(SrmProject {
            name: raw.get_str(SRM_PROJECT_NAME),
            id: raw.get_str(SRM_PROJECT_ID),
        }),
        assessment: non_empty(Assessment {
            types: raw.get_list(SRM_ASSESSMENT_TYPES),
            mode: None,
        }),
        branch: non_empty(SrmBranch {
            name: raw.get_str(SRM_BRANCH_NAME),
            parent: raw.get_str(SRM_BRANCH_PARENT),
        }),
        wait_for_scan: raw.get_bool(SRM_WAITFORSCAN),
    }
}

fn build_project(raw: &RawParameters) -> Option<Project> {
    non_empty(Project {
        directory: raw.get_str(PROJECT_DIRECTORY),
        source: non_empty(Source {
            archive: raw.get_str(PROJECT_SOURCE_ARCHIVE),
            preserve_sym_links: raw.get_bool(PROJECT_SOURCE_PRESERVE_SYM_LINKS),
            excludes: raw.get_list(PROJECT_SOURCE_EXCLUDES),
        }),
    })
}

fn build_network(raw: &RawParameters) -> Option<Network> {
    non_empty(Network {
        air_gap: raw.get_bool(NETWORK_AIRGAP),
        ssl: non_empty(Ssl {
            cert: non_empty(Cert {
                file: raw.get_str(NETWORK_SSL_CERT_FILE),
            }),
            trust_all: raw.get_bool(NETWORK_SSL_TRUSTALL),
        }),
    })
}

/// Map `raw` into the bridge data for `product` without validating it.
/// An empty map yields an empty document.
pub fn prepare(product: ScanProduct, raw: &RawParameters) -> BridgeData {
    let mut data = BridgeData::default();

    match product {
        ScanProduct::BlackDuckSca => {
            data.blackducksca = non_empty(prepare_blackducksca(raw));
            data.detect = build_detect(raw);
        }
        ScanProduct::Coverity => {
            data.coverity = non_empty(prepare_coverity(raw));
        }
        ScanProduct::Polaris => {
            data.polaris = non_empty(prepare_polaris(raw));
            data.coverity = sast_section(raw);
            data.detect = build_detect(raw);
        }
        ScanProduct::Srm => {
            data.srm = non_empty(prepare_srm(raw));
            data.coverity = sast_section(raw);
            data.detect = build_detect(raw);
        }
    }

    data.project = build_project(raw);
    data.network = build_network(raw);
    data
}

fn sast_section(raw: &RawParameters) -> Option<Coverity> {
    let mut coverity = Coverity::default();
    apply_coverity_tool(raw, &mut coverity);
    non_empty(coverity)
}

/// Validate `raw` for `product` and map it into the bridge data
pub fn normalize(product: ScanProduct, raw: &RawParameters) -> Result<BridgeData, ValidationError> {
    let missing = missing_mandatory(product, raw);
    if !missing.is_empty() {
        return Err(ValidationError::MissingParameters { product, missing });
    }

    if raw.contains(NETWORK_SSL_CERT_FILE) && raw.contains(NETWORK_SSL_TRUSTALL) {
        return Err(ValidationError::SslConflict);
    }

    Ok(prepare(product, raw))
}
