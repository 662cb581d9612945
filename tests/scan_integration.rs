//! End-to-end scan runs with a real install directory and workspace
//!
//! The bridge download and the bridge process are replaced by fakes from
//! `support`; everything else runs as in production.

mod support;

use scanbridge::codes::{self, BuildResult};
use scanbridge::config::{GlobalConfig, JobConfig};
use scanbridge::orchestrator::{ScanContext, ScanOrchestrator};
use scanbridge::target::{LocalTarget, MockTarget};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use support::{bundle_zip, CannedDownloader, RecordingRunner};
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    workspace: std::path::PathBuf,
    tools: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("workspace");
    let tools = temp.path().join("tools");
    fs::create_dir_all(&workspace).unwrap();
    fs::create_dir_all(&tools).unwrap();
    Fixture {
        _temp: temp,
        workspace,
        tools,
    }
}

fn job(yaml: &str, tools: &Path) -> JobConfig {
    let yaml = format!(
        "{}\nbridgecli_install_directory: {}\nbridgecli_download_url: {}\n",
        yaml.trim_end(),
        tools.join("bridge-cli-bundle").display(),
        support::LATEST_URL
    );
    JobConfig::from_yaml_str(&yaml).unwrap()
}

fn context(job: JobConfig, fx: &Fixture, runner: Arc<RecordingRunner>) -> ScanContext {
    ScanContext::new(
        Arc::new(LocalTarget::new()),
        Arc::new(CannedDownloader::new(
            bundle_zip(&["bridge-cli-bundle-linux64"], "3.1.0"),
            "3.1.0",
        )),
        runner,
        job.step,
        fx.workspace.clone(),
    )
    .with_scm(job.scm)
    .with_env(job.env)
}

#[test]
fn test_blackducksca_scan_passes_only_configured_fields() {
    let fx = fixture();
    let runner = Arc::new(RecordingRunner::exiting(0));
    let job = job(
        r#"
product: BLACKDUCKSCA
blackducksca_url: https://fake.blackduck-url
blackducksca_token: fake-token
"#,
        &fx.tools,
    );
    let ctx = context(job, &fx, runner.clone());

    let outcome = ScanOrchestrator::new(&ctx).run();

    assert!(outcome.is_success(), "{}", outcome.message);
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let (invocation, input) = &calls[0];
    assert_eq!(invocation.stage, "blackducksca");
    assert_eq!(
        input,
        &json!({
            "data": {
                "blackducksca": {
                    "url": "https://fake.blackduck-url",
                    "token": "fake-token"
                }
            }
        })
    );
    assert!(!invocation.input_file.exists());
    assert!(fx.tools.join("bridge-cli-bundle").is_dir());
}

#[test]
fn test_build_break_with_unstable_status() {
    let fx = fixture();
    let runner = Arc::new(RecordingRunner::exiting(codes::BRIDGE_BUILD_BREAK));
    let job = job(
        r#"
product: polaris
polaris_server_url: https://fake.polaris-url
polaris_access_token: fake-token
polaris_assessment_types: SAST,SCA
mark_build_status: UNSTABLE
"#,
        &fx.tools,
    );
    let ctx = context(job, &fx, runner);

    let outcome = ScanOrchestrator::new(&ctx).run();

    assert_eq!(outcome.exit_code, codes::BRIDGE_BUILD_BREAK);
    assert_eq!(outcome.build_result, Some(BuildResult::Unstable));
    assert_eq!(outcome.process_exit_code(), 0);
}

#[test]
fn test_build_break_with_aborted_status_has_no_override() {
    let fx = fixture();
    let runner = Arc::new(RecordingRunner::exiting(codes::BRIDGE_BUILD_BREAK));
    let job = job(
        r#"
product: polaris
polaris_server_url: https://fake.polaris-url
polaris_access_token: fake-token
polaris_assessment_types: SAST
mark_build_status: ABORTED
"#,
        &fx.tools,
    );
    let ctx = context(job, &fx, runner);

    let outcome = ScanOrchestrator::new(&ctx).run();

    assert_eq!(outcome.build_result, None);
    assert!(outcome.is_failure());
}

#[test]
fn test_srm_without_project_id_is_rejected_before_download() {
    let fx = fixture();
    let runner = Arc::new(RecordingRunner::exiting(0));
    let job = job(
        r#"
product: srm
srm_url: https://fake.srm-url
srm_apikey: fake-key
srm_project_name: payments
srm_assessment_types: SAST
srm_branch_name: main
srm_branch_parent: main
"#,
        &fx.tools,
    );
    let ctx = context(job, &fx, runner.clone());

    let outcome = ScanOrchestrator::new(&ctx).run();

    assert_eq!(outcome.exit_code, codes::INVALID_SRM_PARAMETERS);
    assert!(runner.calls().is_empty());
    assert!(!fx.tools.join("bridge-cli-bundle").exists());
}

#[test]
fn test_global_configuration_fills_credentials() {
    let fx = fixture();
    let runner = Arc::new(RecordingRunner::exiting(0));
    let job = job("product: coverity\ncoverity_project_name: payments\n", &fx.tools);
    let global = GlobalConfig::from_toml_str(
        r#"
coverity_url = "https://fake.coverity-url"
coverity_user = "global-user"
coverity_passphrase = "global-pass"
"#,
    )
    .unwrap();
    let ctx = context(job, &fx, runner.clone()).with_global(global);

    let outcome = ScanOrchestrator::new(&ctx).run();

    assert!(outcome.is_success(), "{}", outcome.message);
    let (invocation, input) = &runner.calls()[0];
    assert_eq!(invocation.stage, "connect");
    assert_eq!(input["data"]["coverity"]["connect"]["url"], "https://fake.coverity-url");
    assert_eq!(input["data"]["coverity"]["connect"]["user"]["name"], "global-user");
}

#[test]
fn test_undeletable_probe_blocks_install() {
    let workspace = TempDir::new().unwrap();
    let target = MockTarget::new();
    target.add_dir("/readonly/parent");
    target.deny_deletes("/readonly/parent");
    let runner = Arc::new(RecordingRunner::exiting(0));
    let downloader = Arc::new(CannedDownloader::new(Vec::new(), "3.1.0"));
    let job = JobConfig::from_yaml_str(
        r#"
product: blackducksca
blackducksca_url: https://fake.blackduck-url
blackducksca_token: fake-token
bridgecli_install_directory: /readonly/parent/child
"#,
    )
    .unwrap();
    let ctx = ScanContext::new(
        Arc::new(target),
        downloader.clone(),
        runner.clone(),
        job.step,
        workspace.path().to_path_buf(),
    );

    let outcome = ScanOrchestrator::new(&ctx).run();

    assert_eq!(outcome.exit_code, codes::INVALID_BRIDGE_DOWNLOAD_PARAMETERS);
    assert_eq!(downloader.downloads(), 0);
    assert!(runner.calls().is_empty());
}
