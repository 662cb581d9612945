//! Scan orchestration
//!
//! One run goes through these stages in order:
//!
//! 1. Flatten the job step and global configuration, select the product
//! 2. Decide on PR comments and normalize into the bridge input
//! 3. Attach the SCM section when PR comments are requested
//! 4. Plan the bridge download and validate the plan
//! 5. Acquire the bridge (download and install unless current)
//! 6. Write the input file, run the bridge, translate its exit code
//!
//! Everything up to step 3 is free of I/O, so configuration mistakes surface
//! before anything is downloaded.

mod context;

pub use context::ScanContext;

use crate::bridge::runner::{remove_input, write_input};
use crate::bridge::{
    acquire, ensure_install_root, perform_validation, plan_download, BridgeDownloadParameters,
    BridgeInvocation, InstallError, PlanError, RunError,
};
use crate::codes::{self, BuildResult, ErrorCode};
use crate::params::{
    keys, normalize, prepare_parameters, BridgeInput, JobStep, RawParameters, ScanProduct,
    ValidationError,
};
use crate::scm::{self, ScmError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Invalid Bridge CLI download parameters for {}", .0.display())]
    InstallPathInvalid(PathBuf),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Scm(#[from] ScmError),

    #[error(transparent)]
    Run(#[from] RunError),
}

impl ScanError {
    pub fn exit_code(&self) -> ErrorCode {
        match self {
            ScanError::Validation(e) => e.exit_code(),
            ScanError::Plan(e) => e.exit_code(),
            ScanError::InstallPathInvalid(_) => codes::INVALID_BRIDGE_DOWNLOAD_PARAMETERS,
            ScanError::Install(e) => e.exit_code(),
            ScanError::Scm(e) => e.exit_code(),
            ScanError::Run(e) => e.exit_code(),
        }
    }
}

/// What a run reports back to the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub exit_code: ErrorCode,
    pub message: String,
    pub build_result: Option<BuildResult>,
    /// The job asked for the exit code instead of a failed build
    pub return_status: bool,
}

impl ScanOutcome {
    fn from_error(error: &ScanError, return_status: bool) -> Self {
        let exit_code = error.exit_code();
        Self {
            exit_code,
            message: report_message(exit_code, &error.to_string()),
            build_result: None,
            return_status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == codes::SCAN_SUCCESSFUL
    }

    /// Whether the job should be marked as failed
    pub fn is_failure(&self) -> bool {
        if self.return_status || self.is_success() {
            return false;
        }
        !matches!(
            self.build_result,
            Some(BuildResult::Success) | Some(BuildResult::Unstable)
        )
    }

    /// Exit status for a process; codes outside 1..=255 collapse to 1
    pub fn process_exit_code(&self) -> i32 {
        if !self.is_failure() {
            0
        } else if (1..=255).contains(&self.exit_code) {
            self.exit_code
        } else {
            1
        }
    }
}

fn report_message(code: ErrorCode, detail: &str) -> String {
    codes::error_message(code, detail).unwrap_or_else(|| {
        format!(
            "Workflow failed! Exit code {}: {} - {}",
            codes::UNDEFINED_PLUGIN_ERROR,
            codes::message(codes::UNDEFINED_PLUGIN_ERROR).unwrap_or_default(),
            detail
        )
    })
}

fn pr_comment_key(product: ScanProduct) -> Option<&'static str> {
    match product {
        ScanProduct::BlackDuckSca => Some(keys::BLACKDUCKSCA_PRCOMMENT_ENABLED),
        ScanProduct::Coverity => Some(keys::COVERITY_PRCOMMENT_ENABLED),
        ScanProduct::Polaris => Some(keys::POLARIS_PRCOMMENT_ENABLED),
        ScanProduct::Srm => None,
    }
}

/// Configuration half of a run: everything the bridge input needs
struct PreparedScan {
    product: ScanProduct,
    raw: RawParameters,
    input: BridgeInput,
}

pub struct ScanOrchestrator<'a> {
    context: &'a ScanContext,
}

impl<'a> ScanOrchestrator<'a> {
    pub fn new(context: &'a ScanContext) -> Self {
        Self { context }
    }

    /// Full run. Failures are folded into the outcome with their exit code.
    pub fn run(&self) -> ScanOutcome {
        let start = Instant::now();
        let return_status = self.return_status();

        let outcome = match self.execute() {
            Ok(outcome) => outcome,
            Err(e) => ScanOutcome::from_error(&e, return_status),
        };

        if outcome.is_success() {
            info!("{}", outcome.message);
        } else {
            error!("{}", outcome.message);
        }
        if outcome.return_status {
            info!("Returning exit code {} to the job", outcome.exit_code);
        }
        self.report_deprecations();

        debug!("Scan finished in {:.2?}", start.elapsed());
        outcome
    }

    /// Bridge acquisition only; returns the executable path
    pub fn install(&self) -> Result<PathBuf, ScanError> {
        let ctx = self.context;
        let mut raw = RawParameters::new();
        raw.put_str(
            keys::BRIDGECLI_INSTALL_DIRECTORY,
            ctx.global.bridgecli_install_directory.as_ref(),
        );
        raw.extend(ctx.step.bridge_parameters(&ctx.deprecations));

        let result = self.acquire_bridge(&raw);
        self.report_deprecations();
        result
    }

    /// Normalized bridge input, without touching the network or the target
    pub fn render(&self) -> Result<BridgeInput, ScanError> {
        let result = self.prepare().map(|prepared| prepared.input);
        self.report_deprecations();
        result
    }

    fn execute(&self) -> Result<ScanOutcome, ScanError> {
        let ctx = self.context;
        let prepared = self.prepare()?;
        let executable = self.acquire_bridge(&prepared.raw)?;

        let input_file = write_input(&ctx.workspace, prepared.product, &prepared.input)?;
        let invocation = BridgeInvocation {
            executable,
            stage: prepared.product.stage().to_string(),
            input_file: input_file.clone(),
            diagnostics: prepared
                .raw
                .get_bool(keys::INCLUDE_DIAGNOSTICS)
                .unwrap_or(false),
            working_dir: ctx.workspace.clone(),
        };

        let result = ctx.runner.run(&invocation);
        remove_input(&input_file);
        let exit = result?;

        Ok(self.translate(exit.code, &exit.message, &prepared.raw))
    }

    fn prepare(&self) -> Result<PreparedScan, ScanError> {
        let ctx = self.context;
        let (product, mut raw) = prepare_parameters(&ctx.step, &ctx.global, &ctx.deprecations)?;
        info!("Security product: {}", product.label());

        let pr_comment = self.pr_comment_requested(product, &mut raw);
        let mut data = normalize(product, &raw)?;

        if pr_comment {
            let context = scm::resolve(&ctx.job_name, &ctx.env, &ctx.scm, &ctx.scm_registry)
                .ok_or(ScmError::Unsupported)?;
            let provider = ctx
                .scm_registry
                .get(&context.source_type)
                .ok_or(ScmError::Unsupported)?;
            data.set_scm(provider.bridge_section(&context, &raw)?);
        }

        Ok(PreparedScan {
            product,
            raw,
            input: BridgeInput { data },
        })
    }

    /// PR comments only make sense on a pull request build; elsewhere the
    /// flag is dropped from `raw`
    fn pr_comment_requested(&self, product: ScanProduct, raw: &mut RawParameters) -> bool {
        let Some(key) = pr_comment_key(product) else {
            return false;
        };
        if raw.get_bool(key) != Some(true) {
            return false;
        }
        if scm::pull_request_number(&self.context.env).is_none() {
            info!("PR comment is ignored for non-PR scans");
            raw.remove(key);
            return false;
        }
        true
    }

    fn acquire_bridge(&self, raw: &RawParameters) -> Result<PathBuf, ScanError> {
        let ctx = self.context;
        let target = ctx.target.as_ref();

        let plan = plan_download(target, raw, &ctx.global)?;
        debug!("Bridge download plan: {:?}", plan);
        self.prepare_default_root(&plan);

        if !perform_validation(target, &plan) {
            return Err(ScanError::InstallPathInvalid(plan.installation_path));
        }

        let airgap = raw.get_bool(keys::NETWORK_AIRGAP).unwrap_or(false);
        let executable = acquire(target, ctx.downloader.as_ref(), &plan, airgap)?;
        info!("Bridge CLI available at {}", executable.display());
        Ok(executable)
    }

    /// The default install root may not exist yet on a fresh agent
    fn prepare_default_root(&self, plan: &BridgeDownloadParameters) {
        if plan.installed_directory_was_explicit {
            return;
        }
        if let Some(root) = plan.installation_path.parent().filter(|p| p != &Path::new("")) {
            ensure_install_root(self.context.target.as_ref(), root);
        }
    }

    fn translate(&self, code: ErrorCode, process_message: &str, raw: &RawParameters) -> ScanOutcome {
        let exit_code = if codes::message(code).is_some() {
            code
        } else {
            codes::UNDEFINED_PLUGIN_ERROR
        };
        let build_result = raw
            .get_str(keys::MARK_BUILD_STATUS)
            .and_then(|status| codes::build_result_if_issues_found(code, &status));

        ScanOutcome {
            exit_code,
            message: report_message(exit_code, process_message),
            build_result,
            return_status: raw.get_bool(keys::RETURN_STATUS).unwrap_or(false),
        }
    }

    fn return_status(&self) -> bool {
        match &self.context.step {
            JobStep::Pipeline(step) => step.return_status.unwrap_or(false),
            JobStep::Freestyle(_) => false,
        }
    }

    fn report_deprecations(&self) {
        let log = &self.context.deprecations;
        if log.is_empty() {
            return;
        }
        warn!(
            "Deprecated parameters used: {}. Use the current parameter names instead.",
            log.names().join(", ")
        );
        log.clear();
    }
}
