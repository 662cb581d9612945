//! Subcommand handlers; each returns the process exit code

use super::commands::{CodesArgs, JobArgs, RenderArgs, ScanArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::bridge::{HttpDownloader, ProcessRunner};
use crate::config::{GlobalConfig, JobConfig, ScanbridgeConfig};
use crate::orchestrator::{ScanContext, ScanOrchestrator};
use crate::target::LocalTarget;
use anyhow::{Context, Result};
use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, error, info};

const EXIT_FAILURE: i32 = 1;

/// Proxy resolution needs the job's own variables kept apart from the process
/// environment so job entries of either case win over process entries
fn job_downloader(job: &JobConfig, settings: &ScanbridgeConfig) -> HttpDownloader {
    HttpDownloader::new(job.env.clone(), settings.request_timeout())
}

fn load_context(args: &JobArgs, cancel: Arc<AtomicBool>) -> Result<ScanContext> {
    let settings = ScanbridgeConfig::default();
    settings.validate()?;
    debug!("{}", settings);

    let job = JobConfig::load(&args.job)
        .with_context(|| format!("Failed to load job file {}", args.job.display()))?;
    let global_path = args.global.clone().or(settings.global_config_path.clone());
    let global = GlobalConfig::load(global_path.as_deref())
        .context("Failed to load global configuration")?;

    let workspace = match &args.workspace {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Failed to determine the current directory")?,
    };
    let downloader = job_downloader(&job, &settings);
    let job_env = job.environment();

    let mut context = ScanContext::new(
        Arc::new(LocalTarget::with_cancel_flag(cancel)),
        Arc::new(downloader),
        Arc::new(ProcessRunner),
        job.step,
        workspace,
    )
    .with_global(global)
    .with_scm(job.scm);
    if let Some(name) = &args.job_name {
        context = context.with_job_name(name.clone());
    }
    Ok(context.with_env(job_env))
}

pub fn handle_scan(args: &ScanArgs, quiet: bool, cancel: Arc<AtomicBool>) -> i32 {
    let context = match load_context(&args.job, cancel) {
        Ok(context) => context,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let outcome = ScanOrchestrator::new(&context).run();

    let format = OutputFormat::from(args.format);
    if !(quiet && format == OutputFormat::Human) {
        match OutputFormatter::new(format).format_outcome(&outcome) {
            Ok(report) => print!("{}", report),
            Err(e) => error!("{:#}", e),
        }
    }
    outcome.process_exit_code()
}

pub fn handle_install(args: &JobArgs, cancel: Arc<AtomicBool>) -> i32 {
    let context = match load_context(args, cancel) {
        Ok(context) => context,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    match ScanOrchestrator::new(&context).install() {
        Ok(executable) => {
            info!("Bridge CLI installed");
            println!("{}", executable.display());
            0
        }
        Err(e) => {
            error!("Workflow failed! Exit code {}: {}", e.exit_code(), e);
            e.exit_code()
        }
    }
}

pub fn handle_render(args: &RenderArgs, cancel: Arc<AtomicBool>) -> i32 {
    let context = match load_context(&args.job, cancel) {
        Ok(context) => context,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let input = match ScanOrchestrator::new(&context).render() {
        Ok(input) => input,
        Err(e) => {
            error!("Workflow failed! Exit code {}: {}", e.exit_code(), e);
            return e.exit_code();
        }
    };

    match OutputFormatter::new(args.format.into()).format_input(&input) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

pub fn handle_codes(args: &CodesArgs) -> i32 {
    match OutputFormatter::new(args.format.into()).format_codes() {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyDescriptor;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(value) => env::set_var(&self.key, value),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_job_proxy_beats_process_proxy() {
        let _upper = EnvGuard::set("HTTPS_PROXY", "http://process.example:1111");
        let _lower = EnvGuard::unset("https_proxy");
        let _no_proxy = EnvGuard::unset("NO_PROXY");
        let _no_proxy_lower = EnvGuard::unset("no_proxy");
        let job = JobConfig::from_yaml_str(
            r#"
product: blackducksca
env:
  https_proxy: http://job.example:2222
"#,
        )
        .unwrap();

        let downloader = job_downloader(&job, &ScanbridgeConfig::default());

        match downloader.proxy_for("https://repo.example/bridge.zip") {
            ProxyDescriptor::Http { host, port, .. } => {
                assert_eq!(host, "job.example");
                assert_eq!(port, 2222);
            }
            other => panic!("expected a proxy, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_job_no_proxy_beats_process_proxy_settings() {
        let _upper = EnvGuard::set("HTTPS_PROXY", "http://process.example:1111");
        let _no_proxy = EnvGuard::set("NO_PROXY", "https://other.example/bridge.zip");
        let _no_proxy_lower = EnvGuard::unset("no_proxy");
        let job = JobConfig::from_yaml_str(
            r#"
product: blackducksca
env:
  no_proxy: https://repo.example/bridge.zip
"#,
        )
        .unwrap();

        let downloader = job_downloader(&job, &ScanbridgeConfig::default());

        assert!(downloader
            .proxy_for("https://repo.example/bridge.zip")
            .is_direct());
    }
}
