use scanbridge::cli::commands::{CliArgs, Commands};
use scanbridge::cli::handlers::{handle_codes, handle_install, handle_render, handle_scan};
use scanbridge::util::logging::{self, LoggingConfig};
use scanbridge::VERSION;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, warn, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("scanbridge v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let cancel = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&cancel)) {
            warn!("Failed to register handler for signal {}: {}", signal, e);
        }
    }

    let exit_code = match &args.command {
        Commands::Scan(scan_args) => handle_scan(scan_args, args.quiet, cancel),
        Commands::Install(job_args) => handle_install(job_args, cancel),
        Commands::Render(render_args) => handle_render(render_args, cancel),
        Commands::Codes(codes_args) => handle_codes(codes_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();
    if let Some(level_str) = &args.log_level {
        config.level = logging::parse_level(level_str);
    } else if args.verbose {
        config = LoggingConfig {
            use_json: config.use_json,
            ..LoggingConfig::verbose()
        };
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    logging::init_logging(config);
}
