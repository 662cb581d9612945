//! Structured logging setup
//!
//! All log output goes to stderr so that commands printing JSON or tables on
//! stdout stay machine-readable. The level comes from the CLI, then
//! `SCANBRIDGE_LOG_LEVEL`, then `info`; `RUST_LOG` directives are layered on
//! top when present.
//!
//! ```no_run
//! use scanbridge::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(product = "POLARIS", "Starting scan");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub const LOG_LEVEL_ENV: &str = "SCANBRIDGE_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "SCANBRIDGE_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// One JSON object per line, for CI log collectors
    pub use_json: bool,

    pub include_target: bool,
    pub include_location: bool,
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON lines with full metadata
    pub fn structured(level: Level) -> Self {
        Self {
            level,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Debug level with module targets, for `-v`
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            include_target: true,
            ..Default::default()
        }
    }
}

/// Case-insensitive level name; unknown names fall back to INFO with a
/// notice on stderr
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("scanbridge={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    if env::var("RUST_LOG").is_err() {
        for quiet in ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"] {
            if let Ok(directive) = quiet.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Install the global subscriber; later calls are no-ops
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer).try_init()
        };
        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    });
}

/// Configuration from `SCANBRIDGE_LOG_LEVEL` and `SCANBRIDGE_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);
    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    if use_json {
        LoggingConfig::structured(level)
    } else {
        LoggingConfig::with_level(level)
    }
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
