//! Logging setup and shared macros

#[macro_use]
pub mod id_enum_macro;
pub mod logging;

pub use logging::{init_from_env, init_logging, LoggingConfig};
