pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, CodesArgs, Commands, JobArgs, RenderArgs, ScanArgs};
pub use output::{OutputFormat, OutputFormatter};
