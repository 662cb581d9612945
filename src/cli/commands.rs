use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bridge CLI acquisition and scan parameter normalization for CI jobs
#[derive(Parser, Debug)]
#[command(
    name = "scanbridge",
    about = "Run security scans through the Bridge CLI from a CI job",
    version,
    author,
    long_about = "scanbridge reads a job file and an optional global configuration, \
                  downloads and installs the Bridge CLI when needed, normalizes the \
                  scan parameters for Black Duck SCA, Coverity, Polaris or SRM, and \
                  runs the bridge with them."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run a scan",
        long_about = "Validates the job, installs the Bridge CLI if it is missing or \
                      outdated, writes the bridge input and runs the scan.\n\n\
                      Examples:\n  \
                      scanbridge scan --job scan.yml\n  \
                      scanbridge scan --job scan.yml --global /etc/scanbridge.toml"
    )]
    Scan(ScanArgs),

    #[command(
        about = "Install the Bridge CLI without scanning",
        long_about = "Resolves the download plan from the job and global configuration \
                      and installs the Bridge CLI.\n\n\
                      Examples:\n  \
                      scanbridge install --job scan.yml"
    )]
    Install(JobArgs),

    #[command(
        about = "Print the normalized bridge input",
        long_about = "Normalizes the job parameters and prints the bridge input document \
                      without downloading or running anything. The output contains \
                      credentials.\n\n\
                      Examples:\n  \
                      scanbridge render --job scan.yml\n  \
                      scanbridge render --job scan.yml --format yaml"
    )]
    Render(RenderArgs),

    #[command(about = "List exit codes and their messages")]
    Codes(CodesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    #[arg(short = 'j', long, value_name = "FILE", help = "Job file (YAML)")]
    pub job: PathBuf,

    #[arg(
        short = 'g',
        long,
        value_name = "FILE",
        help = "Global configuration (TOML); defaults to SCANBRIDGE_GLOBAL_CONFIG"
    )]
    pub global: Option<PathBuf>,

    #[arg(
        short = 'w',
        long,
        value_name = "DIR",
        help = "Workspace directory (defaults to current directory)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Full job name, '<owner>/<branch>' for multi-branch jobs (defaults to JOB_NAME)"
    )]
    pub job_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub job: JobArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Format of the final report on stdout"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub job: JobArgs,

    #[arg(short = 'f', long, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct CodesArgs {
    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
