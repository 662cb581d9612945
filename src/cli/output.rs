//! Output formatting for JSON, YAML and human-readable text
//!
//! Everything printed on stdout goes through `OutputFormatter`; logs stay on
//! stderr.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::codes::{self, ErrorCode};
use crate::orchestrator::ScanOutcome;
use crate::params::BridgeInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

#[derive(Debug, Serialize)]
struct CodeEntry {
    code: ErrorCode,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct OutcomeReport<'a> {
    exit_code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_result: Option<String>,
    failed: bool,
}

impl<'a> From<&'a ScanOutcome> for OutcomeReport<'a> {
    fn from(outcome: &'a ScanOutcome) -> Self {
        Self {
            exit_code: outcome.exit_code,
            message: &outcome.message,
            build_result: outcome.build_result.map(|r| r.to_string()),
            failed: outcome.is_failure(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Bridge input document; the human form is the pretty JSON the bridge
    /// itself reads
    pub fn format_input(&self, input: &BridgeInput) -> Result<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::Human => serde_json::to_string_pretty(input)
                .context("Failed to serialize bridge input to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(input).context("Failed to serialize bridge input to YAML")
            }
        }
    }

    pub fn format_codes(&self) -> Result<String> {
        let entries: Vec<CodeEntry> = codes::entries()
            .map(|(code, message)| CodeEntry { code, message })
            .collect();

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&entries)
                .context("Failed to serialize exit codes to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&entries).context("Failed to serialize exit codes to YAML")
            }
            OutputFormat::Human => {
                let mut output = String::new();
                for entry in entries {
                    output.push_str(&format!("{:>4}  {}\n", entry.code, entry.message));
                }
                Ok(output)
            }
        }
    }

    pub fn format_outcome(&self, outcome: &ScanOutcome) -> Result<String> {
        let report = OutcomeReport::from(outcome);
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)
                .context("Failed to serialize scan outcome to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&report).context("Failed to serialize scan outcome to YAML")
            }
            OutputFormat::Human => {
                let mut output = format!("{}\n", report.message);
                if let Some(result) = &report.build_result {
                    output.push_str(&format!("Build result: {}\n", result));
                }
                Ok(output)
            }
        }
    }
}
