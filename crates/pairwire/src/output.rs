//! Output formatting: csv, table, JSON, YAML.
//!
//! Renders the run summary in the format selected by `--output`. Only the
//! rendered summary goes to stdout; logs and diagnostics go to stderr.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use pairwire_core::{Summary, SummaryRow};

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Tabled)]
struct SummaryTableRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "IP Address")]
    ip_address: String,
}

impl From<&SummaryRow> for SummaryTableRow {
    fn from(row: &SummaryRow) -> Self {
        Self {
            device: row.device.clone(),
            interface: row.interface.clone(),
            ip_address: row.ip_address.clone(),
        }
    }
}

pub fn render_summary(format: OutputFormat, summary: &Summary) -> Result<String, CliError> {
    match format {
        OutputFormat::Csv => Ok(summary.to_csv()),
        OutputFormat::Table => {
            let rows: Vec<SummaryTableRow> = summary.rows.iter().map(Into::into).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(&summary.rows).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&summary.rows).map_err(|e| CliError::Render(e.to_string()))
        }
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
