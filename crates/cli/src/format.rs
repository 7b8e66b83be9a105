//! Output formatting for reports and errors.

use conform_harness::WorkbenchReport;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a finished run.
pub fn format_report(report: &WorkbenchReport, mode: OutputMode) -> anyhow::Result<String> {
    match mode {
        OutputMode::Json => Ok(report.to_json_pretty()?),
        OutputMode::Human => Ok(report.render_text()),
    }
}

/// Format an error that stopped the command.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let causes: Vec<String> = err.chain().skip(1).map(|c| c.to_string()).collect();
            serde_json::json!({ "error": err.to_string(), "causes": causes }).to_string()
        }
        OutputMode::Human => format!("(error) {:#}", err),
    }
}
