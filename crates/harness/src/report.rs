//! Run report
//!
//! Everything a run produced, in one serializable value: run metadata,
//! profile verdicts, per-test-case summaries, run failures and, on request,
//! every raw assertion. Rendering to JSON or to a text table lives here; where
//! the rendering goes is up to the caller.

use chrono::{DateTime, Utc};
use conform_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::assertion::Assertion;
use crate::context::WorkContext;
use crate::profile::{ProfileReport, ProfileStatus};
use crate::recorder::{OutcomeSummary, RunFailure};
use crate::testcase::TestCaseSummary;

/// Settings a run was made with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Calling identity
    pub user_id: String,
    /// Discovery limit per type
    pub instances_per_type: usize,
    /// History page size
    pub max_page_size: usize,
    /// Concurrent test cases
    pub workers: usize,
    /// Per-call timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_ms: Option<u64>,
    /// As-of time of the historical test cases
    pub as_of_time: Timestamp,
}

impl RunSettings {
    /// Settings of `ctx`
    pub fn from_context(ctx: &WorkContext) -> Self {
        let config = ctx.config();
        RunSettings {
            user_id: config.user_id.clone(),
            instances_per_type: config.instances_per_type,
            max_page_size: config.max_page_size,
            workers: config.workers,
            call_timeout_ms: config.call_timeout_ms,
            as_of_time: ctx.as_of_time(),
        }
    }
}

/// Result of one workbench run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchReport {
    /// Unique id of the run
    pub run_id: String,
    /// Repository name reported by the connector
    pub repository: String,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end
    pub finished_at: DateTime<Utc>,
    /// Settings of the run
    pub settings: RunSettings,
    /// One entry per profile, in aggregator order
    pub profiles: Vec<ProfileReport>,
    /// One entry per test case, in (type, variant) order
    pub test_cases: Vec<TestCaseSummary>,
    /// Test cases aborted by fatal errors
    pub failures: Vec<RunFailure>,
    /// Raw assertions, when kept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,
}

impl WorkbenchReport {
    /// True if any assertion FAILED or any test case aborted
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
            || self
                .profiles
                .iter()
                .any(|p| p.status == ProfileStatus::NonConformant)
    }

    /// Outcome counts over every test case
    pub fn totals(&self) -> OutcomeSummary {
        let mut totals = OutcomeSummary::default();
        for case in &self.test_cases {
            totals.total += case.outcomes.total;
            totals.passed += case.outcomes.passed;
            totals.failed += case.outcomes.failed;
            totals.not_supported += case.outcomes.not_supported;
        }
        totals
    }

    /// Same report with the raw assertions dropped
    pub fn without_assertions(mut self) -> Self {
        self.assertions.clear();
        self
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable table: one row per profile, then run failures
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let elapsed = self.finished_at - self.started_at;
        let totals = self.totals();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "Repository:  {}", self.repository);
        let _ = writeln!(out, "Run:         {}", self.run_id);
        let _ = writeln!(
            out,
            "Started:     {} ({} ms)",
            self.started_at.to_rfc3339(),
            elapsed.num_milliseconds()
        );
        let _ = writeln!(
            out,
            "Assertions:  {} total, {} passed, {} failed, {} not supported",
            totals.total, totals.passed, totals.failed, totals.not_supported
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<32} {:<26} {:>6} {:>6} {:>6} {:>6} {:>10} {:>10} {:>10}",
            "PROFILE", "STATUS", "TOTAL", "PASS", "FAIL", "N/S", "MIN ms", "MEAN ms", "P99 ms"
        );
        for report in &self.profiles {
            let summary = &report.summary;
            let (min, mean, p99) = match &summary.latency {
                Some(l) => (
                    format_ms(l.min_micros as f64),
                    format_ms(l.mean_micros),
                    format_ms(l.p99_micros as f64),
                ),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            let status = match report.aborted_test_cases {
                0 => report.status.label().to_string(),
                n => format!("{} ({} aborted)", report.status.label(), n),
            };
            let _ = writeln!(
                out,
                "{:<32} {:<26} {:>6} {:>6} {:>6} {:>6} {:>10} {:>10} {:>10}",
                report.profile.id(),
                status,
                summary.total,
                summary.passed,
                summary.failed,
                summary.not_supported,
                min,
                mean,
                p99
            );
        }

        if !self.failures.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Run failures ({}):", self.failures.len());
            for failure in &self.failures {
                let _ = writeln!(out, "  {}: {}", failure.test_case_id, failure.message);
            }
        }
        out
    }
}

fn format_ms(micros: f64) -> String {
    format!("{:.3}", micros / 1_000.0)
}
