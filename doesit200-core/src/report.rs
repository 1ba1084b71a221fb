// Report generation from a finished crawl

use chrono::{DateTime, Utc};
use colored::Colorize;
use doesit200_scanner::{CrawlOutcome, NavigationFailure, NetworkLedger};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SUCCESS_STATUS: u16 = 200;

/// Every observed response whose status was not 200, keyed by URL.
pub type NonSuccessReport = BTreeMap<String, u16>;

pub fn non_success(ledger: &NetworkLedger) -> NonSuccessReport {
    ledger
        .responses()
        .iter()
        .filter(|r| r.status != SUCCESS_STATUS)
        .map(|r| (r.url.clone(), r.status))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub root_url: String,
    pub max_depth: u8,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_visited: usize,
    pub total_requests: usize,
    pub total_responses: usize,
    pub non_success: NonSuccessReport,
    pub navigation_failures: Vec<NavigationFailure>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        Self {
            root_url: outcome.root_url.clone(),
            max_depth: outcome.max_depth,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            pages_visited: outcome.navigations(),
            total_requests: outcome.ledger.request_count(),
            total_responses: outcome.ledger.response_count(),
            non_success: non_success(&outcome.ledger),
            navigation_failures: outcome.failures.clone(),
            cancelled: outcome.cancelled,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.non_success.is_empty()
    }
}

fn paint_status(status: u16, colored: bool) -> String {
    let text = status.to_string();
    if !colored {
        return text;
    }
    match status {
        100..=199 => text.white().to_string(),
        200..=299 => text.green().to_string(),
        300..=399 => text.cyan().to_string(),
        400..=499 => text.yellow().to_string(),
        500..=599 => text.red().to_string(),
        _ => text.bright_black().to_string(),
    }
}

pub fn render(report: &RunReport, format: &ReportFormat, colored: bool) -> String {
    match format {
        ReportFormat::Text => render_text(report, colored),
        ReportFormat::Json => render_json(report),
    }
}

pub fn render_text(report: &RunReport, colored: bool) -> String {
    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Root URL: {}\n", report.root_url));
    out.push_str(&format!("  Max depth: {}\n", report.max_depth));
    out.push_str(&format!("  Pages visited: {}\n", report.pages_visited));
    out.push_str(&format!("  Network Requests: {}\n", report.total_requests));
    out.push_str(&format!("  Network Responses: {}\n", report.total_responses));
    let elapsed = report.finished_at - report.started_at;
    out.push_str(&format!("  Duration: {}s\n", elapsed.num_seconds()));
    if report.cancelled {
        out.push_str("  Crawl was cancelled before the frontier was exhausted\n");
    }

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if report.non_success.is_empty() {
        out.push_str("No non-200 responses found.\n");
    } else {
        out.push_str("Non-200 responses found:\n");
        for (url, status) in &report.non_success {
            out.push_str(&format!(
                "URL: {}, Status: {}\n",
                url,
                paint_status(*status, colored)
            ));
        }
    }

    if !report.navigation_failures.is_empty() {
        out.push_str(&format!(
            "\n{} page(s) could not be loaded:\n",
            report.navigation_failures.len()
        ));
        for failure in &report.navigation_failures {
            out.push_str(&format!(
                "  [depth {}] {}: {}\n",
                failure.depth, failure.url, failure.error
            ));
        }
    }

    out
}

pub fn render_json(report: &RunReport) -> String {
    // RunReport only holds strings, numbers and maps with string keys.
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
