//! Colored size report for the terminal

use colored::Colorize;
use hashcopy_core::{ReportSink, SizeReport, human_size};

/// Prints one row per reported file: format label, path, size.
#[derive(Debug, Default)]
pub struct ConsoleReportSink;

/// A report row before coloring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub path: String,
    pub size: String,
    pub written: bool,
}

/// Rows with paths padded to a common width.
pub fn rows(format: &str, report: &SizeReport) -> Vec<Row> {
    let width = report
        .entries()
        .iter()
        .map(|e| e.key().len())
        .max()
        .unwrap_or(0);

    report
        .entries()
        .iter()
        .map(|entry| Row {
            label: format.to_string(),
            path: format!("{:<width$}", entry.key()),
            size: human_size(entry.size_bytes),
            written: entry.written,
        })
        .collect()
}

impl ReportSink for ConsoleReportSink {
    fn report(&mut self, format: &str, report: &SizeReport) {
        for row in rows(format, report) {
            let path = if row.written {
                row.path.green()
            } else {
                row.path.dimmed()
            };
            if row.label.is_empty() {
                println!("  {}  {}", path, row.size.yellow());
            } else {
                println!("  {} {}  {}", row.label.blue().bold(), path, row.size.yellow());
            }
        }
    }
}
