//! Size reporting for filesystem writes
//!
//! A pass reports every file it touched (or confirmed current) with its
//! size. Entries that were not written carry an `(unchanged) ` marker
//! when rendered as a key.

use std::collections::BTreeMap;
use std::fmt;

use hashcopy_fs::NormalizedPath;
use serde::Serialize;

const UNCHANGED_MARKER: &str = "(unchanged) ";

/// One reported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub path: NormalizedPath,
    pub written: bool,
    pub size_bytes: u64,
}

impl ReportEntry {
    /// Key as shown to users: the path, or the path behind a marker.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.written {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{UNCHANGED_MARKER}{}", self.path)
        }
    }
}

/// Ordered list of reported files for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SizeReport {
    entries: Vec<ReportEntry>,
}

impl SizeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_written(&mut self, path: impl Into<NormalizedPath>, size_bytes: u64) {
        self.entries.push(ReportEntry {
            path: path.into(),
            written: true,
            size_bytes,
        });
    }

    pub fn record_unchanged(&mut self, path: impl Into<NormalizedPath>, size_bytes: u64) {
        self.entries.push(ReportEntry {
            path: path.into(),
            written: false,
            size_bytes,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn written(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.written)
    }

    pub fn unchanged(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| !e.written)
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path-or-marker keys mapped to sizes.
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        self.entries
            .iter()
            .map(|e| (e.key(), e.size_bytes))
            .collect()
    }
}

/// Receives the size report at the end of a pass.
pub trait ReportSink {
    /// `format` is the build's format label, possibly empty.
    fn report(&mut self, format: &str, report: &SizeReport);
}

/// Human-readable byte count, e.g. `0 B` or `1.2 KiB`.
pub fn human_size(bytes: u64) -> String {
    bytesize::to_string(bytes, true)
}

/// Emits one `info` event per entry.
#[derive(Debug, Default)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    fn report(&mut self, format: &str, report: &SizeReport) {
        for entry in report.entries() {
            tracing::info!(format, file = %entry, size = %human_size(entry.size_bytes), "Asset");
        }
    }
}

/// Keeps every report it receives.
#[derive(Debug, Default)]
pub struct CollectingReportSink {
    pub reports: Vec<(String, SizeReport)>,
}

impl ReportSink for CollectingReportSink {
    fn report(&mut self, format: &str, report: &SizeReport) {
        self.reports.push((format.to_string(), report.clone()));
    }
}

/// Discards reports.
#[derive(Debug, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn report(&mut self, _format: &str, _report: &SizeReport) {}
}
