// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Aggregated outcome of a profiling run.
//!
//! Nothing short of cancellation aborts a scan; every per-module,
//! per-member and per-profile failure becomes a [`ScanIssue`] here and is
//! logged once when recorded.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// Where in the pipeline an issue was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanIssueKind {
    /// A module's metadata could not be read.
    ModuleIntrospection,
    /// A member's metadata is malformed or unobservable.
    MemberInspection,
    /// A profile failed to build or register.
    ProfileConstruction,
    /// A deferred generic member could not be matched on a closed type.
    GenericResolution,
    /// A named processor is missing or has an unusable signature.
    CustomProcessor,
    /// A visibility gate could not be built for the member's value type.
    Validator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanIssue {
    pub severity: Severity,
    pub kind: ScanIssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub message: String,
}

impl ScanIssue {
    pub fn new(severity: Severity, kind: ScanIssueKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            module: None,
            type_name: None,
            member: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: ScanIssueKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn error(kind: ScanIssueKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn on_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn on_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    fn log(&self) {
        let module = self.module.as_deref().unwrap_or("-");
        let type_name = self.type_name.as_deref().unwrap_or("-");
        let member = self.member.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Info => {
                tracing::info!(module, type_name, member, kind = ?self.kind, "{}", self.message)
            }
            Severity::Warning => {
                tracing::warn!(module, type_name, member, kind = ?self.kind, "{}", self.message)
            }
            Severity::Error | Severity::Fatal => {
                tracing::error!(module, type_name, member, kind = ?self.kind, severity = %self.severity, "{}", self.message)
            }
        }
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub modules_scanned: usize,
    pub modules_skipped: usize,
    pub types_scanned: usize,
    pub candidates: usize,
    pub members_inspected: usize,
    pub profiles_built: usize,
    pub deferred: usize,
    pub resolved: usize,
    pub duplicates_suppressed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    issues: Vec<ScanIssue>,
    stats: ScanStats,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log an issue.
    pub fn record(&mut self, issue: ScanIssue) {
        issue.log();
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ScanIssue>) {
        for issue in issues {
            self.record(issue);
        }
    }

    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn count_kind(&self, kind: ScanIssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ScanStats {
        &mut self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_severity_and_kind() {
        let mut report = ScanReport::new();
        report.record(
            ScanIssue::warning(ScanIssueKind::MemberInspection, "void method")
                .on_type("Player")
                .on_member("reset"),
        );
        report.record(
            ScanIssue::error(ScanIssueKind::ModuleIntrospection, "module skipped").in_module("bad"),
        );

        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.count(Severity::Error), 1);
        assert_eq!(report.count_kind(ScanIssueKind::MemberInspection), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn test_warnings_alone_are_not_errors() {
        let mut report = ScanReport::new();
        report.record(ScanIssue::warning(ScanIssueKind::CustomProcessor, "fallback"));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_issue_serializes_without_empty_locations() {
        let issue = ScanIssue::error(ScanIssueKind::GenericResolution, "missing").on_member("value");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "generic_resolution");
        assert_eq!(json["member"], "value");
        assert!(json.get("module").is_none());
    }
}
