// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::report::{ScanIssue, ScanIssueKind, ScanReport};
use crate::core::config::MonitorSettings;
use crate::core::types::{TypeDescriptor, TypeUniverse};
use std::sync::Arc;

/// Runtime and framework modules that never contain observable user types.
pub const BUILTIN_BANNED_PREFIXES: &[&str] = &[
    "std",
    "core",
    "alloc",
    "proc_macro",
    "test",
    "tokio",
    "serde",
    "tracing",
    "parking_lot",
    "crossbeam",
    "inventory",
    "monitorlib",
];

/// Module deny-lists: built-in prefixes plus caller prefixes and names.
#[derive(Debug, Clone, Default)]
pub struct ModuleFilter {
    prefixes: Vec<String>,
    names: Vec<String>,
}

impl ModuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &MonitorSettings) -> Self {
        Self {
            prefixes: settings.banned_module_prefixes.clone(),
            names: settings.banned_modules.clone(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Why `module` is banned, if it is.
    pub fn ban_reason(&self, module: &str) -> Option<String> {
        if let Some(prefix) = BUILTIN_BANNED_PREFIXES
            .iter()
            .find(|p| prefix_matches(module, p))
        {
            return Some(format!("built-in prefix '{prefix}'"));
        }
        if let Some(prefix) = self.prefixes.iter().find(|p| prefix_matches(module, p)) {
            return Some(format!("banned prefix '{prefix}'"));
        }
        if self.names.iter().any(|n| n == module) {
            return Some("banned module".to_string());
        }
        None
    }

    pub fn is_banned(&self, module: &str) -> bool {
        self.ban_reason(module).is_some()
    }
}

/// `prefix` matches the whole name or a leading segment of it.
fn prefix_matches(module: &str, prefix: &str) -> bool {
    match module.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(['_', '-', ':', '.']),
        None => false,
    }
}

/// Enumerates candidate types: every type of every non-excluded module,
/// minus compiler-generated and excluded types.
pub struct TypeScanner {
    filter: ModuleFilter,
}

impl TypeScanner {
    pub fn new(filter: ModuleFilter) -> Self {
        Self { filter }
    }

    pub fn scan(&self, universe: &TypeUniverse, report: &mut ScanReport) -> Vec<Arc<TypeDescriptor>> {
        let mut candidates = Vec::new();
        for (name, module) in universe.modules() {
            if let Some(reason) = self.filter.ban_reason(name) {
                tracing::debug!(module = name, "Skipping module: {}", reason);
                report.stats_mut().modules_skipped += 1;
                continue;
            }
            let module = match module {
                Ok(module) => module,
                Err(e) => {
                    report.stats_mut().modules_skipped += 1;
                    report.record(
                        ScanIssue::error(
                            ScanIssueKind::ModuleIntrospection,
                            format!("module skipped: {e}"),
                        )
                        .in_module(name),
                    );
                    continue;
                }
            };
            if module.is_excluded() {
                tracing::debug!(module = name, "Skipping module tagged exclude");
                report.stats_mut().modules_skipped += 1;
                continue;
            }

            report.stats_mut().modules_scanned += 1;
            for ty in module.types() {
                report.stats_mut().types_scanned += 1;
                if ty.is_compiler_generated() || ty.is_excluded() {
                    tracing::trace!(type_name = ty.name(), "Skipping type");
                    continue;
                }
                candidates.push(ty.clone());
            }
        }
        report.stats_mut().candidates = candidates.len();
        tracing::debug!("Found {} candidate type(s)", candidates.len());
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MetadataError;
    use crate::core::marker::TypeMarker;
    use crate::core::types::ModuleDescriptor;

    struct Visible;
    struct Hidden;
    struct Generated;

    #[test]
    fn test_prefix_matches_whole_segments() {
        assert!(prefix_matches("std", "std"));
        assert!(prefix_matches("std::io", "std"));
        assert!(prefix_matches("tokio-util", "tokio"));
        assert!(prefix_matches("serde_json", "serde"));
        assert!(!prefix_matches("stdlib_shim", "std_"));
        assert!(!prefix_matches("standard", "std"));
        assert!(!prefix_matches("tests", "test"));
    }

    #[test]
    fn test_caller_deny_lists() {
        let filter = ModuleFilter::new().with_prefix("vendor").with_name("legacy");
        assert!(filter.is_banned("vendor.audio"));
        assert!(filter.is_banned("legacy"));
        assert!(!filter.is_banned("legacy2"));
        assert!(filter.is_banned("monitorlib-cli"));
        assert!(!filter.is_banned("game"));
    }

    #[test]
    fn test_scan_filters_modules_and_types() {
        let game = ModuleDescriptor::new("game")
            .with_type(TypeDescriptor::builder::<Visible>("Visible").build())
            .unwrap()
            .with_type(
                TypeDescriptor::builder::<Hidden>("Hidden")
                    .marker(TypeMarker::excluded())
                    .build(),
            )
            .unwrap()
            .with_type(
                TypeDescriptor::builder::<Generated>("Generated")
                    .compiler_generated()
                    .build(),
            )
            .unwrap();
        let universe = TypeUniverse::new()
            .with_module(ModuleDescriptor::new("tokio"))
            .with_module(ModuleDescriptor::new("tools").excluded())
            .with_broken_module(
                "broken",
                MetadataError::Corrupt {
                    module: "broken".into(),
                    reason: "bad table".into(),
                },
            )
            .with_module(game);

        let mut report = ScanReport::new();
        let candidates = TypeScanner::new(ModuleFilter::new()).scan(&universe, &mut report);

        let names: Vec<_> = candidates.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Visible"]);
        assert_eq!(report.count_kind(ScanIssueKind::ModuleIntrospection), 1);
        assert_eq!(report.stats().modules_scanned, 1);
        assert_eq!(report.stats().modules_skipped, 3);
        assert_eq!(report.stats().types_scanned, 3);
    }
}
