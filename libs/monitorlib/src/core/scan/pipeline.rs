// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::deferred::DeferredQueue;
use super::generic_resolver::GenericResolver;
use super::member_inspector::MemberInspector;
use super::report::ScanReport;
use super::type_scanner::{ModuleFilter, TypeScanner};
use crate::core::cancel::CancellationToken;
use crate::core::config::MonitorSettings;
use crate::core::formatting::FormatterFactory;
use crate::core::profiles::{BuildRequest, ProfileFactory};
use crate::core::registry::{ProfileRegistry, ProfileRegistryBuilder};
use crate::core::types::{MemberScope, TypeDescriptor, TypeUniverse};
use crate::core::Result;
use std::sync::Arc;
use std::time::Instant;

/// Result of a completed profiling run.
pub struct ProfilingOutcome {
    pub registry: Arc<ProfileRegistry>,
    pub report: ScanReport,
}

/// Runs the profiling stages over a type universe.
///
/// Stages run strictly in order: scan, static sweep, instance sweep,
/// generic resolution. Cancellation is honored between stages and drops
/// everything built so far.
pub struct Profiler {
    settings: Arc<MonitorSettings>,
    formatters: Arc<FormatterFactory>,
}

impl Profiler {
    pub fn new(settings: MonitorSettings) -> Self {
        Self::with_formatters(Arc::new(settings), Arc::new(FormatterFactory::new()))
    }

    /// Share a formatter factory (and its prototype cache) between runs.
    pub fn with_formatters(settings: Arc<MonitorSettings>, formatters: Arc<FormatterFactory>) -> Self {
        Self {
            settings,
            formatters,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn formatters(&self) -> &Arc<FormatterFactory> {
        &self.formatters
    }

    pub fn run(&self, universe: &TypeUniverse, cancel: &CancellationToken) -> Result<ProfilingOutcome> {
        let started = Instant::now();
        let mut report = ScanReport::new();

        tracing::debug!("Scanning {} module(s)", universe.len());
        let filter = ModuleFilter::from_settings(&self.settings);
        let candidates = TypeScanner::new(filter).scan(universe, &mut report);
        cancel.check()?;

        let factory = ProfileFactory::new(&self.settings, &self.formatters);
        let mut registry = ProfileRegistryBuilder::new();
        let mut deferred = DeferredQueue::new();
        for ty in &candidates {
            registry.add_type(ty);
        }

        for scope in [MemberScope::Static, MemberScope::Instance] {
            self.sweep(&factory, &candidates, scope, &mut registry, &mut deferred, &mut report);
            tracing::debug!(?scope, "Sweep complete, {} profile(s) so far", registry.len());
            cancel.check()?;
        }

        tracing::debug!("Resolving {} deferred generic member(s)", deferred.len());
        GenericResolver::new(&factory).resolve(&candidates, &deferred, &mut registry, &mut report);
        cancel.check()?;

        let registry = Arc::new(registry.freeze());
        tracing::info!(
            profiles = registry.len(),
            candidates = candidates.len(),
            warnings = report.count(super::Severity::Warning),
            errors = report.count(super::Severity::Error),
            "Profiling complete in {:?}",
            started.elapsed()
        );
        Ok(ProfilingOutcome { registry, report })
    }

    fn sweep(
        &self,
        factory: &ProfileFactory<'_>,
        candidates: &[Arc<TypeDescriptor>],
        scope: MemberScope,
        registry: &mut ProfileRegistryBuilder,
        deferred: &mut DeferredQueue,
        report: &mut ScanReport,
    ) {
        let inspector = MemberInspector::new();
        for ty in candidates {
            for inspected in inspector.inspect(ty, scope, report) {
                let request = BuildRequest::direct(ty, &inspected.member, &inspected.marker);
                factory.build(request, registry, deferred, report);
            }
        }
    }
}
