// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::context::ProfileContext;
use crate::core::config::MonitorSettings;
use crate::core::error::ProfileError;
use crate::core::formatting::FormatterFactory;
use crate::core::marker::MonitorMarker;
use crate::core::registry::ProfileRegistryBuilder;
use crate::core::scan::{DeferredMember, DeferredQueue, ScanIssue, ScanIssueKind, ScanReport};
use crate::core::types::{MemberDescriptor, TypeDescriptor, UpcastPath};
use std::sync::Arc;

/// One member to compile.
pub struct BuildRequest<'a> {
    /// Type the profile is registered under.
    pub declaring: &'a Arc<TypeDescriptor>,
    /// Type that declares the member.
    pub holder: &'a Arc<TypeDescriptor>,
    /// From `declaring` to `holder`.
    pub path: UpcastPath,
    pub member: &'a MemberDescriptor,
    /// Member marker merged with the holder's type marker.
    pub marker: &'a MonitorMarker,
}

impl<'a> BuildRequest<'a> {
    /// A member declared on the type it is registered under.
    pub fn direct(
        ty: &'a Arc<TypeDescriptor>,
        member: &'a MemberDescriptor,
        marker: &'a MonitorMarker,
    ) -> Self {
        Self {
            declaring: ty,
            holder: ty,
            path: UpcastPath::new(),
            member,
            marker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built,
    Deferred,
    /// Failed, or a duplicate of an already registered identity.
    Skipped,
}

/// Compiles members into profiles and registers them.
pub struct ProfileFactory<'a> {
    settings: &'a MonitorSettings,
    formatters: &'a FormatterFactory,
}

impl<'a> ProfileFactory<'a> {
    pub fn new(settings: &'a MonitorSettings, formatters: &'a FormatterFactory) -> Self {
        Self {
            settings,
            formatters,
        }
    }

    pub fn build(
        &self,
        request: BuildRequest<'_>,
        registry: &mut ProfileRegistryBuilder,
        deferred: &mut DeferredQueue,
        report: &mut ScanReport,
    ) -> BuildOutcome {
        if request.holder.shape().is_open() {
            deferred.push(DeferredMember {
                definition: request.holder.key().clone(),
                definition_name: request.holder.name().to_string(),
                member: request.member.clone(),
                marker: request.marker.clone(),
            });
            report.stats_mut().deferred += 1;
            return BuildOutcome::Deferred;
        }

        let declaring_name = request.declaring.name().to_string();
        let member_name = request.member.name().to_string();
        let mut cx = ProfileContext::new(
            request.declaring,
            request.holder,
            request.path,
            request.member,
            request.marker,
            self.settings,
            self.formatters,
        );
        let built = Self::compile(&mut cx);
        report.extend(cx.take_issues());

        let profile = match built {
            Ok(profile) => profile,
            Err(e) => {
                report.record(
                    ScanIssue::error(ScanIssueKind::ProfileConstruction, e.to_string())
                        .on_type(declaring_name)
                        .on_member(member_name),
                );
                return BuildOutcome::Skipped;
            }
        };

        let added = if profile.info().is_static {
            registry.add_static(profile)
        } else {
            registry.add_instance(profile)
        };
        if added {
            report.stats_mut().profiles_built += 1;
            BuildOutcome::Built
        } else {
            report.stats_mut().duplicates_suppressed += 1;
            BuildOutcome::Skipped
        }
    }

    fn compile(cx: &mut ProfileContext<'_>) -> Result<Arc<dyn super::MonitorProfile>, ProfileError> {
        let binding = cx.member().binding().cloned().ok_or_else(|| ProfileError::MissingBinding {
            type_name: cx.holder().name().to_string(),
            member: cx.member().name().to_string(),
        })?;
        binding.build(cx)
    }
}
