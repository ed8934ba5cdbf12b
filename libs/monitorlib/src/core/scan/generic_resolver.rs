// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Second pass over members declared on open generic definitions.
//!
//! A member of `Boxed<T>` has no accessor until `T` is known. Every candidate
//! that derives from a closed `Boxed<..>` gets the member profiled through
//! that closed ancestor, registered under the candidate itself.

use super::deferred::{DeferredMember, DeferredQueue};
use super::report::{ScanIssue, ScanIssueKind, ScanReport};
use crate::core::profiles::{BuildOutcome, BuildRequest, MemberIdentity, ProfileFactory};
use crate::core::registry::ProfileRegistryBuilder;
use crate::core::types::{MemberDescriptor, TypeDescriptor, TypeKey, UpcastPath};
use std::collections::HashSet;
use std::sync::Arc;

pub struct GenericResolver<'a> {
    factory: &'a ProfileFactory<'a>,
}

impl<'a> GenericResolver<'a> {
    pub fn new(factory: &'a ProfileFactory<'a>) -> Self {
        Self { factory }
    }

    pub fn resolve(
        &self,
        candidates: &[Arc<TypeDescriptor>],
        deferred: &DeferredQueue,
        registry: &mut ProfileRegistryBuilder,
        report: &mut ScanReport,
    ) {
        report_missing_definitions(candidates, report);
        if deferred.is_empty() {
            return;
        }
        // Closed holders never defer; this only satisfies the factory.
        let mut requeued = DeferredQueue::new();
        let mut statics_done: HashSet<(TypeKey, String)> = HashSet::new();
        let mut warned: HashSet<(TypeKey, String, bool)> = HashSet::new();

        for candidate in candidates.iter().filter(|c| !c.shape().is_open()) {
            let mut seen: HashSet<MemberIdentity> = HashSet::new();
            let own = std::iter::once((candidate.clone(), UpcastPath::new()));
            for (ancestor, path) in own.chain(candidate.ancestors()) {
                let Some(definition) = ancestor.shape().definition() else {
                    continue;
                };
                for pending in deferred.for_definition(definition) {
                    let identity = MemberIdentity {
                        origin: definition.clone(),
                        name: pending.member.name().to_string(),
                        is_static: pending.is_static(),
                    };
                    let first = if pending.is_static() {
                        statics_done.insert((ancestor.key().clone(), identity.name))
                    } else {
                        seen.insert(identity)
                    };
                    if !first {
                        continue;
                    }

                    let Some(member) = concrete_member(&ancestor, pending) else {
                        if warned.insert((
                            ancestor.key().clone(),
                            pending.member.name().to_string(),
                            pending.is_static(),
                        )) {
                            report.record(
                                ScanIssue::warning(
                                    ScanIssueKind::GenericResolution,
                                    format!(
                                        "closed type has no bound {} '{}' from '{}'",
                                        pending.kind(),
                                        pending.member.name(),
                                        pending.definition_name
                                    ),
                                )
                                .on_type(ancestor.name())
                                .on_member(pending.member.name()),
                            );
                        }
                        continue;
                    };

                    let request = if pending.is_static() {
                        BuildRequest {
                            declaring: &ancestor,
                            holder: &ancestor,
                            path: UpcastPath::new(),
                            member,
                            marker: &pending.marker,
                        }
                    } else {
                        BuildRequest {
                            declaring: candidate,
                            holder: &ancestor,
                            path: path.clone(),
                            member,
                            marker: &pending.marker,
                        }
                    };
                    if self.factory.build(request, registry, &mut requeued, report) == BuildOutcome::Built {
                        report.stats_mut().resolved += 1;
                    }
                }
            }
        }
        tracing::debug!(
            "Generic resolution registered {} profile(s) from {} deferred member(s)",
            report.stats().resolved,
            deferred.len()
        );
    }
}

/// Warns once per closed generic ancestor whose open definition is not among
/// the candidates. Members marked on such a definition are never profiled.
fn report_missing_definitions(candidates: &[Arc<TypeDescriptor>], report: &mut ScanReport) {
    let known: HashSet<&TypeKey> = candidates.iter().map(|c| c.key()).collect();
    let mut missing: HashSet<TypeKey> = HashSet::new();

    for candidate in candidates.iter().filter(|c| !c.shape().is_open()) {
        let own = std::iter::once((candidate.clone(), UpcastPath::new()));
        for (ancestor, _) in own.chain(candidate.ancestors()) {
            let Some(definition) = ancestor.shape().definition() else {
                continue;
            };
            if known.contains(definition) || !missing.insert(definition.clone()) {
                continue;
            }
            report.record(
                ScanIssue::warning(
                    ScanIssueKind::GenericResolution,
                    format!(
                        "generic definition of '{}' is not registered; its marked members are not profiled",
                        ancestor.name()
                    ),
                )
                .on_type(candidate.name()),
            );
        }
    }
}

/// The member on a closed type matching a deferred one by name, scope and
/// kind, if it can be read.
fn concrete_member<'t>(closed: &'t TypeDescriptor, pending: &DeferredMember) -> Option<&'t MemberDescriptor> {
    closed
        .member(pending.member.name(), pending.is_static())
        .filter(|m| m.kind() == pending.kind() && m.binding().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MonitorSettings;
    use crate::core::formatting::FormatterFactory;
    use crate::core::marker::MonitorMarker;
    use crate::core::profiles::bind;
    use crate::core::scan::Severity;
    use crate::core::types::{MemberKind, Upcast};

    struct Boxed<T> {
        value: T,
    }

    struct IntBox {
        inner: Boxed<i32>,
    }

    struct Both {
        first: IntBox,
    }

    static SHARED: i32 = 9;

    const BOXED: &str = "game::Boxed";

    fn definition() -> Arc<TypeDescriptor> {
        TypeDescriptor::definition(BOXED, "Boxed<T>")
            .member(MemberDescriptor::unbound(MemberKind::Field, false, "value", "T").with_marker(MonitorMarker::new()))
            .member(MemberDescriptor::unbound(MemberKind::Field, true, "shared", "T").with_marker(MonitorMarker::new()))
            .member(MemberDescriptor::unbound(MemberKind::Field, false, "missing", "T").with_marker(MonitorMarker::new()))
            .build()
    }

    fn closed(def: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        TypeDescriptor::builder::<Boxed<i32>>("Boxed<i32>")
            .closing(def.key().clone(), vec![TypeKey::of::<i32>()])
            .member(MemberDescriptor::bound("value", bind::field::<Boxed<i32>, i32>(|b| &b.value)))
            .member(MemberDescriptor::bound("shared", bind::static_field::<i32>(|| &SHARED)))
            .build()
    }

    fn deferred_from(def: &Arc<TypeDescriptor>) -> DeferredQueue {
        let mut queue = DeferredQueue::new();
        for member in def.members() {
            queue.push(DeferredMember {
                definition: def.key().clone(),
                definition_name: def.name().to_string(),
                member: member.clone(),
                marker: MonitorMarker::new(),
            });
        }
        queue
    }

    #[test]
    fn test_members_resolve_through_closed_ancestors() {
        let def = definition();
        let boxed_i32 = closed(&def);
        let int_box = TypeDescriptor::builder::<IntBox>("IntBox")
            .base(boxed_i32.clone(), Upcast::field::<IntBox, Boxed<i32>>(|b| &b.inner))
            .build();
        let both = TypeDescriptor::builder::<Both>("Both")
            .base(int_box.clone(), Upcast::field::<Both, IntBox>(|b| &b.first))
            .build();

        let settings = MonitorSettings::default();
        let formatters = FormatterFactory::new();
        let factory = ProfileFactory::new(&settings, &formatters);
        let mut registry = ProfileRegistryBuilder::new();
        let mut report = ScanReport::new();

        GenericResolver::new(&factory).resolve(
            &[def.clone(), int_box.clone(), both.clone()],
            &deferred_from(&def),
            &mut registry,
            &mut report,
        );
        let registry = registry.freeze();

        let int_profiles = registry.instance_profiles(int_box.key());
        assert_eq!(int_profiles.len(), 1);
        assert_eq!(int_profiles[0].info().member_name, "value");
        assert_eq!(int_profiles[0].info().origin, *def.key());
        assert_eq!(registry.instance_profiles(both.key()).len(), 1);

        // One static per closed type, not per subtype.
        assert_eq!(registry.static_profiles().len(), 1);
        assert_eq!(report.stats().resolved, 3);

        // The missing member is reported once per closed type.
        assert_eq!(report.count_kind(ScanIssueKind::GenericResolution), 1);
        assert_eq!(report.count(Severity::Warning), 1);
    }

    #[test]
    fn test_resolved_profile_reads_through_the_upcast_path() {
        let def = definition();
        let boxed_i32 = closed(&def);
        let int_box = TypeDescriptor::builder::<IntBox>("IntBox")
            .base(boxed_i32, Upcast::field::<IntBox, Boxed<i32>>(|b| &b.inner))
            .build();

        let settings = MonitorSettings::default();
        let formatters = FormatterFactory::new();
        let factory = ProfileFactory::new(&settings, &formatters);
        let mut registry = ProfileRegistryBuilder::new();
        registry.add_type(&int_box);
        let mut report = ScanReport::new();
        GenericResolver::new(&factory).resolve(
            &[int_box],
            &deferred_from(&def),
            &mut registry,
            &mut report,
        );
        let registry = registry.freeze();

        let target: crate::core::profiles::Target = Arc::new(IntBox {
            inner: Boxed { value: 42 },
        });
        let mut units = registry.units_for(&target).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].refresh(), "value: 42");
    }

    #[test]
    fn test_unregistered_definition_is_reported_once() {
        let def = definition();
        let boxed_i32 = closed(&def);
        let int_box = TypeDescriptor::builder::<IntBox>("IntBox")
            .base(boxed_i32, Upcast::field::<IntBox, Boxed<i32>>(|b| &b.inner))
            .build();
        let both = TypeDescriptor::builder::<Both>("Both")
            .base(int_box.clone(), Upcast::field::<Both, IntBox>(|b| &b.first))
            .build();

        let settings = MonitorSettings::default();
        let formatters = FormatterFactory::new();
        let factory = ProfileFactory::new(&settings, &formatters);
        let mut registry = ProfileRegistryBuilder::new();
        let mut report = ScanReport::new();
        GenericResolver::new(&factory).resolve(
            &[int_box.clone(), both],
            &DeferredQueue::new(),
            &mut registry,
            &mut report,
        );

        assert!(registry.is_empty());
        assert_eq!(report.issues().len(), 1);
        let issue = &report.issues()[0];
        assert_eq!(issue.kind, ScanIssueKind::GenericResolution);
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.type_name.as_deref(), Some("IntBox"));
        assert!(issue.message.contains("Boxed<i32>"));
    }

    #[test]
    fn test_registered_definition_is_not_reported() {
        let def = definition();
        let boxed_i32 = closed(&def);
        let int_box = TypeDescriptor::builder::<IntBox>("IntBox")
            .base(boxed_i32, Upcast::field::<IntBox, Boxed<i32>>(|b| &b.inner))
            .build();

        let mut report = ScanReport::new();
        report_missing_definitions(&[def, int_box], &mut report);
        assert!(report.issues().is_empty());
    }

    #[test]
    fn test_empty_queue_is_a_no_op() {
        let settings = MonitorSettings::default();
        let formatters = FormatterFactory::new();
        let factory = ProfileFactory::new(&settings, &formatters);
        let mut registry = ProfileRegistryBuilder::new();
        let mut report = ScanReport::new();
        GenericResolver::new(&factory).resolve(&[], &DeferredQueue::new(), &mut registry, &mut report);
        assert!(registry.is_empty());
        assert!(report.issues().is_empty());
    }
}
