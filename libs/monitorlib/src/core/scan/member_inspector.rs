// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::report::{ScanIssue, ScanIssueKind, ScanReport};
use crate::core::marker::MonitorMarker;
use crate::core::types::{MemberDescriptor, MemberKind, MemberScope, TypeDescriptor};

/// A marked member ready for the profile factory.
#[derive(Debug, Clone)]
pub struct InspectedMember {
    pub member: MemberDescriptor,
    /// Member marker merged with the type marker.
    pub marker: MonitorMarker,
}

/// Finds the marked members of a type.
#[derive(Debug, Default)]
pub struct MemberInspector;

impl MemberInspector {
    pub fn new() -> Self {
        Self
    }

    /// Marked members of `scope`, fields first, then properties, events and
    /// methods, each kind in declaration order. Malformed and unobservable
    /// members are reported and left out.
    pub fn inspect(&self, ty: &TypeDescriptor, scope: MemberScope, report: &mut ScanReport) -> Vec<InspectedMember> {
        let mut out = Vec::new();
        for kind in MemberKind::ALL {
            for member in ty.members() {
                if member.kind() != kind || !scope.matches(member.is_static()) {
                    continue;
                }
                let Some(marker) = member.marker() else {
                    continue;
                };
                report.stats_mut().members_inspected += 1;
                if let Err(issue) = Self::check(ty, member, marker) {
                    report.record(issue.on_type(ty.name()).on_member(member.name()));
                    continue;
                }
                let marker = match ty.marker() {
                    Some(type_marker) => marker.merged_with(type_marker),
                    None => marker.clone(),
                };
                out.push(InspectedMember {
                    member: member.clone(),
                    marker,
                });
            }
        }
        out
    }

    fn check(ty: &TypeDescriptor, member: &MemberDescriptor, marker: &MonitorMarker) -> Result<(), ScanIssue> {
        if let Some(binding) = member.binding() {
            if binding.kind() != member.kind() || binding.is_static() != member.is_static() {
                return Err(malformed(format!(
                    "declared as {} {} but bound as {} {}",
                    scope_name(member.is_static()),
                    member.kind(),
                    scope_name(binding.is_static()),
                    binding.kind()
                )));
            }
            if let Some(holder) = binding.holder_type() {
                if &holder != ty.key() {
                    return Err(malformed(format!(
                        "accessor reads '{}', not '{}'",
                        holder.name(),
                        ty.name()
                    )));
                }
            }
        }

        if member.kind() != MemberKind::Method {
            if !marker.args.is_empty() {
                return Err(malformed("only methods take marker arguments".to_string()));
            }
            return Ok(());
        }

        let Some(shape) = member.method_shape() else {
            return Err(malformed("method without signature information".to_string()));
        };
        if !shape.is_observable() {
            return Err(ScanIssue::warning(
                ScanIssueKind::MemberInspection,
                "method returns nothing and has no out parameters, skipped",
            ));
        }
        if shape.params != marker.args.len() {
            return Err(malformed(format!(
                "method takes {} argument(s), marker supplies {}",
                shape.params,
                marker.args.len()
            )));
        }
        Ok(())
    }
}

fn malformed(message: String) -> ScanIssue {
    ScanIssue::error(ScanIssueKind::MemberInspection, message)
}

fn scope_name(is_static: bool) -> &'static str {
    if is_static { "static" } else { "instance" }
}
