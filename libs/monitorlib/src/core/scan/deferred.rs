// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::marker::MonitorMarker;
use crate::core::types::{MemberDescriptor, MemberKind, TypeKey};
use std::collections::BTreeMap;

/// A marked member declared on an open generic definition, waiting for a
/// closing subtype.
#[derive(Debug, Clone)]
pub struct DeferredMember {
    pub definition: TypeKey,
    pub definition_name: String,
    pub member: MemberDescriptor,
    /// Marker already merged with the definition's type marker.
    pub marker: MonitorMarker,
}

impl DeferredMember {
    pub fn is_static(&self) -> bool {
        self.member.is_static()
    }

    pub fn kind(&self) -> MemberKind {
        self.member.kind()
    }
}

/// Deferred members grouped by kind, in deferral order within a kind.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    by_kind: BTreeMap<MemberKind, Vec<DeferredMember>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, member: DeferredMember) {
        tracing::debug!(
            definition = %member.definition_name,
            member = member.member.name(),
            kind = %member.kind(),
            "Deferred generic member"
        );
        self.by_kind.entry(member.kind()).or_default().push(member);
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.values().all(Vec::is_empty)
    }

    /// All deferred members, kinds in inspection order.
    pub fn iter(&self) -> impl Iterator<Item = &DeferredMember> {
        self.by_kind.values().flatten()
    }

    pub fn of_kind(&self, kind: MemberKind) -> &[DeferredMember] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Members deferred from `definition`.
    pub fn for_definition<'a>(&'a self, definition: &'a TypeKey) -> impl Iterator<Item = &'a DeferredMember> + 'a {
        self.iter().filter(move |m| &m.definition == definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deferred(def: &str, kind: MemberKind, name: &str) -> DeferredMember {
        DeferredMember {
            definition: TypeKey::definition(def),
            definition_name: def.to_string(),
            member: MemberDescriptor::unbound(kind, false, name, "T"),
            marker: MonitorMarker::new(),
        }
    }

    #[test]
    fn test_iteration_follows_kind_order() {
        let mut queue = DeferredQueue::new();
        queue.push(deferred("a::Boxed", MemberKind::Method, "compute"));
        queue.push(deferred("a::Boxed", MemberKind::Field, "value"));
        queue.push(deferred("a::Pair", MemberKind::Property, "first"));

        let names: Vec<_> = queue.iter().map(|m| m.member.name().to_string()).collect();
        assert_eq!(names, vec!["value", "first", "compute"]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.of_kind(MemberKind::Field).len(), 1);
    }

    #[test]
    fn test_filter_by_definition() {
        let mut queue = DeferredQueue::new();
        assert!(queue.is_empty());
        queue.push(deferred("a::Boxed", MemberKind::Field, "value"));
        queue.push(deferred("a::Pair", MemberKind::Field, "first"));

        let key = TypeKey::definition("a::Pair");
        let names: Vec<_> = queue.for_definition(&key).map(|m| m.member.name()).collect();
        assert_eq!(names, vec!["first"]);
    }
}
