// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::descriptor::{NamedMethod, TypeDescriptor};
use super::member::MemberDescriptor;
use std::any::Any;
use std::sync::Arc;

/// A type that describes itself to the profile compiler.
///
/// Usually derived with `#[derive(Monitored)]`.
pub trait Monitored: Any + Send + Sync {
    fn type_descriptor() -> Arc<TypeDescriptor>;

    /// Descriptor of the open generic definition this type instantiates.
    /// `None` for non-generic types.
    fn generic_definition() -> Option<Arc<TypeDescriptor>> {
        None
    }
}

/// Members and named methods contributed by `#[monitor_members]` impl
/// blocks.
pub trait MonitoredMembers {
    fn monitored_members() -> Vec<MemberDescriptor>;

    fn monitored_methods() -> Vec<NamedMethod> {
        Vec::new()
    }

    /// The same members without accessors, for the open definition of a
    /// generic type.
    fn definition_members() -> Vec<MemberDescriptor> {
        Vec::new()
    }
}
