// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Explicit model of the observable type universe.

mod descriptor;
mod key;
mod member;
mod module;
mod monitored;
mod universe;
mod upcast;

pub use descriptor::{
    GenericShape, InstancePredicate, MethodHandle, NamedMethod, ParentKind, ParentLink,
    TypeDescriptor, TypeDescriptorBuilder,
};
pub use key::TypeKey;
pub use member::{MemberDescriptor, MemberKind, MemberScope, MethodShape, ValueTypeInfo};
pub use module::{ModuleDescriptor, ModuleRegistration};
pub use monitored::{Monitored, MonitoredMembers};
pub use universe::TypeUniverse;
pub use upcast::{Upcast, UpcastPath, UpcastStep};
