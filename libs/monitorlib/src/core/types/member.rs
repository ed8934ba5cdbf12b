// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::key::TypeKey;
use crate::core::marker::MonitorMarker;
use crate::core::profiles::MemberBinding;
use crate::core::values::{MonitorValue, ValueShape};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Member kinds in inspection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
    Event,
    Method,
}

impl MemberKind {
    pub const ALL: [MemberKind; 4] = [
        MemberKind::Field,
        MemberKind::Property,
        MemberKind::Event,
        MemberKind::Method,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
            MemberKind::Method => "method",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberScope {
    Static,
    Instance,
}

impl MemberScope {
    pub fn matches(self, is_static: bool) -> bool {
        match self {
            MemberScope::Static => is_static,
            MemberScope::Instance => !is_static,
        }
    }
}

/// Monitored value type of a member. Unbound members (declared on an open
/// generic definition) only know the written type name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueTypeInfo {
    pub name: String,
    #[serde(skip)]
    pub key: Option<TypeKey>,
    pub shape: Option<ValueShape>,
}

impl ValueTypeInfo {
    pub fn of<V: MonitorValue>() -> Self {
        Self {
            name: std::any::type_name::<V>().to_string(),
            key: Some(TypeKey::of::<V>()),
            shape: Some(V::SHAPE),
        }
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            shape: None,
        }
    }
}

/// Signature facts about a method member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MethodShape {
    pub returns_value: bool,
    pub out_params: usize,
    /// Parameters that take marker arguments.
    pub params: usize,
}

impl MethodShape {
    pub fn is_observable(&self) -> bool {
        self.returns_value || self.out_params > 0
    }
}

/// A declared member of a type.
#[derive(Clone)]
pub struct MemberDescriptor {
    kind: MemberKind,
    is_static: bool,
    name: String,
    value_type: ValueTypeInfo,
    marker: Option<MonitorMarker>,
    binding: Option<Arc<dyn MemberBinding>>,
    method: Option<MethodShape>,
}

impl MemberDescriptor {
    /// A member with an accessor. Kind, scope and value type come from the
    /// binding.
    pub fn bound(name: impl Into<String>, binding: Arc<dyn MemberBinding>) -> Self {
        Self {
            kind: binding.kind(),
            is_static: binding.is_static(),
            name: name.into(),
            value_type: binding.value_type(),
            marker: None,
            method: binding.method_shape(),
            binding: Some(binding),
        }
    }

    /// A member without an accessor, as declared on an open generic
    /// definition.
    pub fn unbound(
        kind: MemberKind,
        is_static: bool,
        name: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            is_static,
            name: name.into(),
            value_type: ValueTypeInfo::unbound(value_type),
            marker: None,
            binding: None,
            method: None,
        }
    }

    /// A method that can not be observed: nothing comes back from it.
    pub fn void_method(name: impl Into<String>, is_static: bool, params: usize) -> Self {
        Self {
            kind: MemberKind::Method,
            is_static,
            name: name.into(),
            value_type: ValueTypeInfo::unbound("()"),
            marker: None,
            binding: None,
            method: Some(MethodShape {
                returns_value: false,
                out_params: 0,
                params,
            }),
        }
    }

    pub fn with_marker(mut self, marker: MonitorMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// The same member with its marker removed.
    pub fn without_marker(mut self) -> Self {
        self.marker = None;
        self
    }

    pub fn with_method_shape(mut self, shape: MethodShape) -> Self {
        self.method = Some(shape);
        self
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueTypeInfo {
        &self.value_type
    }

    pub fn marker(&self) -> Option<&MonitorMarker> {
        self.marker.as_ref()
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    pub fn binding(&self) -> Option<&Arc<dyn MemberBinding>> {
        self.binding.as_ref()
    }

    pub fn method_shape(&self) -> Option<MethodShape> {
        self.method
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("kind", &self.kind)
            .field("is_static", &self.is_static)
            .field("name", &self.name)
            .field("value_type", &self.value_type.name)
            .field("marked", &self.marker.is_some())
            .field("bound", &self.binding.is_some())
            .finish()
    }
}
