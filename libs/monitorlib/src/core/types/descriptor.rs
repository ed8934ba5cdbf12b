// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::key::TypeKey;
use super::member::MemberDescriptor;
use super::upcast::{Upcast, UpcastPath};
use crate::core::formatting::NamedProcessor;
use crate::core::marker::TypeMarker;
use serde::Serialize;
use std::any::{type_name, Any};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Generic-ness of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericShape {
    NonGeneric,
    /// A generic definition with unbound parameters, `Boxed<T>`.
    OpenDefinition,
    /// A fully instantiated generic, `Boxed<i32>`.
    Closed {
        definition: TypeKey,
        args: Vec<TypeKey>,
    },
}

impl GenericShape {
    pub fn is_open(&self) -> bool {
        matches!(self, GenericShape::OpenDefinition)
    }

    pub fn definition(&self) -> Option<&TypeKey> {
        match self {
            GenericShape::Closed { definition, .. } => Some(definition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Base,
    Interface,
}

/// Edge to an ancestor type.
#[derive(Debug, Clone)]
pub struct ParentLink {
    pub kind: ParentKind,
    pub descriptor: Arc<TypeDescriptor>,
    pub upcast: Upcast,
}

/// Instance predicate erased over its receiver type.
pub trait InstancePredicate: Send + Sync {
    /// `None` when `target` is not the receiver type.
    fn test(&self, target: &dyn Any) -> Option<bool>;

    fn receiver(&self) -> &'static str;
}

struct TypedPredicate<D> {
    predicate: fn(&D) -> bool,
}

impl<D: Any> InstancePredicate for TypedPredicate<D> {
    fn test(&self, target: &dyn Any) -> Option<bool> {
        target.downcast_ref::<D>().map(self.predicate)
    }

    fn receiver(&self) -> &'static str {
        type_name::<D>()
    }
}

#[derive(Clone)]
pub enum MethodHandle {
    StaticPredicate(fn() -> bool),
    InstancePredicate(Arc<dyn InstancePredicate>),
    Processor(NamedProcessor),
}

/// A method of a type that markers may refer to by name: visibility
/// predicates and value processors.
#[derive(Clone)]
pub struct NamedMethod {
    name: String,
    handle: MethodHandle,
}

impl NamedMethod {
    pub fn static_predicate(name: impl Into<String>, predicate: fn() -> bool) -> Self {
        Self {
            name: name.into(),
            handle: MethodHandle::StaticPredicate(predicate),
        }
    }

    pub fn instance_predicate<D: Any>(name: impl Into<String>, predicate: fn(&D) -> bool) -> Self {
        Self {
            name: name.into(),
            handle: MethodHandle::InstancePredicate(Arc::new(TypedPredicate { predicate })),
        }
    }

    pub fn processor(processor: NamedProcessor) -> Self {
        Self {
            name: processor.name().to_string(),
            handle: MethodHandle::Processor(processor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &MethodHandle {
        &self.handle
    }

    pub fn is_static(&self) -> bool {
        !matches!(self.handle, MethodHandle::InstancePredicate(_))
    }
}

impl fmt::Debug for NamedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.handle {
            MethodHandle::StaticPredicate(_) => "static_predicate".to_string(),
            MethodHandle::InstancePredicate(p) => format!("instance_predicate<{}>", p.receiver()),
            MethodHandle::Processor(p) => p.signature().to_string(),
        };
        f.debug_struct("NamedMethod")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Everything the engine knows about one type.
pub struct TypeDescriptor {
    key: TypeKey,
    name: String,
    shape: GenericShape,
    compiler_generated: bool,
    marker: Option<TypeMarker>,
    parents: Vec<ParentLink>,
    members: Vec<MemberDescriptor>,
    methods: Vec<NamedMethod>,
}

impl TypeDescriptor {
    /// Start a descriptor for the concrete Rust type `T`.
    pub fn builder<T: Any>(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(TypeKey::of::<T>(), name.into(), GenericShape::NonGeneric)
    }

    /// Start a descriptor for an open generic definition.
    pub fn definition(path: impl Into<Arc<str>>, name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(
            TypeKey::definition(path),
            name.into(),
            GenericShape::OpenDefinition,
        )
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &GenericShape {
        &self.shape
    }

    pub fn is_compiler_generated(&self) -> bool {
        self.compiler_generated
    }

    pub fn is_excluded(&self) -> bool {
        self.marker.as_ref().is_some_and(|m| m.exclude)
    }

    pub fn marker(&self) -> Option<&TypeMarker> {
        self.marker.as_ref()
    }

    pub fn parents(&self) -> &[ParentLink] {
        &self.parents
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn methods(&self) -> &[NamedMethod] {
        &self.methods
    }

    pub fn member(&self, name: &str, is_static: bool) -> Option<&MemberDescriptor> {
        self.members
            .iter()
            .find(|m| m.name() == name && m.is_static() == is_static)
    }

    pub fn method(&self, name: &str) -> Option<&NamedMethod> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Key under which members declared here are identified: the generic
    /// definition for closed generics, the type itself otherwise.
    pub fn origin_key(&self) -> &TypeKey {
        self.shape.definition().unwrap_or(&self.key)
    }

    /// Every ancestor, depth-first, bases before interfaces, each visited
    /// once, with the upcast path from `self` to it.
    pub fn ancestors(&self) -> Vec<(Arc<TypeDescriptor>, UpcastPath)> {
        let mut seen = HashSet::new();
        seen.insert(self.key.clone());
        let mut out = Vec::new();
        collect_ancestors(self, &UpcastPath::new(), &mut seen, &mut out);
        out
    }

    /// True when `key` is this type or one of its ancestors.
    pub fn is_or_derives_from(&self, key: &TypeKey) -> bool {
        &self.key == key || self.ancestors().iter().any(|(a, _)| a.key() == key)
    }
}

fn collect_ancestors(
    ty: &TypeDescriptor,
    path: &UpcastPath,
    seen: &mut HashSet<TypeKey>,
    out: &mut Vec<(Arc<TypeDescriptor>, UpcastPath)>,
) {
    let ordered = ty
        .parents
        .iter()
        .filter(|p| p.kind == ParentKind::Base)
        .chain(ty.parents.iter().filter(|p| p.kind == ParentKind::Interface));
    for parent in ordered {
        if !seen.insert(parent.descriptor.key.clone()) {
            continue;
        }
        let parent_path = path.then(parent.upcast.clone());
        out.push((parent.descriptor.clone(), parent_path.clone()));
        collect_ancestors(&parent.descriptor, &parent_path, seen, out);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("members", &self.members)
            .field(
                "parents",
                &self
                    .parents
                    .iter()
                    .map(|p| p.descriptor.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub struct TypeDescriptorBuilder {
    descriptor: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    fn new(key: TypeKey, name: String, shape: GenericShape) -> Self {
        Self {
            descriptor: TypeDescriptor {
                key,
                name,
                shape,
                compiler_generated: false,
                marker: None,
                parents: Vec::new(),
                members: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    /// Mark this concrete type as an instantiation of `definition`.
    pub fn closing(mut self, definition: TypeKey, args: Vec<TypeKey>) -> Self {
        self.descriptor.shape = GenericShape::Closed { definition, args };
        self
    }

    pub fn compiler_generated(mut self) -> Self {
        self.descriptor.compiler_generated = true;
        self
    }

    pub fn marker(mut self, marker: TypeMarker) -> Self {
        self.descriptor.marker = Some(marker);
        self
    }

    pub fn base(mut self, descriptor: Arc<TypeDescriptor>, upcast: Upcast) -> Self {
        self.descriptor.parents.push(ParentLink {
            kind: ParentKind::Base,
            descriptor,
            upcast,
        });
        self
    }

    pub fn interface(mut self, descriptor: Arc<TypeDescriptor>, upcast: Upcast) -> Self {
        self.descriptor.parents.push(ParentLink {
            kind: ParentKind::Interface,
            descriptor,
            upcast,
        });
        self
    }

    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.descriptor.members.push(member);
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = MemberDescriptor>) -> Self {
        self.descriptor.members.extend(members);
        self
    }

    pub fn method(mut self, method: NamedMethod) -> Self {
        self.descriptor.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = NamedMethod>) -> Self {
        self.descriptor.methods.extend(methods);
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Root;
    struct Left {
        root: Root,
    }
    struct Right {
        root: Root,
    }
    struct Leaf {
        left: Left,
        right: Right,
    }

    fn root() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder::<Root>("Root").build()
    }

    #[test]
    fn test_ancestors_visit_each_type_once() {
        let left = TypeDescriptor::builder::<Left>("Left")
            .base(root(), Upcast::field::<Left, Root>(|l| &l.root))
            .build();
        let right = TypeDescriptor::builder::<Right>("Right")
            .base(root(), Upcast::field::<Right, Root>(|r| &r.root))
            .build();
        let leaf = TypeDescriptor::builder::<Leaf>("Leaf")
            .interface(right, Upcast::field::<Leaf, Right>(|l| &l.right))
            .base(left, Upcast::field::<Leaf, Left>(|l| &l.left))
            .build();

        let names: Vec<_> = leaf
            .ancestors()
            .iter()
            .map(|(a, p)| (a.name().to_string(), p.len()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Left".to_string(), 1),
                ("Root".to_string(), 2),
                ("Right".to_string(), 1),
            ]
        );
        assert!(leaf.is_or_derives_from(&TypeKey::of::<Root>()));
    }

    #[test]
    fn test_origin_key_of_closed_generic_is_definition() {
        let def = TypeKey::definition("tests::Boxed");
        let closed = TypeDescriptor::builder::<Vec<u8>>("Boxed<u8>")
            .closing(def.clone(), vec![TypeKey::of::<u8>()])
            .build();
        assert_eq!(closed.origin_key(), &def);
        assert_eq!(root().origin_key(), &TypeKey::of::<Root>());
    }

    #[test]
    fn test_named_method_lookup() {
        fn debug_enabled() -> bool {
            true
        }
        fn alive(l: &Left) -> bool {
            let _ = &l.root;
            true
        }
        let ty = TypeDescriptor::builder::<Left>("Left")
            .method(NamedMethod::static_predicate("debug_enabled", debug_enabled))
            .method(NamedMethod::instance_predicate::<Left>("alive", alive))
            .build();
        assert!(ty.method("debug_enabled").is_some_and(NamedMethod::is_static));
        assert!(ty.method("alive").is_some_and(|m| !m.is_static()));
        assert!(ty.method("missing").is_none());
    }
}
