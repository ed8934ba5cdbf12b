// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Conversions from a derived type to one of its ancestors.
//!
//! Rust has no inheritance, so "base" types are embedded values reached
//! through an accessor and "interfaces" are views of the value itself. Both
//! are expressed as an [`UpcastStep`] from `&dyn Any` to `&dyn Any`.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

pub trait UpcastStep: Send + Sync {
    fn apply<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any>;

    fn describe(&self) -> String;
}

struct FieldUpcast<C, B> {
    get: fn(&C) -> &B,
}

impl<C: Any, B: Any> UpcastStep for FieldUpcast<C, B> {
    fn apply<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        let derived = value.downcast_ref::<C>()?;
        Some((self.get)(derived) as &dyn Any)
    }

    fn describe(&self) -> String {
        format!("{} -> {}", type_name::<C>(), type_name::<B>())
    }
}

struct IdentityUpcast<C> {
    _marker: std::marker::PhantomData<fn() -> C>,
}

impl<C: Any> UpcastStep for IdentityUpcast<C> {
    fn apply<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        value.downcast_ref::<C>().map(|v| v as &dyn Any)
    }

    fn describe(&self) -> String {
        type_name::<C>().to_string()
    }
}

/// One edge of the ancestry graph.
#[derive(Clone)]
pub struct Upcast(Arc<dyn UpcastStep>);

impl Upcast {
    /// Reach an embedded ancestor value through `get`.
    pub fn field<C: Any, B: Any>(get: fn(&C) -> &B) -> Self {
        Self(Arc::new(FieldUpcast { get }))
    }

    /// The ancestor view is the value itself (interface links).
    pub fn identity<C: Any>() -> Self {
        Self(Arc::new(IdentityUpcast::<C> {
            _marker: std::marker::PhantomData,
        }))
    }

    pub fn apply<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        self.0.apply(value)
    }
}

impl fmt::Debug for Upcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Upcast({})", self.0.describe())
    }
}

/// Chain of upcasts from a declaring type down to the ancestor that
/// actually holds a member. Empty for members declared on the type itself.
#[derive(Clone, Debug, Default)]
pub struct UpcastPath {
    steps: Vec<Upcast>,
}

impl UpcastPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(&self, step: Upcast) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// `self` followed by every step of `rest`.
    pub fn join(&self, rest: &UpcastPath) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(rest.steps.iter().cloned());
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn resolve<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        let mut current = value;
        for step in &self.steps {
            current = step.apply(current)?;
        }
        Some(current)
    }

    /// Resolve and downcast to the holder type in one go.
    pub fn resolve_as<'a, T: Any>(&self, value: &'a dyn Any) -> Option<&'a T> {
        self.resolve(value)?.downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner {
        value: u32,
    }

    struct Middle {
        inner: Inner,
    }

    struct Outer {
        middle: Middle,
    }

    #[test]
    fn test_path_resolves_through_embedded_ancestors() {
        let path = UpcastPath::new()
            .then(Upcast::field::<Outer, Middle>(|o| &o.middle))
            .then(Upcast::field::<Middle, Inner>(|m| &m.inner));

        let outer = Outer {
            middle: Middle {
                inner: Inner { value: 7 },
            },
        };
        let inner = path.resolve_as::<Inner>(&outer).map(|i| i.value);
        assert_eq!(inner, Some(7));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_joined_paths_apply_in_order() {
        let head = UpcastPath::new().then(Upcast::field::<Outer, Middle>(|o| &o.middle));
        let tail = UpcastPath::new().then(Upcast::field::<Middle, Inner>(|m| &m.inner));
        let outer = Outer {
            middle: Middle {
                inner: Inner { value: 3 },
            },
        };
        let joined = head.join(&tail);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.resolve_as::<Inner>(&outer).map(|i| i.value), Some(3));
    }

    #[test]
    fn test_path_rejects_wrong_root_type() {
        let path = UpcastPath::new().then(Upcast::field::<Middle, Inner>(|m| &m.inner));
        assert!(path.resolve(&42u32).is_none());
    }

    #[test]
    fn test_identity_keeps_value() {
        let path = UpcastPath::new().then(Upcast::identity::<u32>());
        assert_eq!(path.resolve_as::<u32>(&5u32), Some(&5));
        assert!(path.resolve(&5i64).is_none());
    }
}
