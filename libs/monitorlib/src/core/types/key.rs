// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Serialize, Serializer};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Hash)]
enum KeyRepr {
    Concrete(TypeId),
    Definition(Arc<str>),
}

/// Identity of a type in the universe.
///
/// Concrete types are keyed by their [`TypeId`]; open generic definitions
/// have no `TypeId` and are keyed by their fully qualified path instead.
/// The display name never takes part in equality.
#[derive(Clone)]
pub struct TypeKey {
    repr: KeyRepr,
    name: Arc<str>,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            repr: KeyRepr::Concrete(TypeId::of::<T>()),
            name: Arc::from(std::any::type_name::<T>()),
        }
    }

    /// Key of an open generic definition, e.g. `"game::Boxed"`.
    pub fn definition(path: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        Self {
            repr: KeyRepr::Definition(path.clone()),
            name: path,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self.repr {
            KeyRepr::Concrete(id) => Some(id),
            KeyRepr::Definition(_) => None,
        }
    }

    pub fn is_definition(&self) -> bool {
        matches!(self.repr, KeyRepr::Definition(_))
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repr.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            KeyRepr::Concrete(_) => write!(f, "TypeKey({})", self.name),
            KeyRepr::Definition(_) => write!(f, "TypeKey(def {})", self.name),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn test_concrete_keys_compare_by_type_id() {
        assert_eq!(TypeKey::of::<Marker>(), TypeKey::of::<Marker>());
        assert_ne!(TypeKey::of::<Marker>(), TypeKey::of::<u32>());
        assert!(TypeKey::of::<u32>().is::<u32>());
    }

    #[test]
    fn test_definition_keys_compare_by_path() {
        let a = TypeKey::definition("game::Boxed");
        let b = TypeKey::definition(String::from("game::Boxed"));
        assert_eq!(a, b);
        assert!(a.is_definition());
        assert_eq!(a.type_id(), None);
        assert_ne!(a, TypeKey::definition("game::Other"));
    }

    #[test]
    fn test_definition_never_equals_concrete() {
        let name = std::any::type_name::<Marker>();
        assert_ne!(TypeKey::definition(name), TypeKey::of::<Marker>());
    }
}
