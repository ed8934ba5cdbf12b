// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::descriptor::TypeDescriptor;
use crate::core::error::MetadataError;
use std::sync::Arc;

/// Types contributed by one compiled module.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    name: String,
    excluded: bool,
    types: Vec<Arc<TypeDescriptor>>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            excluded: false,
            types: Vec::new(),
        }
    }

    /// Tag the whole module "exclude from monitoring".
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    pub fn with_type(mut self, ty: Arc<TypeDescriptor>) -> Result<Self, MetadataError> {
        self.add_type(ty)?;
        Ok(self)
    }

    /// Append a type in declaration order. A key may appear once per module.
    pub fn add_type(&mut self, ty: Arc<TypeDescriptor>) -> Result<(), MetadataError> {
        if self.types.iter().any(|t| t.key() == ty.key()) {
            return Err(MetadataError::DuplicateType {
                module: self.name.clone(),
                type_name: ty.name().to_string(),
            });
        }
        self.types.push(ty);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub fn types(&self) -> &[Arc<TypeDescriptor>] {
        &self.types
    }
}

/// Link-time registration of a module's type metadata.
///
/// Building is deferred to scan time; a module whose `build_fn` fails is
/// reported and skipped.
///
/// # Example
///
/// ```ignore
/// monitorlib::register_monitor_module! {
///     name = "game",
///     types = [Player, Inventory],
///     generic_definitions = [Boxed<i32>],
/// }
/// ```
pub struct ModuleRegistration {
    pub name: &'static str,
    pub build_fn: fn() -> Result<ModuleDescriptor, MetadataError>,
}

impl ModuleRegistration {
    pub const fn new(
        name: &'static str,
        build_fn: fn() -> Result<ModuleDescriptor, MetadataError>,
    ) -> Self {
        Self { name, build_fn }
    }

    pub fn build(&self) -> Result<ModuleDescriptor, MetadataError> {
        (self.build_fn)()
    }
}

inventory::collect!(ModuleRegistration);

/// Register a module of monitored types with the link-time universe.
///
/// `types` lists types implementing [`Monitored`](crate::Monitored);
/// `generic_definitions` names any instantiation of a generic type whose
/// open definition should be part of the universe.
#[macro_export]
macro_rules! register_monitor_module {
    (
        name = $name:literal
        $(, exclude = $exclude:expr)?
        $(, types = [$($ty:ty),* $(,)?])?
        $(, generic_definitions = [$($def:ty),* $(,)?])?
        $(,)?
    ) => {
        const _: () = {
            fn __monitor_module(
            ) -> ::std::result::Result<$crate::ModuleDescriptor, $crate::MetadataError> {
                #[allow(unused_mut)]
                let mut module = $crate::ModuleDescriptor::new($name);
                $(
                    if $exclude {
                        module = module.excluded();
                    }
                )?
                $($(
                    module.add_type(<$ty as $crate::Monitored>::type_descriptor())?;
                )*)?
                $($(
                    let definition = <$def as $crate::Monitored>::generic_definition().ok_or_else(|| {
                        $crate::MetadataError::NotGeneric {
                            module: ::std::string::String::from($name),
                            type_name: ::std::string::String::from(stringify!($def)),
                        }
                    })?;
                    module.add_type(definition)?;
                )*)?
                Ok(module)
            }

            $crate::inventory::submit! {
                $crate::ModuleRegistration::new($name, __monitor_module)
            }
        };
    };
}
