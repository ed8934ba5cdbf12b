// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::module::{ModuleDescriptor, ModuleRegistration};
use crate::core::error::MetadataError;

enum ModuleSource {
    Deferred(fn() -> Result<ModuleDescriptor, MetadataError>),
    Built(Result<ModuleDescriptor, MetadataError>),
}

struct UniverseEntry {
    name: String,
    source: ModuleSource,
}

/// The set of modules visible to a scan.
///
/// [`TypeUniverse::loaded`] collects every module registered at link time;
/// tests and embedders can assemble one by hand.
#[derive(Default)]
pub struct TypeUniverse {
    entries: Vec<UniverseEntry>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every module registered through `register_monitor_module!`.
    ///
    /// Link order is not stable across builds, so modules are sorted by
    /// name; registrations with equal names keep their link order.
    pub fn loaded() -> Self {
        let mut registrations: Vec<&ModuleRegistration> =
            inventory::iter::<ModuleRegistration>().collect();
        registrations.sort_by_key(|r| r.name);
        tracing::debug!("Discovered {} registered module(s)", registrations.len());

        Self {
            entries: registrations
                .into_iter()
                .map(|r| UniverseEntry {
                    name: r.name.to_string(),
                    source: ModuleSource::Deferred(r.build_fn),
                })
                .collect(),
        }
    }

    pub fn from_modules(modules: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        let mut universe = Self::new();
        for module in modules {
            universe.add_module(module);
        }
        universe
    }

    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.add_module(module);
        self
    }

    pub fn add_module(&mut self, module: ModuleDescriptor) {
        self.entries.push(UniverseEntry {
            name: module.name().to_string(),
            source: ModuleSource::Built(Ok(module)),
        });
    }

    /// A module that is present but whose metadata can not be read.
    pub fn with_broken_module(mut self, name: impl Into<String>, error: MetadataError) -> Self {
        self.entries.push(UniverseEntry {
            name: name.into(),
            source: ModuleSource::Built(Err(error)),
        });
        self
    }

    pub fn with_registration(mut self, registration: &ModuleRegistration) -> Self {
        self.entries.push(UniverseEntry {
            name: registration.name.to_string(),
            source: ModuleSource::Deferred(registration.build_fn),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Enumerate modules in discovery order, building deferred ones.
    pub fn modules(&self) -> impl Iterator<Item = (&str, Result<ModuleDescriptor, MetadataError>)> {
        self.entries.iter().map(|entry| {
            let built = match &entry.source {
                ModuleSource::Deferred(build) => build(),
                ModuleSource::Built(result) => result.clone(),
            };
            (entry.name.as_str(), built)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_keep_insertion_order() {
        let universe = TypeUniverse::new()
            .with_module(ModuleDescriptor::new("b"))
            .with_broken_module(
                "c",
                MetadataError::Corrupt {
                    module: "c".into(),
                    reason: "truncated".into(),
                },
            )
            .with_module(ModuleDescriptor::new("a"));

        let names: Vec<_> = universe.module_names().collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        let results: Vec<bool> = universe.modules().map(|(_, r)| r.is_ok()).collect();
        assert_eq!(results, vec![true, false, true]);
    }

    #[test]
    fn test_registration_is_built_on_enumeration() {
        fn build() -> Result<ModuleDescriptor, MetadataError> {
            Ok(ModuleDescriptor::new("late"))
        }
        let registration = ModuleRegistration::new("late", build);
        let universe = TypeUniverse::new().with_registration(&registration);
        let (name, module) = universe.modules().next().unwrap();
        assert_eq!(name, "late");
        assert_eq!(module.unwrap().name(), "late");
    }
}
