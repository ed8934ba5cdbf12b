// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Profile registry.
//!
//! Filled append-only by one profiling run through
//! [`ProfileRegistryBuilder`], then frozen into a read-only
//! [`ProfileRegistry`] shared by `Arc`.

use crate::core::error::ProfileError;
use crate::core::profiles::{MemberIdentity, MonitorProfile, MonitorUnit, ProfileInfo, Target};
use crate::core::types::{TypeDescriptor, TypeKey, UpcastPath};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
pub struct ProfileRegistryBuilder {
    statics: Vec<Arc<dyn MonitorProfile>>,
    types: HashMap<TypeKey, Vec<Arc<dyn MonitorProfile>>>,
    /// Declaring types in first-insertion order.
    order: Vec<TypeKey>,
    seen: HashSet<(TypeKey, MemberIdentity)>,
    descriptors: HashMap<TypeId, Arc<TypeDescriptor>>,
}

impl ProfileRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a scanned type known, so units can be created for its instances
    /// even when it declares no profile of its own.
    pub fn add_type(&mut self, descriptor: &Arc<TypeDescriptor>) {
        if let Some(id) = descriptor.key().type_id() {
            self.descriptors.entry(id).or_insert_with(|| descriptor.clone());
        }
    }

    /// Whether a profile with this identity is registered under `declaring`.
    pub fn contains(&self, declaring: &TypeKey, identity: &MemberIdentity) -> bool {
        self.seen.contains(&(declaring.clone(), identity.clone()))
    }

    /// Append a static profile. `false` for a duplicate identity.
    pub fn add_static(&mut self, profile: Arc<dyn MonitorProfile>) -> bool {
        if !self.claim(profile.info()) {
            return false;
        }
        self.statics.push(profile);
        true
    }

    /// Append an instance profile under its declaring type. `false` for a
    /// duplicate identity.
    pub fn add_instance(&mut self, profile: Arc<dyn MonitorProfile>) -> bool {
        if !self.claim(profile.info()) {
            return false;
        }
        let key = profile.info().declaring_type.clone();
        let profiles = self.types.entry(key.clone()).or_insert_with(|| {
            self.order.push(key);
            Vec::new()
        });
        profiles.push(profile);
        true
    }

    fn claim(&mut self, info: &ProfileInfo) -> bool {
        let claimed = self
            .seen
            .insert((info.declaring_type.clone(), info.identity()));
        if !claimed {
            tracing::debug!(
                declaring_type = %info.declaring_type_name,
                member = %info.member_name,
                "Duplicate member identity suppressed"
            );
        }
        claimed
    }

    pub fn len(&self) -> usize {
        self.statics.len() + self.types.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn freeze(self) -> ProfileRegistry {
        ProfileRegistry {
            statics: self.statics,
            order: self.order,
            types: self.types,
            descriptors: self.descriptors,
        }
    }
}

/// Frozen registry. Read-only, shareable across threads.
pub struct ProfileRegistry {
    statics: Vec<Arc<dyn MonitorProfile>>,
    order: Vec<TypeKey>,
    types: HashMap<TypeKey, Vec<Arc<dyn MonitorProfile>>>,
    descriptors: HashMap<TypeId, Arc<TypeDescriptor>>,
}

/// A profile applicable to instances of some type, with the path from that
/// type to the profile's declaring type.
#[derive(Clone)]
pub struct ApplicableProfile {
    pub profile: Arc<dyn MonitorProfile>,
    pub entry: UpcastPath,
}

impl ProfileRegistry {
    pub fn empty() -> Self {
        ProfileRegistryBuilder::new().freeze()
    }

    pub fn static_profiles(&self) -> &[Arc<dyn MonitorProfile>] {
        &self.statics
    }

    /// Profiles registered under `key` itself.
    pub fn instance_profiles(&self, key: &TypeKey) -> &[Arc<dyn MonitorProfile>] {
        self.types.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Declaring types with instance profiles, in registration order.
    pub fn declaring_types(&self) -> &[TypeKey] {
        &self.order
    }

    /// Own profiles of `ty` followed by those of its ancestors, first
    /// occurrence of each member identity wins.
    pub fn profiles_for(&self, ty: &TypeDescriptor) -> Vec<ApplicableProfile> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let own = std::iter::once((ty.key().clone(), UpcastPath::new()));
        let ancestors = ty
            .ancestors()
            .into_iter()
            .map(|(a, path)| (a.key().clone(), path));
        for (key, entry) in own.chain(ancestors) {
            for profile in self.instance_profiles(&key) {
                if seen.insert(profile.info().identity()) {
                    out.push(ApplicableProfile {
                        profile: profile.clone(),
                        entry: entry.clone(),
                    });
                }
            }
        }
        out
    }

    /// Descriptor of a scanned concrete type.
    pub fn descriptor_of(&self, id: TypeId) -> Option<&Arc<TypeDescriptor>> {
        self.descriptors.get(&id)
    }

    pub fn len(&self) -> usize {
        self.statics.len() + self.types.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_static_units(&self) -> Vec<Box<dyn MonitorUnit>> {
        self.statics
            .iter()
            .filter_map(|profile| match profile.clone().create_unit(None) {
                Ok(unit) => Some(unit),
                Err(e) => {
                    tracing::warn!(member = %profile.info().member_name, "Failed to create static unit: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Units for every profile applicable to `target`, own and inherited.
    pub fn units_for(&self, target: &Target) -> Result<Vec<Box<dyn MonitorUnit>>, ProfileError> {
        let id = Any::type_id(&**target);
        let Some(descriptor) = self.descriptors.get(&id) else {
            return Ok(Vec::new());
        };
        self.profiles_for(descriptor)
            .into_iter()
            .map(|p| p.profile.create_unit_via(Some(target.clone()), &p.entry))
            .collect()
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            statics: self.statics.iter().map(|p| p.info().clone()).collect(),
            types: self
                .order
                .iter()
                .map(|key| {
                    let profiles: Vec<ProfileInfo> = self
                        .instance_profiles(key)
                        .iter()
                        .map(|p| p.info().clone())
                        .collect();
                    TypeSummary {
                        type_name: profiles
                            .first()
                            .map(|p| p.declaring_type_name.clone())
                            .unwrap_or_else(|| key.name().to_string()),
                        profiles,
                    }
                })
                .collect(),
        }
    }
}

/// Serializable snapshot of a registry's contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrySummary {
    pub statics: Vec<ProfileInfo>,
    pub types: Vec<TypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub type_name: String,
    pub profiles: Vec<ProfileInfo>,
}

impl RegistrySummary {
    pub fn len(&self) -> usize {
        self.statics.len() + self.types.iter().map(|t| t.profiles.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
