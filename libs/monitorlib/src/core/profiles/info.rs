// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::types::{MemberKind, TypeKey};
use serde::Serialize;

/// Identity used for duplicate suppression: a member reached twice through
/// different paths (an interface and a generic base, say) has one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberIdentity {
    pub origin: TypeKey,
    pub name: String,
    pub is_static: bool,
}

/// Descriptive half of a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileInfo {
    /// Type the profile is registered under; unit targets must be of it.
    pub declaring_type: TypeKey,
    pub declaring_type_name: String,
    /// Type that actually declares the member (an ancestor for inherited
    /// generic members).
    pub holder_type: String,
    /// Member origin: the generic definition for members of closed generics.
    pub origin: TypeKey,
    pub member_name: String,
    pub member_kind: MemberKind,
    pub is_static: bool,
    pub value_type: String,
    pub label: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_event: Option<String>,
    pub enabled_by_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,
    pub writable: bool,
    pub has_validator: bool,
}

impl ProfileInfo {
    pub fn identity(&self) -> MemberIdentity {
        MemberIdentity {
            origin: self.origin.clone(),
            name: self.member_name.clone(),
            is_static: self.is_static,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
