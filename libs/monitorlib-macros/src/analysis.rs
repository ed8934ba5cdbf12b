// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Field analysis for `#[derive(Monitored)]`
//!
//! Splits the struct's fields into monitored members and parent links.

use crate::attributes::{MarkerAttributes, TypeAttributes};
use proc_macro2::Ident;
use syn::{Data, DeriveInput, Error, Fields, Generics, Result, Type};

/// How a member field is read.
#[derive(Debug, Clone)]
pub enum FieldAccess {
    /// `&this.field`
    Borrow,
    /// A lock read through `monitorlib::Guarded`.
    Guarded,
    /// `&this.field` as an event source.
    Event,
}

#[derive(Debug)]
pub struct MemberField {
    pub ident: Ident,
    pub ty: Type,
    pub access: FieldAccess,
    pub marker: MarkerAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRole {
    Base,
    Interface,
}

#[derive(Debug)]
pub struct ParentField {
    pub ident: Ident,
    pub ty: Type,
    pub role: ParentRole,
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub struct_name: Ident,
    pub generics: Generics,
    pub type_attrs: TypeAttributes,
    pub members: Vec<MemberField>,
    pub parents: Vec<ParentField>,
}

impl AnalysisResult {
    pub fn analyze(input: &DeriveInput) -> Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(Error::new_spanned(
                &input.ident,
                "Monitored can only be derived for structs",
            ));
        };
        let Fields::Named(fields) = &data.fields else {
            return Err(Error::new_spanned(
                &input.ident,
                "Monitored requires named fields",
            ));
        };
        if input.generics.lifetimes().next().is_some() {
            return Err(Error::new_spanned(
                &input.generics,
                "monitored types must be 'static, lifetime parameters are not supported",
            ));
        }

        let type_attrs = TypeAttributes::parse(&input.attrs)?;
        let mut members = Vec::new();
        let mut parents = Vec::new();

        for field in &fields.named {
            let marker = MarkerAttributes::parse(&field.attrs)?;
            if !marker.marked {
                continue;
            }
            let Some(ident) = field.ident.clone() else {
                continue;
            };

            if marker.base || marker.interface {
                if marker.base && marker.interface {
                    return Err(Error::new_spanned(&ident, "a field is either `base` or `interface`"));
                }
                parents.push(ParentField {
                    ident,
                    ty: field.ty.clone(),
                    role: if marker.base { ParentRole::Base } else { ParentRole::Interface },
                });
                continue;
            }

            let access = if marker.event {
                FieldAccess::Event
            } else if marker.guarded {
                FieldAccess::Guarded
            } else {
                FieldAccess::Borrow
            };

            if marker.writable && matches!(access, FieldAccess::Borrow) && marker.setter.is_none() {
                return Err(Error::new_spanned(
                    &ident,
                    "writable fields need `guarded` or a `setter = \"...\"`",
                ));
            }
            if !marker.args.is_empty() {
                return Err(Error::new_spanned(&ident, "only methods take `args`"));
            }

            members.push(MemberField {
                ident,
                ty: field.ty.clone(),
                access,
                marker,
            });
        }

        Ok(Self {
            struct_name: input.ident.clone(),
            generics: input.generics.clone(),
            type_attrs,
            members,
            parents,
        })
    }

    pub fn is_generic(&self) -> bool {
        self.generics.type_params().next().is_some()
    }

    /// Name used for the type's descriptor, without generic arguments.
    pub fn display_name(&self) -> String {
        self.type_attrs
            .name
            .clone()
            .unwrap_or_else(|| self.struct_name.to_string())
    }

    /// `Boxed<T>` for a generic definition.
    pub fn definition_name(&self) -> String {
        let params: Vec<String> = self
            .generics
            .type_params()
            .map(|p| p.ident.to_string())
            .collect();
        format!("{}<{}>", self.display_name(), params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_classifies_fields() {
        let input: DeriveInput = parse_quote! {
            #[monitor(tags = ["unit"])]
            struct Soldier {
                #[monitor(base)]
                actor: Actor,
                #[monitor(label = "HP")]
                hp: i32,
                #[monitor(guarded, writable)]
                orders: parking_lot::Mutex<Vec<String>>,
                #[monitor(event)]
                on_hit: MonitoredEvent,
                ignored: u8,
            }
        };
        let analysis = AnalysisResult::analyze(&input).unwrap();

        assert_eq!(analysis.parents.len(), 1);
        assert_eq!(analysis.parents[0].role, ParentRole::Base);
        let names: Vec<String> = analysis.members.iter().map(|m| m.ident.to_string()).collect();
        assert_eq!(names, vec!["hp", "orders", "on_hit"]);
        assert!(matches!(analysis.members[1].access, FieldAccess::Guarded));
        assert!(matches!(analysis.members[2].access, FieldAccess::Event));
        assert!(!analysis.is_generic());
    }

    #[test]
    fn test_generic_definition_name() {
        let input: DeriveInput = parse_quote! {
            struct Pair<A, B> {
                #[monitor]
                first: A,
                #[monitor]
                second: B,
            }
        };
        let analysis = AnalysisResult::analyze(&input).unwrap();
        assert!(analysis.is_generic());
        assert_eq!(analysis.definition_name(), "Pair<A, B>");
    }

    #[test]
    fn test_writable_plain_field_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Door {
                #[monitor(writable)]
                open: bool,
            }
        };
        let err = AnalysisResult::analyze(&input).unwrap_err();
        assert!(err.to_string().contains("writable"));
    }

    #[test]
    fn test_enums_are_rejected() {
        let input: DeriveInput = parse_quote! {
            enum State { Idle, Busy }
        };
        assert!(AnalysisResult::analyze(&input).is_err());
    }
}
