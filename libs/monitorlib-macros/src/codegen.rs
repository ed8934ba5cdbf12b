// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Code generation for `#[derive(Monitored)]`
//!
//! Non-generic types get a single descriptor with bound, marked members.
//! Generic types get two: the closed instantiation (bound, unmarked) and the
//! open definition (marked, unbound), which the profiler pairs up during
//! generic resolution.

use crate::analysis::{AnalysisResult, FieldAccess, MemberField, ParentRole};
use crate::attributes::{LiteralSpec, MarkerAttributes, ShowIfSpec, TypeAttributes};
use proc_macro2::{Span, TokenStream};
use quote::{quote, ToTokens};
use syn::{Ident, Type, WherePredicate};

pub fn generate_monitored_impl(analysis: &AnalysisResult) -> TokenStream {
    if analysis.is_generic() {
        generate_generic_impl(analysis)
    } else {
        generate_plain_impl(analysis)
    }
}

fn generate_plain_impl(analysis: &AnalysisResult) -> TokenStream {
    let struct_name = &analysis.struct_name;
    let display_name = analysis.display_name();
    let body = descriptor_body(analysis, true);

    quote! {
        impl ::monitorlib::Monitored for #struct_name {
            fn type_descriptor() -> ::std::sync::Arc<::monitorlib::TypeDescriptor> {
                ::monitorlib::TypeDescriptor::builder::<Self>(#display_name)
                    #body
                    .build()
            }
        }
    }
}

fn generate_generic_impl(analysis: &AnalysisResult) -> TokenStream {
    let struct_name = &analysis.struct_name;
    let display_name = analysis.display_name();
    let definition_name = analysis.definition_name();
    let params: Vec<&Ident> = analysis.generics.type_params().map(|p| &p.ident).collect();
    let definition_path = quote! { concat!(module_path!(), "::", #display_name) };

    let mut generics = analysis.generics.clone();
    let where_clause = generics.make_where_clause();
    for param in &params {
        where_clause
            .predicates
            .push(syn::parse_quote! { #param: ::std::marker::Send + ::std::marker::Sync + 'static });
    }
    for predicate in member_predicates(analysis) {
        where_clause.predicates.push(predicate);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let closed_body = descriptor_body(analysis, false);
    let type_marker = type_marker_call(&analysis.type_attrs);
    let unbound_members = analysis.members.iter().map(unbound_field_member);
    let definition_extra = if analysis.type_attrs.members {
        quote! { .members(<Self as ::monitorlib::MonitoredMembers>::definition_members()) }
    } else {
        quote! {}
    };
    let compiler_generated = compiler_generated_call(&analysis.type_attrs);

    quote! {
        impl #impl_generics ::monitorlib::Monitored for #struct_name #ty_generics #where_clause {
            fn type_descriptor() -> ::std::sync::Arc<::monitorlib::TypeDescriptor> {
                let args: ::std::vec::Vec<&str> = ::std::vec![#(::std::any::type_name::<#params>()),*];
                ::monitorlib::TypeDescriptor::builder::<Self>(
                    ::std::format!("{}<{}>", #display_name, args.join(", ")),
                )
                .closing(
                    ::monitorlib::TypeKey::definition(#definition_path),
                    ::std::vec![#(::monitorlib::TypeKey::of::<#params>()),*],
                )
                #closed_body
                .build()
            }

            fn generic_definition() -> ::std::option::Option<::std::sync::Arc<::monitorlib::TypeDescriptor>> {
                ::std::option::Option::Some(
                    ::monitorlib::TypeDescriptor::definition(#definition_path, #definition_name)
                        #compiler_generated
                        #type_marker
                        #(.member(#unbound_members))*
                        #definition_extra
                        .build(),
                )
            }
        }
    }
}

/// Builder calls shared by both descriptor kinds. `marked` is false for the
/// closed instantiation of a generic type, whose markers live on the
/// definition.
fn descriptor_body(analysis: &AnalysisResult, marked: bool) -> TokenStream {
    let compiler_generated = compiler_generated_call(&analysis.type_attrs);
    let type_marker = type_marker_call(&analysis.type_attrs);
    let members = analysis.members.iter().map(|field| {
        let bound = bound_field_member(field);
        if marked {
            let marker = marker_tokens(&field.marker);
            quote! { .member(#bound.with_marker(#marker)) }
        } else {
            quote! { .member(#bound) }
        }
    });
    let parents = analysis.parents.iter().map(|parent| {
        let ident = &parent.ident;
        let ty = &parent.ty;
        let link = match parent.role {
            ParentRole::Base => quote! { base },
            ParentRole::Interface => quote! { interface },
        };
        quote! {
            .#link(
                <#ty as ::monitorlib::Monitored>::type_descriptor(),
                ::monitorlib::Upcast::field::<Self, #ty>(|this| &this.#ident),
            )
        }
    });
    let impl_members = if analysis.type_attrs.members {
        let members = if marked {
            quote! { <Self as ::monitorlib::MonitoredMembers>::monitored_members() }
        } else {
            quote! {
                <Self as ::monitorlib::MonitoredMembers>::monitored_members()
                    .into_iter()
                    .map(::monitorlib::MemberDescriptor::without_marker)
            }
        };
        quote! {
            .members(#members)
            .methods(<Self as ::monitorlib::MonitoredMembers>::monitored_methods())
        }
    } else {
        quote! {}
    };

    quote! {
        #compiler_generated
        #type_marker
        #(#members)*
        #(#parents)*
        #impl_members
    }
}

fn compiler_generated_call(attrs: &TypeAttributes) -> TokenStream {
    if attrs.compiler_generated {
        quote! { .compiler_generated() }
    } else {
        quote! {}
    }
}

fn type_marker_call(attrs: &TypeAttributes) -> TokenStream {
    if !attrs.present {
        return quote! {};
    }
    let exclude = attrs.exclude;
    let tags = &attrs.defaults.tags;
    let mut defaults = attrs.defaults.clone();
    defaults.tags.clear();
    let defaults = marker_tokens(&defaults);
    quote! {
        .marker(::monitorlib::TypeMarker {
            exclude: #exclude,
            tags: ::std::vec![#(::std::string::String::from(#tags)),*],
            defaults: #defaults,
        })
    }
}

fn bound_field_member(field: &MemberField) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let name = ident.to_string();
    let binding = match (&field.access, &field.marker.setter) {
        (FieldAccess::Event, _) => quote! {
            ::monitorlib::bind::event::<Self, #ty>(|this| &this.#ident)
        },
        (FieldAccess::Guarded, _) if field.marker.writable => quote! {
            ::monitorlib::bind::visit_field_with_setter::<Self, <#ty as ::monitorlib::Guarded>::Value>(
                |this, visit| ::monitorlib::Guarded::visit(&this.#ident, visit),
                |this, value| ::monitorlib::Guarded::replace(&this.#ident, value),
            )
        },
        (FieldAccess::Guarded, _) => quote! {
            ::monitorlib::bind::visit_field::<Self, <#ty as ::monitorlib::Guarded>::Value>(
                |this, visit| ::monitorlib::Guarded::visit(&this.#ident, visit),
            )
        },
        (FieldAccess::Borrow, Some(setter)) => {
            let setter = Ident::new(setter, Span::call_site());
            quote! {
                ::monitorlib::bind::field_with_setter::<Self, #ty>(
                    |this| &this.#ident,
                    |this, value| this.#setter(value),
                )
            }
        }
        (FieldAccess::Borrow, None) => quote! {
            ::monitorlib::bind::field::<Self, #ty>(|this| &this.#ident)
        },
    };
    quote! { ::monitorlib::MemberDescriptor::bound(#name, #binding) }
}

fn unbound_field_member(field: &MemberField) -> TokenStream {
    let name = field.ident.to_string();
    let kind = match field.access {
        FieldAccess::Event => quote! { ::monitorlib::MemberKind::Event },
        FieldAccess::Borrow | FieldAccess::Guarded => quote! { ::monitorlib::MemberKind::Field },
    };
    let value_type = type_string(&field.ty);
    let marker = marker_tokens(&field.marker);
    quote! {
        ::monitorlib::MemberDescriptor::unbound(#kind, false, #name, #value_type).with_marker(#marker)
    }
}

/// Bounds the generated accessors need on a generic struct.
fn member_predicates(analysis: &AnalysisResult) -> Vec<WherePredicate> {
    let mut predicates: Vec<WherePredicate> = analysis
        .members
        .iter()
        .map(|field| {
            let ty = &field.ty;
            match field.access {
                FieldAccess::Borrow => syn::parse_quote! { #ty: ::monitorlib::MonitorValue },
                FieldAccess::Guarded => syn::parse_quote! {
                    #ty: ::monitorlib::Guarded<Value: ::monitorlib::MonitorValue>
                },
                FieldAccess::Event => syn::parse_quote! { #ty: ::monitorlib::EventSource + 'static },
            }
        })
        .collect();
    predicates.extend(analysis.parents.iter().map(|parent| -> WherePredicate {
        let ty = &parent.ty;
        syn::parse_quote! { #ty: ::monitorlib::Monitored }
    }));
    if analysis.type_attrs.members {
        let name = &analysis.struct_name;
        let (_, ty_generics, _) = analysis.generics.split_for_impl();
        predicates.push(syn::parse_quote! { #name #ty_generics: ::monitorlib::MonitoredMembers });
    }
    predicates
}

/// The written type, without token spacing: `Vec<T>`.
pub fn type_string(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

/// `::monitorlib::MonitorMarker::new().with_...` for the options that are set.
pub fn marker_tokens(marker: &MarkerAttributes) -> TokenStream {
    let mut calls = Vec::new();
    if let Some(label) = &marker.label {
        calls.push(quote! { .with_label(#label) });
    }
    if let Some(format) = &marker.format {
        calls.push(quote! { .with_format(#format) });
    }
    if let Some(processor) = &marker.processor {
        calls.push(quote! { .with_processor(#processor) });
    }
    if let Some(show_if) = &marker.show_if {
        let show_if = show_if_tokens(show_if);
        calls.push(quote! { .with_show_if(#show_if) });
    }
    if let Some(event) = &marker.update_event {
        calls.push(quote! { .with_update_event(#event) });
    }
    for tag in &marker.tags {
        calls.push(quote! { .with_tag(#tag) });
    }
    if let Some(enabled) = marker.enabled {
        calls.push(quote! { .with_enabled(#enabled) });
    }
    if let Some(indent) = marker.indent {
        calls.push(quote! { .with_indent(#indent) });
    }
    if let Some(show_index) = marker.show_index {
        calls.push(quote! { .with_show_index(#show_index) });
    }
    if let Some(prefix) = &marker.element_prefix {
        calls.push(quote! { .with_element_prefix(#prefix) });
    }
    if let Some(rich_text) = marker.rich_text {
        calls.push(quote! { .with_rich_text(#rich_text) });
    }
    if let Some(size) = marker.font_size {
        calls.push(quote! { .with_font_size(#size) });
    }
    if let Some(group) = &marker.group {
        calls.push(quote! { .with_group(#group) });
    }
    if marker.writable {
        calls.push(quote! { .writable() });
    }
    if !marker.args.is_empty() {
        let args = marker.args.iter().map(literal_tokens);
        calls.push(quote! { .with_args([#(#args),*]) });
    }
    quote! { ::monitorlib::MonitorMarker::new() #(#calls)* }
}

fn show_if_tokens(show_if: &ShowIfSpec) -> TokenStream {
    match show_if {
        ShowIfSpec::Condition(name) => {
            let name = Ident::new(name, Span::call_site());
            quote! { ::monitorlib::ShowIf::Condition(::monitorlib::Condition::#name) }
        }
        ShowIfSpec::Compare(op, value) => {
            let op = Ident::new(op, Span::call_site());
            let value = literal_tokens(value);
            quote! { ::monitorlib::ShowIf::Compare(::monitorlib::Comparison::#op, #value) }
        }
        ShowIfSpec::StaticMethod(name) => {
            quote! { ::monitorlib::ShowIf::StaticMethod(::std::string::String::from(#name)) }
        }
        ShowIfSpec::InstanceMethod(name) => {
            quote! { ::monitorlib::ShowIf::InstanceMethod(::std::string::String::from(#name)) }
        }
    }
}

fn literal_tokens(literal: &LiteralSpec) -> TokenStream {
    match literal {
        LiteralSpec::Null => quote! { ::monitorlib::Literal::Null },
        LiteralSpec::Bool(b) => quote! { ::monitorlib::Literal::Bool(#b) },
        LiteralSpec::Int(i) => quote! { ::monitorlib::Literal::Int(#i) },
        LiteralSpec::Float(f) => quote! { ::monitorlib::Literal::Float(#f) },
        LiteralSpec::Text(s) => quote! { ::monitorlib::Literal::Text(::std::string::String::from(#s)) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput};

    fn generate(input: DeriveInput) -> String {
        let analysis = AnalysisResult::analyze(&input).unwrap();
        generate_monitored_impl(&analysis).to_string()
    }

    #[test]
    fn test_plain_struct_binds_marked_fields() {
        let code = generate(parse_quote! {
            struct Player {
                #[monitor(label = "HP", show_if = Positive)]
                hp: i32,
                name: String,
            }
        });
        assert!(code.contains("bind :: field :: < Self , i32 >"));
        assert!(code.contains("with_label (\"HP\")"));
        assert!(code.contains("Condition :: Positive"));
        assert!(!code.contains("\"name\""));
        assert!(!code.contains("generic_definition"));
        assert!(!code.contains(". marker ("));
    }

    #[test]
    fn test_generic_struct_emits_definition() {
        let code = generate(parse_quote! {
            #[monitor(tags = ["box"])]
            struct Boxed<T> {
                #[monitor(format = "F1")]
                value: T,
            }
        });
        assert!(code.contains("fn generic_definition"));
        assert!(code.contains("MemberDescriptor :: unbound"));
        assert!(code.contains("\"Boxed<T>\""));
        assert!(code.contains("T : :: monitorlib :: MonitorValue"));
        assert!(code.contains(". closing ("));
        assert!(code.contains("String :: from (\"box\")"));
    }

    #[test]
    fn test_guarded_and_parent_fields() {
        let code = generate(parse_quote! {
            struct Turret {
                #[monitor(base)]
                actor: Actor,
                #[monitor(guarded, writable)]
                heat: Mutex<f32>,
            }
        });
        assert!(code.contains("visit_field_with_setter"));
        assert!(code.contains("Guarded > :: Value"));
        assert!(code.contains(". base ("));
        assert!(code.contains("Upcast :: field :: < Self , Actor >"));
    }

    #[test]
    fn test_type_string_strips_spacing() {
        let ty: Type = parse_quote! { Vec<Option<T>> };
        assert_eq!(type_string(&ty), "Vec<Option<T>>");
    }

    #[test]
    fn test_marker_tokens_args() {
        let marker = MarkerAttributes {
            args: vec![LiteralSpec::Int(2), LiteralSpec::Text("x".into())],
            ..Default::default()
        };
        let code = marker_tokens(&marker).to_string();
        assert!(code.contains("with_args"));
        assert!(code.contains("Literal :: Int (2i64)"));
    }
}
