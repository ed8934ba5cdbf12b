// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `#[monitor_members]` on an inherent impl block
//!
//! Marked functions become properties, methods, events, visibility
//! predicates or value processors of the type. The impl block is emitted
//! unchanged apart from the stripped `#[monitor]` attributes, followed by a
//! `MonitoredMembers` impl.

use crate::attributes::{MarkerAttributes, MethodRole};
use crate::codegen::{marker_tokens, type_string};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Result, ReturnType, Signature, Type, WherePredicate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    Shared,
    None,
}

/// One marked function of the impl block.
struct MarkedFn {
    ident: Ident,
    receiver: Receiver,
    params: Vec<Type>,
    returns: Option<Type>,
    marker: MarkerAttributes,
}

impl MarkedFn {
    fn from_item(item: &mut ImplItemFn) -> Result<Option<Self>> {
        let marker = MarkerAttributes::parse(&item.attrs)?;
        item.attrs.retain(|attr| !attr.path().is_ident("monitor"));
        if !marker.marked {
            return Ok(None);
        }

        let sig = &item.sig;
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(&sig.generics, "monitored functions can not be generic"));
        }
        if sig.asyncness.is_some() {
            return Err(syn::Error::new_spanned(sig.asyncness, "monitored functions can not be async"));
        }

        let receiver = receiver_of(sig)?;
        let params = sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(typed) => Some((*typed.ty).clone()),
                FnArg::Receiver(_) => None,
            })
            .collect();
        let returns = match &sig.output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) if is_unit(ty) => None,
            ReturnType::Type(_, ty) => Some((**ty).clone()),
        };

        Ok(Some(Self {
            ident: sig.ident.clone(),
            receiver,
            params,
            returns,
            marker,
        }))
    }

    fn is_static(&self) -> bool {
        self.receiver == Receiver::None
    }

    fn name(&self) -> String {
        self.ident.to_string()
    }

    fn error(&self, message: &str) -> syn::Error {
        syn::Error::new_spanned(&self.ident, message)
    }
}

fn receiver_of(sig: &Signature) -> Result<Receiver> {
    match sig.receiver() {
        None => Ok(Receiver::None),
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => Ok(Receiver::Shared),
        Some(receiver) => Err(syn::Error::new_spanned(
            receiver,
            "monitored methods take `&self` or no receiver",
        )),
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

fn referent(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Reference(reference) => Some(&reference.elem),
        _ => None,
    }
}

fn is_usize(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if path.path.is_ident("usize"))
}

/// Generated pieces for one marked function.
#[derive(Default)]
struct Contribution {
    member: Option<TokenStream>,
    definition: Option<TokenStream>,
    method: Option<TokenStream>,
    bounds: Vec<WherePredicate>,
}

fn contribute(f: &MarkedFn) -> Result<Contribution> {
    match f.marker.role {
        MethodRole::Predicate => predicate(f),
        MethodRole::Processor => processor(f),
        MethodRole::Member => member(f),
    }
}

fn predicate(f: &MarkedFn) -> Result<Contribution> {
    let ident = &f.ident;
    let name = f.name();
    if !f.params.is_empty() {
        return Err(f.error("predicates take no parameters"));
    }
    if !matches!(&f.returns, Some(Type::Path(p)) if p.path.is_ident("bool")) {
        return Err(f.error("predicates return `bool`"));
    }
    let method = if f.is_static() {
        quote! { ::monitorlib::NamedMethod::static_predicate(#name, || Self::#ident()) }
    } else {
        quote! { ::monitorlib::NamedMethod::instance_predicate::<Self>(#name, |this| this.#ident()) }
    };
    Ok(Contribution {
        method: Some(method),
        ..Default::default()
    })
}

fn processor(f: &MarkedFn) -> Result<Contribution> {
    let ident = &f.ident;
    let name = f.name();
    if !f.is_static() {
        return Err(f.error("processors are associated functions without `self`"));
    }
    if !matches!(&f.returns, Some(Type::Path(p)) if p.path.is_ident("String")) {
        return Err(f.error("processors return `String`"));
    }
    let shape_error = || f.error("processors take `&V`, `&E, usize` or `&K, &V`");
    let first = f.params.first().and_then(referent).ok_or_else(shape_error)?;
    let processor = match f.params.as_slice() {
        [_] => quote! { ::monitorlib::NamedProcessor::value::<#first>(#name, Self::#ident) },
        [_, index] if is_usize(index) => {
            quote! { ::monitorlib::NamedProcessor::indexed::<#first>(#name, Self::#ident) }
        }
        [_, second] => {
            let second = referent(second).ok_or_else(shape_error)?;
            quote! { ::monitorlib::NamedProcessor::entry::<#first, #second>(#name, Self::#ident) }
        }
        _ => return Err(shape_error()),
    };
    Ok(Contribution {
        method: Some(quote! { ::monitorlib::NamedMethod::processor(#processor) }),
        ..Default::default()
    })
}

fn member(f: &MarkedFn) -> Result<Contribution> {
    let ident = &f.ident;
    let name = f.name();
    let is_static = f.is_static();
    let marker = marker_tokens(&f.marker);

    // Nothing comes back: kept so the profiler can report it.
    let Some(returns) = &f.returns else {
        let params = f.params.len();
        let descriptor = quote! {
            ::monitorlib::MemberDescriptor::void_method(#name, #is_static, #params).with_marker(#marker)
        };
        return Ok(Contribution {
            member: Some(descriptor.clone()),
            definition: Some(descriptor),
            ..Default::default()
        });
    };

    if f.marker.event {
        let Some(event) = referent(returns) else {
            return Err(f.error("event accessors return a reference to the event"));
        };
        if !f.params.is_empty() {
            return Err(f.error("event accessors take no parameters"));
        }
        let binding = if is_static {
            quote! { ::monitorlib::bind::static_event::<#event>(Self::#ident) }
        } else {
            quote! { ::monitorlib::bind::event::<Self, #event>(|this| this.#ident()) }
        };
        return Ok(Contribution {
            member: Some(bound(&name, binding, &marker)),
            definition: Some(unbound(quote! { Event }, is_static, &name, event, &marker, None)),
            bounds: vec![syn::parse_quote! { #event: ::monitorlib::EventSource + 'static }],
            ..Default::default()
        });
    }

    if referent(returns).is_some() {
        return Err(f.error("monitored functions return an owned value"));
    }
    if f.params.iter().any(|p| referent(p).is_some()) {
        return Err(f.error("method parameters are passed by value from marker `args`"));
    }
    let value_bound: WherePredicate = syn::parse_quote! { #returns: ::monitorlib::MonitorValue };

    if f.params.is_empty() && !f.marker.method {
        let binding = match (&f.marker.setter, is_static) {
            (Some(setter), false) => {
                let setter = Ident::new(setter, Span::call_site());
                quote! {
                    ::monitorlib::bind::property_with_setter::<Self, #returns>(
                        |this| this.#ident(),
                        |this, value| this.#setter(value),
                    )
                }
            }
            (Some(setter), true) => {
                let setter = Ident::new(setter, Span::call_site());
                quote! { ::monitorlib::bind::static_property_with_setter::<#returns>(Self::#ident, Self::#setter) }
            }
            (None, false) => quote! { ::monitorlib::bind::property::<Self, #returns>(|this| this.#ident()) },
            (None, true) => quote! { ::monitorlib::bind::static_property::<#returns>(Self::#ident) },
        };
        return Ok(Contribution {
            member: Some(bound(&name, binding, &marker)),
            definition: Some(unbound(quote! { Property }, is_static, &name, returns, &marker, None)),
            bounds: vec![value_bound],
            ..Default::default()
        });
    }

    if f.marker.setter.is_some() {
        return Err(f.error("only properties take a `setter`"));
    }
    let params = &f.params;
    let indices = (0..params.len()).map(syn::Index::from);
    let calls = quote! { #(args.#indices.clone()),* };
    let binding = if is_static {
        quote! {
            ::monitorlib::bind::static_method::<(#(#params,)*), #returns>(|args| Self::#ident(#calls))
        }
    } else {
        quote! {
            ::monitorlib::bind::method::<Self, (#(#params,)*), #returns>(|this, args| this.#ident(#calls))
        }
    };
    let arity = params.len();
    Ok(Contribution {
        member: Some(bound(&name, binding, &marker)),
        definition: Some(unbound(quote! { Method }, is_static, &name, returns, &marker, Some(arity))),
        bounds: vec![value_bound],
        ..Default::default()
    })
}

fn bound(name: &str, binding: TokenStream, marker: &TokenStream) -> TokenStream {
    quote! { ::monitorlib::MemberDescriptor::bound(#name, #binding).with_marker(#marker) }
}

fn unbound(
    kind: TokenStream,
    is_static: bool,
    name: &str,
    value_type: &Type,
    marker: &TokenStream,
    method_params: Option<usize>,
) -> TokenStream {
    let value_type = type_string(value_type);
    let shape = method_params.map(|params| {
        quote! {
            .with_method_shape(::monitorlib::MethodShape {
                returns_value: true,
                out_params: 0,
                params: #params,
            })
        }
    });
    quote! {
        ::monitorlib::MemberDescriptor::unbound(::monitorlib::MemberKind::#kind, #is_static, #name, #value_type)
            #shape
            .with_marker(#marker)
    }
}

pub fn expand(mut item: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(path, "#[monitor_members] goes on an inherent impl block"));
    }

    let mut marked = Vec::new();
    for impl_item in &mut item.items {
        if let ImplItem::Fn(f) = impl_item {
            marked.extend(MarkedFn::from_item(f)?);
        }
    }

    let mut members = Vec::new();
    let mut definitions = Vec::new();
    let mut methods = Vec::new();
    let mut bounds = Vec::new();
    for f in &marked {
        let contribution = contribute(f)?;
        members.extend(contribution.member);
        definitions.extend(contribution.definition);
        methods.extend(contribution.method);
        bounds.extend(contribution.bounds);
    }

    let self_ty = &item.self_ty;
    let mut generics = item.generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        where_clause
            .predicates
            .push(syn::parse_quote! { #self_ty: ::std::marker::Send + ::std::marker::Sync + 'static });
        where_clause.predicates.extend(bounds);
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #item

        impl #impl_generics ::monitorlib::MonitoredMembers for #self_ty #where_clause {
            fn monitored_members() -> ::std::vec::Vec<::monitorlib::MemberDescriptor> {
                ::std::vec![#(#members),*]
            }

            fn monitored_methods() -> ::std::vec::Vec<::monitorlib::NamedMethod> {
                ::std::vec![#(#methods),*]
            }

            fn definition_members() -> ::std::vec::Vec<::monitorlib::MemberDescriptor> {
                ::std::vec![#(#definitions),*]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_str(item: ItemImpl) -> String {
        expand(item).unwrap().to_string()
    }

    #[test]
    fn test_getter_becomes_property_and_attrs_are_stripped() {
        let code = expand_str(parse_quote! {
            impl Player {
                #[monitor(label = "Speed")]
                fn speed(&self) -> f32 { self.speed }
            }
        });
        assert!(code.contains("bind :: property :: < Self , f32 >"));
        assert!(code.contains("MemberKind :: Property"));
        assert!(!code.contains("# [monitor"));
    }

    #[test]
    fn test_method_with_params_and_statics() {
        let code = expand_str(parse_quote! {
            impl Player {
                #[monitor(args = [2])]
                fn damage_at(&self, level: i64) -> i64 { level }

                #[monitor]
                fn population() -> u32 { 3 }

                #[monitor(method)]
                fn roll(&self) -> i32 { 4 }
            }
        });
        assert!(code.contains("bind :: method :: < Self , (i64 ,) , i64 >"));
        assert!(code.contains("args . 0 . clone ()"));
        assert!(code.contains("bind :: static_property :: < u32 >"));
        assert!(code.contains("bind :: method :: < Self , () , i32 >"));
        assert!(code.contains("params : 1usize"));
    }

    #[test]
    fn test_predicates_processors_and_void_methods() {
        let code = expand_str(parse_quote! {
            impl Player {
                #[monitor(predicate)]
                fn is_alive(&self) -> bool { true }

                #[monitor(processor)]
                fn fmt_hp(hp: &i32) -> String { hp.to_string() }

                #[monitor(processor)]
                fn fmt_slot(item: &String, index: usize) -> String { item.clone() }

                #[monitor]
                fn reset(&self) {}
            }
        });
        assert!(code.contains("instance_predicate :: < Self >"));
        assert!(code.contains("NamedProcessor :: value :: < i32 >"));
        assert!(code.contains("NamedProcessor :: indexed :: < String >"));
        assert!(code.contains("void_method (\"reset\" , false , 0usize)"));
    }

    #[test]
    fn test_event_accessor() {
        let code = expand_str(parse_quote! {
            impl Player {
                #[monitor(event)]
                fn on_death(&self) -> &MonitoredEvent { &self.on_death }
            }
        });
        assert!(code.contains("bind :: event :: < Self , MonitoredEvent >"));
        assert!(code.contains("MemberKind :: Event"));
    }

    #[test]
    fn test_rejected_signatures() {
        let mutable: ItemImpl = parse_quote! {
            impl Player {
                #[monitor]
                fn bump(&mut self) -> i32 { 1 }
            }
        };
        assert!(expand(mutable).is_err());

        let borrowed: ItemImpl = parse_quote! {
            impl Player {
                #[monitor]
                fn name(&self) -> &str { "x" }
            }
        };
        assert!(expand(borrowed).is_err());

        let on_trait: ItemImpl = parse_quote! {
            impl Clone for Player {
                #[monitor]
                fn clone(&self) -> Self { todo!() }
            }
        };
        assert!(expand(on_trait).is_err());
    }
}
