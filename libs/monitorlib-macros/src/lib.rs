// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Procedural macros for monitorlib
//!
//! - `#[derive(Monitored)]` describes a struct's marked fields, its base and
//!   interface parts, and its type-level marker.
//! - `#[monitor_members]` on an inherent impl block contributes marked
//!   functions: properties, methods, events, visibility predicates and
//!   value processors.
//!
//! ```ignore
//! use monitorlib::{monitor_members, Monitored, MonitoredEvent};
//!
//! #[derive(Monitored)]
//! #[monitor(members, tags = ["player"])]
//! struct Player {
//!     #[monitor(label = "HP", show_if = Positive, processor = "fmt_hp")]
//!     hp: i32,
//!
//!     #[monitor(guarded, writable)]
//!     target: parking_lot::Mutex<String>,
//!
//!     #[monitor(event)]
//!     on_death: MonitoredEvent<i32>,
//! }
//!
//! #[monitor_members]
//! impl Player {
//!     #[monitor(show_if = method("is_alive"))]
//!     fn speed(&self) -> f32 { 4.5 }
//!
//!     #[monitor(args = [2])]
//!     fn damage_at(&self, level: i64) -> i64 { level * 10 }
//!
//!     #[monitor(predicate)]
//!     fn is_alive(&self) -> bool { self.hp > 0 }
//!
//!     #[monitor(processor)]
//!     fn fmt_hp(hp: &i32) -> String { format!("{hp} hp") }
//! }
//! ```
//!
//! # Generic types
//!
//! A generic struct describes two types: each closed instantiation, with
//! accessors but no markers, and the open definition, with markers but no
//! accessors. Register the definition through any instantiation with
//! `generic_definitions = [Boxed<i32>]`; the profiler pairs the definition's
//! markers with every closed type it finds.

mod analysis;
mod attributes;
mod codegen;
mod members;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

/// Derive `monitorlib::Monitored`.
///
/// # Attributes
///
/// ## `#[monitor(...)]` on the type
///
/// - `exclude` - opt the type out of monitoring
/// - `compiler_generated` - treat the type as synthesized; it is never scanned
/// - `members` - include the type's `#[monitor_members]` impl block
/// - `name = "..."` - display name
/// - `tags = [...]`, `format`, `group`, `indent`, ... - defaults for every member
///
/// ## `#[monitor(...)]` on a field
///
/// - bare `#[monitor]` - monitor with defaults
/// - `label`, `format`, `processor = "fn"`, `show_if = ...`, `update_event`,
///   `tags`, `enabled`, `indent`, `show_index`, `element_prefix`,
///   `rich_text`, `font_size`, `group`
/// - `writable` with `guarded` or `setter = "fn"`
/// - `guarded` - a `Mutex<V>` / `RwLock<V>` read through its lock
/// - `event` - the field is an event source
/// - `base` / `interface` - the field is an ancestor part of the type
#[proc_macro_derive(Monitored, attributes(monitor))]
pub fn derive_monitored(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let analysis = match analysis::AnalysisResult::analyze(&input) {
        Ok(result) => result,
        Err(err) => return err.to_compile_error().into(),
    };

    TokenStream::from(codegen::generate_monitored_impl(&analysis))
}

/// Implement `monitorlib::MonitoredMembers` from the marked functions of an
/// inherent impl block.
///
/// - `&self` functions are instance members, functions without a receiver
///   are static
/// - no parameters: a property (`setter = "fn"` makes it writable), unless
///   `method` is given
/// - parameters: a method called with the marker's `args`
/// - `event`: the function returns `&E` for an event source `E`
/// - `predicate`: a `bool` function named by `show_if = method(..)` or
///   `static_method(..)`
/// - `processor`: a `fn(&V) -> String`, `fn(&E, usize) -> String` or
///   `fn(&K, &V) -> String` named by `processor = ".."`
///
/// Functions returning nothing are kept and reported by the profiler.
#[proc_macro_attribute]
pub fn monitor_members(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[monitor_members] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let item = parse_macro_input!(item as ItemImpl);
    match members::expand(item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
