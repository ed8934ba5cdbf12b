// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! User-supplied value processors.
//!
//! A processor is a plain function pointer registered by name on a type
//! descriptor. Its signature is checked by downcasting the stored pointer
//! against the shapes a value type accepts, once, when the profile is
//! built.

use super::{FormatOptions, Scratch, ValueFormatter, NULL_TEXT};
use crate::core::values::MonitorValue;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Type-erased processor function with its name and signature.
#[derive(Clone)]
pub struct NamedProcessor {
    name: String,
    signature: String,
    handle: Arc<dyn Any + Send + Sync>,
}

impl NamedProcessor {
    /// `fn(&V) -> String`: formats the whole value.
    pub fn value<V: 'static>(name: impl Into<String>, f: fn(&V) -> String) -> Self {
        Self::erased(name, format!("fn(&{}) -> String", type_name::<V>()), f)
    }

    /// `fn(&E) -> String`: formats one element of a sequence.
    pub fn element<E: 'static>(name: impl Into<String>, f: fn(&E) -> String) -> Self {
        Self::value(name, f)
    }

    /// `fn(&E, usize) -> String`: formats one element with its index.
    pub fn indexed<E: 'static>(name: impl Into<String>, f: fn(&E, usize) -> String) -> Self {
        Self::erased(
            name,
            format!("fn(&{}, usize) -> String", type_name::<E>()),
            f,
        )
    }

    /// `fn(&K, &W) -> String`: formats one dictionary entry.
    pub fn entry<K: 'static, W: 'static>(
        name: impl Into<String>,
        f: fn(&K, &W) -> String,
    ) -> Self {
        Self::erased(
            name,
            format!("fn(&{}, &{}) -> String", type_name::<K>(), type_name::<W>()),
            f,
        )
    }

    fn erased<F: Any + Send + Sync>(name: impl Into<String>, signature: String, f: F) -> Self {
        Self {
            name: name.into(),
            signature,
            handle: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn handle(&self) -> &(dyn Any + Send + Sync) {
        &*self.handle
    }
}

impl fmt::Debug for NamedProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedProcessor")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Formats the whole value through a user function.
pub struct ProcessorFormatter<V> {
    processor: fn(&V) -> String,
    scratch: Scratch,
}

impl<V> ProcessorFormatter<V> {
    pub fn new(processor: fn(&V) -> String, options: &FormatOptions) -> Self {
        Self {
            processor,
            scratch: Scratch::inline(&options.label),
        }
    }
}

impl<V: MonitorValue> ValueFormatter<V> for ProcessorFormatter<V> {
    fn format(&mut self, value: Option<&V>) -> &str {
        let processor = self.processor;
        let out = self.scratch.begin();
        match value {
            Some(v) => out.push_str(&processor(v)),
            None => out.push_str(NULL_TEXT),
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>> {
        Box::new(Self {
            processor: self.processor,
            scratch: self.scratch.clone(),
        })
    }
}

/// Matches a processor whose signature is exactly `fn(&V) -> String`.
pub fn exact_processor<V: MonitorValue>(
    handle: &(dyn Any + Send + Sync),
    options: &FormatOptions,
) -> Option<Box<dyn ValueFormatter<V>>> {
    let processor = *handle.downcast_ref::<fn(&V) -> String>()?;
    Some(Box::new(ProcessorFormatter::new(processor, options)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_bar(v: &u32) -> String {
        "#".repeat(*v as usize)
    }

    #[test]
    fn test_exact_processor_matches_value_type() {
        let p = NamedProcessor::value::<u32>("health_bar", health_bar);
        let mut f = exact_processor::<u32>(p.handle(), &FormatOptions::labeled("HP")).unwrap();
        assert_eq!(f.format(Some(&3)), "HP: ###");
        assert_eq!(f.format(None), "HP: null");
        assert!(exact_processor::<u64>(p.handle(), &FormatOptions::default()).is_none());
    }

    #[test]
    fn test_signature_is_described() {
        let p = NamedProcessor::entry::<u8, bool>("e", |k, v| format!("{k}{v}"));
        assert_eq!(p.signature(), "fn(&u8, &bool) -> String");
        assert_eq!(p.name(), "e");
    }
}
